//! Core drive calculations.
//!
//! Pure functions that can be tested in isolation without Bevy dependencies.
//! Steering and acceleration are a direct kinematic override applied each
//! frame, not forces: the commanded velocity and heading take effect
//! immediately.

use glam::{EulerRot, Quat, Vec3};

use crate::{
    constants::{SPEED, TURN_RATE},
    input::InputState,
};

/// Tuning for the player drive model.
#[derive(Clone, Copy, Debug)]
pub struct DriveParams {
    /// Forward/reverse speed (m/s).
    pub speed: f32,
    /// Yaw change per frame while turning (radians).
    pub turn_rate: f32,
}

impl Default for DriveParams {
    fn default() -> Self {
        Self {
            speed: SPEED,
            turn_rate: TURN_RATE,
        }
    }
}

/// Signed speed and yaw change requested by the held controls.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct DriveCommand {
    /// Positive drives towards the vehicle's heading.
    pub forward_force: f32,
    /// Positive turns left.
    pub turn_force: f32,
}

/// Resulting body state after applying a [`DriveCommand`].
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DriveStep {
    pub velocity: Vec3,
    pub rotation: Quat,
}

/// Map held controls onto a drive command.
///
/// Controls are evaluated forward then reverse, left then right; a later
/// control overwrites an earlier one, so reverse and right win ties.
pub fn drive_command(input: &InputState, params: &DriveParams) -> DriveCommand {
    let mut command = DriveCommand::default();

    if input.forward {
        command.forward_force = params.speed;
    }
    if input.reverse {
        command.forward_force = -params.speed;
    }

    if input.turn_left {
        command.turn_force = params.turn_rate;
    }
    if input.turn_right {
        command.turn_force = -params.turn_rate;
    }

    command
}

/// Extract the heading (rotation about +Y) from an orientation.
pub fn yaw_of(rotation: Quat) -> f32 {
    rotation.to_euler(EulerRot::YXZ).0
}

/// Horizontal velocity `(x, z)` for a signed speed along a heading.
///
/// A heading of zero drives along +Z.
pub fn horizontal_velocity(forward_force: f32, yaw: f32) -> (f32, f32) {
    (forward_force * yaw.sin(), forward_force * yaw.cos())
}

/// Apply the held controls to a body's velocity and orientation.
///
/// The vertical velocity is left untouched so gravity and ground contact keep
/// control of it. The new orientation is a pure yaw; steering never imparts
/// roll or pitch.
pub fn apply_drive(
    input: &InputState,
    params: &DriveParams,
    velocity: Vec3,
    rotation: Quat,
) -> DriveStep {
    let command = drive_command(input, params);
    let yaw = yaw_of(rotation);
    let (x, z) = horizontal_velocity(command.forward_force, yaw);

    DriveStep {
        velocity: Vec3::new(x, velocity.y, z),
        rotation: Quat::from_rotation_y(yaw + command.turn_force),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn held(forward: bool, reverse: bool, turn_left: bool, turn_right: bool) -> InputState {
        InputState {
            forward,
            reverse,
            turn_left,
            turn_right,
        }
    }

    #[test]
    fn test_neutral_input_commands_nothing() {
        let command = drive_command(&InputState::default(), &DriveParams::default());
        assert_eq!(command, DriveCommand::default());
    }

    #[test]
    fn test_reverse_wins_over_forward() {
        let command = drive_command(&held(true, true, false, false), &DriveParams::default());
        assert_eq!(command.forward_force, -SPEED);
    }

    #[test]
    fn test_right_wins_over_left() {
        let command = drive_command(&held(false, false, true, true), &DriveParams::default());
        assert_eq!(command.turn_force, -TURN_RATE);
    }

    #[test]
    fn test_horizontal_velocity_matches_heading() {
        let theta = 0.8_f32;
        assert_eq!(
            horizontal_velocity(SPEED, theta),
            (SPEED * theta.sin(), SPEED * theta.cos())
        );
        assert_eq!(
            horizontal_velocity(-SPEED, theta),
            (-SPEED * theta.sin(), -SPEED * theta.cos())
        );
    }

    #[test]
    fn test_yaw_roundtrip() {
        for theta in [-2.5_f32, -0.3, 0.0, 0.4, 1.2, 3.0] {
            let yaw = yaw_of(Quat::from_rotation_y(theta));
            assert!((yaw - theta).abs() < 1e-5, "{theta} -> {yaw}");
        }
    }

    #[test]
    fn test_forward_drive_keeps_vertical_velocity() {
        let theta = 0.5_f32;
        let step = apply_drive(
            &held(true, false, false, false),
            &DriveParams::default(),
            Vec3::new(3.0, -4.0, 1.0),
            Quat::from_rotation_y(theta),
        );
        assert!((step.velocity.x - SPEED * theta.sin()).abs() < 1e-4);
        assert!((step.velocity.z - SPEED * theta.cos()).abs() < 1e-4);
        assert_eq!(step.velocity.y, -4.0);
    }

    #[test]
    fn test_turn_produces_pure_yaw() {
        let step = apply_drive(
            &held(false, false, true, false),
            &DriveParams::default(),
            Vec3::ZERO,
            Quat::from_rotation_y(0.2),
        );
        assert!((yaw_of(step.rotation) - (0.2 + TURN_RATE)).abs() < 1e-5);
        // The vehicle's up axis stays world up.
        assert!((step.rotation * Vec3::Y).abs_diff_eq(Vec3::Y, 1e-5));
        assert_eq!(step.velocity, Vec3::ZERO);
    }

    #[test]
    fn test_turn_strips_roll_and_pitch() {
        let tilted = Quat::from_euler(EulerRot::YXZ, 0.3, 0.2, -0.1);
        let step = apply_drive(
            &InputState::default(),
            &DriveParams::default(),
            Vec3::ZERO,
            tilted,
        );
        assert!((step.rotation * Vec3::Y).abs_diff_eq(Vec3::Y, 1e-5));
        assert!((yaw_of(step.rotation) - 0.3).abs() < 1e-5);
    }
}
