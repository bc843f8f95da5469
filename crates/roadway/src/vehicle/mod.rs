//! Player vehicle controller.
//!
//! Each frame the held drive controls are turned into a commanded horizontal
//! velocity and heading for the player body. Nothing happens until the player
//! actor has spawned.

pub mod core;

use avian3d::prelude::*;
use bevy::prelude::*;

pub use self::core::{DriveCommand, DriveParams, DriveStep, apply_drive, drive_command, yaw_of};

use crate::{actors::PlayerActor, clock::FrameSet, input::InputTracker};

/// Plugin for the player vehicle controller.
pub struct VehiclePlugin;

impl Plugin for VehiclePlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(Update, drive_player.in_set(FrameSet::Vehicle));
    }
}

/// Override the player body's horizontal velocity and heading from input.
pub fn drive_player(
    tracker: Res<InputTracker>,
    mut query: Query<(&mut LinearVelocity, &mut Rotation), With<PlayerActor>>,
) {
    let Ok((mut velocity, mut rotation)) = query.single_mut() else {
        return;
    };

    let step = apply_drive(
        &tracker.state(),
        &DriveParams::default(),
        velocity.0,
        rotation.0,
    );
    velocity.0 = step.velocity;
    rotation.0 = step.rotation;
}

#[cfg(test)]
mod tests {
    use bevy::{ecs::system::RunSystemOnce, window::WindowCloseRequested};

    use super::*;
    use crate::{
        actors::{ActorKind, spawn_actor},
        clock::ClockPlugin,
        constants::{PLAYER_SPAWN, SPEED},
        input::DriveAction,
    };

    /// A headless app with the real physics, clock and controller, a flat
    /// ground and the player spawned at its start position.
    fn driving_app(tracker: InputTracker) -> (App, Entity) {
        let mut app = App::new();
        app.add_plugins((
            MinimalPlugins,
            TransformPlugin,
            bevy::asset::AssetPlugin::default(),
            bevy::mesh::MeshPlugin,
            bevy::scene::ScenePlugin,
            bevy::state::app::StatesPlugin,
            PhysicsPlugins::default(),
            ClockPlugin,
            VehiclePlugin,
        ))
        .add_message::<WindowCloseRequested>()
        .insert_resource(tracker);
        app.finish();

        app.world_mut().spawn((
            RigidBody::Static,
            Collider::half_space(Vec3::Y),
            Transform::IDENTITY,
        ));
        let player = {
            let mut commands = app.world_mut().commands();
            spawn_actor(
                &mut commands,
                ActorKind::Player,
                0,
                Transform::from_translation(PLAYER_SPAWN),
                Handle::default(),
            )
        };
        app.world_mut().flush();

        (app, player)
    }

    fn player_position(app: &App, player: Entity) -> Vec3 {
        app.world().get::<Position>(player).unwrap().0
    }

    #[test]
    fn test_drive_player_reverse() {
        let theta = -1.1_f32;
        let mut world = World::new();
        let mut tracker = InputTracker::attached();
        tracker.key_down(DriveAction::Reverse);
        world.insert_resource(tracker);
        let player = world
            .spawn((
                LinearVelocity(Vec3::new(0.0, -1.5, 0.0)),
                Rotation(Quat::from_rotation_y(theta)),
                PlayerActor,
            ))
            .id();

        world.run_system_once(drive_player).unwrap();

        let velocity = world.get::<LinearVelocity>(player).unwrap().0;
        assert!((velocity.x + SPEED * theta.sin()).abs() < 1e-4);
        assert!((velocity.z + SPEED * theta.cos()).abs() < 1e-4);
        assert_eq!(velocity.y, -1.5);
    }

    #[test]
    fn test_drive_player_without_player_is_noop() {
        let mut world = World::new();
        let mut tracker = InputTracker::attached();
        tracker.key_down(DriveAction::Forward);
        world.insert_resource(tracker);
        // A non-player body must not be driven.
        let other = world
            .spawn((LinearVelocity(Vec3::ZERO), Rotation(Quat::IDENTITY)))
            .id();

        world.run_system_once(drive_player).unwrap();

        assert_eq!(world.get::<LinearVelocity>(other).unwrap().0, Vec3::ZERO);
        assert_eq!(world.get::<Rotation>(other).unwrap().0, Quat::IDENTITY);
    }

    #[test]
    fn test_idle_player_settles_in_place() {
        let (mut app, player) = driving_app(InputTracker::attached());

        for _ in 0..60 {
            app.update();
        }

        let position = player_position(&app, player);
        assert!((position.x - PLAYER_SPAWN.x).abs() < 1e-3);
        assert!((position.z - PLAYER_SPAWN.z).abs() < 1e-3);
        // Gravity still applies.
        assert!(position.y < PLAYER_SPAWN.y);
    }

    #[test]
    fn test_forward_covers_one_step_per_frame() {
        let mut tracker = InputTracker::attached();
        tracker.key_down(DriveAction::Forward);
        let (mut app, player) = driving_app(tracker);

        for _ in 0..60 {
            app.update();
        }

        // The first frame advances no time, so 59 solver steps have run.
        let expected = PLAYER_SPAWN.z + SPEED * 59.0 / 60.0;
        let position = player_position(&app, player);
        assert!(
            (position.z - expected).abs() < 0.5,
            "expected z near {expected}, got {}",
            position.z
        );
        assert!((position.x - PLAYER_SPAWN.x).abs() < 1e-3);
    }
}
