//! Drive input tracking.
//!
//! Key bindings are declared with `leafwing-input-manager`. Each frame the
//! press/release edges of the four drive controls are folded into a stable
//! [`InputState`] held by the [`InputTracker`] resource; every other key is
//! ignored. Only the currently held state matters, nothing is queued.

use bevy::prelude::*;
use leafwing_input_manager::prelude::*;

use crate::{
    audio::{EngineSound, LoopingSound},
    clock::{FrameSet, SimulationPhase, TeardownSet},
};

// ============================================================================
// Actions
// ============================================================================

/// The four drive controls.
#[derive(Actionlike, PartialEq, Eq, Hash, Clone, Copy, Debug, Reflect)]
pub enum DriveAction {
    /// Drive forward (W / Up).
    Forward,
    /// Drive in reverse (S / Down).
    Reverse,
    /// Turn left (A / Left).
    TurnLeft,
    /// Turn right (D / Right).
    TurnRight,
}

impl DriveAction {
    /// Every drive action, in evaluation order.
    pub const ALL: [DriveAction; 4] = [
        DriveAction::Forward,
        DriveAction::Reverse,
        DriveAction::TurnLeft,
        DriveAction::TurnRight,
    ];
}

/// Keys recognized as drive controls.
pub const KEY_BINDINGS: &[(KeyCode, DriveAction)] = &[
    (KeyCode::KeyW, DriveAction::Forward),
    (KeyCode::ArrowUp, DriveAction::Forward),
    (KeyCode::KeyS, DriveAction::Reverse),
    (KeyCode::ArrowDown, DriveAction::Reverse),
    (KeyCode::KeyA, DriveAction::TurnLeft),
    (KeyCode::ArrowLeft, DriveAction::TurnLeft),
    (KeyCode::KeyD, DriveAction::TurnRight),
    (KeyCode::ArrowRight, DriveAction::TurnRight),
];

/// Create the default input map for drive actions.
pub fn default_drive_input_map() -> InputMap<DriveAction> {
    KEY_BINDINGS
        .iter()
        .fold(InputMap::default(), |map, (key, action)| {
            map.with(*action, *key)
        })
}

// ============================================================================
// Input state
// ============================================================================

/// Currently held drive controls.
#[derive(Default, Debug, Clone, Copy, PartialEq, Eq)]
pub struct InputState {
    pub forward: bool,
    pub reverse: bool,
    pub turn_left: bool,
    pub turn_right: bool,
}

impl InputState {
    fn flag_mut(&mut self, action: DriveAction) -> &mut bool {
        match action {
            DriveAction::Forward => &mut self.forward,
            DriveAction::Reverse => &mut self.reverse,
            DriveAction::TurnLeft => &mut self.turn_left,
            DriveAction::TurnRight => &mut self.turn_right,
        }
    }
}

/// Engine sound change requested by a forward-control edge.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EngineCue {
    Start,
    Stop,
}

/// Owns the [`InputState`] and whether key events are being listened to.
#[derive(Resource, Debug, Default)]
pub struct InputTracker {
    state: InputState,
    attached: bool,
}

impl InputTracker {
    /// A tracker that is listening, with nothing held.
    pub fn attached() -> Self {
        Self {
            state: InputState::default(),
            attached: true,
        }
    }

    /// Snapshot of the held controls.
    pub fn state(&self) -> InputState {
        self.state
    }

    pub fn is_attached(&self) -> bool {
        self.attached
    }

    /// Stop listening. Held state is cleared and later events are ignored.
    pub fn detach(&mut self) {
        self.attached = false;
        self.state = InputState::default();
    }

    /// Handle a key-down for a drive control.
    ///
    /// Returns [`EngineCue::Start`] only when forward goes from released to held.
    pub fn key_down(&mut self, action: DriveAction) -> Option<EngineCue> {
        if !self.attached {
            return None;
        }
        let flag = self.state.flag_mut(action);
        let was_held = std::mem::replace(flag, true);
        (action == DriveAction::Forward && !was_held).then_some(EngineCue::Start)
    }

    /// Handle a key-up for a drive control.
    ///
    /// Returns [`EngineCue::Stop`] only when forward goes from held to released.
    pub fn key_up(&mut self, action: DriveAction) -> Option<EngineCue> {
        if !self.attached {
            return None;
        }
        let flag = self.state.flag_mut(action);
        let was_held = std::mem::replace(flag, false);
        (action == DriveAction::Forward && was_held).then_some(EngineCue::Stop)
    }
}

// ============================================================================
// Plugin
// ============================================================================

/// Marker for the entity carrying the drive input map.
#[derive(Component)]
pub struct DriveControls;

/// Plugin that registers drive actions and folds them into [`InputTracker`].
pub struct DriveInputPlugin;

impl Plugin for DriveInputPlugin {
    fn build(&self, app: &mut App) {
        app.add_plugins(InputManagerPlugin::<DriveAction>::default())
            .insert_resource(InputTracker::attached())
            .add_systems(Startup, spawn_drive_controls)
            .add_systems(Update, track_drive_keys.in_set(FrameSet::Input))
            .add_systems(
                OnEnter(SimulationPhase::TornDown),
                detach_drive_controls.in_set(TeardownSet::Release),
            );
    }
}

fn spawn_drive_controls(mut commands: Commands) {
    commands.spawn((
        DriveControls,
        default_drive_input_map(),
        ActionState::<DriveAction>::default(),
    ));
}

/// Fold this frame's press/release edges into the tracker.
fn track_drive_keys(
    action_query: Query<&ActionState<DriveAction>, With<DriveControls>>,
    mut tracker: ResMut<InputTracker>,
    mut engine_query: Query<&mut LoopingSound, With<EngineSound>>,
) {
    let Ok(action_state) = action_query.single() else {
        return;
    };

    for action in DriveAction::ALL {
        let cue = if action_state.just_pressed(&action) {
            tracker.key_down(action)
        } else if action_state.just_released(&action) {
            tracker.key_up(action)
        } else {
            None
        };

        let Some(cue) = cue else { continue };
        if let Ok(mut engine) = engine_query.single_mut() {
            engine.apply(cue);
        }
    }
}

/// Remove the key listeners.
fn detach_drive_controls(
    mut commands: Commands,
    mut tracker: ResMut<InputTracker>,
    controls: Query<Entity, With<DriveControls>>,
) {
    tracker.detach();
    for entity in &controls {
        commands.entity(entity).despawn();
    }
    tracing::debug!("Drive input detached");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_down_sets_flag() {
        let mut tracker = InputTracker::attached();
        tracker.key_down(DriveAction::TurnLeft);
        assert!(tracker.state().turn_left);
        assert!(!tracker.state().turn_right);
        tracker.key_up(DriveAction::TurnLeft);
        assert_eq!(tracker.state(), InputState::default());
    }

    #[test]
    fn test_forward_press_release_cues_once_each() {
        let mut tracker = InputTracker::attached();
        let mut engine = LoopingSound::default();
        let mut starts = 0;
        let mut stops = 0;

        // Key repeat delivers several downs before the single up.
        let events = [
            (true, DriveAction::Forward),
            (true, DriveAction::Forward),
            (true, DriveAction::Forward),
            (false, DriveAction::Forward),
        ];
        for (down, action) in events {
            let cue = if down {
                tracker.key_down(action)
            } else {
                tracker.key_up(action)
            };
            match cue {
                Some(EngineCue::Start) => {
                    assert!(engine.apply(EngineCue::Start));
                    starts += 1;
                }
                Some(EngineCue::Stop) => {
                    assert!(engine.apply(EngineCue::Stop));
                    stops += 1;
                }
                None => {}
            }
        }

        assert_eq!(starts, 1);
        assert_eq!(stops, 1);
        assert!(!engine.is_playing());
    }

    #[test]
    fn test_other_controls_do_not_cue_engine() {
        let mut tracker = InputTracker::attached();
        assert_eq!(tracker.key_down(DriveAction::Reverse), None);
        assert_eq!(tracker.key_up(DriveAction::Reverse), None);
        assert_eq!(tracker.key_down(DriveAction::TurnRight), None);
    }

    #[test]
    fn test_release_without_press_is_noop() {
        let mut tracker = InputTracker::attached();
        assert_eq!(tracker.key_up(DriveAction::Forward), None);
        assert_eq!(tracker.state(), InputState::default());
    }

    #[test]
    fn test_detached_tracker_ignores_events() {
        let mut tracker = InputTracker::attached();
        tracker.key_down(DriveAction::Reverse);
        tracker.detach();
        assert!(!tracker.is_attached());
        assert_eq!(tracker.state(), InputState::default());

        assert_eq!(tracker.key_down(DriveAction::Forward), None);
        tracker.key_down(DriveAction::TurnLeft);
        assert_eq!(tracker.state(), InputState::default());
    }

    #[test]
    fn test_unrecognized_keys_are_unbound() {
        let bound = |key: KeyCode| {
            KEY_BINDINGS
                .iter()
                .find(|(bound, _)| *bound == key)
                .map(|(_, action)| *action)
        };
        assert_eq!(bound(KeyCode::KeyQ), None);
        assert_eq!(bound(KeyCode::Space), None);
        assert_eq!(bound(KeyCode::ArrowUp), Some(DriveAction::Forward));
        assert_eq!(bound(KeyCode::KeyD), Some(DriveAction::TurnRight));
    }

    #[test]
    fn test_every_action_has_a_binding() {
        for action in DriveAction::ALL {
            assert!(KEY_BINDINGS.iter().any(|(_, bound)| *bound == action));
        }
    }
}
