//! Simulation clock and frame loop.
//!
//! The simulation has two phases: [`SimulationPhase::Running`], entered on
//! mount and re-entered every frame, and [`SimulationPhase::TornDown`], a
//! terminal phase reached once on unmount.
//!
//! ## Frame order
//!
//! ```text
//! FixedPostUpdate: physics step (exactly one FIXED_TIMESTEP per frame)
//! Update:          Input -> Vehicle -> Traffic -> SyncVisuals -> Camera
//! PostUpdate:      transform propagation, render extraction
//! ```
//!
//! Virtual time is advanced manually by [`FIXED_TIMESTEP`] each frame and the
//! fixed clock uses the same period, so the fixed schedule (and with it the
//! Avian solver) runs exactly once per frame independent of wall time.

use std::sync::atomic::{AtomicBool, Ordering};

use avian3d::prelude::*;
use bevy::{
    prelude::*,
    time::TimeUpdateStrategy,
    window::{PrimaryWindow, WindowCloseRequested},
};

use crate::{
    actors::{ActorBody, ActorVisual, PlayerActor, mirror_body},
    constants::FIXED_TIMESTEP,
};

/// Set by [`request_unmount`], consumed by the frame loop.
static UNMOUNT_REQUESTED: AtomicBool = AtomicBool::new(false);

/// Lifecycle phase of the simulation.
#[derive(States, Default, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SimulationPhase {
    /// Frames are being simulated and rendered.
    #[default]
    Running,
    /// Listeners, sounds, scene and render surface have been released.
    TornDown,
}

/// Per-frame stages, run in this order while [`SimulationPhase::Running`].
#[derive(SystemSet, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FrameSet {
    /// Key events are folded into the input state.
    Input,
    /// Player velocity and heading are commanded.
    Vehicle,
    /// Traffic agents are driven and their visuals synced.
    Traffic,
    /// The player visual mirrors its body.
    SyncVisuals,
    /// The chase camera follows the player.
    Camera,
}

/// Stages of the teardown transition.
#[derive(SystemSet, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TeardownSet {
    /// Listeners are detached, sounds stopped, scene entities despawned.
    Release,
    /// The render surface is detached and the app exits.
    Detach,
}

/// Plugin for the fixed-step frame loop and the mount lifecycle.
pub struct ClockPlugin;

impl Plugin for ClockPlugin {
    fn build(&self, app: &mut App) {
        app.init_state::<SimulationPhase>()
            .insert_resource(Time::<Fixed>::from_duration(FIXED_TIMESTEP))
            .insert_resource(TimeUpdateStrategy::ManualDuration(FIXED_TIMESTEP))
            .configure_sets(
                Update,
                (
                    FrameSet::Input,
                    FrameSet::Vehicle,
                    FrameSet::Traffic,
                    FrameSet::SyncVisuals,
                    FrameSet::Camera,
                )
                    .chain()
                    .run_if(in_state(SimulationPhase::Running)),
            )
            .configure_sets(
                OnEnter(SimulationPhase::TornDown),
                (TeardownSet::Release, TeardownSet::Detach).chain(),
            )
            .add_systems(Startup, log_mount)
            .add_systems(
                Update,
                (
                    sync_player_visual.in_set(FrameSet::SyncVisuals),
                    (poll_unmount_request, unmount_on_window_close)
                        .run_if(in_state(SimulationPhase::Running)),
                ),
            )
            .add_systems(
                OnEnter(SimulationPhase::TornDown),
                detach_render_surface.in_set(TeardownSet::Detach),
            );
    }
}

/// Ask the running simulation to tear down at the start of the next frame.
///
/// Safe to call from outside the app (e.g. the WASM `unmount` export).
pub fn request_unmount() {
    UNMOUNT_REQUESTED.store(true, Ordering::SeqCst);
}

fn log_mount() {
    tracing::info!(
        "Simulation mounted, stepping physics by {:.4}s per frame",
        FIXED_TIMESTEP.as_secs_f32()
    );
}

/// Transition to [`SimulationPhase::TornDown`] when an unmount was requested.
fn poll_unmount_request(mut next_phase: ResMut<NextState<SimulationPhase>>) {
    if UNMOUNT_REQUESTED.swap(false, Ordering::SeqCst) {
        tracing::info!("Unmount requested");
        next_phase.set(SimulationPhase::TornDown);
    }
}

/// Route window close through the same teardown as an explicit unmount.
fn unmount_on_window_close(
    mut close_requests: MessageReader<WindowCloseRequested>,
    mut next_phase: ResMut<NextState<SimulationPhase>>,
) {
    if close_requests.read().next().is_some() {
        tracing::info!("Window close requested");
        next_phase.set(SimulationPhase::TornDown);
    }
}

/// Copy the player body's pose onto its visual.
fn sync_player_visual(
    player_query: Query<(&Position, &Rotation, &ActorBody), With<PlayerActor>>,
    mut visual_query: Query<&mut Transform, With<ActorVisual>>,
) {
    let Ok((position, rotation, body)) = player_query.single() else {
        return;
    };
    if let Ok(mut visual) = visual_query.get_mut(body.visual) {
        mirror_body(position, rotation, &mut visual);
    }
}

/// Release the window and stop the app. No further frames are scheduled.
fn detach_render_surface(
    mut commands: Commands,
    windows: Query<Entity, With<PrimaryWindow>>,
    mut exit: MessageWriter<AppExit>,
) {
    for window in &windows {
        commands.entity(window).despawn();
    }
    exit.write(AppExit::Success);
    tracing::info!("Simulation torn down");
}
