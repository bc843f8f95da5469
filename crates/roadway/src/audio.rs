//! Looping engine and ambient sounds.
//!
//! Both sounds are created exactly once at startup, so the engine handle is
//! always present by the time input is processed. The [`LoopingSound`]
//! component is the source of truth for whether a sound should be audible;
//! [`apply_sound_state`] pushes that onto the audio sink once it exists.

use bevy::{audio::AudioSinkPlayback, prelude::*};

use crate::{
    clock::{FrameSet, SimulationPhase, TeardownSet},
    constants::{AMBIENT_SOUND_PATH, ENGINE_SOUND_PATH},
    input::EngineCue,
    launch_params::SimulationConfig,
};

/// Marker for the engine loop.
#[derive(Component)]
pub struct EngineSound;

/// Marker for the ambient background loop.
#[derive(Component)]
pub struct AmbientSound;

/// Play/stop state of a looping sound.
#[derive(Component, Debug, Default)]
pub struct LoopingSound {
    playing: bool,
}

impl LoopingSound {
    /// A sound that starts playing immediately.
    pub fn playing() -> Self {
        Self { playing: true }
    }

    pub fn is_playing(&self) -> bool {
        self.playing
    }

    /// Start playing. Returns `false` if it was already playing.
    pub fn play(&mut self) -> bool {
        !std::mem::replace(&mut self.playing, true)
    }

    /// Stop playing. Returns `false` if it was already stopped.
    pub fn stop(&mut self) -> bool {
        std::mem::replace(&mut self.playing, false)
    }

    /// Apply an engine cue. Returns whether the state changed.
    pub fn apply(&mut self, cue: EngineCue) -> bool {
        let changed = match cue {
            EngineCue::Start => self.play(),
            EngineCue::Stop => self.stop(),
        };
        if changed {
            tracing::debug!("Engine sound {:?}", cue);
        }
        changed
    }
}

/// Plugin for the engine and ambient loops.
pub struct SoundPlugin;

impl Plugin for SoundPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(Startup, setup_sounds)
            .add_systems(
                Update,
                apply_sound_state
                    .after(FrameSet::Input)
                    .run_if(in_state(SimulationPhase::Running)),
            )
            .add_systems(
                OnEnter(SimulationPhase::TornDown),
                stop_all_sounds.in_set(TeardownSet::Release),
            );
    }
}

/// Create both sound handles. The audio players are only attached when audio
/// is enabled; the play state is tracked either way.
fn setup_sounds(
    mut commands: Commands,
    asset_server: Res<AssetServer>,
    config: Res<SimulationConfig>,
) {
    let mut engine = commands.spawn((EngineSound, LoopingSound::default()));
    if config.audio {
        engine.insert((
            AudioPlayer::new(asset_server.load(ENGINE_SOUND_PATH)),
            PlaybackSettings::LOOP.paused(),
        ));
    }

    let mut ambient = commands.spawn((AmbientSound, LoopingSound::playing()));
    if config.audio {
        ambient.insert((
            AudioPlayer::new(asset_server.load(AMBIENT_SOUND_PATH)),
            PlaybackSettings::LOOP,
        ));
    }
}

/// Bring each sink in line with its [`LoopingSound`] state.
///
/// Sinks appear only after the audio source has loaded, so this also covers a
/// forward press that happened while the engine sound was still loading.
fn apply_sound_state(query: Query<(&LoopingSound, &AudioSink)>) {
    for (sound, sink) in &query {
        if sound.is_playing() && sink.is_paused() {
            sink.play();
        } else if !sound.is_playing() && !sink.is_paused() {
            sink.pause();
        }
    }
}

/// Stop and release both sounds.
fn stop_all_sounds(
    mut commands: Commands,
    mut query: Query<(Entity, &mut LoopingSound, Option<&AudioSink>)>,
) {
    for (entity, mut sound, sink) in &mut query {
        if sound.stop()
            && let Some(sink) = sink
        {
            sink.pause();
        }
        commands.entity(entity).despawn();
    }
}
