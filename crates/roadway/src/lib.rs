//! A drivable road scene built on Bevy and Avian.
//!
//! The player drives a car down a procedurally dressed road while scripted
//! traffic keeps its distance and a chase camera trails behind. The pure
//! vehicle and follow maths live in plain functions so they can be exercised
//! without an app; everything else is a set of Bevy plugins assembled by
//! [`build_app`].
//!
//! On the web, [`mount`] starts the simulation inside a canvas and
//! [`unmount`] tears it down.

pub mod actors;
pub mod audio;
pub mod camera;
pub mod clock;
pub mod constants;
pub mod error;
pub mod input;
pub mod launch_params;
pub mod physics;
pub mod traffic;
pub mod vehicle;
pub mod world;

use bevy::prelude::*;

use crate::{launch_params::SimulationConfig, world::SceneRng};

/// Plugin for the whole simulation.
pub struct RoadwayPlugin {
    pub config: SimulationConfig,
}

impl Plugin for RoadwayPlugin {
    fn build(&self, app: &mut App) {
        let seed = self.config.resolve_seed();
        tracing::info!("Scene seed: {seed}");

        app.insert_resource(self.config.clone())
            .insert_resource(SceneRng::from_seed(seed))
            .add_plugins((
                clock::ClockPlugin,
                physics::PhysicsIntegrationPlugin,
                world::WorldPlugin,
                actors::ActorPlugin,
                input::DriveInputPlugin,
                audio::SoundPlugin,
                vehicle::VehiclePlugin,
                traffic::TrafficPlugin,
                camera::ChaseCameraPlugin,
            ));
    }
}

/// Build the app. `canvas` selects the element to render into on the web.
pub fn build_app(config: SimulationConfig, canvas: Option<String>) -> App {
    let mut app = App::new();

    #[allow(unused_mut)]
    let mut window = Window {
        title: "roadway".to_string(),
        resolution: (1280, 720).into(),
        position: WindowPosition::Centered(MonitorSelection::Primary),
        canvas,
        ..Default::default()
    };

    // WASM: Fit canvas to parent element and prevent browser event handling.
    #[cfg(target_family = "wasm")]
    {
        window.fit_canvas_to_parent = true;
        window.prevent_default_event_handling = true;
    }

    app.add_plugins(DefaultPlugins.set(WindowPlugin {
        primary_window: Some(window),
        // Closing goes through the teardown path instead.
        close_when_requested: false,
        ..Default::default()
    }))
    .add_plugins(RoadwayPlugin { config });

    app
}

#[cfg(target_family = "wasm")]
mod web {
    use wasm_bindgen::prelude::*;

    use crate::{build_app, clock, launch_params};

    /// Start the simulation inside the canvas matched by `selector`.
    #[wasm_bindgen]
    pub fn mount(selector: &str) {
        console_error_panic_hook::set_once();
        // A second mount keeps the subscriber from the first.
        if tracing_wasm::try_set_as_global_default().is_err() {
            tracing::debug!("Tracing already initialized");
        }
        build_app(launch_params::parse(), Some(selector.to_string())).run();
    }

    /// Tear the running simulation down at the next frame.
    #[wasm_bindgen]
    pub fn unmount() {
        clock::request_unmount();
    }
}

#[cfg(target_family = "wasm")]
pub use web::{mount, unmount};
