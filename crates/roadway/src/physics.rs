//! Physics integration using Avian 3D.
//!
//! Avian steps in `FixedPostUpdate`. With the fixed clock and the manual
//! virtual clock sharing one period, that is exactly one solver step per
//! frame, ahead of the controllers in `Update`.

use avian3d::debug_render::{PhysicsDebugPlugin, PhysicsGizmos};
use avian3d::prelude::*;
use bevy::color::palettes::css::LIME;
use bevy::gizmos::config::{GizmoConfig, GizmoConfigStore};
use bevy::prelude::*;

use crate::{clock::SimulationPhase, constants::GRAVITY, launch_params::SimulationConfig};

/// Key that toggles the collider overlay.
pub const PHYSICS_DEBUG_KEY: KeyCode = KeyCode::F3;

/// Plugin for the physics world.
pub struct PhysicsIntegrationPlugin;

impl Plugin for PhysicsIntegrationPlugin {
    fn build(&self, app: &mut App) {
        app.add_plugins(PhysicsPlugins::default())
            // Collider overlay, hidden unless requested.
            .add_plugins(PhysicsDebugPlugin)
            .insert_resource(Gravity(Vec3::NEG_Y * GRAVITY))
            .add_systems(Startup, configure_physics_debug_on_startup)
            .add_systems(
                Update,
                physics_debug_toggle_system.run_if(in_state(SimulationPhase::Running)),
            );
    }
}

/// Configure the collider overlay from the launch parameters.
fn configure_physics_debug_on_startup(
    mut config_store: ResMut<GizmoConfigStore>,
    config: Res<SimulationConfig>,
) {
    let physics_gizmos = PhysicsGizmos {
        collider_color: Some(LIME.into()),
        ..Default::default()
    };

    // Negative depth bias draws the overlay on top of geometry.
    let gizmo_config = GizmoConfig {
        enabled: config.physics_debug,
        depth_bias: -1.0,
        ..Default::default()
    };

    config_store.insert(gizmo_config, physics_gizmos);
    tracing::info!(
        "Physics debug visualization: {} ({PHYSICS_DEBUG_KEY:?} toggles)",
        is_physics_debug_enabled(&config_store)
    );
}

/// Toggle physics debug visualization.
pub fn toggle_physics_debug(config_store: &mut GizmoConfigStore) {
    let (config, _) = config_store.config_mut::<PhysicsGizmos>();
    config.enabled = !config.enabled;
    tracing::info!("Physics debug visualization: {}", config.enabled);
}

/// Check if physics debug is currently enabled.
pub fn is_physics_debug_enabled(config_store: &GizmoConfigStore) -> bool {
    let (config, _) = config_store.config::<PhysicsGizmos>();
    config.enabled
}

fn physics_debug_toggle_system(
    keyboard: Res<ButtonInput<KeyCode>>,
    mut config_store: ResMut<GizmoConfigStore>,
) {
    if keyboard.just_pressed(PHYSICS_DEBUG_KEY) {
        toggle_physics_debug(&mut config_store);
    }
}
