//! Chase camera rig.
//!
//! A single perspective camera is spawned on mount and has exclusive control
//! of its own transform: there are no orbit, pan or zoom controls. Each frame
//! it trails the player (see [`follow`]) and on viewport resize its aspect
//! ratio is recomputed. Linear distance fog in the sky colour hides the far
//! end of the road.

mod follow;

use bevy::{prelude::*, window::WindowResized};

pub use follow::{follow_step, follow_target};

use crate::{
    clock::{FrameSet, SimulationPhase, TeardownSet},
    constants::{CAMERA_START, FOG_END, FOG_START},
    world::SKY_COLOR,
};

/// Marker for the chase camera.
#[derive(Component)]
pub struct ChaseCamera;

/// Plugin for the chase camera.
pub struct ChaseCameraPlugin;

impl Plugin for ChaseCameraPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(Startup, spawn_chase_camera)
            .add_systems(
                Update,
                (
                    follow::follow_player.in_set(FrameSet::Camera),
                    handle_viewport_resize.run_if(in_state(SimulationPhase::Running)),
                ),
            )
            .add_systems(
                OnEnter(SimulationPhase::TornDown),
                despawn_chase_camera.in_set(TeardownSet::Release),
            );
    }
}

fn spawn_chase_camera(mut commands: Commands) {
    commands.spawn((
        ChaseCamera,
        Camera3d::default(),
        Projection::Perspective(PerspectiveProjection::default()),
        Transform::from_translation(CAMERA_START).looking_at(Vec3::ZERO, Vec3::Y),
        DistanceFog {
            color: SKY_COLOR,
            falloff: FogFalloff::Linear {
                start: FOG_START,
                end: FOG_END,
            },
            ..default()
        },
    ));
}

/// Aspect ratio for a viewport, or `None` if it has collapsed.
pub fn aspect_ratio(width: f32, height: f32) -> Option<f32> {
    (width > 0.0 && height > 0.0).then(|| width / height)
}

/// Keep the projection in step with the viewport.
fn handle_viewport_resize(
    mut resized: MessageReader<WindowResized>,
    mut projection_query: Query<&mut Projection, With<ChaseCamera>>,
) {
    let Some(last) = resized.read().last() else {
        return;
    };
    let Some(aspect) = aspect_ratio(last.width, last.height) else {
        return;
    };

    for mut projection in &mut projection_query {
        if let Projection::Perspective(perspective) = projection.as_mut() {
            perspective.aspect_ratio = aspect;
        }
    }
    tracing::debug!("Viewport resized to {}x{}", last.width, last.height);
}

fn despawn_chase_camera(mut commands: Commands, cameras: Query<Entity, With<ChaseCamera>>) {
    for camera in &cameras {
        commands.entity(camera).despawn();
    }
}

#[cfg(test)]
mod tests {
    use bevy::ecs::system::RunSystemOnce;

    use super::*;

    #[test]
    fn test_chase_camera_fades_into_sky() {
        let mut world = World::new();
        world.run_system_once(spawn_chase_camera).unwrap();

        let mut fogs = world.query_filtered::<&DistanceFog, With<ChaseCamera>>();
        let fog = fogs.single(&world).unwrap();
        assert_eq!(fog.color, SKY_COLOR);
        let FogFalloff::Linear { start, end } = fog.falloff else {
            panic!("expected linear fog, got {:?}", fog.falloff);
        };
        assert_eq!(start, FOG_START);
        assert_eq!(end, FOG_END);
    }

    #[test]
    fn test_aspect_ratio() {
        assert_eq!(aspect_ratio(1600.0, 900.0), Some(1600.0 / 900.0));
        assert_eq!(aspect_ratio(800.0, 0.0), None);
        assert_eq!(aspect_ratio(0.0, 600.0), None);
    }
}
