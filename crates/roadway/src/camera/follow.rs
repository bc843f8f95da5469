//! Chase camera follow.
//!
//! Third-person camera that trails the player vehicle. The target point is a
//! fixed offset in the vehicle's local frame; the camera closes a fixed
//! fraction of the remaining distance each frame and never snaps.

use avian3d::prelude::*;
use bevy::prelude::*;

use super::ChaseCamera;
use crate::{
    actors::{ActorBody, ActorVisual, PlayerActor},
    constants::{CAMERA_LERP, CAMERA_OFFSET},
};

/// World-space camera target for a vehicle whose visual sits at `mesh_position`
/// and whose body has orientation `body_rotation`.
pub fn follow_target(mesh_position: Vec3, body_rotation: Quat, offset: Vec3) -> Vec3 {
    mesh_position + body_rotation * offset
}

/// Move `camera` a fraction `factor` of the way toward `target`.
pub fn follow_step(camera: Vec3, target: Vec3, factor: f32) -> Vec3 {
    camera.lerp(target, factor)
}

/// Trail the player and keep looking at its visual.
pub(super) fn follow_player(
    player_query: Query<(&Rotation, &ActorBody), With<PlayerActor>>,
    visual_query: Query<&Transform, (With<ActorVisual>, Without<ChaseCamera>)>,
    mut camera_query: Query<&mut Transform, (With<ChaseCamera>, Without<ActorVisual>)>,
) {
    let Ok((rotation, body)) = player_query.single() else {
        return;
    };
    let Ok(visual) = visual_query.get(body.visual) else {
        return;
    };
    let Ok(mut camera) = camera_query.single_mut() else {
        return;
    };

    let target = follow_target(visual.translation, rotation.0, CAMERA_OFFSET);
    camera.translation = follow_step(camera.translation, target, CAMERA_LERP);
    camera.look_at(visual.translation, Vec3::Y);
}
