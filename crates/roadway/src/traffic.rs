//! Scripted traffic.
//!
//! Every traffic vehicle drives away from the player along the road axis at a
//! constant speed, flipping direction the moment it crosses the player.
//! Nothing moves until the player exists.

use avian3d::prelude::*;
use bevy::prelude::*;

use crate::{
    actors::{ActorBody, ActorVisual, PlayerActor, TrafficActor, mirror_body},
    clock::FrameSet,
    constants::TRAFFIC_SPEED,
};

/// Plugin for the traffic controller.
pub struct TrafficPlugin;

impl Plugin for TrafficPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(Update, drive_traffic.in_set(FrameSet::Traffic));
    }
}

/// Longitudinal velocity for a traffic vehicle at `agent_z` given the player
/// at `player_z`. Zero when they are level.
pub fn traffic_velocity(agent_z: f32, player_z: f32) -> f32 {
    let offset = agent_z - player_z;
    if offset == 0.0 {
        0.0
    } else {
        offset.signum() * TRAFFIC_SPEED
    }
}

/// Drive every spawned traffic vehicle and mirror it onto its visual.
pub fn drive_traffic(
    player_query: Query<&Position, (With<PlayerActor>, Without<TrafficActor>)>,
    mut traffic_query: Query<
        (&Position, &Rotation, &ActorBody, &mut LinearVelocity),
        (With<TrafficActor>, Without<PlayerActor>),
    >,
    mut visual_query: Query<&mut Transform, With<ActorVisual>>,
) {
    let Ok(player) = player_query.single() else {
        return;
    };

    for (position, rotation, body, mut velocity) in &mut traffic_query {
        velocity.z = traffic_velocity(position.z, player.z);
        if let Ok(mut visual) = visual_query.get_mut(body.visual) {
            mirror_body(position, rotation, &mut visual);
        }
    }
}

#[cfg(test)]
mod tests {
    use bevy::ecs::system::RunSystemOnce;

    use super::*;
    use crate::actors::ActorKind;

    fn spawn_body(world: &mut World, kind: ActorKind, position: Vec3) -> (Entity, Entity) {
        let visual = world.spawn(Transform::default()).id();
        let mut body = world.spawn((
            Position(position),
            Rotation::default(),
            LinearVelocity::default(),
            ActorBody {
                kind,
                slot: 0,
                visual,
            },
        ));
        match kind {
            ActorKind::Player => body.insert(PlayerActor),
            ActorKind::Traffic => body.insert(TrafficActor),
        };
        let body = body.id();
        world.entity_mut(visual).insert(ActorVisual { body });
        (body, visual)
    }

    #[test]
    fn test_behind_player_drives_backward() {
        assert_eq!(traffic_velocity(-5.0, 0.0), -TRAFFIC_SPEED);
    }

    #[test]
    fn test_ahead_of_player_drives_forward() {
        assert_eq!(traffic_velocity(5.0, 2.0), TRAFFIC_SPEED);
    }

    #[test]
    fn test_level_with_player_is_stationary() {
        assert_eq!(traffic_velocity(3.0, 3.0), 0.0);
    }

    #[test]
    fn test_crossing_player_flips_direction() {
        let mut world = World::new();
        let (player, _) = spawn_body(&mut world, ActorKind::Player, Vec3::ZERO);
        let (agent, visual) = spawn_body(&mut world, ActorKind::Traffic, Vec3::new(1.0, 0.0, -4.0));

        world.run_system_once(drive_traffic).unwrap();
        assert_eq!(world.get::<LinearVelocity>(agent).unwrap().z, -TRAFFIC_SPEED);
        assert_eq!(
            world.get::<Transform>(visual).unwrap().translation,
            Vec3::new(1.0, 0.0, -4.0)
        );

        // Player overtakes in reverse so the agent ends up ahead.
        world.get_mut::<Position>(player).unwrap().0.z = -10.0;
        world.run_system_once(drive_traffic).unwrap();
        assert_eq!(world.get::<LinearVelocity>(agent).unwrap().z, TRAFFIC_SPEED);
    }

    #[test]
    fn test_no_player_leaves_traffic_untouched() {
        let mut world = World::new();
        let (agent, visual) = spawn_body(&mut world, ActorKind::Traffic, Vec3::new(0.0, 0.0, 8.0));

        world.run_system_once(drive_traffic).unwrap();

        assert_eq!(world.get::<LinearVelocity>(agent).unwrap().0, Vec3::ZERO);
        assert_eq!(world.get::<Transform>(visual).unwrap().translation, Vec3::ZERO);
    }
}
