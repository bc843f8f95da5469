//! Actor component definitions.
//!
//! An actor is a physics body entity paired with exactly one visual entity.
//! The visual mirrors the body's pose once per frame and is never written
//! back to the body.

use avian3d::prelude::*;
use bevy::prelude::*;

/// Which role an actor plays.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ActorKind {
    /// The vehicle driven by the user.
    Player,
    /// A scripted vehicle that drives away from the player.
    Traffic,
}

/// Physics side of an actor.
#[derive(Component, Debug)]
pub struct ActorBody {
    /// Actor role.
    pub kind: ActorKind,
    /// Roster slot this actor was spawned for.
    pub slot: usize,
    /// The visual entity mirroring this body.
    pub visual: Entity,
}

/// Visual side of an actor.
#[derive(Component, Debug)]
pub struct ActorVisual {
    /// The body this visual mirrors.
    pub body: Entity,
}

/// Marker for the player body.
#[derive(Component)]
pub struct PlayerActor;

/// Marker for traffic bodies.
#[derive(Component)]
pub struct TrafficActor;

/// Copy a body's pose onto its visual.
pub fn mirror_body(position: &Position, rotation: &Rotation, visual: &mut Transform) {
    visual.translation = position.0;
    visual.rotation = rotation.0;
}
