//! Tracks every actor load and its outcome.
//!
//! Each actor gets a slot when its model load is requested. A slot resolves
//! exactly once, to either a spawned entity or a failure. Once the simulation
//! is unmounted no slot can resolve, so late loads are discarded instead of
//! touching a scene that no longer exists.

use bevy::{gltf::Gltf, prelude::*};

use super::components::ActorKind;
use crate::error::{Result, RoadwayError};

/// Load status of one actor.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SlotStatus {
    /// The model is still loading.
    Loading,
    /// The actor exists with this body entity.
    Spawned(Entity),
    /// The model failed to load; the actor will never exist.
    Failed(String),
}

/// One requested actor.
#[derive(Clone, Debug)]
pub struct ActorSlot {
    /// Actor role.
    pub kind: ActorKind,
    /// Spawn pose.
    pub placement: Transform,
    /// Vehicle model being loaded. The actor spawns from its first scene.
    pub model: Handle<Gltf>,
    /// Current status.
    pub status: SlotStatus,
}

/// All actor slots for the current session.
#[derive(Resource, Debug, Default)]
pub struct ActorRoster {
    slots: Vec<ActorSlot>,
    mounted: bool,
}

impl ActorRoster {
    /// An empty roster that accepts load results.
    pub fn mounted() -> Self {
        Self {
            slots: Vec::new(),
            mounted: true,
        }
    }

    pub fn is_mounted(&self) -> bool {
        self.mounted
    }

    /// Register a pending load and return its slot index.
    pub fn request(&mut self, kind: ActorKind, placement: Transform, model: Handle<Gltf>) -> usize {
        self.slots.push(ActorSlot {
            kind,
            placement,
            model,
            status: SlotStatus::Loading,
        });
        self.slots.len() - 1
    }

    pub fn slots(&self) -> &[ActorSlot] {
        &self.slots
    }

    pub fn slot(&self, slot: usize) -> Option<&ActorSlot> {
        self.slots.get(slot)
    }

    /// Indices of slots still waiting on their load.
    pub fn loading(&self) -> Vec<usize> {
        self.slots
            .iter()
            .enumerate()
            .filter(|(_, slot)| slot.status == SlotStatus::Loading)
            .map(|(index, _)| index)
            .collect()
    }

    /// Check that a slot may resolve now.
    pub fn accept(&self, slot: usize) -> Result<&ActorSlot> {
        if !self.mounted {
            return Err(RoadwayError::Unmounted);
        }
        let entry = self
            .slots
            .get(slot)
            .ok_or(RoadwayError::UnknownSlot(slot))?;
        if entry.status != SlotStatus::Loading {
            return Err(RoadwayError::AlreadyResolved(slot));
        }
        Ok(entry)
    }

    /// Record that the actor for a slot was spawned.
    pub fn mark_spawned(&mut self, slot: usize, body: Entity) -> Result<()> {
        self.resolve(slot, SlotStatus::Spawned(body))
    }

    /// Record that the load for a slot failed.
    pub fn mark_failed(&mut self, slot: usize, reason: impl Into<String>) -> Result<()> {
        self.resolve(slot, SlotStatus::Failed(reason.into()))
    }

    fn resolve(&mut self, slot: usize, status: SlotStatus) -> Result<()> {
        self.accept(slot)?;
        self.slots[slot].status = status;
        Ok(())
    }

    /// Stop accepting load results.
    pub fn unmount(&mut self) {
        self.mounted = false;
    }

    /// Whether the actor for a slot exists.
    pub fn is_ready(&self, slot: usize) -> bool {
        matches!(
            self.slots.get(slot).map(|entry| &entry.status),
            Some(SlotStatus::Spawned(_))
        )
    }

    /// The player body, once spawned.
    pub fn player(&self) -> Option<Entity> {
        self.slots.iter().find_map(|slot| match slot.status {
            SlotStatus::Spawned(entity) if slot.kind == ActorKind::Player => Some(entity),
            _ => None,
        })
    }

    /// Number of spawned traffic actors.
    pub fn traffic_spawned(&self) -> usize {
        self.slots
            .iter()
            .filter(|slot| {
                slot.kind == ActorKind::Traffic && matches!(slot.status, SlotStatus::Spawned(_))
            })
            .count()
    }
}
