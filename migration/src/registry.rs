//! # Repossession Registry
//!
//! Maps an owner identity to the ordered list of entities awaiting that
//! owner's reconnection. An entity handle appears in at most one entry at a
//! time, and entries are always claimed in full; there is no partial claim.

use std::collections::HashMap;

use peerhost_shared::identity::PlayerIdentity;

use crate::entity::EntityId;

/// Entities awaiting repossession, keyed by owner identity.
#[derive(Debug, Default)]
pub struct RepossessionRegistry {
    entries: HashMap<PlayerIdentity, Vec<EntityId>>,
}

impl RepossessionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an entity as awaiting `owner`. The handle is first removed
    /// from any other owner's entry so it can never be pending for two
    /// identities at once.
    pub fn register(&mut self, owner: &str, id: EntityId) {
        for handles in self.entries.values_mut() {
            handles.retain(|&h| h != id);
        }
        self.entries.retain(|_, handles| !handles.is_empty());
        self.entries
            .entry(owner.to_string())
            .or_default()
            .push(id);
    }

    /// Entities currently pending for `owner`, in registration order.
    pub fn pending(&self, owner: &str) -> &[EntityId] {
        self.entries.get(owner).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Claim everything pending for `owner`. Removes the entry in full;
    /// claiming under any other identity returns nothing.
    pub fn claim(&mut self, owner: &str) -> Vec<EntityId> {
        self.entries.remove(owner).unwrap_or_default()
    }

    /// Drain every entry, used to clean up abandoned repossessions from a
    /// prior incomplete migration cycle.
    pub fn drain_all(&mut self) -> Vec<(PlayerIdentity, Vec<EntityId>)> {
        self.entries.drain().collect()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Total number of pending entity handles across all owners.
    pub fn len(&self) -> usize {
        self.entries.values().map(Vec::len).sum()
    }
}
