//! # Migratable Entity Adapter
//!
//! Per-entity agent that keeps a locally-owned entity's most recent valid
//! state available for capture. The replication framework zeroes networked
//! fields before the teardown hooks fire, so reading the live values at
//! save time would lose the data; the adapter instead refreshes a cached
//! copy every tick while the entity still has an owner.

use log::warn;

use peerhost_shared::identity::is_unowned;
use peerhost_shared::snapshot::{EntitySnapshot, FieldData};
use peerhost_shared::types::{Quat, Vector3};

use super::{EntityId, ReplicatedEntity, SharedEntity};

/// Cached copy of the entity's replicated state, refreshed per tick
struct CachedState {
    position: Vector3,
    orientation: Quat,
    owner_identity: String,
    field_data: FieldData,
}

/// Adapter wrapping one live entity for migration capture and restore.
pub struct MigratableEntity {
    id: EntityId,
    entity: SharedEntity,
    cached: Option<CachedState>,
}

impl MigratableEntity {
    pub fn new(id: EntityId, entity: SharedEntity) -> Self {
        Self {
            id,
            entity,
            cached: None,
        }
    }

    pub fn id(&self) -> EntityId {
        self.id
    }

    pub fn entity(&self) -> &SharedEntity {
        &self.entity
    }

    /// Refresh the cached state. Runs only while the replicated owner
    /// identity is non-empty: once the framework clears it the fields are
    /// being zeroed too, and overwriting the cache would defeat its point.
    pub fn tick(&mut self) {
        let entity = self.entity.borrow();
        let owner = entity.owner_identity();
        if is_unowned(&owner) {
            return;
        }
        self.cached = Some(CachedState {
            position: entity.position(),
            orientation: entity.orientation(),
            owner_identity: owner,
            field_data: capture_fields(&*entity),
        });
    }

    /// The identity the entity is effectively owned by: the replicated
    /// value when non-empty, otherwise the last cached value.
    pub fn effective_identity(&self) -> String {
        let replicated = self.entity.borrow().owner_identity();
        if !is_unowned(&replicated) {
            return replicated;
        }
        self.cached
            .as_ref()
            .map(|c| c.owner_identity.clone())
            .unwrap_or_default()
    }

    /// Capture a snapshot of this entity. Prefers the cached state when it
    /// belongs to the effective identity; otherwise falls back to reading
    /// the live fields, which may already be cleared. Returns `None` when
    /// no owner identity is known at all (nothing worth saving).
    pub fn save_snapshot(&self) -> Option<EntitySnapshot> {
        let entity = self.entity.borrow();
        let effective = {
            let replicated = entity.owner_identity();
            if !is_unowned(&replicated) {
                replicated
            } else {
                self.cached
                    .as_ref()
                    .map(|c| c.owner_identity.clone())
                    .unwrap_or_default()
            }
        };
        if is_unowned(&effective) {
            return None;
        }

        if let Some(cached) = &self.cached {
            if cached.owner_identity == effective {
                return Some(EntitySnapshot {
                    prototype_name: entity.prototype_name().to_string(),
                    position: cached.position,
                    orientation: cached.orientation,
                    owner_identity: effective,
                    field_data: cached.field_data.clone(),
                });
            }
        }

        warn!(
            "entity {}: no usable cached state for '{}', reading live fields (may already be cleared)",
            self.id, effective
        );
        Some(EntitySnapshot {
            prototype_name: entity.prototype_name().to_string(),
            position: entity.position(),
            orientation: entity.orientation(),
            owner_identity: effective,
            field_data: capture_fields(&*entity),
        })
    }

    /// Reapply a snapshot onto the live entity: pose and owner identity
    /// first, then each captured field. Unmatched components and fields
    /// are skipped with a warning, never fatal.
    pub fn restore_snapshot(&self, snapshot: &EntitySnapshot) {
        let mut entity = self.entity.borrow_mut();
        entity.set_pose(snapshot.position, snapshot.orientation);
        entity.set_owner_identity(&snapshot.owner_identity);

        for (key, fields) in &snapshot.field_data {
            match entity.component_mut(key) {
                Some(component) => {
                    for (name, value) in fields {
                        if !component.restore(name, value) {
                            warn!(
                                "entity {}: component {} has no field '{}', skipping",
                                self.id, key, name
                            );
                        }
                    }
                }
                None => {
                    warn!(
                        "entity {}: no component at {}, skipping {} field(s)",
                        self.id,
                        key,
                        fields.len()
                    );
                }
            }
        }
    }
}

/// Walk every replicated component and collect its declared fields.
fn capture_fields(entity: &dyn ReplicatedEntity) -> FieldData {
    let mut data = FieldData::new();
    entity.visit_components(&mut |key, component| {
        let mut fields = std::collections::HashMap::new();
        component.capture(&mut |name, value| {
            fields.insert(name.to_string(), value);
        });
        data.insert(key.clone(), fields);
    });
    data
}
