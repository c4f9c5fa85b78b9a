//! # Entity Abstractions
//!
//! What the migration core needs from the replication framework's live
//! entities. The framework itself (spawn/despawn, field replication, scene
//! graph) is an external collaborator; these traits are the seam.
//!
//! Components declare their replicated fields at compile time through the
//! `ReplicatedComponent` visitor rather than being enumerated by runtime
//! type introspection, which keeps the captured field bag type-safe.

pub mod adapter;

use std::cell::RefCell;
use std::rc::Rc;

use peerhost_shared::identity::NetworkId;
use peerhost_shared::snapshot::{ComponentKey, FieldValue};
use peerhost_shared::types::{HostResult, Quat, Vector3};

/// Handle identifying one live entity.
pub type EntityId = u64;

/// A component that declares which of its fields are captured during
/// migration. Field names are compile-time constants; `restore` returns
/// `false` for a name the component does not recognize so the caller can
/// log and skip it.
pub trait ReplicatedComponent {
    /// Component type tag, matched against `ComponentKey::type_name`
    fn type_name(&self) -> &'static str;

    /// Emit every captured field in declaration order
    fn capture(&self, out: &mut dyn FnMut(&'static str, FieldValue));

    /// Apply one captured field; `false` means the field is unknown here
    fn restore(&mut self, field: &str, value: &FieldValue) -> bool;
}

/// A live entity as seen by the migration core.
pub trait ReplicatedEntity {
    /// Stable identifier of the entity's template
    fn prototype_name(&self) -> &str;

    fn position(&self) -> Vector3;

    fn orientation(&self) -> Quat;

    fn set_pose(&mut self, position: Vector3, orientation: Quat);

    /// Replicated owner-identity field; empty means unowned. The
    /// replication framework clears this during teardown, which is why the
    /// adapter keeps a cached copy.
    fn owner_identity(&self) -> String;

    fn set_owner_identity(&mut self, identity: &str);

    /// Transient per-session network id
    fn network_id(&self) -> NetworkId;

    /// Clear the leftover network id from a previous session so the new
    /// server instance can re-register this entity
    fn reset_network_id(&mut self) -> HostResult<()>;

    /// Scene-rooted entities survive session teardown and are subject to
    /// the pre-restart network-id reset pass
    fn is_persistent(&self) -> bool;

    /// Opt-out marker capability: entities carrying it are never tracked
    fn migration_opt_out(&self) -> bool {
        false
    }

    /// Deactivate leaves the entity invisible and non-interactive until a
    /// reconnecting owner claims it
    fn set_active(&mut self, active: bool);

    /// Visit every replicated component, keyed by structural path + type
    fn visit_components(&self, visit: &mut dyn FnMut(&ComponentKey, &dyn ReplicatedComponent));

    /// Resolve a component by structural path + type name; `None` when the
    /// path or component no longer exists on this entity
    fn component_mut(&mut self, key: &ComponentKey) -> Option<&mut dyn ReplicatedComponent>;
}

/// Shared handle to a live entity. All migration state is mutated on one
/// cooperative execution context, so no locking is involved.
pub type SharedEntity = Rc<RefCell<dyn ReplicatedEntity>>;
