//! # Session Driver
//!
//! The seam between the migration core and its external collaborators: the
//! peer-to-peer transport, the replication framework's spawn/despawn and
//! observer machinery, and identity resolution. Start/stop calls are
//! requests; the framework confirms them later through the coordinator's
//! role-state callbacks.

use peerhost_shared::identity::PlayerIdentity;
use peerhost_shared::types::{HostResult, Quat, Vector3};

use crate::entity::{EntityId, SharedEntity};

/// Everything the coordinator asks of the surrounding session machinery.
pub trait SessionDriver {
    /// Request the local client role to start (connect to the session
    /// host; on the new host itself this is the self-connect).
    fn start_client(&mut self);

    /// Request the local client role to stop.
    fn stop_client(&mut self);

    /// Request the local server role to start.
    fn start_server(&mut self);

    /// Request the local server role to stop.
    fn stop_server(&mut self);

    fn is_client_started(&self) -> bool;

    fn is_server_started(&self) -> bool;

    /// Stable identity of the local player, from identity resolution.
    fn local_identity(&self) -> PlayerIdentity;

    /// Resolve a prototype name to its registered template and instantiate
    /// it at the given pose. `Err` when the prototype is not registered.
    fn instantiate(
        &mut self,
        prototype_name: &str,
        position: Vector3,
        orientation: Quat,
    ) -> HostResult<(EntityId, SharedEntity)>;

    /// Spawn an instantiated entity under server authority.
    fn spawn(&mut self, id: EntityId);

    /// Despawn a live entity.
    fn despawn(&mut self, id: EntityId);

    /// Rebuild visibility/observer state for all entities after the new
    /// server instance is up.
    fn rebuild_observers(&mut self);
}
