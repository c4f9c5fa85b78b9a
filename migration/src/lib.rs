//! # Peerhost Migration Module
//!
//! Coordinates host migration for a peer-hosted multiplayer session: when
//! the peer acting as authoritative server disconnects, one surviving peer
//! is promoted to host, the session's live entities are captured before
//! teardown, the new host restarts the authoritative role, and previously
//! connected peers reconnect and reclaim the entities they owned.
//!
//! The system is organized into several sub-modules:
//! - `entity`: traits the core needs from live replicated entities, plus
//!   the per-entity `MigratableEntity` adapter
//! - `registry`: the repossession registry (owner identity -> pending
//!   entity handles)
//! - `coordinator`: the migration state machine for both the new-host and
//!   client paths
//! - `reconnect`: bounded-retry schedule for the client reconnect loop
//! - `timers`: deadline queue driving scheduled delays from `tick`
//! - `driver`: the seam to the external transport/replication framework
//! - `events`: migration lifecycle notifications

pub mod coordinator;
pub mod driver;
pub mod entity;
pub mod events;
pub mod reconnect;
pub mod registry;
pub mod timers;

// Re-export commonly used items
pub use coordinator::{MigrationCoordinator, MigrationPhase};
pub use driver::SessionDriver;
pub use entity::adapter::MigratableEntity;
pub use entity::{EntityId, ReplicatedComponent, ReplicatedEntity, SharedEntity};
pub use events::{MigrationEvent, MigrationOutcome};
pub use reconnect::{ReconnectConfig, ReconnectScheduler, RetryDecision};
pub use registry::RepossessionRegistry;
