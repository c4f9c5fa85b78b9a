//! # Peerhost Shared Types
//!
//! Common type definitions shared across the peer-hosted session modules.
//! This crate is deliberately passive: spatial math types, connection role
//! states, identity conventions, and the entity snapshot data model. All
//! behavior lives in the consuming crates.

pub mod connection;
pub mod identity;
pub mod snapshot;
pub mod types;

// Re-export commonly used items
pub use connection::{RoleKind, RoleState};
pub use identity::{is_unowned, NetworkId, PlayerIdentity, NETWORK_ID_UNSET};
pub use snapshot::{ComponentKey, EntitySnapshot, FieldData, FieldValue};
pub use types::{HostResult, Quat, Vector3};
