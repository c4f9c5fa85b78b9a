//! # Identity Conventions
//!
//! A player is identified by a stable string that survives reconnects; the
//! transient per-session network id an entity carries is a separate `u64`
//! with a documented "unset" sentinel. Mapping a live connection to a
//! `PlayerIdentity` is done by an external identity-resolution layer.

/// Stable identity of a player, independent of transient connection or
/// session identifiers. The empty string means "unowned".
pub type PlayerIdentity = String;

/// Transient network identifier assigned to an entity for one session.
pub type NetworkId = u64;

/// Sentinel meaning "no network id assigned". Persistent entities are
/// compared against this during pre-restart cleanup so the new server
/// instance can re-register them.
pub const NETWORK_ID_UNSET: NetworkId = 0;

/// Whether an owner-identity value means "unowned" (scene-permanent
/// entities and anything never claimed by a player).
pub fn is_unowned(identity: &str) -> bool {
    identity.is_empty()
}
