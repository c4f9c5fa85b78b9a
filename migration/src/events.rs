//! # Migration Events
//!
//! Coarse-grained lifecycle notifications consumed by external
//! collaborators (e.g. a spawner that claims repossessed entities).
//! Completion carries an explicit outcome so the client path's exhausted
//! retries are distinguishable from success without polling connection
//! state.

use serde::{Deserialize, Serialize};

/// How a migration cycle ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MigrationOutcome {
    /// Host promotion finished, or the client reconnected
    Succeeded,

    /// The client reconnect loop exhausted its attempts
    ReconnectFailed,
}

/// Notification emitted at migration cycle boundaries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MigrationEvent {
    /// A migration cycle began on this peer
    Started,

    /// The cycle finished; the local phase is back to idle
    Completed(MigrationOutcome),
}

/// Listener callback; registered once, invoked for every event.
pub type EventListener = Box<dyn FnMut(MigrationEvent)>;
