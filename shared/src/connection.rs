//! # Connection Role States
//!
//! State enums carried by the start/stop notifications for the local client
//! and server roles. Migration waits only ever resolve on the two terminal
//! values; `Starting` and `Stopping` are informational.

use serde::{Serialize, Deserialize};

/// State of a local network role (client or server)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RoleState {
    /// Role is not running
    Stopped,

    /// Role is starting up
    Starting,

    /// Role is running
    Started,

    /// Role is tearing down
    Stopping,
}

impl RoleState {
    /// Whether this is one of the two terminal states a migration wait
    /// resolves on.
    pub fn is_terminal(self) -> bool {
        matches!(self, RoleState::Started | RoleState::Stopped)
    }
}

/// Which local role a state notification refers to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RoleKind {
    /// The local client role (connection to the session host)
    Client,

    /// The local server role (authoritative host)
    Server,
}
