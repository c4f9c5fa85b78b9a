//! # Entity Snapshot Model
//!
//! A point-in-time capture of one entity: prototype name, pose, owning
//! identity, and a keyed bag of replicated field values. Snapshots are
//! immutable once stored in a pending-restore list; they are only ever
//! replaced wholesale, never field-patched.

use serde::{Serialize, Deserialize};
use std::collections::HashMap;
use std::fmt;

use crate::identity::{is_unowned, PlayerIdentity};
use crate::types::{Quat, Vector3};

/// A replicated field value captured from a component.
///
/// Container values are carried as JSON strings rather than typed trees,
/// the same trade the property system makes elsewhere in the stack.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum FieldValue {
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
    Vector(Vector3),
    Quat(Quat),

    /// JSON-encoded container or custom struct value
    Json(String),

    /// Null value
    None,
}

impl FieldValue {
    /// Wrap an arbitrary JSON tree as a container field.
    pub fn from_json(value: &serde_json::Value) -> Self {
        FieldValue::Json(value.to_string())
    }

    /// Decode a `Json` container back into a tree. `None` for every other
    /// variant and for text that no longer parses.
    pub fn as_json(&self) -> Option<serde_json::Value> {
        match self {
            FieldValue::Json(text) => serde_json::from_str(text).ok(),
            _ => None,
        }
    }
}

/// Identifies one component instance on an entity: the structural path from
/// the entity root plus the component's type tag. The pair disambiguates
/// repeated component types on the same entity.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ComponentKey {
    /// Structural path from the entity root (e.g. "Body/Turret")
    pub path: String,

    /// Component type tag
    pub type_name: String,
}

impl ComponentKey {
    pub fn new(path: impl Into<String>, type_name: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            type_name: type_name.into(),
        }
    }
}

impl fmt::Display for ComponentKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}#{}", self.path, self.type_name)
    }
}

/// Captured field values keyed by component, then by field name.
pub type FieldData = HashMap<ComponentKey, HashMap<String, FieldValue>>;

/// A point-in-time capture of one entity's replicated state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntitySnapshot {
    /// Stable identifier of the entity's template, used to re-instantiate it
    pub prototype_name: String,

    /// Position at capture time
    pub position: Vector3,

    /// Orientation at capture time
    pub orientation: Quat,

    /// Stable identity of the owning peer; empty means unowned
    pub owner_identity: PlayerIdentity,

    /// Captured replicated field values
    pub field_data: FieldData,
}

impl EntitySnapshot {
    /// Whether this snapshot belongs to a player (and so must go through
    /// repossession on restore).
    pub fn is_owned(&self) -> bool {
        !is_unowned(&self.owner_identity)
    }

    /// Dedup check used by the lazy capture path: an entity contributes at
    /// most one snapshot per migration cycle, matched by owner identity
    /// plus prototype name.
    pub fn matches_entity(&self, owner_identity: &str, prototype_name: &str) -> bool {
        self.owner_identity == owner_identity && self.prototype_name == prototype_name
    }
}
