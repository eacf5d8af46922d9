//! # Shelf Types
//!
//! Shared type definitions for the shelfdb persistence layer.
//!
//! This crate provides the record model, the closed set of entity kinds, and
//! the storage error taxonomy used across the workspace, ensuring a single
//! source of truth and preventing circular dependencies.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;

mod audiobook;
mod settings;
mod user;

pub use audiobook::Audiobook;
pub use settings::ServerSettings;
pub use user::{User, ROOT_USER_TYPE};

// ============================================================================
// Records
// ============================================================================

/// An opaque stored record: a mapping of field name to JSON value.
///
/// The store enforces no schema beyond the convention that a record carries a
/// unique string `id` within its collection; field shape is owned by the
/// caller.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Record(Map<String, Value>);

impl Record {
    pub fn new() -> Self {
        Self(Map::new())
    }

    /// The record's `id` field, if present and a string.
    pub fn id(&self) -> Option<&str> {
        self.0.get("id").and_then(Value::as_str)
    }

    pub fn get(&self, field: &str) -> Option<&Value> {
        self.0.get(field)
    }

    /// Sets a field, returning the record for chained construction.
    pub fn with(mut self, field: impl Into<String>, value: impl Into<Value>) -> Self {
        self.0.insert(field.into(), value.into());
        self
    }

    pub fn set(&mut self, field: impl Into<String>, value: impl Into<Value>) {
        self.0.insert(field.into(), value.into());
    }

    pub fn fields(&self) -> &Map<String, Value> {
        &self.0
    }

    pub fn into_fields(self) -> Map<String, Value> {
        self.0
    }

    /// Converts any serializable value into a record.
    ///
    /// Fails if the value does not serialize to a JSON object.
    pub fn from_serialize<T: Serialize>(value: &T) -> StoreResult<Self> {
        match serde_json::to_value(value)? {
            Value::Object(fields) => Ok(Self(fields)),
            other => Err(StoreError::Corrupt(format!(
                "record must be a JSON object, got {}",
                value_kind(&other)
            ))),
        }
    }

    /// Deserializes the record into a typed view.
    pub fn deserialize<T: for<'de> Deserialize<'de>>(&self) -> StoreResult<T> {
        Ok(serde_json::from_value(Value::Object(self.0.clone()))?)
    }
}

impl From<Map<String, Value>> for Record {
    fn from(fields: Map<String, Value>) -> Self {
        Self(fields)
    }
}

fn value_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

// ============================================================================
// Entity Kinds
// ============================================================================

/// The closed set of entities the repository persists.
///
/// Replaces string-keyed dispatch: an unknown entity name is a parse error,
/// never a silent fallback to another collection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntityKind {
    User,
    Audiobook,
    Settings,
}

impl EntityKind {
    /// The entity-name token used in configuration and logs.
    pub fn as_str(&self) -> &'static str {
        match self {
            EntityKind::User => "user",
            EntityKind::Audiobook => "audiobook",
            EntityKind::Settings => "settings",
        }
    }

    /// The name of the in-memory mirror holding this entity's records, which
    /// doubles as the collection's directory name on disk.
    pub fn mirror_key(&self) -> &'static str {
        match self {
            EntityKind::User => "users",
            EntityKind::Audiobook => "audiobooks",
            EntityKind::Settings => "settings",
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Error)]
#[error("unknown entity kind: {0}")]
pub struct UnknownEntityKind(pub String);

impl FromStr for EntityKind {
    type Err = UnknownEntityKind;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "user" => Ok(EntityKind::User),
            "audiobook" => Ok(EntityKind::Audiobook),
            "settings" => Ok(EntityKind::Settings),
            other => Err(UnknownEntityKind(other.to_string())),
        }
    }
}

// ============================================================================
// Operation Outcomes
// ============================================================================

/// Result of a bulk insert.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct InsertOutcome {
    pub inserted: usize,
}

/// Result of a predicate-driven update.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpdateOutcome {
    pub updated: usize,
}

/// Result of a predicate-driven delete.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeleteOutcome {
    pub deleted: usize,
}

// ============================================================================
// Error Types
// ============================================================================

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Corrupt record: {0}")]
    Corrupt(String),

    #[error("Unknown backend type: {0}")]
    UnknownBackend(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

pub type StoreResult<T> = std::result::Result<T, StoreError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_id() {
        let record = Record::new().with("id", "ab-1").with("title", "Dune");
        assert_eq!(record.id(), Some("ab-1"));
        assert_eq!(record.get("title"), Some(&Value::String("Dune".into())));

        let no_id = Record::new().with("title", "Dune");
        assert_eq!(no_id.id(), None);
    }

    #[test]
    fn test_record_from_non_object() {
        let result = Record::from_serialize(&42);
        assert!(matches!(result, Err(StoreError::Corrupt(_))));
    }

    #[test]
    fn test_entity_kind_parse() {
        assert_eq!("user".parse::<EntityKind>().unwrap(), EntityKind::User);
        assert_eq!("audiobook".parse::<EntityKind>().unwrap(), EntityKind::Audiobook);
        assert_eq!("settings".parse::<EntityKind>().unwrap(), EntityKind::Settings);
    }

    #[test]
    fn test_entity_kind_rejects_unknown() {
        let err = "podcast".parse::<EntityKind>().unwrap_err();
        assert_eq!(err.to_string(), "unknown entity kind: podcast");
    }

    #[test]
    fn test_mirror_keys() {
        assert_eq!(EntityKind::User.mirror_key(), "users");
        assert_eq!(EntityKind::Audiobook.mirror_key(), "audiobooks");
        assert_eq!(EntityKind::Settings.mirror_key(), "settings");
    }
}
