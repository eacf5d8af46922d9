//! User account records.

use chrono::Utc;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::{Record, StoreResult};

/// The account type of the bootstrap administrator.
pub const ROOT_USER_TYPE: &str = "root";

/// Typed view over a stored user record.
///
/// Construction is a pass-through: every field defaults when absent and
/// unrecognized fields are preserved round-trip, so any well-formed stored
/// record converts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    #[serde(default)]
    pub id: String,

    /// Account type, e.g. `"root"` or `"user"`.
    #[serde(rename = "type", default)]
    pub account_type: String,

    #[serde(default)]
    pub username: String,

    /// Password hash; empty for the freshly seeded root account.
    #[serde(default)]
    pub pash: String,

    /// Id of the stream this user is currently playing, if any.
    #[serde(default)]
    pub stream: Option<String>,

    /// The user's access token.
    #[serde(default)]
    pub token: String,

    /// Creation time, milliseconds since the epoch.
    #[serde(default)]
    pub created_at: i64,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl User {
    /// The bootstrap administrator inserted on first startup when no root
    /// account exists yet.
    pub fn root(token: String) -> Self {
        Self {
            id: "root".to_string(),
            account_type: ROOT_USER_TYPE.to_string(),
            username: "root".to_string(),
            pash: String::new(),
            stream: None,
            token,
            created_at: Utc::now().timestamp_millis(),
            extra: Map::new(),
        }
    }

    pub fn is_root(&self) -> bool {
        self.account_type == ROOT_USER_TYPE
    }

    pub fn from_record(record: &Record) -> StoreResult<Self> {
        record.deserialize()
    }

    pub fn to_record(&self) -> StoreResult<Record> {
        Record::from_serialize(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_root_user_defaults() {
        let user = User::root("tok-1".to_string());
        assert_eq!(user.id, "root");
        assert_eq!(user.username, "root");
        assert!(user.is_root());
        assert!(user.pash.is_empty());
        assert_eq!(user.stream, None);
        assert_eq!(user.token, "tok-1");
        assert!(user.created_at > 0);
    }

    #[test]
    fn test_record_round_trip_preserves_unknown_fields() {
        let record = Record::new()
            .with("id", "u1")
            .with("type", "user")
            .with("username", "alice")
            .with("theme", "dark");

        let user = User::from_record(&record).unwrap();
        assert_eq!(user.id, "u1");
        assert_eq!(user.username, "alice");
        assert_eq!(user.extra.get("theme"), Some(&Value::String("dark".into())));

        let back = user.to_record().unwrap();
        assert_eq!(back.get("theme"), Some(&Value::String("dark".into())));
        assert_eq!(back.id(), Some("u1"));
    }

    #[test]
    fn test_camel_case_created_at() {
        let user = User::root("t".to_string());
        let record = user.to_record().unwrap();
        assert!(record.get("createdAt").is_some());
        assert!(record.get("created_at").is_none());
    }

    #[test]
    fn test_sparse_record_converts() {
        let record = Record::new().with("id", "u2");
        let user = User::from_record(&record).unwrap();
        assert_eq!(user.id, "u2");
        assert!(!user.is_root());
        assert_eq!(user.stream, None);
    }
}
