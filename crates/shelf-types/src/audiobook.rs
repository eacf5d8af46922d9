//! Audiobook records.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::{Record, StoreResult};

/// Typed view over a stored audiobook record.
///
/// Only the fields the repository itself reads are lifted out; everything
/// else rides along untouched in `extra`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Audiobook {
    #[serde(default)]
    pub id: String,

    #[serde(default)]
    pub title: String,

    /// Multi-valued genre labels, deduplicated library-wide by the facade.
    #[serde(default)]
    pub genres: Vec<String>,

    /// Multi-valued free-form tags, deduplicated library-wide by the facade.
    #[serde(default)]
    pub tags: Vec<String>,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Audiobook {
    pub fn from_record(record: &Record) -> StoreResult<Self> {
        record.deserialize()
    }

    pub fn to_record(&self) -> StoreResult<Record> {
        Record::from_serialize(self)
    }
}
