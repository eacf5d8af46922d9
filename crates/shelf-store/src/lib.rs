//! # Shelf Store - Storage Abstraction Layer
//!
//! Provides the collection store interface and its backends: one durable
//! collection per entity kind, with whole-collection scan and
//! predicate-driven mutation.

use async_trait::async_trait;
use shelf_types::{DeleteOutcome, InsertOutcome, Record, StoreResult, UpdateOutcome};

pub mod factory;
pub mod flatfile;
pub mod memory;

pub use factory::{BackendType, StorageConfig, StorageFactory};
pub use flatfile::FlatFileBackend;
pub use memory::MemoryBackend;

type Result<T> = StoreResult<T>;

/// Selects the records an operation applies to.
pub type Predicate<'a> = &'a (dyn Fn(&Record) -> bool + Send + Sync);

/// Produces the replacement for a matched record.
pub type Transform<'a> = &'a (dyn Fn(&Record) -> Record + Send + Sync);

/// The abstract collection store interface.
///
/// All operations are scoped to a single collection; there is no
/// cross-collection atomicity. Concurrent writers are serialized by the
/// backend, but a failed multi-record call may leave a prefix of its records
/// applied (best-effort, not transactional).
#[async_trait]
pub trait Collection: Send + Sync {
    /// Returns every record currently stored. No ordering guarantee.
    async fn scan_all(&self) -> Result<Vec<Record>>;

    /// Appends records. Never deduplicates by id; that is the caller's
    /// responsibility.
    async fn insert_many(&self, records: Vec<Record>) -> Result<InsertOutcome>;

    /// Replaces every record matching `predicate` with `transform(record)`,
    /// leaving the rest untouched.
    async fn update_where(
        &self,
        predicate: Predicate<'_>,
        transform: Transform<'_>,
    ) -> Result<UpdateOutcome>;

    /// Removes every record matching `predicate`.
    async fn delete_where(&self, predicate: Predicate<'_>) -> Result<DeleteOutcome>;
}
