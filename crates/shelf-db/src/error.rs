//! Repository error types.
//!
//! Wraps storage-level errors and adds domain-specific variants for facade
//! operations. Mutation failures are never swallowed: every facade operation
//! surfaces its outcome to the caller.

use shelf_auth::AuthError;
use shelf_types::StoreError;

/// Result type alias for repository operations.
pub type DbResult<T> = Result<T, DbError>;

/// Errors that can occur during repository operations.
#[derive(Debug, thiserror::Error)]
pub enum DbError {
    /// The underlying collection store failed.
    #[error("Storage error: {0}")]
    Store(#[from] StoreError),

    /// Seed-token issuance failed during startup.
    #[error("Token error: {0}")]
    Auth(#[from] AuthError),

    /// Inserting a synthesized default record failed.
    #[error("Seeding {entity} failed: {source}")]
    Seed {
        entity: &'static str,
        #[source]
        source: StoreError,
    },

    /// A record targeted by an id-keyed operation has no id field.
    #[error("Record has no id field")]
    MissingId,
}
