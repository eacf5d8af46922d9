//! Storage factory for creating backend instances
//!
//! Provides a flexible way to instantiate collection backends without
//! exposing implementation details to consumers.

use std::path::PathBuf;
use std::str::FromStr;
use std::sync::Arc;

use shelf_types::StoreError;

use crate::flatfile::{FlatFileBackend, DEFAULT_PARTITIONS};
use crate::memory::MemoryBackend;
use crate::{Collection, Result};

/// Storage backend type
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackendType {
    /// In-memory storage (for testing and development)
    Memory,
    /// Partitioned flat-file storage (durable)
    FlatFile,
}

impl FromStr for BackendType {
    type Err = StoreError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "memory" => Ok(BackendType::Memory),
            "flatfile" | "file" => Ok(BackendType::FlatFile),
            other => Err(StoreError::UnknownBackend(other.to_string())),
        }
    }
}

impl BackendType {
    pub fn as_str(&self) -> &'static str {
        match self {
            BackendType::Memory => "memory",
            BackendType::FlatFile => "flatfile",
        }
    }
}

/// Configuration for storage backends
#[derive(Debug, Clone)]
pub struct StorageConfig {
    /// Backend type to use
    pub backend: BackendType,
    /// Root directory holding one subdirectory per collection
    pub root: PathBuf,
}

impl StorageConfig {
    pub fn memory() -> Self {
        Self { backend: BackendType::Memory, root: PathBuf::new() }
    }

    pub fn flatfile(root: impl Into<PathBuf>) -> Self {
        Self { backend: BackendType::FlatFile, root: root.into() }
    }
}

/// Storage factory for creating collection instances
pub struct StorageFactory;

impl StorageFactory {
    /// Opens the named collection under the configured root.
    pub async fn open_collection(
        config: &StorageConfig,
        name: &str,
    ) -> Result<Arc<dyn Collection>> {
        Self::open_collection_with_partitions(config, name, DEFAULT_PARTITIONS).await
    }

    /// Opens the named collection with an explicit partition count.
    pub async fn open_collection_with_partitions(
        config: &StorageConfig,
        name: &str,
        partitions: usize,
    ) -> Result<Arc<dyn Collection>> {
        match config.backend {
            BackendType::Memory => Ok(Arc::new(MemoryBackend::new()) as Arc<dyn Collection>),
            BackendType::FlatFile => {
                let backend =
                    FlatFileBackend::with_partitions(config.root.join(name), partitions).await?;
                Ok(Arc::new(backend) as Arc<dyn Collection>)
            }
        }
    }
}
