//! Durable flat-file storage backend
//!
//! Persists one collection as newline-delimited JSON spread across a fixed
//! set of partition files (`part-<i>.ndjson`) under the collection
//! directory. Inserts append to the partition chosen by record-id hash;
//! update and delete rewrite each affected partition to a temporary file and
//! rename it into place, so an interrupted rewrite leaves the previous
//! partition contents intact. A collection-level `RwLock` serializes
//! writers; a multi-record call is best-effort, not transactional.

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::fs::{self, OpenOptions};
use tokio::io::AsyncWriteExt;
use tokio::sync::RwLock;

use shelf_types::{DeleteOutcome, InsertOutcome, Record, UpdateOutcome};

use crate::{Collection, Predicate, Result, Transform};

/// Default number of partition files per collection.
pub const DEFAULT_PARTITIONS: usize = 5;

/// File-backed collection store.
pub struct FlatFileBackend {
    dir: PathBuf,
    partitions: usize,
    lock: RwLock<()>,
}

impl FlatFileBackend {
    /// Opens the collection at `dir`, initializing its file storage if
    /// absent.
    pub async fn open(dir: impl AsRef<Path>) -> Result<Self> {
        Self::with_partitions(dir, DEFAULT_PARTITIONS).await
    }

    /// Opens the collection with an explicit partition count.
    ///
    /// The count must match across reopens of the same directory; records in
    /// partitions past the configured count would not be scanned.
    pub async fn with_partitions(dir: impl AsRef<Path>, partitions: usize) -> Result<Self> {
        let dir = dir.as_ref().to_path_buf();
        let partitions = partitions.max(1);
        fs::create_dir_all(&dir).await?;

        let backend = Self { dir, partitions, lock: RwLock::new(()) };
        for index in 0..partitions {
            let path = backend.partition_path(index);
            OpenOptions::new().create(true).append(true).open(&path).await?;
        }

        tracing::debug!(dir = %backend.dir.display(), partitions, "Opened flat-file collection");
        Ok(backend)
    }

    pub fn partitions(&self) -> usize {
        self.partitions
    }

    fn partition_path(&self, index: usize) -> PathBuf {
        self.dir.join(format!("part-{}.ndjson", index))
    }

    fn partition_for(&self, record: &Record) -> usize {
        let mut hasher = DefaultHasher::new();
        match record.id() {
            Some(id) => id.hash(&mut hasher),
            // Schemaless escape hatch: records without an id are still
            // storable, bucketed by their field names.
            None => record.fields().keys().for_each(|k| k.hash(&mut hasher)),
        }
        (hasher.finish() as usize) % self.partitions
    }

    async fn read_partition(&self, index: usize) -> Result<Vec<Record>> {
        let contents = fs::read_to_string(self.partition_path(index)).await?;
        let mut records = Vec::new();
        for line in contents.lines() {
            if line.trim().is_empty() {
                continue;
            }
            records.push(serde_json::from_str(line)?);
        }
        Ok(records)
    }

    /// Rewrites a whole partition through a temp file and an atomic rename.
    async fn write_partition(&self, index: usize, records: &[Record]) -> Result<()> {
        let mut contents = String::new();
        for record in records {
            contents.push_str(&serde_json::to_string(record)?);
            contents.push('\n');
        }

        let path = self.partition_path(index);
        let tmp = path.with_extension("ndjson.tmp");
        fs::write(&tmp, contents.as_bytes()).await?;
        fs::rename(&tmp, &path).await?;
        Ok(())
    }

    async fn append_to_partition(&self, index: usize, records: &[Record]) -> Result<()> {
        let mut contents = String::new();
        for record in records {
            contents.push_str(&serde_json::to_string(record)?);
            contents.push('\n');
        }

        let mut file =
            OpenOptions::new().append(true).open(self.partition_path(index)).await?;
        file.write_all(contents.as_bytes()).await?;
        file.flush().await?;
        Ok(())
    }
}

#[async_trait]
impl Collection for FlatFileBackend {
    async fn scan_all(&self) -> Result<Vec<Record>> {
        let _guard = self.lock.read().await;

        let mut records = Vec::new();
        for index in 0..self.partitions {
            records.extend(self.read_partition(index).await?);
        }
        Ok(records)
    }

    async fn insert_many(&self, records: Vec<Record>) -> Result<InsertOutcome> {
        let _guard = self.lock.write().await;

        let mut buckets: Vec<Vec<Record>> = vec![Vec::new(); self.partitions];
        for record in records {
            let index = self.partition_for(&record);
            buckets[index].push(record);
        }

        let mut inserted = 0;
        for (index, bucket) in buckets.iter().enumerate() {
            if bucket.is_empty() {
                continue;
            }
            self.append_to_partition(index, bucket).await?;
            inserted += bucket.len();
        }

        Ok(InsertOutcome { inserted })
    }

    async fn update_where(
        &self,
        predicate: Predicate<'_>,
        transform: Transform<'_>,
    ) -> Result<UpdateOutcome> {
        let _guard = self.lock.write().await;

        let mut updated = 0;
        for index in 0..self.partitions {
            let mut records = self.read_partition(index).await?;
            let mut touched = false;
            for record in records.iter_mut() {
                if predicate(record) {
                    *record = transform(record);
                    updated += 1;
                    touched = true;
                }
            }
            if touched {
                self.write_partition(index, &records).await?;
            }
        }

        Ok(UpdateOutcome { updated })
    }

    async fn delete_where(&self, predicate: Predicate<'_>) -> Result<DeleteOutcome> {
        let _guard = self.lock.write().await;

        let mut deleted = 0;
        for index in 0..self.partitions {
            let records = self.read_partition(index).await?;
            let kept: Vec<Record> =
                records.iter().filter(|r| !predicate(r)).cloned().collect();
            if kept.len() != records.len() {
                deleted += records.len() - kept.len();
                self.write_partition(index, &kept).await?;
            }
        }

        Ok(DeleteOutcome { deleted })
    }
}
