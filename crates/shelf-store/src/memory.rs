//! In-memory storage backend for testing and development

use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;

use shelf_types::{DeleteOutcome, InsertOutcome, Record, UpdateOutcome};

use crate::{Collection, Predicate, Result, Transform};

/// In-memory collection implementation.
///
/// Keeps every record in an `Arc<RwLock<Vec<_>>>`; the write lock serializes
/// concurrent mutations the same way the durable backend does.
#[derive(Clone, Default)]
pub struct MemoryBackend {
    data: Arc<RwLock<Vec<Record>>>,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self { data: Arc::new(RwLock::new(Vec::new())) }
    }

    /// Number of records currently stored.
    pub async fn len(&self) -> usize {
        self.data.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.data.read().await.is_empty()
    }
}

#[async_trait]
impl Collection for MemoryBackend {
    async fn scan_all(&self) -> Result<Vec<Record>> {
        let data = self.data.read().await;
        Ok(data.clone())
    }

    async fn insert_many(&self, records: Vec<Record>) -> Result<InsertOutcome> {
        let mut data = self.data.write().await;
        let inserted = records.len();
        data.extend(records);
        Ok(InsertOutcome { inserted })
    }

    async fn update_where(
        &self,
        predicate: Predicate<'_>,
        transform: Transform<'_>,
    ) -> Result<UpdateOutcome> {
        let mut data = self.data.write().await;
        let mut updated = 0;
        for record in data.iter_mut() {
            if predicate(record) {
                *record = transform(record);
                updated += 1;
            }
        }
        Ok(UpdateOutcome { updated })
    }

    async fn delete_where(&self, predicate: Predicate<'_>) -> Result<DeleteOutcome> {
        let mut data = self.data.write().await;
        let before = data.len();
        data.retain(|record| !predicate(record));
        Ok(DeleteOutcome { deleted: before - data.len() })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(id: &str, title: &str) -> Record {
        Record::new().with("id", id).with("title", title)
    }

    #[tokio::test]
    async fn test_insert_and_scan() {
        let store = MemoryBackend::new();

        let outcome =
            store.insert_many(vec![record("1", "Dune"), record("2", "Hyperion")]).await.unwrap();
        assert_eq!(outcome.inserted, 2);

        let records = store.scan_all().await.unwrap();
        assert_eq!(records.len(), 2);
    }

    #[tokio::test]
    async fn test_insert_does_not_deduplicate() {
        let store = MemoryBackend::new();

        store.insert_many(vec![record("1", "Dune")]).await.unwrap();
        store.insert_many(vec![record("1", "Dune")]).await.unwrap();

        assert_eq!(store.len().await, 2);
    }

    #[tokio::test]
    async fn test_update_where_replaces_matches_only() {
        let store = MemoryBackend::new();
        store
            .insert_many(vec![record("1", "Dune"), record("2", "Hyperion")])
            .await
            .unwrap();

        let replacement = record("1", "Dune Messiah");
        let outcome = store
            .update_where(&|r| r.id() == Some("1"), &move |_| replacement.clone())
            .await
            .unwrap();
        assert_eq!(outcome.updated, 1);

        let records = store.scan_all().await.unwrap();
        let updated = records.iter().find(|r| r.id() == Some("1")).unwrap();
        assert_eq!(updated.get("title").and_then(|v| v.as_str()), Some("Dune Messiah"));
        let untouched = records.iter().find(|r| r.id() == Some("2")).unwrap();
        assert_eq!(untouched.get("title").and_then(|v| v.as_str()), Some("Hyperion"));
    }

    #[tokio::test]
    async fn test_update_where_no_match() {
        let store = MemoryBackend::new();
        store.insert_many(vec![record("1", "Dune")]).await.unwrap();

        let outcome = store
            .update_where(&|r| r.id() == Some("missing"), &|r| r.clone())
            .await
            .unwrap();
        assert_eq!(outcome.updated, 0);
    }

    #[tokio::test]
    async fn test_delete_where() {
        let store = MemoryBackend::new();
        store
            .insert_many(vec![record("1", "Dune"), record("2", "Hyperion"), record("3", "Ubik")])
            .await
            .unwrap();

        let outcome = store.delete_where(&|r| r.id() != Some("2")).await.unwrap();
        assert_eq!(outcome.deleted, 2);

        let records = store.scan_all().await.unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].id(), Some("2"));
    }

    #[tokio::test]
    async fn test_concurrent_inserts() {
        let store = Arc::new(MemoryBackend::new());

        let mut handles = vec![];
        for i in 0..10 {
            let store = Arc::clone(&store);
            handles.push(tokio::spawn(async move {
                store.insert_many(vec![record(&format!("{}", i), "book")]).await
            }));
        }

        for handle in handles {
            handle.await.unwrap().unwrap();
        }

        assert_eq!(store.len().await, 10);
    }
}
