//! # Shelf DB - Repository Facade
//!
//! The component application code talks to: owns one durable collection per
//! entity kind together with its in-memory mirror, performs the initial bulk
//! load and default-data seeding, and keeps each mirror consistent with its
//! store after every successful mutation.
//!
//! Mirrors are plain vectors guarded by `tokio::sync::RwLock`; the facade is
//! an explicitly owned, lifecycle-scoped object constructed at startup.
//! Every mutation writes to disk first and only patches the mirror once the
//! store reports success, so a failed mutation surfaces as an error and
//! leaves the mirror untouched.

use std::collections::HashSet;
use std::sync::Arc;

use serde_json::Value;
use tokio::sync::RwLock;

use shelf_store::{Collection, Predicate, StorageConfig, StorageFactory, Transform};
use shelf_types::{
    Audiobook, DeleteOutcome, EntityKind, InsertOutcome, Record, StoreResult, UpdateOutcome, User,
};

mod bootstrap;
mod error;

pub use error::{DbError, DbResult};

/// The repository facade.
pub struct Database {
    token_secret: String,
    stores: EntityStores,
    mirrors: Mirrors,
}

struct EntityStores {
    users: Arc<dyn Collection>,
    audiobooks: Arc<dyn Collection>,
    settings: Arc<dyn Collection>,
}

#[derive(Default)]
struct Mirrors {
    users: RwLock<Vec<User>>,
    audiobooks: RwLock<Vec<Audiobook>>,
    settings: RwLock<Vec<Record>>,
}

impl Database {
    /// Opens the collections described by `config` and returns an unloaded
    /// database; call [`Database::init`] before serving reads.
    pub async fn open(config: &shelf_config::Config) -> DbResult<Self> {
        let backend = config.storage.backend.parse().map_err(DbError::Store)?;
        let storage = StorageConfig { backend, root: config.storage.root.clone() };

        let audiobooks = StorageFactory::open_collection_with_partitions(
            &storage,
            EntityKind::Audiobook.mirror_key(),
            config.storage.partitions,
        )
        .await?;
        let users = StorageFactory::open_collection_with_partitions(
            &storage,
            EntityKind::User.mirror_key(),
            config.storage.partitions,
        )
        .await?;
        let settings = StorageFactory::open_collection_with_partitions(
            &storage,
            EntityKind::Settings.mirror_key(),
            config.storage.settings_partitions,
        )
        .await?;

        tracing::info!(
            root = %config.storage.root.display(),
            backend = %config.storage.backend,
            "Opened database collections"
        );

        Ok(Self::with_stores(users, audiobooks, settings, config.auth.token_secret.clone()))
    }

    /// Assembles a database over pre-built collection stores.
    pub fn with_stores(
        users: Arc<dyn Collection>,
        audiobooks: Arc<dyn Collection>,
        settings: Arc<dyn Collection>,
        token_secret: String,
    ) -> Self {
        Self {
            token_secret,
            stores: EntityStores { users, audiobooks, settings },
            mirrors: Mirrors::default(),
        }
    }

    /// Resolves an entity kind to its backing collection store.
    fn store_for(&self, kind: EntityKind) -> &Arc<dyn Collection> {
        match kind {
            EntityKind::User => &self.stores.users,
            EntityKind::Audiobook => &self.stores.audiobooks,
            EntityKind::Settings => &self.stores.settings,
        }
    }

    /// Loads every collection and seeds default records (root user, server
    /// settings) when absent. Idempotent and safe to call on every startup.
    pub async fn init(&self) -> DbResult<()> {
        self.load().await?;
        self.seed_defaults().await
    }

    /// Rebuilds every mirror wholesale from a concurrent scan of all three
    /// collections. Any one scan failing fails the whole load.
    pub async fn load(&self) -> DbResult<()> {
        let (audiobooks, users, settings) = tokio::try_join!(
            self.stores.audiobooks.scan_all(),
            self.stores.users.scan_all(),
            self.stores.settings.scan_all(),
        )?;

        let audiobooks: Vec<Audiobook> =
            audiobooks.iter().map(Audiobook::from_record).collect::<StoreResult<_>>()?;
        let users: Vec<User> =
            users.iter().map(User::from_record).collect::<StoreResult<_>>()?;

        tracing::info!(count = audiobooks.len(), "Audiobooks loaded");
        tracing::info!(count = users.len(), "Users loaded");
        tracing::debug!(count = settings.len(), "Settings loaded");

        *self.mirrors.audiobooks.write().await = audiobooks;
        *self.mirrors.users.write().await = users;
        *self.mirrors.settings.write().await = settings;

        Ok(())
    }

    // ------------------------------------------------------------------
    // Inserts
    // ------------------------------------------------------------------

    pub async fn insert_audiobook(&self, audiobook: Audiobook) -> DbResult<InsertOutcome> {
        self.insert_audiobooks(vec![audiobook]).await
    }

    pub async fn insert_audiobooks(&self, audiobooks: Vec<Audiobook>) -> DbResult<InsertOutcome> {
        let records: Vec<Record> =
            audiobooks.iter().map(Audiobook::to_record).collect::<StoreResult<_>>()?;

        match self.stores.audiobooks.insert_many(records).await {
            Ok(outcome) => {
                self.mirrors.audiobooks.write().await.extend(audiobooks);
                tracing::debug!(inserted = outcome.inserted, "Inserted audiobooks");
                Ok(outcome)
            }
            Err(err) => {
                tracing::error!(error = %err, "Insert audiobooks failed");
                Err(err.into())
            }
        }
    }

    pub async fn insert_user(&self, user: User) -> DbResult<InsertOutcome> {
        let record = user.to_record()?;

        match self.stores.users.insert_many(vec![record]).await {
            Ok(outcome) => {
                self.mirrors.users.write().await.push(user);
                tracing::debug!(inserted = outcome.inserted, "Inserted user");
                Ok(outcome)
            }
            Err(err) => {
                tracing::error!(error = %err, "Insert user failed");
                Err(err.into())
            }
        }
    }

    // ------------------------------------------------------------------
    // Updates and deletes
    //
    // Every update and delete flows through one generic predicate-driven
    // path; the mirror is patched with the same predicate/transform the
    // store applied, so disk and mirror cannot drift apart.
    // ------------------------------------------------------------------

    /// Replaces the stored record whose id matches `record`'s id, patching
    /// the entity's mirror on success.
    pub async fn update_entity(&self, kind: EntityKind, record: Record) -> DbResult<UpdateOutcome> {
        let id = record.id().ok_or(DbError::MissingId)?.to_string();

        let predicate = |r: &Record| r.id() == Some(id.as_str());
        let transform = |_: &Record| record.clone();
        self.apply_update(kind, &predicate, &transform).await
    }

    /// Updates the matching user's `stream` field on disk and in the mirror.
    pub async fn update_user_stream(
        &self,
        user_id: &str,
        stream_id: Option<String>,
    ) -> DbResult<UpdateOutcome> {
        let stream_value = stream_id.map_or(Value::Null, Value::String);

        let predicate = |r: &Record| r.id() == Some(user_id);
        let transform = |r: &Record| r.clone().with("stream", stream_value.clone());
        let outcome = self.apply_update(EntityKind::User, &predicate, &transform).await?;

        tracing::debug!(user_id, updated = outcome.updated, "Updated user stream");
        Ok(outcome)
    }

    /// Removes every record with the given id, filtering the entity's mirror
    /// on success.
    pub async fn remove_entity(&self, kind: EntityKind, entity_id: &str) -> DbResult<DeleteOutcome> {
        let predicate = |r: &Record| r.id() == Some(entity_id);

        let outcome = match self.store_for(kind).delete_where(&predicate).await {
            Ok(outcome) => outcome,
            Err(err) => {
                tracing::error!(entity = %kind, id = entity_id, error = %err, "Remove entity failed");
                return Err(err.into());
            }
        };

        match kind {
            EntityKind::User => {
                self.mirrors.users.write().await.retain(|u| u.id != entity_id);
            }
            EntityKind::Audiobook => {
                self.mirrors.audiobooks.write().await.retain(|b| b.id != entity_id);
            }
            EntityKind::Settings => {
                self.mirrors.settings.write().await.retain(|r| r.id() != Some(entity_id));
            }
        }

        tracing::debug!(entity = %kind, id = entity_id, deleted = outcome.deleted, "Removed entity");
        Ok(outcome)
    }

    async fn apply_update(
        &self,
        kind: EntityKind,
        predicate: Predicate<'_>,
        transform: Transform<'_>,
    ) -> DbResult<UpdateOutcome> {
        let outcome = match self.store_for(kind).update_where(predicate, transform).await {
            Ok(outcome) => outcome,
            Err(err) => {
                tracing::error!(entity = %kind, error = %err, "Update entity failed");
                return Err(err.into());
            }
        };

        self.patch_mirror(kind, predicate, transform).await?;
        tracing::debug!(entity = %kind, updated = outcome.updated, "Updated entity");
        Ok(outcome)
    }

    /// Applies the update's predicate/transform to the mirror, swapping the
    /// whole vector in so a conversion failure cannot leave it half-patched.
    async fn patch_mirror(
        &self,
        kind: EntityKind,
        predicate: Predicate<'_>,
        transform: Transform<'_>,
    ) -> DbResult<()> {
        match kind {
            EntityKind::User => {
                let mut mirror = self.mirrors.users.write().await;
                let mut next = Vec::with_capacity(mirror.len());
                for entry in mirror.iter() {
                    let record = entry.to_record()?;
                    if predicate(&record) {
                        let transformed = transform(&record);
                        next.push(User::from_record(&transformed)?);
                    } else {
                        next.push(entry.clone());
                    }
                }
                *mirror = next;
            }
            EntityKind::Audiobook => {
                let mut mirror = self.mirrors.audiobooks.write().await;
                let mut next = Vec::with_capacity(mirror.len());
                for entry in mirror.iter() {
                    let record = entry.to_record()?;
                    if predicate(&record) {
                        let transformed = transform(&record);
                        next.push(Audiobook::from_record(&transformed)?);
                    } else {
                        next.push(entry.clone());
                    }
                }
                *mirror = next;
            }
            EntityKind::Settings => {
                let mut mirror = self.mirrors.settings.write().await;
                for entry in mirror.iter_mut() {
                    if predicate(entry) {
                        *entry = transform(entry);
                    }
                }
            }
        }
        Ok(())
    }

    // ------------------------------------------------------------------
    // Derived reads
    // ------------------------------------------------------------------

    /// The deduplicated union of genre labels across the audiobook mirror.
    /// Order is unspecified.
    pub async fn genres(&self) -> Vec<String> {
        let mirror = self.mirrors.audiobooks.read().await;
        let set: HashSet<String> =
            mirror.iter().flat_map(|book| book.genres.iter().cloned()).collect();
        set.into_iter().collect()
    }

    /// The deduplicated union of tags across the audiobook mirror. Order is
    /// unspecified.
    pub async fn tags(&self) -> Vec<String> {
        let mirror = self.mirrors.audiobooks.read().await;
        let set: HashSet<String> =
            mirror.iter().flat_map(|book| book.tags.iter().cloned()).collect();
        set.into_iter().collect()
    }

    // ------------------------------------------------------------------
    // Mirror snapshots
    // ------------------------------------------------------------------

    pub async fn users(&self) -> Vec<User> {
        self.mirrors.users.read().await.clone()
    }

    pub async fn audiobooks(&self) -> Vec<Audiobook> {
        self.mirrors.audiobooks.read().await.clone()
    }

    pub async fn settings(&self) -> Vec<Record> {
        self.mirrors.settings.read().await.clone()
    }
}
