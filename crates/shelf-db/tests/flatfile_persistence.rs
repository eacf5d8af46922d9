//! End-to-end persistence tests over the flat-file backend.
//!
//! Boots the facade from configuration against a real on-disk storage root
//! and verifies that state survives a full close-and-reopen cycle.

use std::sync::Once;

use shelf_db::Database;
use shelf_observe::{init_logging, LogConfig, LogFormat};
use shelf_types::{Audiobook, EntityKind, ROOT_USER_TYPE};
use tempfile::TempDir;

static INIT: Once = Once::new();

fn init_test_logging() {
    INIT.call_once(|| {
        let _ = init_logging(LogConfig {
            format: LogFormat::Compact,
            include_location: false,
            include_target: false,
            log_spans: false,
            filter: Some("debug".to_string()),
        });
    });
}

fn disk_config(root: &TempDir) -> shelf_config::Config {
    init_test_logging();
    let mut config = shelf_config::Config::default();
    config.storage.root = root.path().to_path_buf();
    config.auth.token_secret = "e2e-secret".to_string();
    config
}

fn book(id: &str, genres: &[&str]) -> Audiobook {
    Audiobook {
        id: id.to_string(),
        title: format!("book {}", id),
        genres: genres.iter().map(|s| s.to_string()).collect(),
        ..Audiobook::default()
    }
}

#[tokio::test]
async fn state_survives_reopen() {
    let root = TempDir::new().unwrap();
    let config = disk_config(&root);

    {
        let db = Database::open(&config).await.unwrap();
        db.init().await.unwrap();
        db.insert_audiobooks(vec![book("ab-1", &["sci-fi"]), book("ab-2", &["drama"])])
            .await
            .unwrap();
        db.remove_entity(EntityKind::Audiobook, "ab-2").await.unwrap();
    }

    let db = Database::open(&config).await.unwrap();
    db.init().await.unwrap();

    // The surviving audiobook, the seeded root user, and the seeded settings
    // all came back from disk; no defaults were re-seeded.
    let books = db.audiobooks().await;
    assert_eq!(books.len(), 1);
    assert_eq!(books[0].id, "ab-1");

    let users = db.users().await;
    assert_eq!(users.len(), 1);
    assert_eq!(users[0].account_type, ROOT_USER_TYPE);

    assert_eq!(db.settings().await.len(), 1);
}

#[tokio::test]
async fn collections_use_configured_layout() {
    let root = TempDir::new().unwrap();
    let config = disk_config(&root);

    let db = Database::open(&config).await.unwrap();
    db.init().await.unwrap();

    for collection in ["audiobooks", "users"] {
        for partition in 0..config.storage.partitions {
            let path = root.path().join(collection).join(format!("part-{}.ndjson", partition));
            assert!(path.exists(), "missing {}", path.display());
        }
    }

    // The settings collection keeps its smaller partition set.
    assert!(root.path().join("settings/part-0.ndjson").exists());
    assert!(root.path().join("settings/part-1.ndjson").exists());
    assert!(!root.path().join("settings/part-2.ndjson").exists());
}

#[tokio::test]
async fn updates_are_visible_after_reopen() {
    let root = TempDir::new().unwrap();
    let config = disk_config(&root);

    {
        let db = Database::open(&config).await.unwrap();
        db.init().await.unwrap();
        db.insert_audiobook(book("ab-1", &["x"])).await.unwrap();
        let replacement = book("ab-1", &["z"]).to_record().unwrap();
        db.update_entity(EntityKind::Audiobook, replacement).await.unwrap();
        db.update_user_stream("root", Some("stream-9".to_string())).await.unwrap();
    }

    let db = Database::open(&config).await.unwrap();
    db.load().await.unwrap();

    let books = db.audiobooks().await;
    assert_eq!(books[0].genres, vec!["z".to_string()]);

    let users = db.users().await;
    assert_eq!(users[0].stream.as_deref(), Some("stream-9"));
}
