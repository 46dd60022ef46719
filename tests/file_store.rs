use context_index::file_store::{JsonFileStore, ANALYTICS_FILE, INDEX_FILE};
use context_index_core::models::Metadata;
use context_index_core::store::{DocumentKind, Store, StoreError};
use context_index_core::{ContextEngine, EngineConfig, SearchOptions};
use std::fs;
use tempfile::TempDir;

#[tokio::test]
async fn missing_files_load_as_none() {
    let tmp = TempDir::new().unwrap();
    let store = JsonFileStore::new(tmp.path().join("not-yet"));
    assert!(store.load_index().await.unwrap().is_none());
    assert!(store.load_analytics().await.unwrap().is_none());
}

#[tokio::test]
async fn snapshots_survive_reopen() {
    let tmp = TempDir::new().unwrap();
    let dir = tmp.path().join("data");

    let mut engine = ContextEngine::open(JsonFileStore::new(&dir), EngineConfig::default()).await;
    let outcome = engine
        .index(
            "doc",
            "text",
            "The quick brown fox jumps over lazy dog repeatedly",
            Metadata::new(),
        )
        .await;
    let id = outcome.chunks[0].id.clone();
    engine
        .index("doc", "text", "A quick brown fox often jumps high", Metadata::new())
        .await;
    engine.search("quick fox", &SearchOptions::default()).await;
    engine.record_interaction(&id).await;
    assert!(engine.last_store_error().is_none());

    let index_raw = fs::read_to_string(dir.join(INDEX_FILE)).unwrap();
    assert!(index_raw.contains("\"totalChunks\": 2"));
    assert!(index_raw.contains("\"sharedKeywords\""));
    assert!(dir.join(ANALYTICS_FILE).exists());
    assert!(!dir.join("index.json.tmp").exists());

    let reopened = ContextEngine::open(JsonFileStore::new(&dir), EngineConfig::default()).await;
    assert!(reopened.last_store_error().is_none());
    assert_eq!(reopened.stats().total_chunks, 2);
    assert_eq!(reopened.stats().total_links, 1);
    assert_eq!(reopened.analytics().context_usage[&id].clicks, 1);
    assert_eq!(reopened.analytics().searches.len(), 1);
    assert_eq!(reopened.linked_sources(&id).len(), 1);
}

#[tokio::test]
async fn corrupt_file_reports_and_resets() {
    let tmp = TempDir::new().unwrap();
    fs::write(tmp.path().join(INDEX_FILE), "{ definitely not json").unwrap();

    let store = JsonFileStore::new(tmp.path());
    let err = store.load_index().await.unwrap_err();
    assert!(matches!(
        err,
        StoreError::Corrupt {
            kind: DocumentKind::Index,
            ..
        }
    ));

    let engine = ContextEngine::open(store, EngineConfig::default()).await;
    assert_eq!(engine.stats().total_chunks, 0);
    assert!(engine.last_store_error().is_some());
}

#[tokio::test]
async fn unwritable_dir_is_absorbed() {
    let tmp = TempDir::new().unwrap();
    // A regular file where the storage directory should be.
    let blocker = tmp.path().join("blocked");
    fs::write(&blocker, "").unwrap();

    let mut engine =
        ContextEngine::open(JsonFileStore::new(&blocker), EngineConfig::default()).await;
    let outcome = engine
        .index("doc", "text", "content that cannot be saved", Metadata::new())
        .await;

    assert_eq!(outcome.chunks.len(), 1);
    assert_eq!(engine.stats().total_chunks, 1);
    assert!(matches!(
        engine.take_store_error(),
        Some(StoreError::Io { .. })
    ));
}
