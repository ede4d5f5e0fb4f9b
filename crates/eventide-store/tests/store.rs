//! Integration tests for the storage backends and the writer pool.

use std::sync::Arc;
use std::time::Duration;

use eventide_store::{
    JsonFileStore, MemoryStore, PersistenceGateway, StoreConfig, StoreWriter,
};
use eventide_types::{EventId, EventKind, EventRecord, EventStatus, ParticipantId, Reward};

// =========================================================================
// Helpers
// =========================================================================

fn record(name: &str) -> EventRecord {
    EventRecord {
        id: EventId::new(),
        name: name.into(),
        description: "test event".into(),
        kind: EventKind::Race,
        status: EventStatus::Created,
        max_participants: 8,
        participants: vec![ParticipantId::new()],
        start_ms: 1_000,
        end_ms: 2_000,
        created_by: None,
        created_at: 500,
        rewards: vec![Reward::new("currency", 100)],
        requirements: None,
        metadata: None,
    }
}

// =========================================================================
// MemoryStore
// =========================================================================

#[tokio::test]
async fn test_memory_store_round_trip() {
    let store = MemoryStore::new();
    let original = record("alpha");

    store.save_event(&original).await.unwrap();
    let loaded = store.load_event(original.id).await.unwrap().unwrap();

    assert_eq!(loaded, original);
}

#[tokio::test]
async fn test_memory_store_load_missing_is_none() {
    let store = MemoryStore::new();
    assert!(store.load_event(EventId::new()).await.unwrap().is_none());
}

#[tokio::test]
async fn test_memory_store_delete() {
    let store = MemoryStore::new();
    let rec = record("alpha");
    store.save_event(&rec).await.unwrap();

    assert!(store.delete_event(rec.id).await.unwrap());
    assert!(!store.delete_event(rec.id).await.unwrap());
    assert!(store.load_event(rec.id).await.unwrap().is_none());
}

#[tokio::test]
async fn test_memory_store_batch_save_and_load_all() {
    let store = MemoryStore::new();
    let batch = vec![record("a"), record("b"), record("c")];

    store.save_events(&batch).await.unwrap();
    let mut all = store.load_all_events().await.unwrap();
    all.sort_by(|a, b| a.name.cmp(&b.name));

    assert_eq!(all.len(), 3);
    assert_eq!(all[0].name, "a");
    assert_eq!(all[2].name, "c");
}

#[tokio::test]
async fn test_memory_store_always_healthy() {
    let store = MemoryStore::new();
    assert!(store.is_healthy());
    store.reconnect().await.unwrap();
    assert!(store.is_healthy());
}

// =========================================================================
// JsonFileStore
// =========================================================================

#[tokio::test]
async fn test_file_store_round_trip() {
    let dir = tempfile::tempdir().unwrap();
    let store = JsonFileStore::open(dir.path()).await.unwrap();

    let mut original = record("persisted");
    original.metadata = Some(
        [("arena".to_string(), "north".to_string())]
            .into_iter()
            .collect(),
    );

    store.save_event(&original).await.unwrap();
    let loaded = store.load_event(original.id).await.unwrap().unwrap();

    assert_eq!(loaded.name, original.name);
    assert_eq!(loaded.kind, original.kind);
    assert_eq!(loaded.status, original.status);
    assert_eq!(loaded.participants, original.participants);
    assert_eq!(loaded.start_ms, original.start_ms);
    assert_eq!(loaded.end_ms, original.end_ms);
    assert_eq!(loaded.metadata, original.metadata);
}

#[tokio::test]
async fn test_file_store_save_overwrites() {
    let dir = tempfile::tempdir().unwrap();
    let store = JsonFileStore::open(dir.path()).await.unwrap();

    let mut rec = record("v1");
    store.save_event(&rec).await.unwrap();
    rec.name = "v2".into();
    store.save_event(&rec).await.unwrap();

    let loaded = store.load_event(rec.id).await.unwrap().unwrap();
    assert_eq!(loaded.name, "v2");
    assert_eq!(store.load_all_events().await.unwrap().len(), 1);
}

#[tokio::test]
async fn test_file_store_delete() {
    let dir = tempfile::tempdir().unwrap();
    let store = JsonFileStore::open(dir.path()).await.unwrap();

    let rec = record("doomed");
    store.save_event(&rec).await.unwrap();

    assert!(store.delete_event(rec.id).await.unwrap());
    assert!(!store.delete_event(rec.id).await.unwrap());
    assert!(store.load_event(rec.id).await.unwrap().is_none());
}

#[tokio::test]
async fn test_file_store_load_all_skips_corrupt_files() {
    let dir = tempfile::tempdir().unwrap();
    let store = JsonFileStore::open(dir.path()).await.unwrap();

    store.save_event(&record("good")).await.unwrap();
    std::fs::write(dir.path().join("junk.json"), b"{ not json").unwrap();

    let all = store.load_all_events().await.unwrap();
    assert_eq!(all.len(), 1);
    assert_eq!(all[0].name, "good");
}

#[tokio::test]
async fn test_file_store_reconnect_restores_health() {
    let dir = tempfile::tempdir().unwrap();
    let store = JsonFileStore::open(dir.path().join("data")).await.unwrap();
    assert!(store.is_healthy());
    store.reconnect().await.unwrap();
    assert!(store.is_healthy());
}

// =========================================================================
// StoreWriter
// =========================================================================

#[tokio::test]
async fn test_writer_drains_queued_saves_on_shutdown() {
    let store = Arc::new(MemoryStore::new());
    let writer = StoreWriter::spawn(store.clone(), StoreConfig::default());

    for i in 0..10 {
        writer.queue_save(record(&format!("e{i}")));
    }
    writer.shutdown().await;

    assert_eq!(store.len(), 10);
}

#[tokio::test]
async fn test_writer_batch_is_chunked_and_saved() {
    let store = Arc::new(MemoryStore::new());
    let config = StoreConfig {
        batch_size: 4,
        ..StoreConfig::default()
    };
    let writer = StoreWriter::spawn(store.clone(), config);

    let batch: Vec<_> = (0..11).map(|i| record(&format!("b{i}"))).collect();
    writer.queue_batch(batch);
    writer.shutdown().await;

    assert_eq!(store.len(), 11);
}

#[tokio::test]
async fn test_writer_delete_job() {
    let store = Arc::new(MemoryStore::new());
    let rec = record("gone");
    store.save_event(&rec).await.unwrap();

    let writer = StoreWriter::spawn(store.clone(), StoreConfig::default());
    writer.queue_delete(rec.id);
    writer.shutdown().await;

    assert!(store.load_event(rec.id).await.unwrap().is_none());
}

#[tokio::test]
async fn test_writer_empty_batch_is_noop() {
    let store = Arc::new(MemoryStore::new());
    let writer = StoreWriter::spawn(store.clone(), StoreConfig::default());
    writer.queue_batch(Vec::new());
    writer.shutdown().await;
    assert!(store.is_empty());
}

#[tokio::test]
async fn test_writer_shutdown_respects_grace_period() {
    let store = Arc::new(MemoryStore::new());
    let config = StoreConfig {
        shutdown_grace: Duration::from_millis(200),
        ..StoreConfig::default()
    };
    let writer = StoreWriter::spawn(store.clone(), config);
    writer.queue_save(record("last"));

    let started = std::time::Instant::now();
    writer.shutdown().await;
    // An idle pool with one tiny job should stop well inside the grace.
    assert!(started.elapsed() < Duration::from_secs(2));
    assert_eq!(store.len(), 1);
}
