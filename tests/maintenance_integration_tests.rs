//! Maintenance Integration Tests
//!
//! End-to-end coverage of the validate → repair → stats flow against a
//! disk-backed fake store: the collection handle swaps in place during
//! repair, backups land on disk before the collection is touched, and the
//! stats pass reads whatever the current handle serves.

use std::fs;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use serde_json::json;
use tempfile::TempDir;

use memvault::{
    database_stats, derive_content_hash, exact_match_retrieve, repair_store, validate_store,
    CollectionConfig, GetInclude, MemoryStoreHandle, MetadataRecord, QueryBatch, QueryInclude,
    RecordBatch, StatsOutcome, StoreConfig, StoreError, StoreResult, VectorStore,
};

/// The collection state a [`FakeStore`] serves; repair swaps it wholesale.
#[derive(Default)]
struct CollectionState {
    ids: Vec<String>,
    documents: Vec<String>,
    metadatas: Vec<Option<MetadataRecord>>,
    healthy: bool,
}

impl CollectionState {
    fn healthy_with(records: Vec<(&str, &str, serde_json::Value)>) -> Self {
        let mut state = CollectionState {
            healthy: true,
            ..Default::default()
        };
        for (id, document, metadata) in records {
            state.ids.push(id.to_string());
            state.documents.push(document.to_string());
            state
                .metadatas
                .push(metadata.as_object().cloned());
        }
        state
    }

    fn broken() -> Self {
        CollectionState {
            healthy: false,
            ..Default::default()
        }
    }
}

/// Disk-backed fake vector store. `recreate_collection` replaces the state
/// cell behind the handle, which is exactly what a real backend's
/// get-or-create does to its collection pointer.
struct FakeStore {
    state: tokio::sync::RwLock<CollectionState>,
    fail_recreate: AtomicBool,
    recreations: AtomicUsize,
}

impl FakeStore {
    fn new(state: CollectionState) -> Self {
        Self {
            state: tokio::sync::RwLock::new(state),
            fail_recreate: AtomicBool::new(false),
            recreations: AtomicUsize::new(0),
        }
    }
}

#[async_trait]
impl VectorStore for FakeStore {
    async fn count(&self) -> StoreResult<usize> {
        let state = self.state.read().await;
        if !state.healthy {
            return Err(StoreError::CollectionUnavailable {
                message: "collection segment unreadable".to_string(),
            });
        }
        Ok(state.ids.len())
    }

    async fn get(&self, include: GetInclude) -> StoreResult<RecordBatch> {
        let state = self.state.read().await;
        if !state.healthy {
            return Err(StoreError::CollectionUnavailable {
                message: "collection segment unreadable".to_string(),
            });
        }
        Ok(RecordBatch {
            ids: state.ids.clone(),
            documents: if include.documents {
                state.documents.clone()
            } else {
                Vec::new()
            },
            metadatas: if include.metadatas {
                state.metadatas.clone()
            } else {
                Vec::new()
            },
        })
    }

    async fn query(
        &self,
        query_texts: &[String],
        _n_results: usize,
        _include: QueryInclude,
    ) -> StoreResult<QueryBatch> {
        // Nearest-neighbor ranking belongs to the engine; diagnostics only
        // need the batch shape.
        Ok(QueryBatch {
            ids: vec![Vec::new(); query_texts.len()],
            documents: vec![Vec::new(); query_texts.len()],
            metadatas: vec![Vec::new(); query_texts.len()],
            distances: vec![Vec::new(); query_texts.len()],
        })
    }

    async fn recreate_collection(&self, _config: &CollectionConfig) -> StoreResult<()> {
        if self.fail_recreate.load(Ordering::SeqCst) {
            return Err(StoreError::Recreation {
                message: "backend refused to re-open the collection".to_string(),
            });
        }
        let mut state = self.state.write().await;
        *state = CollectionState::healthy_with(Vec::new());
        self.recreations.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

struct StaticEmbedder;

#[async_trait]
impl memvault::Embedder for StaticEmbedder {
    async fn encode(&self, _text: &str) -> memvault::EmbeddingResult<Vec<f32>> {
        Ok(vec![0.1, 0.2, 0.3, 0.4])
    }

    fn model_name(&self) -> &str {
        "static-test-model"
    }

    fn device(&self) -> String {
        "cpu".to_string()
    }
}

fn seeded_store_root(temp: &TempDir) -> PathBuf {
    let store_root = temp.path().join("store");
    fs::create_dir_all(store_root.join("segments")).unwrap();
    fs::write(store_root.join("manifest.json"), b"{\"version\":1}").unwrap();
    fs::write(store_root.join("segments/seg-0.bin"), b"vectors").unwrap();
    store_root
}

fn handle_for(store: Arc<FakeStore>, temp: &TempDir) -> MemoryStoreHandle {
    let config = StoreConfig {
        store_root: seeded_store_root(temp),
        backups_dir: temp.path().join("backups"),
        ..StoreConfig::default()
    };
    MemoryStoreHandle::new(store, Arc::new(StaticEmbedder), config)
}

#[tokio::test]
async fn test_validate_then_repair_then_stats() {
    let temp = TempDir::new().unwrap();
    let store = Arc::new(FakeStore::new(CollectionState::broken()));
    let handle = handle_for(store.clone(), &temp);

    // The broken collection fails validation without throwing.
    let validation = validate_store(&handle).await;
    assert!(!validation.is_valid);
    assert!(validation.message.contains("collection segment unreadable"));

    // Repair snapshots the root, swaps the collection, and re-validates.
    let outcome = repair_store(&handle).await;
    assert!(outcome.success, "repair failed: {}", outcome.message);
    assert_eq!(store.recreations.load(Ordering::SeqCst), 1);

    let backup_path = outcome.backup_path.expect("backup path should be set");
    assert_eq!(
        fs::read(backup_path.join("manifest.json")).unwrap(),
        b"{\"version\":1}"
    );
    assert_eq!(
        fs::read(backup_path.join("segments/seg-0.bin")).unwrap(),
        b"vectors"
    );

    // The same handle now validates and reports an empty collection.
    let validation = validate_store(&handle).await;
    assert!(validation.is_valid);
    assert_eq!(
        validation.message,
        "Database validated successfully. Contains 0 memories."
    );

    match database_stats(&handle).await {
        StatsOutcome::Report(report) => {
            assert_eq!(report.total_memories, 0);
            assert_eq!(report.avg_content_length, 0.0);
        }
        StatsOutcome::Error { error } => panic!("stats failed after repair: {error}"),
    }
}

#[tokio::test]
async fn test_failed_recreation_still_leaves_a_backup() {
    let temp = TempDir::new().unwrap();
    let store = Arc::new(FakeStore::new(CollectionState::broken()));
    store.fail_recreate.store(true, Ordering::SeqCst);
    let handle = handle_for(store.clone(), &temp);

    let outcome = repair_store(&handle).await;
    assert!(!outcome.success);

    // The snapshot happened before the failed re-open.
    let backup_path = outcome.backup_path.expect("backup path should be set");
    assert!(backup_path.join("manifest.json").exists());
    assert_eq!(store.recreations.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_sequential_repairs_create_distinct_backups() {
    let temp = TempDir::new().unwrap();
    let store = Arc::new(FakeStore::new(CollectionState::healthy_with(Vec::new())));
    let handle = handle_for(store.clone(), &temp);

    let first = repair_store(&handle).await;
    assert!(first.success);
    // Directory names are second-granularity timestamps, so spacing the
    // repairs apart guarantees distinct paths.
    tokio::time::sleep(std::time::Duration::from_millis(1100)).await;
    let second = repair_store(&handle).await;
    assert!(second.success);

    assert_ne!(first.backup_path, second.backup_path);
    let backups: Vec<_> = fs::read_dir(temp.path().join("backups"))
        .unwrap()
        .collect();
    assert_eq!(backups.len(), 2);
}

#[tokio::test]
async fn test_stats_over_seeded_collection() {
    let temp = TempDir::new().unwrap();
    let store = Arc::new(FakeStore::new(CollectionState::healthy_with(vec![
        (
            "m1",
            "the first memory",
            json!({
                "content_hash": derive_content_hash("the first memory", None),
                "memory_type": "note",
                "tags": "[\"alpha\", \"beta\"]",
                "timestamp": 1700000000,
            }),
        ),
        (
            "m2",
            "the second",
            json!({
                "memory_type": "task",
                "tags": ["alpha"],
                "timestamp": "1700086400",
            }),
        ),
        (
            "m3",
            "malformed friend",
            json!({
                "tags": "not-json",
                "timestamp": "not-a-number",
            }),
        ),
    ])));
    let handle = handle_for(store, &temp);

    let report = match database_stats(&handle).await {
        StatsOutcome::Report(report) => report,
        StatsOutcome::Error { error } => panic!("stats failed: {error}"),
    };

    assert_eq!(report.total_memories, 3);
    assert_eq!(
        report.total_content_length,
        "the first memory".len() + "the second".len() + "malformed friend".len()
    );
    assert_eq!(report.memory_types.get("note"), Some(&1));
    assert_eq!(report.memory_types.get("task"), Some(&1));
    assert_eq!(report.memory_types.get(""), Some(&1));

    let alpha = report.tags.iter().find(|t| t.tag == "alpha").unwrap();
    assert_eq!(alpha.count, 2);
    let beta = report.tags.iter().find(|t| t.tag == "beta").unwrap();
    assert_eq!(beta.count, 1);

    // m3 contributes to counts but not to the timestamp extrema.
    assert_eq!(
        report.oldest_memory.as_deref(),
        Some("2023-11-14T22:13:20.000000+00:00")
    );
    assert_eq!(
        report.newest_memory.as_deref(),
        Some("2023-11-15T22:13:20.000000+00:00")
    );
}

#[tokio::test]
async fn test_exact_match_against_the_store() {
    let temp = TempDir::new().unwrap();
    let store = Arc::new(FakeStore::new(CollectionState::healthy_with(vec![
        ("m1", "Foo", json!({"content_hash": "upper"})),
        ("m2", "foo", json!({"content_hash": "lower"})),
    ])));
    let handle = handle_for(store, &temp);

    let matches = exact_match_retrieve(&handle, "Foo").await;
    assert_eq!(matches.len(), 1);
    assert_eq!(matches[0].content_hash, "upper");

    let matches = exact_match_retrieve(&handle, "FOO").await;
    assert!(matches.is_empty());
}
