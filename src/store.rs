//! Vector store seam consumed by the maintenance utilities.
//!
//! The vector database engine is an external collaborator; this module
//! defines the narrow interface the utilities need from it — a record count,
//! a bulk scan, a nearest-neighbor query, and destructive collection
//! re-creation — together with the parallel-indexed batch types those
//! operations return. [`MemoryStoreHandle`] bundles a store, an embedder,
//! and the collection configuration into the single handle every operation
//! takes.

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::{Map, Value};

use crate::config::{CollectionConfig, StoreConfig};
use crate::embedding::Embedder;
use crate::errors::StoreResult;

/// Metadata record attached to a stored document.
pub type MetadataRecord = Map<String, Value>;

/// Field groups to materialize in a bulk [`VectorStore::get`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct GetInclude {
    pub documents: bool,
    pub metadatas: bool,
}

impl GetInclude {
    pub const ALL: GetInclude = GetInclude {
        documents: true,
        metadatas: true,
    };
}

/// Field groups to materialize in a [`VectorStore::query`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct QueryInclude {
    pub documents: bool,
    pub metadatas: bool,
    pub distances: bool,
}

impl QueryInclude {
    pub const ALL: QueryInclude = QueryInclude {
        documents: true,
        metadatas: true,
        distances: true,
    };
}

/// Parallel-indexed arrays returned by a bulk scan: `documents[i]` and
/// `metadatas[i]` belong to `ids[i]`. Fields excluded from the request come
/// back empty.
#[derive(Debug, Clone, Default)]
pub struct RecordBatch {
    pub ids: Vec<String>,
    pub documents: Vec<String>,
    pub metadatas: Vec<Option<MetadataRecord>>,
}

/// Nearest-neighbor results, nested one level per input query text. Within
/// each inner array, results are ordered by ascending distance.
#[derive(Debug, Clone, Default)]
pub struct QueryBatch {
    pub ids: Vec<Vec<String>>,
    pub documents: Vec<Vec<String>>,
    pub metadatas: Vec<Vec<Option<MetadataRecord>>>,
    pub distances: Vec<Vec<f32>>,
}

/// The collection capability consumed from the vector database.
#[async_trait]
pub trait VectorStore: Send + Sync {
    /// Number of records currently in the collection.
    async fn count(&self) -> StoreResult<usize>;

    /// Full scan of the collection.
    async fn get(&self, include: GetInclude) -> StoreResult<RecordBatch>;

    /// Nearest-neighbor search for each of `query_texts`, returning at most
    /// `n_results` per query.
    async fn query(
        &self,
        query_texts: &[String],
        n_results: usize,
        include: QueryInclude,
    ) -> StoreResult<QueryBatch>;

    /// Destructively re-open the collection with its original configuration.
    ///
    /// This refreshes the live handle, not the data files: implementations
    /// hold their collection behind a single swappable cell and replace it in
    /// place, so the new handle is visible to every subsequent call through
    /// this trait. Not safe to run concurrently with readers.
    async fn recreate_collection(&self, config: &CollectionConfig) -> StoreResult<()>;
}

/// Bundles the collaborators the maintenance utilities operate against: the
/// collection handle, the embedding model, and the store configuration.
#[derive(Clone)]
pub struct MemoryStoreHandle {
    collection: Arc<dyn VectorStore>,
    embedder: Arc<dyn Embedder>,
    config: StoreConfig,
}

impl MemoryStoreHandle {
    pub fn new(
        collection: Arc<dyn VectorStore>,
        embedder: Arc<dyn Embedder>,
        config: StoreConfig,
    ) -> Self {
        Self {
            collection,
            embedder,
            config,
        }
    }

    pub fn collection(&self) -> &dyn VectorStore {
        self.collection.as_ref()
    }

    pub fn embedder(&self) -> &dyn Embedder {
        self.embedder.as_ref()
    }

    pub fn config(&self) -> &StoreConfig {
        &self.config
    }
}


#[cfg(test)]
mod tests {
    use super::testing::{InMemoryStore, StubRecord};
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn test_get_include_controls_fields() {
        let store = InMemoryStore::new(vec![StubRecord::new(
            "m1",
            "hello",
            Some(json!({"memory_type": "note"})),
        )]);

        let ids_only = store.get(GetInclude::default()).await.unwrap();
        assert_eq!(ids_only.ids, vec!["m1".to_string()]);
        assert!(ids_only.documents.is_empty());
        assert!(ids_only.metadatas.is_empty());

        let full = store.get(GetInclude::ALL).await.unwrap();
        assert_eq!(full.documents, vec!["hello".to_string()]);
        assert_eq!(full.metadatas.len(), 1);
    }

    #[tokio::test]
    async fn test_recreate_swaps_collection_in_place() {
        let store = InMemoryStore::new(vec![StubRecord::new("m1", "hello", None)]);
        assert_eq!(store.count().await.unwrap(), 1);

        let config = StoreConfig::default();
        store.recreate_collection(&config.collection()).await.unwrap();

        // Same handle, fresh collection.
        assert_eq!(store.count().await.unwrap(), 0);
        assert_eq!(store.recreations.load(std::sync::atomic::Ordering::SeqCst), 1);
    }
}
