use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Distance metric configured on the collection's vector index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DistanceMetric {
    /// Cosine distance; similarity is derived as `1 - distance`.
    Cosine,
    /// Squared L2 (Euclidean) distance.
    L2,
    /// Inner product.
    Ip,
}

impl DistanceMetric {
    /// Metric name as the underlying store expects it (index space parameter).
    pub fn as_str(&self) -> &'static str {
        match self {
            DistanceMetric::Cosine => "cosine",
            DistanceMetric::L2 => "l2",
            DistanceMetric::Ip => "ip",
        }
    }
}

/// Configuration for a memory store handle.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreConfig {
    /// Name of the collection inside the vector store
    pub collection_name: String,
    /// Distance metric the collection index was created with
    pub distance_metric: DistanceMetric,
    /// Identifier of the embedding model attached to the collection
    pub embedding_model: String,
    /// On-disk root of the vector store (the source of repair backups)
    pub store_root: PathBuf,
    /// Directory receiving timestamped repair backups
    pub backups_dir: PathBuf,
}

impl Default for StoreConfig {
    fn default() -> Self {
        let data_root = dirs::data_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("memvault");

        Self {
            collection_name: "memory_collection".to_string(),
            distance_metric: DistanceMetric::Cosine,
            embedding_model: "all-MiniLM-L6-v2".to_string(),
            store_root: data_root.join("store"),
            backups_dir: data_root.join("backups"),
        }
    }
}

impl StoreConfig {
    /// The collection facet of this configuration, as handed to
    /// [`crate::store::VectorStore::recreate_collection`] during repair.
    pub fn collection(&self) -> CollectionConfig {
        CollectionConfig {
            name: self.collection_name.clone(),
            distance_metric: self.distance_metric,
            embedding_model: self.embedding_model.clone(),
        }
    }
}

/// The original configuration a collection is destructively re-opened with:
/// its name, index metric, and embedding function identifier.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CollectionConfig {
    pub name: String,
    pub distance_metric: DistanceMetric,
    pub embedding_model: String,
}
