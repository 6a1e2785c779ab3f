//! Maintenance, diagnostic, and identity utilities for a semantic memory
//! store built on a vector database.
//!
//! The crate owns three concerns:
//!
//! 1. **Content identity** (`content_hash`): a canonical SHA-256 hash over a
//!    memory's content and metadata, stable across processes and independent
//!    of metadata key insertion order. Used as the deduplication and
//!    exact-match lookup key.
//! 2. **Statistics** (`stats`): a full-scan aggregation pass producing record
//!    counts, content-length totals, type and tag histograms, and
//!    oldest/newest timestamps. Malformed records degrade field-by-field
//!    instead of aborting the scan.
//! 3. **Validation and repair** (`maintenance`, `backup`): a liveness probe
//!    over the collection, and a backup-then-recreate repair path that always
//!    snapshots the store's on-disk root before touching collection state.
//!
//! A fourth, diagnostic concern (`inspect`) wraps query and scan operations
//! to expose raw distances, similarity scores, and embedding internals.
//!
//! The vector database engine and the embedding model are external
//! collaborators, consumed through the `VectorStore` and `Embedder` traits;
//! `MemoryStoreHandle` bundles the two together with the collection
//! configuration.

// Module declarations
pub mod backup;
pub mod config;
pub mod content_hash;
pub mod embedding;
pub mod errors;
pub mod inspect;
pub mod maintenance;
pub mod stats;
pub mod store;
pub mod types;

// Re-exports for commonly used types
pub use config::{CollectionConfig, DistanceMetric, StoreConfig};
pub use content_hash::derive_content_hash;
pub use embedding::{Embedder, EmbeddingError, EmbeddingResult, OllamaConfig, OllamaEmbedder};
pub use errors::{StoreError, StoreResult};
pub use inspect::{
    check_embedding_model, debug_retrieve, exact_match_retrieve, raw_embedding, EmbeddingProbe,
    ModelStatus,
};
pub use maintenance::{repair_store, validate_store, RepairOutcome, ValidationResult};
pub use stats::{database_stats, StatsOutcome, StatsReport, TagCount};
pub use store::{
    GetInclude, MemoryStoreHandle, MetadataRecord, QueryBatch, QueryInclude, RecordBatch,
    VectorStore,
};
pub use types::{Memory, MemoryDebugInfo, MemoryQueryResult};
