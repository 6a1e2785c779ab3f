//! Diagnostic wrappers exposing raw similarity scores and embedding
//! internals.
//!
//! These operations exist for troubleshooting: they surface what the
//! retrieval path normally hides (raw distances, unclamped similarities,
//! embedding vectors, timing) and never propagate a fault — every failure
//! converts to an empty result or an error-shaped value.

use std::time::Instant;

use serde::Serialize;

use crate::errors::{StoreError, StoreResult};
use crate::store::{GetInclude, MemoryStoreHandle, QueryInclude};
use crate::types::{Memory, MemoryDebugInfo, MemoryQueryResult};

/// Fixed probe sentence for model health checks.
const MODEL_CHECK_SENTENCE: &str = "This is a test string for embedding.";

/// Content previews are truncated to this many characters.
const CONTENT_PREVIEW_CHARS: usize = 100;

/// Number of leading vector values included in an embedding sample.
const EMBEDDING_SAMPLE_LEN: usize = 5;

/// Raw embedding details for a piece of text.
#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum EmbeddingProbe {
    Sample {
        /// Encode wall time in seconds, rounded to 4 decimal places
        embedding_time: f64,
        embedding_dimensions: usize,
        embedding_model: String,
        /// First values of the vector, enough to eyeball scale and sign
        embedding_sample: Vec<f32>,
        content_preview: String,
    },
    Error {
        error: String,
    },
}

/// Health of the embedding model.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum ModelStatus {
    Ok {
        model: String,
        embedding_dimensions: usize,
        embedding_time: f64,
        device: String,
    },
    Error {
        error: String,
    },
}

/// Encode `content` and report the embedding's shape, timing, and a sample
/// of its values.
pub async fn raw_embedding(handle: &MemoryStoreHandle, content: &str) -> EmbeddingProbe {
    let start = Instant::now();
    match handle.embedder().encode(content).await {
        Ok(embedding) => EmbeddingProbe::Sample {
            embedding_time: round4(start.elapsed().as_secs_f64()),
            embedding_dimensions: embedding.len(),
            embedding_model: handle.embedder().model_name().to_string(),
            embedding_sample: embedding.iter().take(EMBEDDING_SAMPLE_LEN).copied().collect(),
            content_preview: preview(content),
        },
        Err(error) => {
            log::error!("Error generating embedding: {error}");
            EmbeddingProbe::Error {
                error: error.to_string(),
            }
        }
    }
}

/// Check that the embedding model is loaded and working by encoding a fixed
/// test sentence.
pub async fn check_embedding_model(handle: &MemoryStoreHandle) -> ModelStatus {
    let start = Instant::now();
    match handle.embedder().encode(MODEL_CHECK_SENTENCE).await {
        Ok(embedding) => ModelStatus::Ok {
            model: handle.embedder().model_name().to_string(),
            embedding_dimensions: embedding.len(),
            embedding_time: round4(start.elapsed().as_secs_f64()),
            device: handle.embedder().device(),
        },
        Err(error) => {
            log::error!("Error checking embedding model: {error}");
            ModelStatus::Error {
                error: error.to_string(),
            }
        }
    }
}

/// Retrieve memories for `query` with raw distances and similarities
/// attached.
///
/// Similarity is `1 - distance`, unclamped: cosine distance lives in
/// [0, 2], so similarity lives in [-1, 1] and distances above 1 go
/// negative. Results below `similarity_threshold` are dropped; the store's
/// ascending-distance order is preserved. Any underlying fault yields an
/// empty list.
pub async fn debug_retrieve(
    handle: &MemoryStoreHandle,
    query: &str,
    n_results: usize,
    similarity_threshold: f32,
) -> Vec<MemoryQueryResult> {
    match debug_retrieve_inner(handle, query, n_results, similarity_threshold).await {
        Ok(results) => results,
        Err(error) => {
            log::error!("Error in debug retrieve: {error}");
            Vec::new()
        }
    }
}

async fn debug_retrieve_inner(
    handle: &MemoryStoreHandle,
    query: &str,
    n_results: usize,
    similarity_threshold: f32,
) -> StoreResult<Vec<MemoryQueryResult>> {
    let batch = handle
        .collection()
        .query(&[query.to_string()], n_results, QueryInclude::ALL)
        .await?;

    // Only the first query's results are consumed.
    let Some(ids) = batch.ids.first() else {
        return Ok(Vec::new());
    };
    let documents = batch
        .documents
        .first()
        .ok_or_else(|| StoreError::malformed("query batch is missing documents"))?;
    let metadatas = batch
        .metadatas
        .first()
        .ok_or_else(|| StoreError::malformed("query batch is missing metadatas"))?;
    let distances = batch
        .distances
        .first()
        .ok_or_else(|| StoreError::malformed("query batch is missing distances"))?;

    let mut results = Vec::new();
    for (position, id) in ids.iter().enumerate() {
        let document = documents
            .get(position)
            .ok_or_else(|| StoreError::malformed("documents shorter than ids"))?;
        let metadata = metadatas
            .get(position)
            .ok_or_else(|| StoreError::malformed("metadatas shorter than ids"))?
            .as_ref();
        let distance = *distances
            .get(position)
            .ok_or_else(|| StoreError::malformed("distances shorter than ids"))?;

        let similarity = 1.0 - distance;
        if similarity < similarity_threshold {
            continue;
        }

        results.push(MemoryQueryResult {
            memory: Memory::from_record(document, metadata),
            similarity,
            debug_info: Some(MemoryDebugInfo {
                raw_distance: distance,
                raw_similarity: similarity,
                memory_id: id.clone(),
                embedding_model: handle.embedder().model_name().to_string(),
            }),
        });
    }

    Ok(results)
}

/// Retrieve memories whose stored content equals `content` byte for byte.
///
/// No normalization, no case folding. Any underlying fault yields an empty
/// list.
pub async fn exact_match_retrieve(handle: &MemoryStoreHandle, content: &str) -> Vec<Memory> {
    match exact_match_inner(handle, content).await {
        Ok(matches) => matches,
        Err(error) => {
            log::error!("Error in exact match retrieve: {error}");
            Vec::new()
        }
    }
}

async fn exact_match_inner(
    handle: &MemoryStoreHandle,
    content: &str,
) -> StoreResult<Vec<Memory>> {
    let records = handle.collection().get(GetInclude::ALL).await?;

    let mut matches = Vec::new();
    for (position, document) in records.documents.iter().enumerate() {
        if document == content {
            let metadata = records.metadatas.get(position).and_then(Option::as_ref);
            matches.push(Memory::from_record(document, metadata));
        }
    }

    Ok(matches)
}

/// Truncate to the leading characters, marking the cut with an ellipsis.
fn preview(content: &str) -> String {
    if content.chars().count() <= CONTENT_PREVIEW_CHARS {
        content.to_string()
    } else {
        let truncated: String = content.chars().take(CONTENT_PREVIEW_CHARS).collect();
        format!("{truncated}...")
    }
}

fn round4(value: f64) -> f64 {
    (value * 10_000.0).round() / 10_000.0
}
