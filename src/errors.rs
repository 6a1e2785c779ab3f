use thiserror::Error;

/// Errors surfaced by the vector store collaborator.
///
/// Implementations of [`crate::store::VectorStore`] map their backend's
/// failures onto these variants; the maintenance utilities never let one of
/// them escape a public entry point — each operation converts faults into its
/// documented failure value (`ValidationResult`, `StatsOutcome::Error`, an
/// empty result set, ...).
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Collection unavailable: {message}")]
    CollectionUnavailable { message: String },

    #[error("Malformed record batch: {reason}")]
    MalformedBatch { reason: String },

    #[error("Collection re-creation failed: {message}")]
    Recreation { message: String },

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl StoreError {
    /// Shorthand for the batch-shape violations detected while consuming
    /// parallel-indexed arrays.
    pub fn malformed(reason: impl Into<String>) -> Self {
        StoreError::MalformedBatch {
            reason: reason.into(),
        }
    }
}

pub type StoreResult<T> = Result<T, StoreError>;
