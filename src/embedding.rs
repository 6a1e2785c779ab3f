//! Embedding collaborator seam and the Ollama-backed implementation.
//!
//! The embedding model is external to this crate; the diagnostics only need
//! to encode text and to report which model and device did the work. The
//! shipped implementation talks to a local Ollama instance over HTTP.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors that can occur during embedding generation
#[derive(Error, Debug)]
pub enum EmbeddingError {
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("API error: {status_code} - {message}")]
    Api { status_code: u16, message: String },

    #[error("Empty text provided")]
    EmptyText,

    #[error("Invalid embedding response: {reason}")]
    InvalidResponse { reason: String },
}

pub type EmbeddingResult<T> = Result<T, EmbeddingError>;

/// The encoding capability consumed from the embedding model.
#[async_trait]
pub trait Embedder: Send + Sync {
    /// Encode text into a fixed-length embedding vector.
    async fn encode(&self, text: &str) -> EmbeddingResult<Vec<f32>>;

    /// Model identifier reported in diagnostics.
    fn model_name(&self) -> &str;

    /// Where inference runs, as a display string ("cpu", "cuda:0", a remote
    /// host for out-of-process backends).
    fn device(&self) -> String;
}

/// Configuration for the Ollama embedding backend.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OllamaConfig {
    pub base_url: String,
    pub model: String,
    pub timeout_ms: u64,
}

impl Default for OllamaConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:11434".to_string(),
            model: "nomic-embed-text".to_string(),
            timeout_ms: 30_000,
        }
    }
}

/// Request payload for the Ollama embedding API
#[derive(Debug, Serialize)]
struct EmbeddingRequest<'a> {
    model: &'a str,
    prompt: &'a str,
}

/// Response from the Ollama embedding API
#[derive(Debug, Deserialize)]
struct EmbeddingResponse {
    embedding: Vec<f32>,
}

/// Embedder backed by a local Ollama instance.
#[derive(Debug, Clone)]
pub struct OllamaEmbedder {
    config: OllamaConfig,
    client: Client,
}

impl Default for OllamaEmbedder {
    fn default() -> Self {
        Self::with_config(OllamaConfig::default())
    }
}

impl OllamaEmbedder {
    /// Create an embedder with custom configuration.
    pub fn with_config(config: OllamaConfig) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_millis(config.timeout_ms))
            .build()
            .expect("Failed to create HTTP client");

        Self { config, client }
    }
}

#[async_trait]
impl Embedder for OllamaEmbedder {
    async fn encode(&self, text: &str) -> EmbeddingResult<Vec<f32>> {
        if text.is_empty() {
            return Err(EmbeddingError::EmptyText);
        }

        let url = format!("{}/api/embeddings", self.config.base_url);
        let request = EmbeddingRequest {
            model: &self.config.model,
            prompt: text,
        };

        let response = self.client.post(&url).json(&request).send().await?;
        if !response.status().is_success() {
            return Err(EmbeddingError::Api {
                status_code: response.status().as_u16(),
                message: response.text().await.unwrap_or_default(),
            });
        }

        let parsed: EmbeddingResponse = response.json().await?;
        if parsed.embedding.is_empty() {
            return Err(EmbeddingError::InvalidResponse {
                reason: "embedding array is empty".to_string(),
            });
        }

        Ok(parsed.embedding)
    }

    fn model_name(&self) -> &str {
        &self.config.model
    }

    fn device(&self) -> String {
        // Inference happens out of process; the service endpoint is the
        // closest thing to a device identity.
        self.config.base_url.clone()
    }
}
