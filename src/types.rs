use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A memory record reconstructed from a stored document body and its
/// metadata record.
///
/// Records in the store may be partially malformed (tag fields holding
/// invalid JSON, missing or non-numeric timestamps); reconstruction degrades
/// field-by-field instead of failing, so a bad field never loses the rest of
/// the record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Memory {
    /// Document body as stored
    pub content: String,
    /// Stable identity hash (see [`crate::content_hash::derive_content_hash`])
    pub content_hash: String,
    /// Tags attached to the record; empty when absent or undecodable
    pub tags: Vec<String>,
    /// Free-form type bucket; empty string means "unspecified type"
    pub memory_type: String,
    /// Seconds since epoch, when present and numeric
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<f64>,
}

impl Memory {
    /// Rebuild a memory from a document body and the metadata record stored
    /// alongside it.
    pub fn from_record(document: &str, metadata: Option<&Map<String, Value>>) -> Self {
        Self {
            content: document.to_string(),
            content_hash: string_field(metadata, "content_hash"),
            tags: tags_field(metadata),
            memory_type: string_field(metadata, "memory_type"),
            timestamp: timestamp_field(metadata),
        }
    }
}

/// Debug metadata attached to a query result by the inspector.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MemoryDebugInfo {
    /// Distance exactly as reported by the index
    pub raw_distance: f32,
    /// `1 - raw_distance`, unclamped
    pub raw_similarity: f32,
    /// Record id in the underlying store
    pub memory_id: String,
    /// Embedding model the query ran against
    pub embedding_model: String,
}

/// A memory together with its similarity score and optional debug metadata.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MemoryQueryResult {
    pub memory: Memory,
    /// Cosine similarity derived as `1 - distance`; 1 = identical
    pub similarity: f32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub debug_info: Option<MemoryDebugInfo>,
}

/// String field lookup with an empty-string default.
pub(crate) fn string_field(metadata: Option<&Map<String, Value>>, key: &str) -> String {
    metadata
        .and_then(|record| record.get(key))
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string()
}

/// Decode the `tags` field of a metadata record.
///
/// Tags are persisted either as a JSON-encoded string or as a native list,
/// depending on store capability. Decode failures and type mismatches yield
/// zero tags for the record rather than an error.
pub(crate) fn tags_field(metadata: Option<&Map<String, Value>>) -> Vec<String> {
    let Some(value) = metadata.and_then(|record| record.get("tags")) else {
        return Vec::new();
    };

    match value {
        Value::String(encoded) => serde_json::from_str(encoded).unwrap_or_default(),
        Value::Array(_) => {
            serde_json::from_value(value.clone()).unwrap_or_default()
        }
        _ => Vec::new(),
    }
}

/// Parse the `timestamp` field of a metadata record as seconds since epoch.
///
/// Accepts numbers and numeric strings; anything absent, non-numeric, or
/// non-finite is treated as "no timestamp" so the enclosing scan never
/// branches on a parse error.
pub(crate) fn timestamp_field(metadata: Option<&Map<String, Value>>) -> Option<f64> {
    let value = metadata?.get("timestamp")?;

    let parsed = match value {
        Value::Number(number) => number.as_f64(),
        Value::String(raw) => raw.parse::<f64>().ok(),
        _ => None,
    };

    parsed.filter(|seconds| seconds.is_finite())
}
