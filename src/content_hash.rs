//! Stable content identity hashing.
//!
//! A memory's identity hash is a pure function of its content and its
//! serializable metadata: two records with identical content and identical
//! metadata always receive the same hash, across process restarts and
//! independent of metadata key insertion order. The hash doubles as the
//! deduplication and exact-match lookup key for the store.

use serde_json::{Map, Value};
use sha2::{Digest, Sha256};

/// Derive the identity hash for a piece of content and optional metadata.
///
/// Metadata entries are filtered to the closed union of JSON-serializable
/// kinds (string, number, boolean, list, mapping); anything else — `null`
/// stands in for values that cannot be serialized — is silently dropped
/// rather than failing. Surviving entries are appended to the content as
/// canonical JSON with keys sorted lexicographically at every nesting level,
/// and the result is the lowercase hex SHA-256 of the UTF-8 bytes.
///
/// Passing `None` and passing an empty (or fully filtered-out) map are
/// equivalent: nothing is appended and the hash is that of the content
/// alone.
pub fn derive_content_hash(content: &str, metadata: Option<&Map<String, Value>>) -> String {
    let mut hash_input = content.to_string();

    if let Some(metadata) = metadata {
        let serializable: Map<String, Value> = metadata
            .iter()
            .filter(|(_, value)| is_serializable(value))
            .map(|(key, value)| (key.clone(), value.clone()))
            .collect();

        if !serializable.is_empty() {
            hash_input.push_str(&canonical_json(&Value::Object(serializable)));
        }
    }

    let mut hasher = Sha256::new();
    hasher.update(hash_input.as_bytes());
    format!("{:x}", hasher.finalize())
}

/// The serializable-value union: every JSON kind except `null`.
fn is_serializable(value: &Value) -> bool {
    !value.is_null()
}

/// Canonical JSON encoding: compact separators, object keys sorted
/// lexicographically at every level, list order preserved.
fn canonical_json(value: &Value) -> String {
    match value {
        Value::Object(map) => {
            let mut keys: Vec<&String> = map.keys().collect();
            keys.sort();
            let entries: Vec<String> = keys
                .iter()
                .map(|key| {
                    format!(
                        "{}:{}",
                        Value::String((*key).clone()),
                        canonical_json(&map[key.as_str()])
                    )
                })
                .collect();
            format!("{{{}}}", entries.join(","))
        }
        Value::Array(items) => {
            let rendered: Vec<String> = items.iter().map(canonical_json).collect();
            format!("[{}]", rendered.join(","))
        }
        other => other.to_string(),
    }
}
