//! Aggregate statistics over the memory collection.
//!
//! A stats pass is a single full scan: O(total records) time and memory,
//! read-only, no pagination. Inside the scan every record is best-effort —
//! a malformed tag field or timestamp costs that record its contribution to
//! that one aggregate, never the whole pass. Only a failure of the bulk
//! fetch itself aborts, and then the call reports a single error value
//! instead of partial numbers.

use std::collections::HashMap;

use chrono::{DateTime, SecondsFormat};
use serde::Serialize;

use crate::errors::StoreResult;
use crate::store::{GetInclude, MemoryStoreHandle};
use crate::types;

/// Number of entries in the truncated top-tags view.
pub const TOP_TAGS_LIMIT: usize = 10;

/// A tag together with its occurrence count.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TagCount {
    pub tag: String,
    pub count: u64,
}

/// Aggregate view over every stored memory.
#[derive(Debug, Clone, Serialize)]
pub struct StatsReport {
    /// Record count reported by the collection
    pub total_memories: usize,
    /// Summed length of all document bodies, in bytes
    pub total_content_length: usize,
    /// `total_content_length / total_memories`, 0 for an empty store
    pub avg_content_length: f64,
    /// Histogram of `memory_type` buckets; `""` holds untyped records
    pub memory_types: HashMap<String, u64>,
    /// Full tag histogram, in the order tags were first encountered
    pub tags: Vec<TagCount>,
    /// The ten most frequent tags, descending by count; ties keep
    /// first-encounter order
    pub top_tags: Vec<TagCount>,
    /// ISO-8601 timestamp of the oldest record carrying a parseable timestamp
    #[serde(skip_serializing_if = "Option::is_none")]
    pub oldest_memory: Option<String>,
    /// ISO-8601 timestamp of the newest record carrying a parseable timestamp
    #[serde(skip_serializing_if = "Option::is_none")]
    pub newest_memory: Option<String>,
    pub collection_name: String,
    pub embedding_model: String,
}

/// Outcome of a stats pass: a full report, or a single error value when the
/// bulk fetch itself failed.
#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum StatsOutcome {
    Report(Box<StatsReport>),
    Error { error: String },
}

impl StatsOutcome {
    pub fn report(&self) -> Option<&StatsReport> {
        match self {
            StatsOutcome::Report(report) => Some(report),
            StatsOutcome::Error { .. } => None,
        }
    }
}

/// Compute aggregate statistics for the collection behind `handle`.
pub async fn database_stats(handle: &MemoryStoreHandle) -> StatsOutcome {
    match collect_stats(handle).await {
        Ok(report) => StatsOutcome::Report(Box::new(report)),
        Err(error) => {
            log::error!("Error getting database stats: {error}");
            StatsOutcome::Error {
                error: error.to_string(),
            }
        }
    }
}

async fn collect_stats(handle: &MemoryStoreHandle) -> StoreResult<StatsReport> {
    let collection = handle.collection();
    let count = collection.count().await?;
    let records = collection.get(GetInclude::ALL).await?;

    let mut report = StatsReport {
        total_memories: count,
        total_content_length: 0,
        avg_content_length: 0.0,
        memory_types: HashMap::new(),
        tags: Vec::new(),
        top_tags: Vec::new(),
        oldest_memory: None,
        newest_memory: None,
        collection_name: handle.config().collection_name.clone(),
        embedding_model: handle.config().embedding_model.clone(),
    };

    // Tag counts keyed by first-encounter position so ties in the top-N
    // view resolve by scan order.
    let mut tag_positions: HashMap<String, usize> = HashMap::new();
    let mut oldest: Option<f64> = None;
    let mut newest: Option<f64> = None;

    for (position, document) in records.documents.iter().enumerate() {
        report.total_content_length += document.len();

        let metadata = records.metadatas.get(position).and_then(Option::as_ref);

        let memory_type = types::string_field(metadata, "memory_type");
        *report.memory_types.entry(memory_type).or_insert(0) += 1;

        for tag in types::tags_field(metadata) {
            match tag_positions.get(&tag) {
                Some(&index) => report.tags[index].count += 1,
                None => {
                    tag_positions.insert(tag.clone(), report.tags.len());
                    report.tags.push(TagCount { tag, count: 1 });
                }
            }
        }

        if let Some(timestamp) = types::timestamp_field(metadata) {
            // Extrema render eagerly; a timestamp outside the representable
            // datetime range counts as unparseable and skips the record.
            if oldest.map_or(true, |current| timestamp < current) {
                if let Some(rendered) = render_iso8601(timestamp) {
                    oldest = Some(timestamp);
                    report.oldest_memory = Some(rendered);
                }
            }
            if newest.map_or(true, |current| timestamp > current) {
                if let Some(rendered) = render_iso8601(timestamp) {
                    newest = Some(timestamp);
                    report.newest_memory = Some(rendered);
                }
            }
        }
    }

    if count > 0 {
        report.avg_content_length = report.total_content_length as f64 / count as f64;
    }

    let mut top = report.tags.clone();
    top.sort_by(|a, b| b.count.cmp(&a.count));
    top.truncate(TOP_TAGS_LIMIT);
    report.top_tags = top;

    Ok(report)
}

/// Render seconds-since-epoch as an ISO-8601 (RFC 3339) UTC timestamp with
/// microsecond precision. Returns `None` outside chrono's representable
/// range.
fn render_iso8601(timestamp: f64) -> Option<String> {
    let seconds = timestamp.floor();
    let nanos = ((timestamp - seconds) * 1_000_000_000.0).round() as u32;
    DateTime::from_timestamp(seconds as i64, nanos.min(999_999_999))
        .map(|datetime| datetime.to_rfc3339_opts(SecondsFormat::Micros, false))
}
