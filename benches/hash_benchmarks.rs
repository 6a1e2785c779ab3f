//! Benchmarks for content identity hashing
//!
//! The hash deriver sits on the write path of every memory, so its cost per
//! call matters more than anything else in this crate. These benchmarks
//! cover the content-size axis and the metadata axis separately.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use serde_json::{json, Map, Value};

use memvault::derive_content_hash;

/// Test data factory for benchmarks
struct BenchmarkData;

impl BenchmarkData {
    fn content(size: usize) -> String {
        "memory content chunk ".chars().cycle().take(size).collect()
    }

    fn flat_metadata(entries: usize) -> Map<String, Value> {
        let mut metadata = Map::new();
        for i in 0..entries {
            metadata.insert(format!("key_{i}"), json!(format!("value_{i}")));
        }
        metadata
    }

    fn nested_metadata() -> Map<String, Value> {
        json!({
            "tags": ["alpha", "beta", "gamma"],
            "memory_type": "note",
            "source": {"host": "localhost", "session": {"id": 42, "flags": [true, false]}},
            "timestamp": 1700000000.5,
        })
        .as_object()
        .unwrap()
        .clone()
    }
}

fn bench_content_sizes(c: &mut Criterion) {
    let mut group = c.benchmark_group("hash_content_size");

    for size in [64, 1_024, 16_384, 262_144] {
        let content = BenchmarkData::content(size);
        group.throughput(Throughput::Bytes(size as u64));
        group.bench_with_input(BenchmarkId::from_parameter(size), &content, |b, content| {
            b.iter(|| derive_content_hash(black_box(content), None));
        });
    }

    group.finish();
}

fn bench_metadata_shapes(c: &mut Criterion) {
    let mut group = c.benchmark_group("hash_metadata");
    let content = BenchmarkData::content(256);

    group.bench_function("no_metadata", |b| {
        b.iter(|| derive_content_hash(black_box(&content), None));
    });

    for entries in [4, 32, 128] {
        let metadata = BenchmarkData::flat_metadata(entries);
        group.bench_with_input(
            BenchmarkId::new("flat", entries),
            &metadata,
            |b, metadata| {
                b.iter(|| derive_content_hash(black_box(&content), Some(metadata)));
            },
        );
    }

    let nested = BenchmarkData::nested_metadata();
    group.bench_function("nested", |b| {
        b.iter(|| derive_content_hash(black_box(&content), Some(&nested)));
    });

    group.finish();
}

criterion_group!(benches, bench_content_sizes, bench_metadata_shapes);
criterion_main!(benches);
