//! Performance benchmarks for the knowledge layer
//!
//! Targets:
//! - Chunking: <5ms for a 100KB page
//! - Ranking: <2ms over 1000 chunks
//! - Hashing embeddings: <100us per chunk

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use brandscope_core::knowledge::rank;
use brandscope_core::types::EmbeddedChunk;
use brandscope_core::{Chunk, Chunker, HashingEmbeddingService, SourceTag};

const PARAGRAPH: &str = "TrailRunner builds lightweight shoes for mountain running. \
Each pair uses recycled foam and an outsole tuned for wet rock. \
We sponsor races, publish training plans and repair worn soles for free.\n\n";

fn page(bytes: usize) -> String {
    PARAGRAPH.repeat(bytes / PARAGRAPH.len() + 1)
}

fn embedded(n: usize) -> Vec<EmbeddedChunk> {
    (0..n)
        .map(|i| {
            let text = format!("{} variant {}", PARAGRAPH, i);
            EmbeddedChunk {
                vector: HashingEmbeddingService::hash_embedding(&text),
                chunk: Chunk::new(text, SourceTag::new("bench")),
            }
        })
        .collect()
}

/// Benchmark 1: Chunking
fn bench_chunking(c: &mut Criterion) {
    let mut group = c.benchmark_group("chunking");
    let chunker = Chunker::new(1000, 200).unwrap();
    let tag = SourceTag::new("bench");

    for size in [10_000, 100_000] {
        let text = page(size);
        group.throughput(Throughput::Bytes(text.len() as u64));
        group.bench_with_input(BenchmarkId::from_parameter(size), &text, |b, text| {
            b.iter(|| black_box(chunker.chunk(black_box(text), &tag)));
        });
    }

    group.finish();
}

/// Benchmark 2: Ranking
fn bench_ranking(c: &mut Criterion) {
    let mut group = c.benchmark_group("ranking");
    let query = HashingEmbeddingService::hash_embedding("recycled foam running shoes");

    for n in [100, 1000] {
        let entries = embedded(n);
        group.throughput(Throughput::Elements(n as u64));
        group.bench_with_input(BenchmarkId::from_parameter(n), &entries, |b, entries| {
            b.iter(|| black_box(rank(black_box(&query), entries, 3)));
        });
    }

    group.finish();
}

/// Benchmark 3: Hashing embeddings
fn bench_hashing_embeddings(c: &mut Criterion) {
    let mut group = c.benchmark_group("hashing_embeddings");
    group.throughput(Throughput::Elements(1));

    group.bench_function("paragraph", |b| {
        b.iter(|| black_box(HashingEmbeddingService::hash_embedding(black_box(PARAGRAPH))));
    });

    group.finish();
}

criterion_group!(
    benches,
    bench_chunking,
    bench_ranking,
    bench_hashing_embeddings,
);

criterion_main!(benches);
