//! Performance benchmarks for stampede-kit.
//!
//! This benchmark suite measures:
//! - InMemory backend raw operations (set, get, set_if_absent, compare_delete)
//! - Each strategy's hit-path and cold-miss-path throughput
//! - Serialization throughput across payload sizes
//!
//! Run with: cargo bench
//! View results: open target/criterion/report/index.html

use serde::{Deserialize, Serialize};
use stampede_kit::backend::{CacheBackend, InMemoryBackend};
use stampede_kit::config::StrategyConfig;
use stampede_kit::serialization::{decode, encode};
use stampede_kit::strategy::{
    BasicCacheStrategy, CacheStrategy, FullProtectionCacheStrategy, JitterCacheStrategy,
    JitterLockCacheStrategy, JitterSwrCacheStrategy,
};
use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use std::hint::black_box;
use std::time::Duration;

#[derive(Clone, Serialize, Deserialize)]
struct BenchPayload {
    id: String,
    data: Vec<u8>,
}

impl BenchPayload {
    fn new(id: &str, size: usize) -> Self {
        BenchPayload {
            id: id.to_string(),
            data: vec![0u8; size],
        }
    }
}

fn inmemory_backend_benchmarks(c: &mut Criterion) {
    let mut group = c.benchmark_group("inmemory_backend");
    let rt = tokio::runtime::Runtime::new().expect("failed to create Tokio runtime");

    group.bench_function("set", |b| {
        let backend = InMemoryBackend::new();
        b.to_async(&rt).iter(|| async {
            backend
                .set(black_box("bench_key"), black_box(vec![0u8; 100]), None)
                .await
                .unwrap();
        });
    });

    group.bench_function("get_hit", |b| {
        let backend = InMemoryBackend::new();
        rt.block_on(backend.set("bench_key", vec![0u8; 100], None))
            .unwrap();
        b.to_async(&rt)
            .iter(|| async { backend.get(black_box("bench_key")).await.unwrap() });
    });

    group.bench_function("get_miss", |b| {
        let backend = InMemoryBackend::new();
        b.to_async(&rt)
            .iter(|| async { backend.get(black_box("absent_key")).await.unwrap() });
    });

    group.bench_function("set_if_absent_contended", |b| {
        let backend = InMemoryBackend::new();
        rt.block_on(backend.set("lock:bench", vec![0u8], None))
            .unwrap();
        b.to_async(&rt).iter(|| async {
            backend
                .set_if_absent(
                    black_box("lock:bench"),
                    black_box(vec![1u8]),
                    Duration::from_secs(5),
                )
                .await
                .unwrap()
        });
    });

    group.finish();
}

fn strategy_hit_path_benchmarks(c: &mut Criterion) {
    let mut group = c.benchmark_group("strategy_hit_path");
    let rt = tokio::runtime::Runtime::new().expect("failed to create Tokio runtime");
    let config = StrategyConfig::default();

    macro_rules! bench_hit_path {
        ($name:literal, $strategy:expr) => {
            group.bench_function($name, |b| {
                let strategy = $strategy;
                rt.block_on(strategy.get_or_load("k", || async {
                    Ok(Some(BenchPayload::new("k", 100)))
                }))
                .unwrap();

                b.to_async(&rt).iter(|| async {
                    strategy
                        .get_or_load("k", || async { panic!("must not run on a hit") })
                        .await
                        .unwrap()
                })
            });
        };
    }

    bench_hit_path!(
        "basic",
        BasicCacheStrategy::new(InMemoryBackend::new(), config.clone())
    );
    bench_hit_path!(
        "jitter",
        JitterCacheStrategy::new(InMemoryBackend::new(), config.clone())
    );
    bench_hit_path!(
        "jitter-lock",
        JitterLockCacheStrategy::new(InMemoryBackend::new(), config.clone())
    );
    bench_hit_path!(
        "jitter-swr",
        JitterSwrCacheStrategy::new(InMemoryBackend::new(), config.clone())
    );
    bench_hit_path!(
        "full-protection",
        FullProtectionCacheStrategy::new(InMemoryBackend::new(), config.clone())
    );

    group.finish();
}

fn strategy_cold_miss_benchmarks(c: &mut Criterion) {
    let mut group = c.benchmark_group("strategy_cold_miss");
    let rt = tokio::runtime::Runtime::new().expect("failed to create Tokio runtime");
    let config = StrategyConfig::default();

    // Each iteration uses a fresh backend and a fresh key so we always measure
    // the cold-miss path, never an incidental hit from a prior iteration.
    group.bench_function("basic", |b| {
        b.to_async(&rt).iter(|| async {
            let strategy = BasicCacheStrategy::new(InMemoryBackend::new(), config.clone());
            strategy
                .get_or_load("k", || async { Ok(Some(BenchPayload::new("k", 100))) })
                .await
                .unwrap()
        });
    });

    group.bench_function("jitter-lock", |b| {
        b.to_async(&rt).iter(|| async {
            let strategy = JitterLockCacheStrategy::new(InMemoryBackend::new(), config.clone());
            strategy
                .get_or_load("k", || async { Ok(Some(BenchPayload::new("k", 100))) })
                .await
                .unwrap()
        });
    });

    group.finish();
}

fn serialization_benchmarks(c: &mut Criterion) {
    let mut group = c.benchmark_group("serialization");

    for size in [100, 1_000, 10_000, 100_000].iter() {
        let payload = BenchPayload::new("id", *size);

        group
            .throughput(Throughput::Bytes(*size as u64))
            .bench_with_input(BenchmarkId::new("encode", size), &payload, |b, payload| {
                b.iter(|| encode(black_box(payload)).unwrap());
            });

        let bytes = encode(&payload).unwrap();
        group
            .throughput(Throughput::Bytes(*size as u64))
            .bench_with_input(BenchmarkId::new("decode", size), &bytes, |b, bytes| {
                b.iter(|| decode::<BenchPayload>(black_box(bytes)).unwrap());
            });
    }

    group.finish();
}

criterion_group!(
    benches,
    inmemory_backend_benchmarks,
    strategy_hit_path_benchmarks,
    strategy_cold_miss_benchmarks,
    serialization_benchmarks
);
criterion_main!(benches);
