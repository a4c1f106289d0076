//! Memcached-backed strategy integration tests. See `redis_integration_test.rs`
//! for the matching Redis coverage and `src/backend/memcached.rs` for raw
//! backend unit tests.
//!
//! ```bash
//! cargo test --features memcached --test memcached_integration_test -- --ignored
//! ```
//!
//! Server address comes from `TEST_MEMCACHED_ADDR`, defaulting to
//! `127.0.0.1:11211`.

#![cfg(feature = "memcached")]

use stampede_kit::backend::{CacheBackend, MemcachedBackend};
use stampede_kit::config::StrategyConfig;
use stampede_kit::strategy::{CacheStrategy, JitterLockCacheStrategy};
use std::env;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

fn get_memcached_addr() -> String {
    env::var("TEST_MEMCACHED_ADDR").unwrap_or_else(|_| "127.0.0.1:11211".to_string())
}

async fn create_test_backend() -> Option<MemcachedBackend> {
    match MemcachedBackend::from_server(get_memcached_addr()).await {
        Ok(backend) if backend.health_check().await.unwrap_or(false) => Some(backend),
        _ => None,
    }
}

#[tokio::test]
#[ignore]
async fn test_jitter_lock_cold_hit_against_memcached() {
    let Some(backend) = create_test_backend().await else {
        println!("Memcached not available, skipping");
        return;
    };
    backend.delete("product:jitter-lock:memcached_it_1").await.ok();
    backend
        .delete("lock:refresh:jitter-lock:memcached_it_1")
        .await
        .ok();

    let strategy = JitterLockCacheStrategy::new(backend, StrategyConfig::default());
    let result = strategy
        .get_or_load("memcached_it_1", || async { Ok(Some("V".to_string())) })
        .await
        .unwrap();
    assert_eq!(result, Some("V".to_string()));
}

#[tokio::test]
#[ignore]
async fn test_jitter_lock_single_flight_against_memcached() {
    let Some(backend) = create_test_backend().await else {
        println!("Memcached not available, skipping");
        return;
    };
    backend
        .delete("product:jitter-lock:memcached_it_stampede")
        .await
        .ok();
    backend
        .delete("lock:refresh:jitter-lock:memcached_it_stampede")
        .await
        .ok();

    let config = StrategyConfig::builder()
        .with_lock_retry_interval(Duration::from_millis(10))
        .with_lock_max_retries(200)
        .build();
    let strategy = Arc::new(JitterLockCacheStrategy::new(backend, config));
    let calls = Arc::new(AtomicUsize::new(0));

    let mut handles = Vec::new();
    for _ in 0..10 {
        let strategy = strategy.clone();
        let calls = calls.clone();
        handles.push(tokio::spawn(async move {
            strategy
                .get_or_load("memcached_it_stampede", move || {
                    calls.fetch_add(1, Ordering::SeqCst);
                    async {
                        tokio::time::sleep(Duration::from_millis(50)).await;
                        Ok(Some("V".to_string()))
                    }
                })
                .await
        }));
    }

    for h in handles {
        assert_eq!(h.await.unwrap().unwrap(), Some("V".to_string()));
    }
    assert_eq!(calls.load(Ordering::SeqCst), 1);
}
