//! Compares how many times a slow loader gets invoked under a burst of
//! concurrent misses, across all five strategies.

use stampede_kit::backend::InMemoryBackend;
use stampede_kit::config::StrategyConfig;
use stampede_kit::strategy::{
    BasicCacheStrategy, CacheStrategy, FullProtectionCacheStrategy, JitterCacheStrategy,
    JitterLockCacheStrategy, JitterSwrCacheStrategy,
};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

const CONCURRENT_CALLERS: usize = 20;

async fn run_burst<B, S>(name: &str, strategy: S)
where
    B: stampede_kit::CacheBackend + 'static,
    S: CacheStrategy<B> + Send + Sync + 'static,
{
    let strategy = Arc::new(strategy);
    let calls = Arc::new(AtomicUsize::new(0));

    let mut handles = Vec::new();
    for _ in 0..CONCURRENT_CALLERS {
        let strategy = strategy.clone();
        let calls = calls.clone();
        handles.push(tokio::spawn(async move {
            strategy
                .get_or_load("hot_key", move || {
                    calls.fetch_add(1, Ordering::SeqCst);
                    async {
                        tokio::time::sleep(Duration::from_millis(20)).await;
                        Ok(Some("origin value".to_string()))
                    }
                })
                .await
        }));
    }

    for h in handles {
        let _ = h.await;
    }

    println!(
        "{:<16} {} concurrent callers -> {} loader calls",
        name,
        CONCURRENT_CALLERS,
        calls.load(Ordering::SeqCst)
    );
}

#[tokio::main]
async fn main() {
    env_logger::Builder::from_default_env()
        .filter_level(log::LevelFilter::Warn)
        .try_init()
        .ok();

    println!("\n=== stampede-kit - Strategy Comparison ===\n");
    println!("Simulating {} concurrent callers racing a cold cache key.\n", CONCURRENT_CALLERS);

    let config = StrategyConfig::builder()
        .with_lock_retry_interval(Duration::from_millis(5))
        .with_lock_max_retries(200)
        .build();

    run_burst(
        "basic",
        BasicCacheStrategy::new(InMemoryBackend::new(), config.clone()),
    )
    .await;

    run_burst(
        "jitter",
        JitterCacheStrategy::new(InMemoryBackend::new(), config.clone()),
    )
    .await;

    run_burst(
        "jitter-lock",
        JitterLockCacheStrategy::new(InMemoryBackend::new(), config.clone()),
    )
    .await;

    run_burst(
        "jitter-swr",
        JitterSwrCacheStrategy::new(InMemoryBackend::new(), config.clone()),
    )
    .await;

    run_burst(
        "full-protection",
        FullProtectionCacheStrategy::new(InMemoryBackend::new(), config),
    )
    .await;

    println!(
        "\n`basic` and `jitter` offer no single-flight protection and will show \
         multiple loader calls under this burst; the lock-backed strategies \
         collapse the burst to a single call.\n"
    );
}
