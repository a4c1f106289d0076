//! Basic usage example of the cache-stampede engine.

use serde::{Deserialize, Serialize};
use stampede_kit::backend::InMemoryBackend;
use stampede_kit::config::StrategyConfig;
use stampede_kit::strategy::JitterLockCacheStrategy;
use stampede_kit::{CacheService, Result};

/// Example payload: an employment record loaded from a slow origin.
#[derive(Clone, Serialize, Deserialize, Debug)]
struct Employment {
    id: String,
    employer_name: String,
    salary: f64,
}

/// Simulates a slow database lookup.
async fn fetch_employment(id: &str) -> Result<Option<Employment>> {
    println!("  [DB] Fetching employment: {}", id);
    tokio::time::sleep(std::time::Duration::from_millis(50)).await;

    let employment = match id {
        "emp_001" => Some(Employment {
            id: id.to_string(),
            employer_name: "Acme Corp".to_string(),
            salary: 75000.0,
        }),
        "emp_002" => Some(Employment {
            id: id.to_string(),
            employer_name: "Tech Inc".to_string(),
            salary: 95000.0,
        }),
        _ => None,
    };

    Ok(employment)
}

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::Builder::from_default_env()
        .filter_level(log::LevelFilter::Debug)
        .try_init()
        .ok();

    println!("\n=== stampede-kit - Basic Example ===\n");

    println!("1. Initializing in-memory backend + jitter-lock strategy...");
    let backend = InMemoryBackend::new();
    let strategy = JitterLockCacheStrategy::new(backend, StrategyConfig::default());
    let cache = CacheService::new(strategy);
    println!("   done\n");

    println!("2. First request for emp_001 (cache miss):");
    let employment = cache
        .get_or_load("emp_001", || async { fetch_employment("emp_001").await })
        .await?;
    println!("   -> {:?}\n", employment);

    println!("3. Second request for emp_001 (cache hit, no DB call):");
    let employment = cache
        .get_or_load("emp_001", || async { fetch_employment("emp_001").await })
        .await?;
    println!("   -> {:?}\n", employment);

    println!("4. Request for a missing id (loader returns not-found):");
    let missing = cache
        .get_or_load("emp_999", || async { fetch_employment("emp_999").await })
        .await?;
    println!("   -> {:?}\n", missing);

    println!("5. Invalidating emp_001, then re-fetching (cache miss again):");
    cache.invalidate("emp_001").await?;
    let employment = cache
        .get_or_load("emp_001", || async { fetch_employment("emp_001").await })
        .await?;
    println!("   -> {:?}\n", employment);

    println!("=== Done ===");
    Ok(())
}
