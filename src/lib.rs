//! # stampede-kit
//!
//! Composable cache-stampede mitigation strategies over a backend-agnostic
//! key-value store.
//!
//! ## Strategies
//!
//! | Strategy | Stampede protection |
//! |---|---|
//! | [`strategy::BasicCacheStrategy`] | none — every miss calls the loader |
//! | [`strategy::JitterCacheStrategy`] | de-synchronizes expirations, no single-flight |
//! | [`strategy::JitterLockCacheStrategy`] | single-flight via distributed lock |
//! | [`strategy::JitterSwrCacheStrategy`] | stale-while-revalidate + single-flight |
//! | [`strategy::FullProtectionCacheStrategy`] | SWR + locked revalidation on both paths |
//!
//! ## Features
//!
//! - **Backend agnostic:** in-memory (default), Redis, Memcached, or a custom
//!   [`backend::CacheBackend`] implementation.
//! - **Fail-open:** a down backend or a corrupt cache entry degrades to a
//!   cache miss and a direct loader call, never a hard error to the caller.
//! - **Single process-local dependency:** no external scheduler; background
//!   revalidation runs on a bounded `tokio` task pool.
//!
//! ## Quick Start
//!
//! ```ignore
//! use stampede_kit::{CacheService, backend::InMemoryBackend, config::StrategyConfig};
//! use stampede_kit::strategy::JitterLockCacheStrategy;
//!
//! # async fn run() -> stampede_kit::Result<()> {
//! let strategy = JitterLockCacheStrategy::new(InMemoryBackend::new(), StrategyConfig::default());
//! let cache = CacheService::new(strategy);
//!
//! // CacheService is Clone — share it across tasks/handlers cheaply.
//! let cache_clone = cache.clone();
//!
//! let value: Option<String> = cache
//!     .get_or_load("user:1", || async {
//!         Ok(Some(fetch_user_from_origin("1").await?))
//!     })
//!     .await?;
//! # Ok(())
//! # }
//! # async fn fetch_user_from_origin(_id: &str) -> stampede_kit::Result<String> { unimplemented!() }
//! ```

#[macro_use]
extern crate log;

pub mod backend;
pub mod config;
pub mod envelope;
pub mod error;
pub mod key;
pub mod lock;
pub mod observability;
pub mod serialization;
pub mod service;
pub mod strategy;

// Re-exports for convenience
pub use backend::CacheBackend;
pub use config::StrategyConfig;
pub use envelope::{CachedValue, FreshnessState};
pub use error::{Error, Result};
pub use lock::{DistributedLock, LockHandle};
pub use service::CacheService;
pub use strategy::CacheStrategy;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
