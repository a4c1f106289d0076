//! The five cache-stampede mitigation strategies and their shared contract.
//!
//! Every strategy exposes the same three operations (`get_or_load`,
//! `invalidate`, `strategy_name`) and owns a disjoint key namespace (see
//! [`crate::key`]). They differ only in how aggressively they protect the
//! origin loader from concurrent callers on a miss:
//!
//! | Strategy | Stampede protection |
//! |---|---|
//! | [`basic::BasicCacheStrategy`] | none — every miss calls the loader |
//! | [`jitter::JitterCacheStrategy`] | de-synchronizes expirations, no single-flight |
//! | [`jitter_lock::JitterLockCacheStrategy`] | single-flight via distributed lock |
//! | [`jitter_swr::JitterSwrCacheStrategy`] | stale-while-revalidate + single-flight |
//! | [`full_protection::FullProtectionCacheStrategy`] | SWR + locked revalidation on both paths |

mod common;
mod swr_core;

pub mod basic;
pub mod full_protection;
pub mod jitter;
pub mod jitter_lock;
pub mod jitter_swr;

pub use basic::BasicCacheStrategy;
pub use full_protection::FullProtectionCacheStrategy;
pub use jitter::JitterCacheStrategy;
pub use jitter_lock::JitterLockCacheStrategy;
pub use jitter_swr::JitterSwrCacheStrategy;

use crate::error::Result;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::future::Future;

/// Shared contract implemented by every cache-stampede strategy.
///
/// `loader` is a zero-argument function producing `T | not-found`; it may
/// block and must be safe to invoke from a background execution context
/// (strategies that revalidate in the background move it into a spawned
/// task), so implementations require `Send + 'static` bounds throughout
/// even where a given strategy never spawns.
#[allow(async_fn_in_trait)]
pub trait CacheStrategy<B: crate::backend::CacheBackend> {
    /// Stable identifier used in the cache key and in metrics tags.
    fn strategy_name(&self) -> &'static str;

    /// Return a value satisfying this strategy's stampede-mitigation
    /// guarantees, or `Ok(None)` iff a fresh `loader()` call returns
    /// not-found and no usable cached value exists.
    ///
    /// Errors from the remote store are logged and treated as a cache miss;
    /// only the loader's own failure propagates to the caller.
    async fn get_or_load<T, L, Fut>(&self, key: &str, loader: L) -> Result<Option<T>>
    where
        T: Serialize + DeserializeOwned + Clone + Send + Sync + 'static,
        L: FnOnce() -> Fut + Send + 'static,
        Fut: Future<Output = Result<Option<T>>> + Send + 'static;

    /// Delete the cache entry for this strategy's namespace and clear any
    /// refresh-in-flight marker. Idempotent.
    async fn invalidate(&self, key: &str) -> Result<()>;
}
