//! High-level entry point wrapping a chosen strategy for cheap cross-task
//! sharing.
//!
//! `CacheService` holds its strategy behind an `Arc`, so cloning it and
//! handing a clone to each spawned task (or each request handler) is just an
//! atomic refcount bump, never a deep copy of the backend or lock state.

use crate::backend::CacheBackend;
use crate::error::Result;
use crate::strategy::CacheStrategy;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::future::Future;
use std::sync::Arc;

/// Cheaply cloneable wrapper around a single [`CacheStrategy`] instance.
///
/// # Example
///
/// ```ignore
/// use stampede_kit::{CacheService, backend::InMemoryBackend, config::StrategyConfig};
/// use stampede_kit::strategy::JitterLockCacheStrategy;
///
/// let strategy = JitterLockCacheStrategy::new(InMemoryBackend::new(), StrategyConfig::default());
/// let cache = CacheService::new(strategy);
///
/// let cache_clone = cache.clone(); // cheap: Arc increment
/// let value = cache.get_or_load("user:1", || async {
///     Ok(Some(load_user_from_origin("1").await?))
/// }).await?;
/// ```
#[derive(Clone)]
pub struct CacheService<S> {
    strategy: Arc<S>,
}

impl<S> CacheService<S> {
    /// Wrap `strategy` for cheap sharing.
    pub fn new(strategy: S) -> Self {
        CacheService {
            strategy: Arc::new(strategy),
        }
    }

    /// Access the wrapped strategy directly, e.g. to call a strategy-specific
    /// extension method not part of the shared [`CacheStrategy`] contract.
    pub fn strategy(&self) -> &S {
        &self.strategy
    }
}

impl<B, S> CacheService<S>
where
    B: CacheBackend,
    S: CacheStrategy<B>,
{
    /// Stable identifier of the wrapped strategy, forwarded for logging/metrics.
    pub fn strategy_name(&self) -> &'static str {
        self.strategy.strategy_name()
    }

    /// Forward to the wrapped strategy's `get_or_load`.
    pub async fn get_or_load<T, L, Fut>(&self, key: &str, loader: L) -> Result<Option<T>>
    where
        T: Serialize + DeserializeOwned + Clone + Send + Sync + 'static,
        L: FnOnce() -> Fut + Send + 'static,
        Fut: Future<Output = Result<Option<T>>> + Send + 'static,
    {
        self.strategy.get_or_load(key, loader).await
    }

    /// Forward to the wrapped strategy's `invalidate`.
    pub async fn invalidate(&self, key: &str) -> Result<()> {
        self.strategy.invalidate(key).await
    }
}
