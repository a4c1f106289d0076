//! `basic`: no stampede protection. A burst of N concurrent misses yields
//! up to N loader calls.

use super::common::{read_bare, write_bare};
use super::CacheStrategy;
use crate::backend::CacheBackend;
use crate::config::StrategyConfig;
use crate::error::Result;
use crate::key as keyspace;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::future::Future;

/// Bare read-through cache: `product:basic:<key>` holds the payload
/// directly, relying on the backend's own TTL for expiration.
#[derive(Clone)]
pub struct BasicCacheStrategy<B> {
    backend: B,
    config: StrategyConfig,
}

impl<B: CacheBackend> BasicCacheStrategy<B> {
    pub fn new(backend: B, config: StrategyConfig) -> Self {
        BasicCacheStrategy { backend, config }
    }
}

impl<B: CacheBackend> CacheStrategy<B> for BasicCacheStrategy<B> {
    fn strategy_name(&self) -> &'static str {
        "basic"
    }

    async fn get_or_load<T, L, Fut>(&self, key: &str, loader: L) -> Result<Option<T>>
    where
        T: Serialize + DeserializeOwned + Clone + Send + Sync + 'static,
        L: FnOnce() -> Fut + Send + 'static,
        Fut: Future<Output = Result<Option<T>>> + Send + 'static,
    {
        let cache_key = keyspace::cache_key(self.strategy_name(), key);

        if let Some(value) = read_bare::<B, T>(&self.backend, &cache_key).await {
            log::debug!("basic HIT {}", cache_key);
            return Ok(Some(value));
        }

        log::debug!("basic MISS {}, invoking loader", cache_key);
        let Some(value) = loader().await? else {
            log::debug!("basic loader not-found for {}, nothing written", cache_key);
            return Ok(None);
        };

        write_bare(&self.backend, &cache_key, &value, self.config.base_ttl).await;
        Ok(Some(value))
    }

    async fn invalidate(&self, key: &str) -> Result<()> {
        let cache_key = keyspace::cache_key(self.strategy_name(), key);
        self.backend.delete(&cache_key).await
    }
}
