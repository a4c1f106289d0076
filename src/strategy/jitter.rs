//! `jitter`: identical to `basic` except the write TTL gets a uniform
//! `[0, jitter_max]` random component, so keys populated in lockstep (e.g.
//! after a mass invalidation) de-synchronize their expirations instead of
//! expiring together.

use super::common::{read_bare, write_jittered_bare};
use super::CacheStrategy;
use crate::backend::CacheBackend;
use crate::config::StrategyConfig;
use crate::error::Result;
use crate::key as keyspace;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::future::Future;

#[derive(Clone)]
pub struct JitterCacheStrategy<B> {
    backend: B,
    config: StrategyConfig,
}

impl<B: CacheBackend> JitterCacheStrategy<B> {
    pub fn new(backend: B, config: StrategyConfig) -> Self {
        JitterCacheStrategy { backend, config }
    }
}

impl<B: CacheBackend> CacheStrategy<B> for JitterCacheStrategy<B> {
    fn strategy_name(&self) -> &'static str {
        "jitter"
    }

    async fn get_or_load<T, L, Fut>(&self, key: &str, loader: L) -> Result<Option<T>>
    where
        T: Serialize + DeserializeOwned + Clone + Send + Sync + 'static,
        L: FnOnce() -> Fut + Send + 'static,
        Fut: Future<Output = Result<Option<T>>> + Send + 'static,
    {
        let cache_key = keyspace::cache_key(self.strategy_name(), key);

        if let Some(value) = read_bare::<B, T>(&self.backend, &cache_key).await {
            log::debug!("jitter HIT {}", cache_key);
            return Ok(Some(value));
        }

        log::debug!("jitter MISS {}, invoking loader", cache_key);
        let Some(value) = loader().await? else {
            return Ok(None);
        };

        write_jittered_bare(&self.backend, &cache_key, &value, &self.config).await;
        Ok(Some(value))
    }

    async fn invalidate(&self, key: &str) -> Result<()> {
        let cache_key = keyspace::cache_key(self.strategy_name(), key);
        self.backend.delete(&cache_key).await
    }
}
