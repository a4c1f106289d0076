//! `jitter-lock`: `jitter` plus single-flight via a distributed lock, so a
//! burst of concurrent misses produces exactly one loader call instead of N.

use super::common::{read_bare, write_jittered_bare};
use super::CacheStrategy;
use crate::backend::CacheBackend;
use crate::config::StrategyConfig;
use crate::error::Result;
use crate::key as keyspace;
use crate::lock::DistributedLock;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::future::Future;

#[derive(Clone)]
pub struct JitterLockCacheStrategy<B: CacheBackend> {
    backend: B,
    config: StrategyConfig,
    lock: DistributedLock<B>,
}

impl<B: CacheBackend> JitterLockCacheStrategy<B> {
    pub fn new(backend: B, config: StrategyConfig) -> Self {
        let lock = DistributedLock::new(backend.clone());
        JitterLockCacheStrategy {
            backend,
            config,
            lock,
        }
    }
}

impl<B: CacheBackend> CacheStrategy<B> for JitterLockCacheStrategy<B> {
    fn strategy_name(&self) -> &'static str {
        "jitter-lock"
    }

    async fn get_or_load<T, L, Fut>(&self, key: &str, loader: L) -> Result<Option<T>>
    where
        T: Serialize + DeserializeOwned + Clone + Send + Sync + 'static,
        L: FnOnce() -> Fut + Send + 'static,
        Fut: Future<Output = Result<Option<T>>> + Send + 'static,
    {
        let cache_key = keyspace::cache_key(self.strategy_name(), key);

        if let Some(value) = read_bare::<B, T>(&self.backend, &cache_key).await {
            log::debug!("jitter-lock HIT {}", cache_key);
            return Ok(Some(value));
        }

        let resource = keyspace::lock_resource(self.strategy_name(), key);
        let wait_timeout = self.config.lock_wait_budget();

        let lock_outcome = self
            .lock
            .wait_for_lock(
                &resource,
                self.config.lock_timeout,
                wait_timeout,
                self.config.lock_retry_interval,
            )
            .await
            .unwrap_or_else(|e| {
                log::warn!(
                    "jitter-lock lock acquisition errored for {}, treating as contended: {}",
                    resource,
                    e
                );
                None
            });

        match lock_outcome {
            Some(handle) => {
                // Double-check: another holder may have populated the cache
                // between our first miss and acquiring the lock.
                if let Some(value) = read_bare::<B, T>(&self.backend, &cache_key).await {
                    log::debug!("jitter-lock HIT after lock acquisition {}", cache_key);
                    if let Err(e) = self.lock.unlock(handle).await {
                        log::warn!("jitter-lock unlock failed for {}: {}", resource, e);
                    }
                    return Ok(Some(value));
                }

                log::debug!("jitter-lock acquired, invoking loader for {}", cache_key);
                let loaded = loader().await;
                let result = match loaded {
                    Ok(Some(value)) => {
                        write_jittered_bare(&self.backend, &cache_key, &value, &self.config).await;
                        Ok(Some(value))
                    }
                    Ok(None) => Ok(None),
                    Err(e) => Err(e),
                };
                if let Err(e) = self.lock.unlock(handle).await {
                    log::warn!("jitter-lock unlock failed for {}: {}", resource, e);
                }
                result
            }
            None => {
                // Wait budget exhausted: degrade to a direct, unprotected
                // loader call rather than returning an error.
                log::warn!(
                    "jitter-lock wait_for_lock timed out for {}, checking cache once more",
                    resource
                );
                if let Some(value) = read_bare::<B, T>(&self.backend, &cache_key).await {
                    return Ok(Some(value));
                }
                log::warn!(
                    "jitter-lock falling back to unprotected loader call for {}",
                    cache_key
                );
                match loader().await? {
                    Some(value) => {
                        write_jittered_bare(&self.backend, &cache_key, &value, &self.config).await;
                        Ok(Some(value))
                    }
                    None => Ok(None),
                }
            }
        }
    }

    async fn invalidate(&self, key: &str) -> Result<()> {
        let cache_key = keyspace::cache_key(self.strategy_name(), key);
        self.backend.delete(&cache_key).await
    }
}
