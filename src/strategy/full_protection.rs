//! `full-protection`: stale-while-revalidate with a distributed lock guarding
//! *both* the background refresh path (shared with `jitter-swr`) and the
//! foreground expired/absent path, which waits on the lock instead of
//! racing a bounded number of unlocked retries.

use super::common::write_envelope;
use super::swr_core::SwrCore;
use super::CacheStrategy;
use crate::backend::CacheBackend;
use crate::config::StrategyConfig;
use crate::envelope::FreshnessState;
use crate::error::Result;
use crate::key as keyspace;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::future::Future;

#[derive(Clone)]
pub struct FullProtectionCacheStrategy<B: CacheBackend + 'static> {
    core: SwrCore<B>,
}

impl<B: CacheBackend + 'static> FullProtectionCacheStrategy<B> {
    pub fn new(backend: B, config: StrategyConfig) -> Self {
        FullProtectionCacheStrategy {
            core: SwrCore::new(backend, config),
        }
    }
}

impl<B: CacheBackend + 'static> CacheStrategy<B> for FullProtectionCacheStrategy<B> {
    fn strategy_name(&self) -> &'static str {
        "full-protection"
    }

    async fn get_or_load<T, L, Fut>(&self, key: &str, loader: L) -> Result<Option<T>>
    where
        T: Serialize + DeserializeOwned + Clone + Send + Sync + 'static,
        L: FnOnce() -> Fut + Send + 'static,
        Fut: Future<Output = Result<Option<T>>> + Send + 'static,
    {
        let cache_key = keyspace::cache_key(self.strategy_name(), key);

        if let Some(env) = self.core.read::<T>(&cache_key).await {
            match env.state() {
                FreshnessState::Fresh => {
                    log::debug!("full-protection FRESH {}", cache_key);
                    return Ok(Some(env.into_value()));
                }
                FreshnessState::Stale => {
                    log::debug!(
                        "full-protection STALE {}, scheduling locked background refresh",
                        cache_key
                    );
                    let value = env.into_value();
                    self.core
                        .schedule_background_refresh(self.strategy_name(), key, loader);
                    return Ok(Some(value));
                }
                FreshnessState::Expired => {
                    log::debug!("full-protection EXPIRED {}, waiting for lock", cache_key);
                }
            }
        } else {
            log::debug!("full-protection MISS {}, waiting for lock", cache_key);
        }

        self.locked_reload(&cache_key, key, loader).await
    }

    async fn invalidate(&self, key: &str) -> Result<()> {
        let cache_key = keyspace::cache_key(self.strategy_name(), key);
        self.core.clear_in_flight_marker(&cache_key);
        self.core.backend.delete(&cache_key).await
    }
}

impl<B: CacheBackend + 'static> FullProtectionCacheStrategy<B> {
    /// Every caller that observes an expired or absent entry waits on the
    /// same lock (rather than `jitter-swr`'s bounded unlocked poll loop),
    /// giving `full-protection` its stronger guarantee that at most one
    /// loader call happens across the whole wait window, not just per
    /// "round" of polling.
    async fn locked_reload<T, L, Fut>(
        &self,
        cache_key: &str,
        user_key: &str,
        loader: L,
    ) -> Result<Option<T>>
    where
        T: Serialize + DeserializeOwned + Clone + Send + Sync + 'static,
        L: FnOnce() -> Fut + Send + 'static,
        Fut: Future<Output = Result<Option<T>>> + Send + 'static,
    {
        let resource = keyspace::lock_resource(self.strategy_name(), user_key);
        let config = &self.core.config;
        let wait_timeout = config.lock_wait_budget();

        let lock_outcome = self
            .core
            .lock
            .wait_for_lock(&resource, config.lock_timeout, wait_timeout, config.lock_retry_interval)
            .await
            .unwrap_or_else(|e| {
                log::warn!(
                    "full-protection lock acquisition errored for {}, treating as contended: {}",
                    resource,
                    e
                );
                None
            });

        match lock_outcome {
            Some(handle) => {
                if let Some(env) = self.core.read::<T>(cache_key).await {
                    if !env.is_expired() {
                        log::debug!(
                            "full-protection cache populated by another holder for {}",
                            cache_key
                        );
                        if let Err(e) = self.core.lock.unlock(handle).await {
                            log::warn!("full-protection unlock failed for {}: {}", resource, e);
                        }
                        return Ok(Some(env.into_value()));
                    }
                }

                let result = match loader().await {
                    Ok(Some(value)) => {
                        write_envelope(&self.core.backend, cache_key, value.clone(), config).await;
                        Ok(Some(value))
                    }
                    Ok(None) => Ok(None),
                    Err(e) => Err(e),
                };
                if let Err(e) = self.core.lock.unlock(handle).await {
                    log::warn!("full-protection unlock failed for {}: {}", resource, e);
                }
                result
            }
            None => {
                log::warn!(
                    "full-protection wait_for_lock timed out for {}, checking cache once more",
                    resource
                );
                if let Some(env) = self.core.read::<T>(cache_key).await {
                    if !env.is_expired() {
                        return Ok(Some(env.into_value()));
                    }
                }
                log::warn!(
                    "full-protection falling back to unprotected loader for {}",
                    cache_key
                );
                match loader().await? {
                    Some(value) => {
                        write_envelope(&self.core.backend, cache_key, value.clone(), config).await;
                        Ok(Some(value))
                    }
                    None => Ok(None),
                }
            }
        }
    }
}
