//! `jitter-swr`: stale-while-revalidate. A `Stale` read returns the old
//! value immediately and schedules exactly one background revalidation; an
//! `Expired`/absent read single-flights a synchronous reload.

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
pub struct JitterSwrCacheStrategy<B: CacheBackend + 'static> {
    core: SwrCore<B>,
}

impl<B: CacheBackend + 'static> JitterSwrCacheStrategy<B> {
    pub fn new(backend: B, config: StrategyConfig) -> Self {
        JitterSwrCacheStrategy {
            core: SwrCore::new(backend, config),
        }
    }
}

impl<B: CacheBackend + 'static> CacheStrategy<B> for JitterSwrCacheStrategy<B> {
    fn strategy_name(&self) -> &'static str {
        "jitter-swr"
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
                    log::debug!("jitter-swr FRESH {}", cache_key);
                    return Ok(Some(env.into_value()));
                }
                FreshnessState::Stale => {
                    log::debug!("jitter-swr STALE {}, scheduling background refresh", cache_key);
                    let value = env.into_value();
                    self.core
                        .schedule_background_refresh(self.strategy_name(), key, loader);
                    return Ok(Some(value));
                }
                FreshnessState::Expired => {
                    log::debug!("jitter-swr EXPIRED {}, single-flighting reload", cache_key);
                }
            }
        } else {
            log::debug!("jitter-swr MISS {}, single-flighting reload", cache_key);
        }

        self.single_flight_reload(&cache_key, key, loader).await
    }

    async fn invalidate(&self, key: &str) -> Result<()> {
        let cache_key = keyspace::cache_key(self.strategy_name(), key);
        self.core.clear_in_flight_marker(&cache_key);
        self.core.backend.delete(&cache_key).await
    }
}

impl<B: CacheBackend + 'static> JitterSwrCacheStrategy<B> {
    /// Synchronous single-flight reload for an expired or absent entry: one
    /// caller wins the lock and loads; the rest poll the cache for the
    /// winner's write until the retry budget is exhausted, at which point
    /// they degrade to an unprotected direct loader call, mirroring
    /// `jitter-lock`'s fallback.
    async fn single_flight_reload<T, L, Fut>(
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

        let lock_outcome = self
            .core
            .lock
            .try_lock(&resource, config.lock_timeout)
            .await
            .unwrap_or_else(|e| {
                log::warn!(
                    "jitter-swr lock acquisition errored for {}, treating as contended: {}",
                    resource,
                    e
                );
                None
            });

        match lock_outcome {
            Some(handle) => {
                if let Some(env) = self.core.read::<T>(cache_key).await {
                    if !env.is_expired() {
                        if let Err(e) = self.core.lock.unlock(handle).await {
                            log::warn!("jitter-swr unlock failed for {}: {}", resource, e);
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
                    log::warn!("jitter-swr unlock failed for {}: {}", resource, e);
                }
                result
            }
            None => {
                for _ in 0..config.lock_max_retries {
                    tokio::time::sleep(config.lock_retry_interval).await;
                    if let Some(env) = self.core.read::<T>(cache_key).await {
                        if !env.is_expired() {
                            return Ok(Some(env.into_value()));
                        }
                    }
                }
                log::warn!(
                    "jitter-swr lock wait exhausted for {}, falling back to unprotected loader",
                    resource
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

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::InMemoryBackend;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use std::time::Duration;

    fn strategy() -> JitterSwrCacheStrategy<InMemoryBackend> {
        JitterSwrCacheStrategy::new(
            InMemoryBackend::new(),
            StrategyConfig::builder()
                .with_base_ttl(Duration::from_millis(40))
                .with_soft_ttl_ratio(0.25)
                .with_jitter_max(Duration::ZERO)
                .with_lock_retry_interval(Duration::from_millis(5))
                .with_lock_max_retries(50)
                .build(),
        )
    }

    #[tokio::test]
    async fn test_fresh_read_returns_without_loader() {
        let s = strategy();
        s.get_or_load("1", || async { Ok(Some("V".to_string())) })
            .await
            .unwrap();

        let result = s
            .get_or_load("1", || async { panic!("must not run on fresh read") })
            .await
            .unwrap();
        assert_eq!(result, Some("V".to_string()));
    }

    #[tokio::test]
    async fn test_stale_read_returns_old_value_and_schedules_refresh() {
        let s = strategy();
        s.get_or_load("1", || async { Ok(Some("OLD".to_string())) })
            .await
            .unwrap();

        // soft_ttl = 10ms, hard_ttl = 40ms: sleep into the stale window.
        tokio::time::sleep(Duration::from_millis(15)).await;

        let calls = Arc::new(AtomicUsize::new(0));
        let calls2 = calls.clone();
        let result = s
            .get_or_load("1", move || {
                calls2.fetch_add(1, Ordering::SeqCst);
                async { Ok(Some("NEW".to_string())) }
            })
            .await
            .unwrap();

        assert_eq!(result, Some("OLD".to_string()), "stale read returns old value");

        // Give the background task a chance to run and write NEW.
        tokio::time::sleep(Duration::from_millis(50)).await;
        assert_eq!(calls.load(Ordering::SeqCst), 1);

        let refreshed = s
            .get_or_load("1", || async { panic!("must not run, refreshed value is fresh") })
            .await
            .unwrap();
        assert_eq!(refreshed, Some("NEW".to_string()));
    }

    #[tokio::test]
    async fn test_expired_single_flight_invokes_loader_once() {
        let s = Arc::new(strategy());
        let calls = Arc::new(AtomicUsize::new(0));

        let mut handles = Vec::new();
        for _ in 0..8 {
            let s = s.clone();
            let calls = calls.clone();
            handles.push(tokio::spawn(async move {
                s.get_or_load("1", move || {
                    calls.fetch_add(1, Ordering::SeqCst);
                    async {
                        tokio::time::sleep(Duration::from_millis(20)).await;
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

    #[tokio::test]
    async fn test_only_one_background_refresh_in_flight() {
        let s = strategy();
        s.get_or_load("1", || async { Ok(Some("OLD".to_string())) })
            .await
            .unwrap();
        tokio::time::sleep(Duration::from_millis(15)).await;

        let calls = Arc::new(AtomicUsize::new(0));
        for _ in 0..5 {
            let calls2 = calls.clone();
            s.get_or_load("1", move || {
                calls2.fetch_add(1, Ordering::SeqCst);
                async {
                    tokio::time::sleep(Duration::from_millis(20)).await;
                    Ok(Some("NEW".to_string()))
                }
            })
            .await
            .unwrap();
        }

        tokio::time::sleep(Duration::from_millis(60)).await;
        assert_eq!(calls.load(Ordering::SeqCst), 1, "only one refresh should run");
    }
}
