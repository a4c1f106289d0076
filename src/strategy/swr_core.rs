//! Shared state machine behind `jitter-swr` and `full-protection`: reading
//! an envelope's freshness, and scheduling the single background
//! revalidation a stale read triggers, reused unchanged by
//! `full-protection`'s stale branch.

use super::common::{read_envelope, write_envelope};
use crate::backend::CacheBackend;
use crate::config::StrategyConfig;
use crate::key;
use crate::lock::DistributedLock;
use dashmap::DashSet;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::future::Future;
use std::sync::Arc;
use tokio::sync::Semaphore;

/// Core shared by the two SWR-family strategies: backend/config/lock
/// access, the process-local refresh-in-flight set, and a bounded
/// dispatcher for background revalidation (a bounded worker pool is
/// preferred over unbounded task creation).
pub(super) struct SwrCore<B: CacheBackend> {
    pub(super) backend: B,
    pub(super) config: StrategyConfig,
    pub(super) lock: DistributedLock<B>,
    refreshing: Arc<DashSet<String>>,
    dispatch_permits: Arc<Semaphore>,
}

/// Default cap on concurrently in-flight background revalidation tasks per
/// strategy instance.
const DEFAULT_MAX_CONCURRENT_REVALIDATIONS: usize = 32;

impl<B: CacheBackend + 'static> SwrCore<B> {
    pub(super) fn new(backend: B, config: StrategyConfig) -> Self {
        Self::with_max_concurrent_revalidations(
            backend,
            config,
            DEFAULT_MAX_CONCURRENT_REVALIDATIONS,
        )
    }

    pub(super) fn with_max_concurrent_revalidations(
        backend: B,
        config: StrategyConfig,
        max_concurrent_revalidations: usize,
    ) -> Self {
        let lock = DistributedLock::new(backend.clone());
        SwrCore {
            backend,
            config,
            lock,
            refreshing: Arc::new(DashSet::new()),
            dispatch_permits: Arc::new(Semaphore::new(max_concurrent_revalidations.max(1))),
        }
    }

    pub(super) async fn read<T: DeserializeOwned>(
        &self,
        cache_key: &str,
    ) -> Option<crate::envelope::CachedValue<T>> {
        read_envelope(&self.backend, cache_key).await
    }

    /// Drop any refresh-in-flight marker for `cache_key` (part of
    /// `invalidate`'s contract: clear the marker so a later stale read can
    /// schedule a fresh revalidation rather than believing one is already
    /// running).
    pub(super) fn clear_in_flight_marker(&self, cache_key: &str) {
        self.refreshing.remove(cache_key);
    }

    /// Schedule exactly one background revalidation for `cache_key`, unless
    /// one is already in flight for this process (atomic test-and-add via
    /// `DashSet::insert`, which reports whether the value was newly
    /// inserted).
    pub(super) fn schedule_background_refresh<T, L, Fut>(
        &self,
        strategy_name: &'static str,
        user_key: &str,
        loader: L,
    ) where
        T: Serialize + Send + 'static,
        L: FnOnce() -> Fut + Send + 'static,
        Fut: Future<Output = crate::error::Result<Option<T>>> + Send + 'static,
    {
        let cache_key = key::cache_key(strategy_name, user_key);
        if !self.refreshing.insert(cache_key.clone()) {
            log::debug!("background refresh already in flight for {}", cache_key);
            return;
        }

        let resource = key::lock_resource(strategy_name, user_key);
        let backend = self.backend.clone();
        let lock = self.lock.clone();
        let config = self.config.clone();
        let refreshing = self.refreshing.clone();
        let permits = self.dispatch_permits.clone();
        let cache_key_for_cleanup = cache_key.clone();

        tokio::spawn(async move {
            let _permit = match permits.acquire_owned().await {
                Ok(permit) => permit,
                Err(_) => {
                    // Semaphore closed (dispatcher shutting down): drop the
                    // in-flight marker and bail, a later caller will retry.
                    refreshing.remove(&cache_key_for_cleanup);
                    return;
                }
            };

            match lock.try_lock(&resource, config.lock_timeout).await {
                Ok(Some(handle)) => {
                    match loader().await {
                        Ok(Some(value)) => {
                            write_envelope(&backend, &cache_key, value, &config).await;
                        }
                        Ok(None) => {
                            log::debug!(
                                "background loader returned not-found for {}, leaving entry as-is",
                                cache_key
                            );
                        }
                        Err(e) => {
                            log::warn!("background loader failed for {}: {}", cache_key, e);
                        }
                    }
                    if let Err(e) = lock.unlock(handle).await {
                        log::warn!("background refresh unlock failed for {}: {}", cache_key, e);
                    }
                }
                Ok(None) => {
                    log::debug!(
                        "background refresh lock contended for {}, another node will refresh",
                        resource
                    );
                }
                Err(e) => {
                    log::warn!("background refresh lock error for {}: {}", resource, e);
                }
            }

            refreshing.remove(&cache_key_for_cleanup);
        });
    }
}

impl<B: CacheBackend> Clone for SwrCore<B> {
    fn clone(&self) -> Self {
        SwrCore {
            backend: self.backend.clone(),
            config: self.config.clone(),
            lock: self.lock.clone(),
            refreshing: self.refreshing.clone(),
            dispatch_permits: self.dispatch_permits.clone(),
        }
    }
}
