//! Read/write helpers shared by every strategy: backend errors and
//! deserialization failures are swallowed here, at the lowest level, so
//! every strategy gets the engine's fail-open policy for free.

use crate::backend::CacheBackend;
use crate::config::StrategyConfig;
use crate::envelope::CachedValue;
use crate::serialization;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::time::Duration;

/// Read a bare payload (non-SWR strategies). Backend errors and decode
/// failures both collapse to `None` (miss), never propagate.
pub(super) async fn read_bare<B: CacheBackend, T: DeserializeOwned>(
    backend: &B,
    cache_key: &str,
) -> Option<T> {
    match backend.get(cache_key).await {
        Ok(Some(bytes)) => match serialization::decode::<T>(&bytes) {
            Ok(value) => Some(value),
            Err(e) => {
                log::warn!("decode failed for {}, treating as miss: {}", cache_key, e);
                None
            }
        },
        Ok(None) => None,
        Err(e) => {
            log::warn!("backend get failed for {}, treating as miss: {}", cache_key, e);
            None
        }
    }
}

/// Write a bare payload with a fixed TTL. Write failures are logged and
/// dropped silently: the next caller's miss will simply retry the write.
pub(super) async fn write_bare<B: CacheBackend, T: Serialize>(
    backend: &B,
    cache_key: &str,
    value: &T,
    ttl: Duration,
) {
    match serialization::encode(value) {
        Ok(bytes) => {
            if let Err(e) = backend.set(cache_key, bytes, Some(ttl)).await {
                log::warn!("cache write dropped for {}: {}", cache_key, e);
            }
        }
        Err(e) => log::error!("serialization failed for {}, not cached: {}", cache_key, e),
    }
}

/// Read a [`CachedValue`] envelope (SWR-aware strategies).
pub(super) async fn read_envelope<B: CacheBackend, T: DeserializeOwned>(
    backend: &B,
    cache_key: &str,
) -> Option<CachedValue<T>> {
    match backend.get(cache_key).await {
        Ok(Some(bytes)) => match serialization::decode::<CachedValue<T>>(&bytes) {
            Ok(env) => Some(env),
            Err(e) => {
                log::warn!("envelope decode failed for {}, treating as miss: {}", cache_key, e);
                None
            }
        },
        Ok(None) => None,
        Err(e) => {
            log::warn!("backend get failed for {}, treating as miss: {}", cache_key, e);
            None
        }
    }
}

/// Wrap `value` in a freshly jittered [`CachedValue`] envelope and write it
/// with the envelope's own `store_ttl` (so it never outlives `hard_expire_at`).
pub(super) async fn write_envelope<B: CacheBackend, T: Serialize>(
    backend: &B,
    cache_key: &str,
    value: T,
    config: &StrategyConfig,
) {
    let jitter = jitter_duration(config);
    let env = CachedValue::new(value, config.base_ttl, config.soft_ttl_ratio, jitter);
    let ttl = env.store_ttl();

    match serialization::encode(&env) {
        Ok(bytes) => {
            if let Err(e) = backend.set(cache_key, bytes, Some(ttl)).await {
                log::warn!("cache write dropped for {}: {}", cache_key, e);
            }
        }
        Err(e) => log::error!("serialization failed for {}, not cached: {}", cache_key, e),
    }
}

/// Uniform `[0, jitter_max]` random additive TTL component.
pub(super) fn jitter_duration(config: &StrategyConfig) -> Duration {
    let max_secs = config.jitter_max.as_secs();
    if max_secs == 0 {
        return Duration::ZERO;
    }
    use rand::Rng;
    let secs = rand::rng().random_range(0..=max_secs);
    Duration::from_secs(secs)
}

/// Write a bare payload with `base_ttl + U{0, jitter_max}`.
pub(super) async fn write_jittered_bare<B: CacheBackend, T: Serialize>(
    backend: &B,
    cache_key: &str,
    value: &T,
    config: &StrategyConfig,
) {
    let ttl = config.base_ttl + jitter_duration(config);
    write_bare(backend, cache_key, value, ttl).await;
}
