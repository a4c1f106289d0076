//! Distributed lock primitive: a fenced, single-holder lock with TTL, safe
//! release, and bounded wait.
//!
//! Held in the backend under `lock:<resource>`, value = a fresh random
//! token identifying the holder. Only the holder whose token matches the
//! stored value may delete the record — enforced by the backend's atomic
//! `compare_delete`. A holder whose TTL expires before it calls `unlock`
//! loses the lock silently; the later `unlock` is then a no-op.

use crate::backend::CacheBackend;
use crate::error::Result;
use log::{debug, warn};
use std::time::Duration;
use uuid::Uuid;

/// Owned proof of lock ownership, returned by [`DistributedLock::try_lock`]
/// and [`DistributedLock::wait_for_lock`].
///
/// This is the "pass a lock-handle value through the call chain"
/// realization of caller-scoped token storage: nothing is stashed in a
/// thread-local or a process-wide map, so two concurrently-running tasks on
/// the same process never see each other's tokens. `unlock` consumes the
/// handle so it cannot accidentally be used twice.
#[derive(Debug)]
pub struct LockHandle {
    resource: String,
    token: Vec<u8>,
}

impl LockHandle {
    /// The resource name this handle was acquired for.
    pub fn resource(&self) -> &str {
        &self.resource
    }
}

/// Distributed lock over a [`CacheBackend`].
#[derive(Clone)]
pub struct DistributedLock<B: CacheBackend> {
    backend: B,
}

impl<B: CacheBackend> DistributedLock<B> {
    pub fn new(backend: B) -> Self {
        DistributedLock { backend }
    }

    fn storage_key(resource: &str) -> String {
        format!("lock:{}", resource)
    }

    /// Atomically acquire `resource` iff it is currently unheld.
    ///
    /// Returns `Some(handle)` on acquisition, `None` if another holder
    /// currently owns it.
    pub async fn try_lock(&self, resource: &str, ttl: Duration) -> Result<Option<LockHandle>> {
        let token = Uuid::new_v4().as_bytes().to_vec();
        let key = Self::storage_key(resource);

        let acquired = self.backend.set_if_absent(&key, token.clone(), ttl).await?;
        if acquired {
            debug!("lock acquired: {} (ttl {:?})", resource, ttl);
            Ok(Some(LockHandle {
                resource: resource.to_string(),
                token,
            }))
        } else {
            debug!("lock contended: {}", resource);
            Ok(None)
        }
    }

    /// Release a previously acquired lock.
    ///
    /// Idempotent with respect to lost/expired locks: if the stored value no
    /// longer matches this handle's token (TTL expired and a new holder took
    /// over, or the resource was never held), this silently no-ops rather
    /// than deleting someone else's lock.
    pub async fn unlock(&self, handle: LockHandle) -> Result<()> {
        let key = Self::storage_key(&handle.resource);
        let released = self.backend.compare_delete(&key, &handle.token).await?;
        if released {
            debug!("lock released: {}", handle.resource);
        } else {
            warn!(
                "unlock no-op for {}: lock already expired or held by another holder",
                handle.resource
            );
        }
        Ok(())
    }

    /// Retry [`try_lock`](Self::try_lock) with sleeps of `retry_interval`
    /// until acquisition or until the wall clock exceeds `timeout`.
    ///
    /// Honors cooperative cancellation: this future contains only
    /// cancel-safe `await` points (`try_lock`'s backend call and
    /// `tokio::time::sleep`), so dropping it — e.g. via `select!` or the
    /// caller's own cancellation — cleanly abandons the wait without having
    /// acquired anything.
    pub async fn wait_for_lock(
        &self,
        resource: &str,
        ttl: Duration,
        timeout: Duration,
        retry_interval: Duration,
    ) -> Result<Option<LockHandle>> {
        let deadline = tokio::time::Instant::now() + timeout;

        loop {
            if let Some(handle) = self.try_lock(resource, ttl).await? {
                return Ok(Some(handle));
            }

            let now = tokio::time::Instant::now();
            if now >= deadline {
                debug!("wait_for_lock timed out: {}", resource);
                return Ok(None);
            }

            let sleep_for = retry_interval.min(deadline - now);
            tokio::time::sleep(sleep_for).await;
        }
    }
}
