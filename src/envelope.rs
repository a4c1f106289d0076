//! The `CachedValue<T>` envelope: two-tier (soft/hard) expiration metadata
//! wrapping a cached payload, used by the SWR-aware strategies
//! (`jitter-swr`, `full-protection`).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Derived state of a [`CachedValue`] at a given instant.
///
/// Exactly one of these holds at any `now`, and an envelope passes through
/// them in this order as time advances: `Fresh` -> `Stale` -> `Expired`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FreshnessState {
    /// `now < soft_expire_at`. Safe to return with no side effects.
    Fresh,
    /// `soft_expire_at <= now < hard_expire_at`. Safe to return, but a
    /// background revalidation should be scheduled.
    Stale,
    /// `hard_expire_at <= now`. Must not be returned; treat as a miss.
    Expired,
}

/// Envelope stored by SWR-aware strategies.
///
/// Invariant: `soft_expire_at <= hard_expire_at`, enforced at construction.
/// The envelope is immutable once built; freshness is a pure function of
/// wall-clock time, evaluated at read time and never persisted.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct CachedValue<T> {
    value: T,
    soft_expire_at: DateTime<Utc>,
    hard_expire_at: DateTime<Utc>,
}

impl<T> CachedValue<T> {
    /// Build a new envelope around `value`.
    ///
    /// `total_ttl = base_ttl + jitter`; `soft_ttl = floor(total_ttl *
    /// soft_ttl_ratio)`. The caller is responsible for applying `total_ttl`
    /// as the remote-store TTL so the envelope never outlives
    /// `hard_expire_at`.
    pub fn new(value: T, base_ttl: Duration, soft_ttl_ratio: f64, jitter: Duration) -> Self {
        let now = Utc::now();
        let total_ttl = base_ttl + jitter;
        let soft_ttl_secs = (total_ttl.as_secs_f64() * soft_ttl_ratio.clamp(0.0, 1.0)).floor();
        let soft_ttl = Duration::from_secs_f64(soft_ttl_secs.max(0.0));

        CachedValue {
            value,
            soft_expire_at: now + chrono::Duration::from_std(soft_ttl).unwrap_or_default(),
            hard_expire_at: now + chrono::Duration::from_std(total_ttl).unwrap_or_default(),
        }
    }

    /// Total TTL that should be applied when writing this envelope to the
    /// remote store, so it vanishes no later than `hard_expire_at`.
    pub fn store_ttl(&self) -> Duration {
        let now = Utc::now();
        (self.hard_expire_at - now).to_std().unwrap_or_default()
    }

    /// Current freshness, evaluated against the wall clock.
    pub fn state(&self) -> FreshnessState {
        let now = Utc::now();
        if now < self.soft_expire_at {
            FreshnessState::Fresh
        } else if now < self.hard_expire_at {
            FreshnessState::Stale
        } else {
            FreshnessState::Expired
        }
    }

    pub fn is_fresh(&self) -> bool {
        self.state() == FreshnessState::Fresh
    }

    pub fn is_stale(&self) -> bool {
        self.state() == FreshnessState::Stale
    }

    pub fn is_expired(&self) -> bool {
        self.state() == FreshnessState::Expired
    }

    pub fn value(&self) -> &T {
        &self.value
    }

    pub fn into_value(self) -> T {
        self.value
    }

    pub fn soft_expire_at(&self) -> DateTime<Utc> {
        self.soft_expire_at
    }

    pub fn hard_expire_at(&self) -> DateTime<Utc> {
        self.hard_expire_at
    }
}
