//! Tunable configuration shared by every strategy.
//!
//! A flat tunables table, loaded once at construction via the builder and
//! never mutated afterwards.

use std::time::Duration;

/// Configuration for a single strategy instance.
///
/// All strategies accept the same tunables; strategies that don't use a
/// given field (e.g. `basic` ignores `jitter_max`) simply leave it unread.
#[derive(Clone, Debug)]
pub struct StrategyConfig {
    /// Nominal TTL applied to a freshly loaded value.
    pub base_ttl: Duration,
    /// Upper bound of the uniform TTL jitter added on top of `base_ttl`.
    pub jitter_max: Duration,
    /// Soft-TTL fraction of total TTL, in `[0, 1]`.
    pub soft_ttl_ratio: f64,
    /// TTL applied to a held distributed lock.
    pub lock_timeout: Duration,
    /// Sleep between lock acquisition retries.
    pub lock_retry_interval: Duration,
    /// Maximum number of lock acquisition retries; total wait is the
    /// product of this and `lock_retry_interval`.
    pub lock_max_retries: u32,
}

impl Default for StrategyConfig {
    fn default() -> Self {
        StrategyConfig {
            base_ttl: Duration::from_secs(60),
            jitter_max: Duration::from_secs(10),
            soft_ttl_ratio: 0.8,
            lock_timeout: Duration::from_secs(5),
            lock_retry_interval: Duration::from_millis(50),
            lock_max_retries: 100,
        }
    }
}

impl StrategyConfig {
    /// Start building a config from the defaults.
    pub fn builder() -> StrategyConfigBuilder {
        StrategyConfigBuilder::default()
    }

    /// Total wait budget for a single `waitForLock` call.
    pub fn lock_wait_budget(&self) -> Duration {
        self.lock_retry_interval * self.lock_max_retries
    }
}

/// Fluent builder for [`StrategyConfig`].
#[derive(Clone, Debug, Default)]
pub struct StrategyConfigBuilder {
    config: StrategyConfig,
}

impl StrategyConfigBuilder {
    pub fn with_base_ttl(mut self, ttl: Duration) -> Self {
        self.config.base_ttl = ttl;
        self
    }

    pub fn with_jitter_max(mut self, jitter_max: Duration) -> Self {
        self.config.jitter_max = jitter_max;
        self
    }

    pub fn with_soft_ttl_ratio(mut self, ratio: f64) -> Self {
        self.config.soft_ttl_ratio = ratio.clamp(0.0, 1.0);
        self
    }

    pub fn with_lock_timeout(mut self, timeout: Duration) -> Self {
        self.config.lock_timeout = timeout;
        self
    }

    pub fn with_lock_retry_interval(mut self, interval: Duration) -> Self {
        self.config.lock_retry_interval = interval;
        self
    }

    pub fn with_lock_max_retries(mut self, retries: u32) -> Self {
        self.config.lock_max_retries = retries;
        self
    }

    pub fn build(self) -> StrategyConfig {
        self.config
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_values() {
        let cfg = StrategyConfig::default();
        assert_eq!(cfg.base_ttl, Duration::from_secs(60));
        assert_eq!(cfg.jitter_max, Duration::from_secs(10));
        assert_eq!(cfg.soft_ttl_ratio, 0.8);
        assert_eq!(cfg.lock_timeout, Duration::from_secs(5));
        assert_eq!(cfg.lock_retry_interval, Duration::from_millis(50));
        assert_eq!(cfg.lock_max_retries, 100);
    }

    #[test]
    fn test_builder_overrides() {
        let cfg = StrategyConfig::builder()
            .with_base_ttl(Duration::from_secs(30))
            .with_jitter_max(Duration::from_secs(5))
            .with_soft_ttl_ratio(1.5)
            .build();

        assert_eq!(cfg.base_ttl, Duration::from_secs(30));
        assert_eq!(cfg.jitter_max, Duration::from_secs(5));
        assert_eq!(cfg.soft_ttl_ratio, 1.0, "ratio must clamp into [0,1]");
    }

    #[test]
    fn test_lock_wait_budget() {
        let cfg = StrategyConfig::builder()
            .with_lock_retry_interval(Duration::from_millis(50))
            .with_lock_max_retries(100)
            .build();

        assert_eq!(cfg.lock_wait_budget(), Duration::from_millis(5000));
    }
}
