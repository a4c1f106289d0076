//! Cache and lock key derivation.
//!
//! Every strategy owns a disjoint namespace in the remote store so that (a)
//! envelope and bare-payload encodings never collide under the same key and
//! (b) a benchmark comparing strategies on the same logical key is
//! well-defined.

/// Build the remote-store key for `user_key` under a strategy's namespace:
/// `product:<strategy_name>:<user_key>`.
pub fn cache_key(strategy_name: &str, user_key: &str) -> String {
    format!("product:{}:{}", strategy_name, user_key)
}

/// Build the lock *resource* name a strategy passes to [`crate::lock`]:
/// `refresh:<strategy_name>:<user_key>`.
///
/// The `refresh:` prefix (not `lock:`, which the lock primitive adds
/// itself) lets multiple strategies coexist in the same lock namespace
/// without colliding with each other's cache keys.
pub fn lock_resource(strategy_name: &str, user_key: &str) -> String {
    format!("refresh:{}:{}", strategy_name, user_key)
}
