//! Error types for the cache-stampede engine.

use std::fmt;

/// Result type for cache operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Error types for the cache-stampede engine.
///
/// Per the engine's fail-open policy, most of these are handled internally
/// (logged and treated as a miss) and never reach a caller. Only
/// [`Error::LoaderError`] and [`Error::ConfigError`] are expected to surface.
#[derive(Debug, Clone)]
pub enum Error {
    /// Serialization failed when converting a value to cache bytes.
    SerializationError(String),

    /// Deserialization failed, or the decoded value could not be coerced
    /// back into the requested concrete type.
    ///
    /// Treated as a cache miss everywhere it originates; the stale entry is
    /// left in the store and is overwritten by the next successful loader
    /// result.
    DeserializationError(String),

    /// Cache backend is unavailable or returned an error.
    ///
    /// Transient by assumption: logged at warn and treated as a miss on
    /// reads, a silent drop on writes.
    BackendError(String),

    /// The caller-supplied loader failed.
    ///
    /// The only error variant that is not fail-open: it propagates to the
    /// caller unchanged, and the cache is left untouched.
    LoaderError(String),

    /// Distributed lock could not be acquired or released cleanly.
    ///
    /// Non-fatal: strategies fall back to a cache re-read and then to a
    /// direct loader call. Surfaced only through metrics/logging, never
    /// returned from `getOrLoad`.
    LockError(String),

    /// Configuration error during strategy or backend construction.
    ConfigError(String),

    /// Feature not implemented or not enabled for the active backend.
    NotImplemented(String),

    /// Generic error with custom message.
    Other(String),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::SerializationError(msg) => write!(f, "Serialization error: {}", msg),
            Error::DeserializationError(msg) => write!(f, "Deserialization error: {}", msg),
            Error::BackendError(msg) => write!(f, "Backend error: {}", msg),
            Error::LoaderError(msg) => write!(f, "Loader error: {}", msg),
            Error::LockError(msg) => write!(f, "Lock error: {}", msg),
            Error::ConfigError(msg) => write!(f, "Config error: {}", msg),
            Error::NotImplemented(msg) => write!(f, "Not implemented: {}", msg),
            Error::Other(msg) => write!(f, "Error: {}", msg),
        }
    }
}

impl std::error::Error for Error {}

// ============================================================================
// Conversions from other error types
// ============================================================================

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        if e.is_io() {
            Error::BackendError(e.to_string())
        } else if e.is_syntax() || e.is_data() {
            Error::DeserializationError(e.to_string())
        } else {
            Error::SerializationError(e.to_string())
        }
    }
}

impl From<std::io::Error> for Error {
    fn from(e: std::io::Error) -> Self {
        Error::BackendError(e.to_string())
    }
}

impl From<String> for Error {
    fn from(e: String) -> Self {
        Error::Other(e)
    }
}

impl From<&str> for Error {
    fn from(e: &str) -> Self {
        Error::Other(e.to_string())
    }
}

#[cfg(feature = "redis")]
impl From<redis::RedisError> for Error {
    fn from(e: redis::RedisError) -> Self {
        Error::BackendError(format!("Redis error: {}", e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = Error::LoaderError("boom".to_string());
        assert_eq!(err.to_string(), "Loader error: boom");
    }

    #[test]
    fn test_error_from_string() {
        let err: Error = "test error".into();
        assert!(matches!(err, Error::Other(_)));
    }

    #[test]
    fn test_error_from_json_syntax() {
        let json_err = serde_json::from_str::<serde_json::Value>("{not json").unwrap_err();
        let err: Error = json_err.into();
        assert!(matches!(err, Error::DeserializationError(_)));
    }
}
