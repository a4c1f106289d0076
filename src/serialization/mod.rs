//! Serialization layer: the rules that let values round-trip through the
//! remote key-value store without losing type fidelity.
//!
//! Contract: `write(T) -> read(T)` must yield a value equal to the original
//! for all `T` the caller uses — including `T`s nested inside the
//! `CachedValue<T>` envelope. Concretely this module:
//!
//! - encodes as JSON, which carries instants (`chrono::DateTime<Utc>`, see
//!   [`crate::envelope`]) as ISO-8601 strings rather than epoch counts;
//! - decodes first into a generic, self-describing [`serde_json::Value`]
//!   (standing in for "the remote store may hand back a generic map rather
//!   than the concrete type"), then reflectively *coerces* that value into
//!   the caller's requested concrete type;
//! - tolerates unknown fields on read, because `serde_json::Value` carries
//!   every field and `serde_json::from_value` only consumes the fields the
//!   target type declares — this is also what lets [`crate::envelope`]
//!   round-trip payloads that carry legacy `fresh`/`stale` fields;
//! - treats a failed coercion as a cache miss (logged at `warn!`), never as
//!   a hard error, per the engine's fail-open error policy.

use crate::error::{Error, Result};
use serde::de::DeserializeOwned;
use serde::Serialize;

/// Encode a value (a bare payload, or a [`crate::envelope::CachedValue`])
/// as the bytes written to the remote store.
pub fn encode<T: Serialize>(value: &T) -> Result<Vec<u8>> {
    serde_json::to_vec(value).map_err(|e| {
        log::error!("cache serialization failed: {}", e);
        Error::SerializationError(e.to_string())
    })
}

/// Decode bytes read from the remote store back into `T`.
///
/// Goes through an intermediate generic [`serde_json::Value`] and then
/// [`coerce`]s it, modeling "the remote store may deserialize to a generic
/// map" read path uniformly rather than special-casing it.
pub fn decode<T: DeserializeOwned>(bytes: &[u8]) -> Result<T> {
    let generic: serde_json::Value = serde_json::from_slice(bytes).map_err(|e| {
        log::warn!("cache payload is not valid JSON, treating as miss: {}", e);
        Error::DeserializationError(e.to_string())
    })?;
    coerce(generic)
}

/// Reflectively coerce a generic decoded value into the requested concrete
/// type `T`. A failed coercion is a cache miss, never an error — callers
/// should map `Err` here to "treat as absent" rather than propagate it.
pub fn coerce<T: DeserializeOwned>(generic: serde_json::Value) -> Result<T> {
    serde_json::from_value(generic).map_err(|e| {
        log::warn!("type coercion to requested type failed, treating as miss: {}", e);
        Error::DeserializationError(e.to_string())
    })
}
