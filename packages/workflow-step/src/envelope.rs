//! Envelope trait and JSON codec.
//!
//! An envelope is decoded once, mutated at most once (to attach error text),
//! and encoded once as the terminal message. Implementors should derive
//! `Deserialize` with `#[serde(default)]` and put
//! `deserialize_with = "null_as_default"` on non-optional fields, so that both
//! missing and `null` values take their zero value and are only rejected by
//! validation.

use bytes::Bytes;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};

use crate::error::{DecodeError, EncodeError};

/// The single event flowing through one workflow step.
pub trait Envelope: Serialize + DeserializeOwned + Send + Sync + 'static {
    /// Correlates the event with a workflow run. Opaque, echoed verbatim.
    fn operation_id(&self) -> &str;

    /// Correlates the event with a batch of parallel steps. Opaque, echoed verbatim.
    fn batch_id(&self) -> &str;

    /// Error text, present only on the failure path.
    fn error(&self) -> Option<&str>;

    /// Annotate the envelope with the failure message.
    fn attach_error(&mut self, message: String);

    /// Remove any error text, e.g. one left over from an earlier attempt.
    fn clear_error(&mut self);
}

/// Field deserializer treating an explicit `null` like a missing key.
///
/// Go producers encode nil slices and unset values as `null`.
pub fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Option::<T>::deserialize(deserializer).map(Option::unwrap_or_default)
}

/// Parse an inbound payload. Unknown fields are ignored.
pub fn decode<E: Envelope>(payload: &[u8]) -> Result<E, DecodeError> {
    Ok(serde_json::from_slice(payload)?)
}

/// Serialize an envelope in field declaration order.
pub fn encode<E: Envelope>(envelope: &E) -> Result<Bytes, EncodeError> {
    Ok(Bytes::from(serde_json::to_vec(envelope)?))
}
