//! Error taxonomy for a step invocation.
//!
//! - [`DecodeError`]: payload could not be parsed. Never reported on the bus.
//! - [`ValidationError`]: a field-level defect with a fixed, canonical message.
//! - [`ActionError`]: the external operation failed or timed out.
//!
//! [`StepError`] joins the last two; its `Display` is exactly the text that
//! lands in the outgoing envelope's `error` field.

use std::borrow::Cow;
use std::time::Duration;

use thiserror::Error;

/// Inbound payload is not well-formed structured data.
#[derive(Debug, Error)]
#[error("malformed envelope: {0}")]
pub struct DecodeError(#[from] serde_json::Error);

/// Envelope could not be serialized for publishing.
#[derive(Debug, Error)]
#[error("failed to encode envelope: {0}")]
pub struct EncodeError(#[from] serde_json::Error);

/// The first failing validation check.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct ValidationError {
    message: Cow<'static, str>,
}

impl ValidationError {
    pub fn new(message: impl Into<Cow<'static, str>>) -> Self {
        Self {
            message: message.into(),
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

/// Failure of the external action, carrying a human-readable cause.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{cause}")]
pub struct ActionError {
    pub cause: String,
}

impl ActionError {
    pub fn new(cause: impl Into<String>) -> Self {
        Self {
            cause: cause.into(),
        }
    }

    /// The action did not finish within the configured bound.
    pub fn timed_out(after: Duration) -> Self {
        Self::new(format!("action timed out after {:?}", after))
    }
}

/// Any failure after a successful decode. Always published as an error event.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StepError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Action(#[from] ActionError),
}
