//! Lifecycle controller: decode → validate → execute → publish.
//!
//! ```text
//! Received ──decode ok──► Decoded ──valid──► Validated ──action ok──► Executed ──► Completed
//!    │                       │                   │
//!    └─decode fails─► drop   └─invalid─► Failed ◄┘─action fails
//! ```
//!
//! No stage is revisited. Every envelope that reaches `Decoded` is published
//! exactly once: to the done subject on `Completed` with any inbound `error`
//! cleared, or to the error subject on `Failed` with `error` attached.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, error, info, warn};

use crate::envelope::{decode, encode, Envelope};
use crate::error::{ActionError, StepError};
use crate::executor::Executor;
use crate::publisher::Publisher;
use crate::subjects::Subjects;
use crate::validate::Validator;

/// Default bound on a single action.
pub const DEFAULT_ACTION_TIMEOUT: Duration = Duration::from_secs(60);

/// Lifecycle stages of one invocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Received,
    Decoded,
    Validated,
    Executed,
    Completed,
    Failed,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Stage::Received => "received",
            Stage::Decoded => "decoded",
            Stage::Validated => "validated",
            Stage::Executed => "executed",
            Stage::Completed => "completed",
            Stage::Failed => "failed",
        };
        f.write_str(name)
    }
}

/// How an invocation ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// Payload did not decode; nothing was published.
    Dropped,
    /// Action succeeded; envelope published to the done subject.
    Completed,
    /// Validation or action failed; envelope published to the error subject.
    Failed(StepError),
}

impl Outcome {
    /// Final stage reached, `None` for dropped payloads.
    pub fn stage(&self) -> Option<Stage> {
        match self {
            Outcome::Dropped => None,
            Outcome::Completed => Some(Stage::Completed),
            Outcome::Failed(_) => Some(Stage::Failed),
        }
    }

    pub fn error(&self) -> Option<&StepError> {
        match self {
            Outcome::Failed(err) => Some(err),
            _ => None,
        }
    }
}

/// Runs one envelope end-to-end.
///
/// A controller holds only immutable configuration and shared handles, so a
/// single instance (behind an `Arc`) serves any number of concurrent
/// invocations.
pub struct Controller<E: Envelope> {
    subjects: Subjects,
    validator: Validator<E>,
    executor: Arc<dyn Executor<E>>,
    publisher: Arc<dyn Publisher>,
    action_timeout: Duration,
}

impl<E: Envelope> Controller<E> {
    pub fn new(
        subjects: Subjects,
        validator: Validator<E>,
        executor: Arc<dyn Executor<E>>,
        publisher: Arc<dyn Publisher>,
    ) -> Self {
        Self {
            subjects,
            validator,
            executor,
            publisher,
            action_timeout: DEFAULT_ACTION_TIMEOUT,
        }
    }

    /// Bound the action; expiry is reported as an [`ActionError`].
    pub fn with_action_timeout(mut self, timeout: Duration) -> Self {
        self.action_timeout = timeout;
        self
    }

    pub fn subjects(&self) -> &Subjects {
        &self.subjects
    }

    pub fn action_timeout(&self) -> Duration {
        self.action_timeout
    }

    /// Handle one inbound payload through to a terminal outcome.
    pub async fn handle(&self, payload: &[u8]) -> Outcome {
        let mut envelope: E = match decode(payload) {
            Ok(envelope) => envelope,
            Err(e) => {
                warn!(
                    subject = %self.subjects.trigger(),
                    error = %e,
                    "dropping message that failed to decode"
                );
                return Outcome::Dropped;
            }
        };

        debug!(
            operation_id = %envelope.operation_id(),
            batch_id = %envelope.batch_id(),
            stage = %Stage::Decoded,
            "envelope decoded"
        );

        match self.advance(&envelope).await {
            Ok(()) => {
                self.complete(&mut envelope).await;
                Outcome::Completed
            }
            Err(err) => {
                self.fail(&mut envelope, &err).await;
                Outcome::Failed(err)
            }
        }
    }

    /// Decoded → Validated → Executed, short-circuiting on the first failure.
    async fn advance(&self, envelope: &E) -> Result<(), StepError> {
        self.validator.validate(envelope)?;
        debug!(operation_id = %envelope.operation_id(), stage = %Stage::Validated, "envelope valid");

        self.execute(envelope).await?;
        debug!(operation_id = %envelope.operation_id(), stage = %Stage::Executed, "action succeeded");

        Ok(())
    }

    async fn execute(&self, envelope: &E) -> Result<(), ActionError> {
        match tokio::time::timeout(self.action_timeout, self.executor.execute(envelope)).await {
            Ok(result) => result,
            Err(_) => Err(ActionError::timed_out(self.action_timeout)),
        }
    }

    async fn complete(&self, envelope: &mut E) {
        if let Some(stale) = envelope.error() {
            debug!(
                operation_id = %envelope.operation_id(),
                stale_error = %stale,
                "clearing error carried by inbound envelope"
            );
            envelope.clear_error();
        }
        info!(
            operation_id = %envelope.operation_id(),
            batch_id = %envelope.batch_id(),
            subject = %self.subjects.done(),
            "step completed"
        );
        self.publish(self.subjects.done(), envelope).await;
    }

    async fn fail(&self, envelope: &mut E, err: &StepError) {
        envelope.attach_error(err.to_string());
        warn!(
            operation_id = %envelope.operation_id(),
            batch_id = %envelope.batch_id(),
            subject = %self.subjects.error(),
            error = %err,
            "step failed"
        );
        self.publish(self.subjects.error(), envelope).await;
    }

    async fn publish(&self, subject: &str, envelope: &E) {
        let payload = match encode(envelope) {
            Ok(payload) => payload,
            Err(e) => {
                error!(operation_id = %envelope.operation_id(), error = %e, "failed to encode envelope");
                return;
            }
        };

        if let Err(e) = self.publisher.publish(subject.to_string(), payload).await {
            error!(
                operation_id = %envelope.operation_id(),
                subject = %subject,
                error = %e,
                "failed to publish outcome"
            );
        }
    }
}
