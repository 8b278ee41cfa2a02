//! The side-effecting action a step exists to perform.

use async_trait::async_trait;

use crate::error::ActionError;

/// Performs the single external operation for an envelope.
///
/// Called at most once per envelope, after validation has passed. Every
/// failure (network, auth, rejected request) must come back as an
/// [`ActionError`] with a readable cause. Retries belong to the parent
/// workflow, not to implementations of this trait.
#[async_trait]
pub trait Executor<E: Sync>: Send + Sync {
    async fn execute(&self, envelope: &E) -> Result<(), ActionError>;
}
