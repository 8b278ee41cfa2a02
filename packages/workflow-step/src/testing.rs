//! Testing utilities for step controllers.
//!
//! # Feature Flag
//!
//! This module is only available with the `testing` feature:
//!
//! ```toml
//! [dev-dependencies]
//! workflow-step = { path = "../workflow-step", features = ["testing"] }
//! ```
//!
//! # Example
//!
//! ```ignore
//! use workflow_step::testing::{next_on, StubExecutor, DEFAULT_WAIT};
//!
//! let bus = Arc::new(InMemoryBus::new());
//! let mut rx = bus.subscribe();
//!
//! controller.handle(&payload).await;
//!
//! assert!(next_on(&mut rx, "elb.delete.aws.done", DEFAULT_WAIT).await.is_some());
//! assert!(next_on(&mut rx, "elb.delete.aws.error", DEFAULT_WAIT).await.is_none());
//! ```

use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::broadcast::{self, error::RecvError};

use crate::error::ActionError;
use crate::executor::Executor;
use crate::publisher::PublishedMessage;

/// How long tests wait for a message before treating the subject as silent.
pub const DEFAULT_WAIT: Duration = Duration::from_millis(100);

/// Wait for the next message on `subject`, skipping others.
///
/// Returns `None` if nothing arrives on that subject within `within`.
pub async fn next_on(
    rx: &mut broadcast::Receiver<PublishedMessage>,
    subject: &str,
    within: Duration,
) -> Option<PublishedMessage> {
    tokio::time::timeout(within, async {
        loop {
            match rx.recv().await {
                Ok(msg) if msg.subject == subject => return Some(msg),
                Ok(_) => continue,
                Err(RecvError::Lagged(_)) => continue,
                Err(RecvError::Closed) => return None,
            }
        }
    })
    .await
    .ok()
    .flatten()
}

#[derive(Debug, Clone)]
enum Canned {
    Succeed,
    Fail(String),
    Hang,
    Delay(Duration),
}

/// Executor returning a canned outcome and counting its calls.
#[derive(Debug)]
pub struct StubExecutor {
    canned: Canned,
    calls: AtomicUsize,
}

impl StubExecutor {
    fn with(canned: Canned) -> Self {
        Self {
            canned,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn succeeding() -> Self {
        Self::with(Canned::Succeed)
    }

    pub fn failing(cause: impl Into<String>) -> Self {
        Self::with(Canned::Fail(cause.into()))
    }

    /// Never finishes; exercises action timeouts.
    pub fn hanging() -> Self {
        Self::with(Canned::Hang)
    }

    /// Succeeds after `delay`; exercises in-flight shutdown.
    pub fn delayed(delay: Duration) -> Self {
        Self::with(Canned::Delay(delay))
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl<E: Sync> Executor<E> for StubExecutor {
    async fn execute(&self, _envelope: &E) -> Result<(), ActionError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match &self.canned {
            Canned::Succeed => Ok(()),
            Canned::Fail(cause) => Err(ActionError::new(cause.clone())),
            Canned::Hang => {
                std::future::pending::<()>().await;
                Ok(())
            }
            Canned::Delay(delay) => {
                tokio::time::sleep(*delay).await;
                Ok(())
            }
        }
    }
}
