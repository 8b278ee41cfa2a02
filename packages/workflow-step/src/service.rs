//! Long-running consumer for a step's trigger subject.
//!
//! The `StepService`:
//! - Pulls payloads from a stream (the NATS subscription in production)
//! - Spawns one independent controller invocation per payload
//! - On shutdown, stops pulling and lets in-flight invocations reach a
//!   terminal state, bounded by a grace period
//!
//! # Example
//!
//! ```ignore
//! let payloads = workflow_step::subscribe(&client, controller.subjects()).await?;
//! let shutdown = CancellationToken::new();
//!
//! let summary = StepService::new(controller)
//!     .with_shutdown_grace(Duration::from_secs(30))
//!     .run(payloads, shutdown.clone())
//!     .await;
//! ```

use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use bytes::Bytes;
use futures::{Stream, StreamExt};
use tokio::task::{JoinError, JoinSet};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use crate::controller::{Controller, Outcome};
use crate::envelope::Envelope;
use crate::subjects::Subjects;

/// Default time in-flight invocations get to finish after shutdown.
pub const DEFAULT_SHUTDOWN_GRACE: Duration = Duration::from_secs(30);

/// Subscribe to the trigger subject and yield raw payloads.
pub async fn subscribe(
    client: &async_nats::Client,
    subjects: &Subjects,
) -> Result<impl Stream<Item = Bytes> + Unpin + Send + 'static> {
    let subscriber = client
        .subscribe(subjects.trigger().to_string())
        .await
        .with_context(|| format!("Failed to subscribe to {}", subjects.trigger()))?;

    Ok(subscriber.map(|message| message.payload))
}

/// Tally of a service run.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct RunSummary {
    pub completed: usize,
    pub failed: usize,
    pub dropped: usize,
    /// Invocations still running when the grace period ran out.
    pub abandoned: usize,
}

impl RunSummary {
    fn record(&mut self, result: Result<Outcome, JoinError>) {
        match result {
            Ok(Outcome::Completed) => self.completed += 1,
            Ok(Outcome::Failed(_)) => self.failed += 1,
            Ok(Outcome::Dropped) => self.dropped += 1,
            Err(e) => {
                error!(error = %e, "step invocation panicked");
                self.failed += 1;
            }
        }
    }

    pub fn handled(&self) -> usize {
        self.completed + self.failed + self.dropped
    }
}

/// Consumes trigger payloads and drives a controller per message.
pub struct StepService<E: Envelope> {
    controller: Arc<Controller<E>>,
    shutdown_grace: Duration,
}

impl<E: Envelope> StepService<E> {
    pub fn new(controller: Controller<E>) -> Self {
        Self {
            controller: Arc::new(controller),
            shutdown_grace: DEFAULT_SHUTDOWN_GRACE,
        }
    }

    pub fn with_shutdown_grace(mut self, grace: Duration) -> Self {
        self.shutdown_grace = grace;
        self
    }

    /// Run until the stream ends or `shutdown` is cancelled.
    pub async fn run<S>(self, mut payloads: S, shutdown: CancellationToken) -> RunSummary
    where
        S: Stream<Item = Bytes> + Unpin,
    {
        info!(
            subject = %self.controller.subjects().trigger(),
            action_timeout = ?self.controller.action_timeout(),
            "step service starting"
        );

        let mut summary = RunSummary::default();
        let mut inflight: JoinSet<Outcome> = JoinSet::new();

        loop {
            tokio::select! {
                biased;

                _ = shutdown.cancelled() => break,

                Some(result) = inflight.join_next(), if !inflight.is_empty() => {
                    summary.record(result);
                }

                next = payloads.next() => match next {
                    Some(payload) => {
                        let controller = self.controller.clone();
                        inflight.spawn(async move { controller.handle(&payload).await });
                    }
                    None => {
                        debug!("trigger stream ended");
                        break;
                    }
                },
            }
        }

        if !inflight.is_empty() {
            info!(count = inflight.len(), "waiting for in-flight invocations to finish");
        }

        let drain = async {
            while let Some(result) = inflight.join_next().await {
                summary.record(result);
            }
        };

        if tokio::time::timeout(self.shutdown_grace, drain).await.is_err() {
            summary.abandoned = inflight.len();
            warn!(
                count = summary.abandoned,
                grace = ?self.shutdown_grace,
                "abandoning in-flight invocations after grace period"
            );
            inflight.abort_all();
        }

        info!(
            handled = summary.handled(),
            completed = summary.completed,
            failed = summary.failed,
            dropped = summary.dropped,
            abandoned = summary.abandoned,
            "step service stopped"
        );
        summary
    }
}
