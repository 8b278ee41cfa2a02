//! # Workflow Step
//!
//! The lifecycle shared by every step-service of the workflow engine: one
//! inbound event is decoded, validated, acted upon, and reported back on the
//! bus as either a completion or an error.
//!
//! ## Architecture
//!
//! ```text
//! trigger subject (e.g. elb.delete.aws)
//!     │
//!     ▼
//! StepService ── spawn per message ──► Controller.handle()
//!                                          │
//!                                          ├─► decode()      ─ fail ─► drop (logged)
//!                                          ├─► Validator     ─ fail ─┐
//!                                          ├─► Executor      ─ fail ─┤
//!                                          │                         ▼
//!                                          ├─► Publisher ◄── <trigger>.error (with "error")
//!                                          └─► Publisher ◄── <trigger>.done  (unchanged)
//! ```
//!
//! ## Key Invariants
//!
//! 1. **One publish per decoded envelope** - completion XOR failure
//! 2. **First failing check wins** - validation messages are never aggregated
//! 3. **Decode failures are silent on the bus** - nothing to correlate them with
//! 4. **Invocations share nothing** - each envelope is local to one task
//!
//! ## Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use workflow_step::{Controller, NatsPublisher, StepService, Subjects, Validator};
//!
//! let subjects = Subjects::new("elb", "delete", "aws");
//! let validator = Validator::<MyEvent>::new()
//!     .require("Datacenter Region invalid", |e| !e.region.is_empty());
//!
//! let controller = Controller::new(
//!     subjects.clone(),
//!     validator,
//!     Arc::new(MyExecutor),
//!     Arc::new(NatsPublisher::new(client.clone())),
//! );
//!
//! let payloads = workflow_step::subscribe(&client, &subjects).await?;
//! StepService::new(controller).run(payloads, shutdown).await;
//! ```

mod controller;
mod envelope;
mod error;
mod executor;
mod publisher;
mod service;
mod subjects;
mod validate;

// Stub executors and bus helpers for downstream test suites
#[cfg(any(test, feature = "testing"))]
pub mod testing;

pub use controller::{Controller, Outcome, Stage, DEFAULT_ACTION_TIMEOUT};
pub use envelope::{decode, encode, null_as_default, Envelope};
pub use error::{ActionError, DecodeError, EncodeError, StepError, ValidationError};
pub use executor::Executor;
pub use publisher::{InMemoryBus, NatsPublisher, PublishedMessage, Publisher};
pub use service::{subscribe, RunSummary, StepService, DEFAULT_SHUTDOWN_GRACE};
pub use subjects::Subjects;
pub use validate::Validator;

pub use async_trait::async_trait;
