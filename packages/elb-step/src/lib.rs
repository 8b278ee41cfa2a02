//! Load-balancer workflow step.
//!
//! Consumes `elb.<create|delete>.<provider>` events, validates them, calls the
//! provider, and reports on `<trigger>.done` or `<trigger>.error`.

pub mod aws;
pub mod config;
pub mod event;
pub mod operation;

use std::sync::Arc;

use workflow_step::{Controller, Executor, Publisher};

pub use config::Config;
pub use event::{ElbEvent, Port};
pub use operation::ElbOperation;

/// Wire a controller for the configured operation.
pub fn build_controller(
    config: &Config,
    executor: Arc<dyn Executor<ElbEvent>>,
    publisher: Arc<dyn Publisher>,
) -> Controller<ElbEvent> {
    let operation = config.operation;
    Controller::new(
        operation.subjects(&config.resource, &config.provider),
        operation.validator(),
        executor,
        publisher,
    )
    .with_action_timeout(config.action_timeout)
}
