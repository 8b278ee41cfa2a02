//! Shared fixtures and harness for ELB step integration tests.

#![allow(dead_code)]

use std::sync::Arc;
use std::time::Duration;

use elb_step::{build_controller, Config, ElbEvent, ElbOperation, Port};
use workflow_step::testing::StubExecutor;
use workflow_step::{Controller, InMemoryBus};

/// Canonical encoding of [`test_event`], written out by hand.
pub const CANONICAL_PAYLOAD: &str = concat!(
    r#"{"_uuid":"test","_batch_id":"test","_type":"aws","#,
    r#""vpc_id":"vpc-0000000","datacenter_region":"eu-west-1","#,
    r#""datacenter_secret":"key","datacenter_token":"token","#,
    r#""name":"test-elb","is_private":false,"#,
    r#""ports":[{"from_port":80,"to_port":80,"protocol":"HTTP"}],"#,
    r#""network_aws_ids":["subnet-0000000"],"#,
    r#""instance_aws_ids":["i-0000000"],"#,
    r#""security_group_aws_ids":["sg-0000000"]}"#
);

pub fn init_tracing() {
    // Run tests with: RUST_LOG=debug cargo test -- --nocapture
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// A valid event with one HTTP listener, provider "aws".
pub fn test_event() -> ElbEvent {
    ElbEvent {
        uuid: "test".into(),
        batch_id: "test".into(),
        provider_type: "aws".into(),
        vpc_id: "vpc-0000000".into(),
        datacenter_region: "eu-west-1".into(),
        datacenter_secret: "key".into(),
        datacenter_token: "token".into(),
        name: "test-elb".into(),
        is_private: false,
        ports: vec![Port {
            from_port: 80,
            to_port: 80,
            protocol: "HTTP".into(),
            ssl_cert: None,
        }],
        network_aws_ids: vec!["subnet-0000000".into()],
        instance_aws_ids: vec!["i-0000000".into()],
        security_group_aws_ids: vec!["sg-0000000".into()],
        error: None,
    }
}

pub fn payload(event: &ElbEvent) -> Vec<u8> {
    serde_json::to_vec(event).expect("fixture serializes")
}

pub fn config(operation: ElbOperation) -> Config {
    Config {
        nats_uri: "nats://unused:4222".into(),
        operation,
        provider: "aws".into(),
        resource: "elb".into(),
        action_timeout: Duration::from_secs(5),
        shutdown_grace: Duration::from_secs(5),
    }
}

/// Controller wired to an in-memory bus and a stub executor.
pub struct Harness {
    pub bus: Arc<InMemoryBus>,
    pub executor: Arc<StubExecutor>,
    pub controller: Controller<ElbEvent>,
}

impl Harness {
    pub fn new(operation: ElbOperation, executor: StubExecutor) -> Self {
        init_tracing();

        let bus = Arc::new(InMemoryBus::new());
        let executor = Arc::new(executor);
        let controller = build_controller(&config(operation), executor.clone(), bus.clone());

        Self {
            bus,
            executor,
            controller,
        }
    }

    pub fn delete() -> Self {
        Self::new(ElbOperation::Delete, StubExecutor::succeeding())
    }
}
