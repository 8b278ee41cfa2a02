//! End-to-end lifecycle of an ELB event through the controller.

mod common;

use std::time::Duration;

use common::{payload, test_event, Harness, CANONICAL_PAYLOAD};
use elb_step::{ElbEvent, ElbOperation};
use workflow_step::testing::{next_on, StubExecutor, DEFAULT_WAIT};
use workflow_step::{decode, encode, Outcome, StepError};

const DONE: &str = "elb.delete.aws.done";
const ERROR: &str = "elb.delete.aws.error";

#[tokio::test]
async fn decoded_event_carries_every_field() {
    let event: ElbEvent = decode(CANONICAL_PAYLOAD.as_bytes()).unwrap();

    assert_eq!(event, test_event());
    assert_eq!(event.ports.len(), 1);
    assert_eq!(event.ports[0].from_port, 80);
    assert_eq!(event.ports[0].protocol, "HTTP");
    assert_eq!(event.security_group_aws_ids, vec!["sg-0000000".to_string()]);
    assert_eq!(event.error, None);
}

#[tokio::test]
async fn canonical_payload_round_trips_byte_for_byte() {
    let event: ElbEvent = decode(CANONICAL_PAYLOAD.as_bytes()).unwrap();
    assert_eq!(encode(&event).unwrap().as_ref(), CANONICAL_PAYLOAD.as_bytes());

    let again: ElbEvent = decode(&encode(&test_event()).unwrap()).unwrap();
    assert_eq!(again, test_event());
}

#[tokio::test]
async fn scenario_a_valid_event_completes() {
    let harness = Harness::delete();
    let mut rx = harness.bus.subscribe();

    let outcome = harness.controller.handle(CANONICAL_PAYLOAD.as_bytes()).await;
    assert_eq!(outcome, Outcome::Completed);
    assert_eq!(harness.executor.calls(), 1);

    let msg = next_on(&mut rx, DONE, DEFAULT_WAIT)
        .await
        .expect("completion published");
    assert_eq!(msg.payload.as_ref(), CANONICAL_PAYLOAD.as_bytes());

    assert!(next_on(&mut rx, ERROR, DEFAULT_WAIT).await.is_none());
}

#[tokio::test]
async fn scenario_b_empty_region_fails_without_acting() {
    let harness = Harness::delete();
    let mut rx = harness.bus.subscribe();
    let event = ElbEvent {
        datacenter_region: String::new(),
        ..test_event()
    };

    let outcome = harness.controller.handle(&payload(&event)).await;
    assert!(matches!(outcome, Outcome::Failed(StepError::Validation(_))));
    assert_eq!(harness.executor.calls(), 0);

    let msg = next_on(&mut rx, ERROR, DEFAULT_WAIT)
        .await
        .expect("failure published");
    let published: ElbEvent = decode(&msg.payload).unwrap();
    assert_eq!(published.error.as_deref(), Some("Datacenter Region invalid"));

    assert!(next_on(&mut rx, DONE, DEFAULT_WAIT).await.is_none());
}

#[tokio::test]
async fn action_failure_is_published_with_its_cause() {
    let harness = Harness::new(
        ElbOperation::Delete,
        StubExecutor::failing("LoadBalancerNotFound: There is no ACTIVE Load Balancer named 'test-elb'"),
    );
    let mut rx = harness.bus.subscribe();

    harness.controller.handle(CANONICAL_PAYLOAD.as_bytes()).await;

    let msg = next_on(&mut rx, ERROR, DEFAULT_WAIT).await.unwrap();
    let text = std::str::from_utf8(&msg.payload).unwrap();
    assert!(text.contains(
        r#""error":"LoadBalancerNotFound: There is no ACTIVE Load Balancer named 'test-elb'""#
    ));
    assert!(next_on(&mut rx, DONE, DEFAULT_WAIT).await.is_none());
}

#[tokio::test]
async fn failure_echoes_correlation_ids_verbatim() {
    let harness = Harness::new(ElbOperation::Delete, StubExecutor::failing("error"));
    let event = ElbEvent {
        uuid: "op-7f3a".into(),
        batch_id: "batch-42".into(),
        ..test_event()
    };

    harness.controller.handle(&payload(&event)).await;

    let published = harness.bus.messages_for_subject(ERROR);
    assert_eq!(published.len(), 1);
    let echoed: ElbEvent = decode(&published[0].payload).unwrap();
    assert_eq!(echoed.uuid, "op-7f3a");
    assert_eq!(echoed.batch_id, "batch-42");
    assert_eq!(echoed.error.as_deref(), Some("error"));
    assert_eq!(
        ElbEvent {
            error: None,
            ..echoed
        },
        event
    );
}

#[tokio::test]
async fn slow_provider_is_reported_as_timeout() {
    let mut harness = Harness::new(ElbOperation::Delete, StubExecutor::hanging());
    harness.controller = harness
        .controller
        .with_action_timeout(Duration::from_millis(25));

    let outcome = harness.controller.handle(CANONICAL_PAYLOAD.as_bytes()).await;

    let err = outcome.error().expect("timed out").to_string();
    assert!(err.starts_with("action timed out"), "{}", err);
    assert_eq!(harness.bus.messages_for_subject(ERROR).len(), 1);
}

#[tokio::test]
async fn exactly_one_publish_per_decoded_event() {
    let harness = Harness::delete();
    let invalid = ElbEvent {
        name: String::new(),
        ..test_event()
    };

    harness.controller.handle(CANONICAL_PAYLOAD.as_bytes()).await;
    harness.controller.handle(&payload(&invalid)).await;

    assert_eq!(harness.bus.publish_count(), 2);
    assert_eq!(harness.bus.messages_for_subject(DONE).len(), 1);
    assert_eq!(harness.bus.messages_for_subject(ERROR).len(), 1);
}

#[tokio::test]
async fn malformed_payloads_are_dropped_silently() {
    let harness = Harness::delete();
    let mut rx = harness.bus.subscribe();

    for garbage in [
        b"".as_slice(),
        b"{".as_slice(),
        b"\xff\xfe\xfd".as_slice(),
        b"[1,2,3]".as_slice(),
        br#"{"ports":"eighty"}"#.as_slice(),
    ] {
        assert_eq!(harness.controller.handle(garbage).await, Outcome::Dropped);
    }

    assert_eq!(harness.executor.calls(), 0);
    assert!(next_on(&mut rx, DONE, DEFAULT_WAIT).await.is_none());
    assert_eq!(harness.bus.publish_count(), 0);
}

#[tokio::test]
async fn missing_fields_fail_validation_not_decoding() {
    let harness = Harness::delete();

    let outcome = harness.controller.handle(br#"{"_uuid":"sparse"}"#).await;

    assert_eq!(
        outcome.error().map(ToString::to_string).as_deref(),
        Some("Datacenter VPC ID invalid")
    );
    let published: ElbEvent = decode(&harness.bus.messages_for_subject(ERROR)[0].payload).unwrap();
    assert_eq!(published.uuid, "sparse");
}

#[tokio::test]
async fn null_fields_decode_as_zero_values() {
    let harness = Harness::delete();
    let mut rx = harness.bus.subscribe();
    let with_nulls = CANONICAL_PAYLOAD
        .replace(r#""ports":[{"from_port":80,"to_port":80,"protocol":"HTTP"}]"#, r#""ports":null"#)
        .replace(r#""instance_aws_ids":["i-0000000"]"#, r#""instance_aws_ids":null"#)
        .replace(r#""_type":"aws""#, r#""_type":null"#)
        .replace(r#""is_private":false"#, r#""is_private":null"#)
        .replace(r#"]}"#, r#"],"error":null}"#);

    let event: ElbEvent = decode(with_nulls.as_bytes()).unwrap();
    assert!(event.ports.is_empty());
    assert!(event.instance_aws_ids.is_empty());
    assert_eq!(event.provider_type, "");
    assert!(!event.is_private);
    assert_eq!(event.error, None);

    let outcome = harness.controller.handle(with_nulls.as_bytes()).await;
    assert_eq!(outcome, Outcome::Completed);
    assert!(next_on(&mut rx, DONE, DEFAULT_WAIT).await.is_some());
}

#[tokio::test]
async fn null_required_string_fails_validation() {
    let harness = Harness::delete();
    let with_null_name = CANONICAL_PAYLOAD.replace(r#""name":"test-elb""#, r#""name":null"#);

    let outcome = harness.controller.handle(with_null_name.as_bytes()).await;

    assert_eq!(
        outcome.error().map(ToString::to_string).as_deref(),
        Some("ELB name is invalid")
    );
    assert_eq!(harness.bus.messages_for_subject(ERROR).len(), 1);
}

#[tokio::test]
async fn completion_never_carries_error_text() {
    let harness = Harness::delete();
    let mut rx = harness.bus.subscribe();
    let stale = CANONICAL_PAYLOAD.replace(r#"]}"#, r#"],"error":"stale"}"#);
    assert!(stale.ends_with(r#""error":"stale"}"#));

    let outcome = harness.controller.handle(stale.as_bytes()).await;
    assert_eq!(outcome, Outcome::Completed);

    let msg = next_on(&mut rx, DONE, DEFAULT_WAIT)
        .await
        .expect("completion published");
    let text = std::str::from_utf8(&msg.payload).unwrap();
    assert!(!text.contains("\"error\""), "{}", text);
    assert_eq!(msg.payload.as_ref(), CANONICAL_PAYLOAD.as_bytes());
    assert!(next_on(&mut rx, ERROR, DEFAULT_WAIT).await.is_none());
}

#[tokio::test]
async fn create_step_publishes_on_create_subjects() {
    let harness = Harness::new(ElbOperation::Create, StubExecutor::succeeding());
    let no_ports = ElbEvent {
        ports: vec![],
        ..test_event()
    };

    harness.controller.handle(CANONICAL_PAYLOAD.as_bytes()).await;
    harness.controller.handle(&payload(&no_ports)).await;

    assert_eq!(harness.bus.messages_for_subject("elb.create.aws.done").len(), 1);
    let failed = harness.bus.messages_for_subject("elb.create.aws.error");
    assert_eq!(failed.len(), 1);
    let event: ElbEvent = decode(&failed[0].payload).unwrap();
    assert_eq!(event.error.as_deref(), Some("ELB must contain at least one port"));
    assert!(!harness.bus.was_published_to(DONE));
}

#[tokio::test]
async fn concurrent_events_do_not_interfere() {
    let harness = std::sync::Arc::new(Harness::delete());

    let handles: Vec<_> = (0..16)
        .map(|i| {
            let harness = harness.clone();
            tokio::spawn(async move {
                let event = ElbEvent {
                    uuid: format!("op-{}", i),
                    name: if i % 2 == 0 { "lb".into() } else { String::new() },
                    ..test_event()
                };
                harness.controller.handle(&payload(&event)).await
            })
        })
        .collect();

    for handle in handles {
        handle.await.unwrap();
    }

    assert_eq!(harness.bus.messages_for_subject(DONE).len(), 8);
    assert_eq!(harness.bus.messages_for_subject(ERROR).len(), 8);
    for msg in harness.bus.messages_for_subject(ERROR) {
        let event: ElbEvent = decode(&msg.payload).unwrap();
        let n: usize = event.uuid.trim_start_matches("op-").parse().unwrap();
        assert_eq!(n % 2, 1);
    }
}
