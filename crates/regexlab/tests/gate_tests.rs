//! Integration tests for the validation gate.

use std::sync::Arc;
use std::time::Duration;

use regexlab::error::Operation;
use regexlab::mock::MockBuilder;
use regexlab::{SessionMetrics, ValidationGate, ValidationState};

#[tokio::test]
async fn x_resolving_last_leaves_y_displayed() {
    let service = MockBuilder::new()
        .valid("x")
        .invalid("y")
        .delay_ms("x", 80)
        .build();
    let metrics = Arc::new(SessionMetrics::new());
    let gate = ValidationGate::with_metrics(Arc::new(service), Arc::clone(&metrics));

    let (x, y) = tokio::join!(gate.validate("x"), async {
        tokio::time::sleep(Duration::from_millis(5)).await;
        gate.validate("y").await
    });

    assert!(x);
    assert!(!y);
    assert_eq!(gate.state(), ValidationState::Invalid);

    let snapshot = metrics.snapshot();
    assert_eq!(snapshot.validations, 2);
    assert_eq!(snapshot.superseded_validations, 1);
}

#[tokio::test]
async fn in_order_completion_applies_each() {
    let service = MockBuilder::new()
        .invalid("x")
        .delay_ms("y", 30)
        .build();
    let gate = ValidationGate::new(Arc::new(service));

    let (x, y) = tokio::join!(gate.validate_tracked("x"), gate.validate_tracked("y"));

    assert!(x.applied);
    assert!(y.applied);
    assert_eq!(gate.state(), ValidationState::Valid);
}

#[tokio::test]
async fn failure_and_rejection_look_the_same() {
    let rejecting = ValidationGate::new(Arc::new(MockBuilder::new().invalid_by_default().build()));
    let failing = ValidationGate::new(Arc::new(
        MockBuilder::new().fail(Operation::Validate).build(),
    ));

    assert_eq!(rejecting.validate("a").await, failing.validate("a").await);
    assert_eq!(rejecting.state(), failing.state());
}

#[tokio::test]
async fn malformed_response_fails_closed() {
    let metrics = Arc::new(SessionMetrics::new());
    let gate = ValidationGate::with_metrics(
        Arc::new(MockBuilder::new().malformed(Operation::Validate).build()),
        Arc::clone(&metrics),
    );

    assert!(!gate.validate("a").await);
    assert_eq!(metrics.snapshot().validation_failures, 1);
}

#[tokio::test]
async fn local_service_validates_rust_dialect() {
    let gate = ValidationGate::new(Arc::new(regexlab::LocalService::new()));
    assert!(gate.validate(r"(?P<year>\d{4})").await);
    assert!(!gate.validate(r"a{2,1}").await);
}

#[tokio::test]
async fn burst_of_keystrokes_settles_on_last() {
    // Earlier keystrokes answer later.
    let patterns = ["a", "ab", "ab(", "ab(c", "ab(c)"];
    let mut builder = MockBuilder::new().invalid("ab(").invalid("ab(c");
    for (i, pattern) in patterns.iter().enumerate() {
        builder = builder.delay_ms(pattern, 20 * (patterns.len() - i) as u64);
    }
    let metrics = Arc::new(SessionMetrics::new());
    let gate = ValidationGate::with_metrics(Arc::new(builder.build()), Arc::clone(&metrics));

    let results = futures::future::join_all(patterns.iter().map(|p| gate.validate_tracked(p))).await;

    let applied: Vec<_> = results.iter().filter(|r| r.applied).collect();
    assert_eq!(applied.len(), 1);
    assert_eq!(applied[0].ticket, 5);
    assert_eq!(gate.state(), ValidationState::Valid);
    assert_eq!(metrics.snapshot().superseded_validations, 4);
}
