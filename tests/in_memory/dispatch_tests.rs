//! In-memory integration tests for event delivery to registered handlers.

use std::sync::Arc;
use std::time::Duration;

use autowire::event_handler::domain::BusEvent;
use rstest::rstest;
use serde_json::json;

use super::helpers::{
    AuditTrail, Journal, MailerRegistration, UserService, Wiring, journal, journal_methods,
    wiring,
};

async fn wait_for_entries(journal: &Journal, expected: usize) {
    for _ in 0..100 {
        if journal_methods(journal).len() >= expected {
            return;
        }
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn user_created_reaches_bound_methods(wiring: Wiring, journal: Journal) {
    wiring
        .coordinator
        .register_event_handlers(Arc::new(UserService {
            journal: Arc::clone(&journal),
        }))
        .await
        .expect("registration should succeed");

    let event = BusEvent::new("user.created", json!({"email": "ada@example.com"}))
        .expect("valid event");
    let delivered = wiring.bus.dispatch(event).await.expect("dispatch should succeed");
    wait_for_entries(&journal, 2).await;

    assert_eq!(delivered, 2);
    let mut methods = journal_methods(&journal);
    methods.sort();
    assert_eq!(methods, ["on_user_created", "send_welcome"]);
    let payloads = journal.lock().expect("journal lock");
    assert!(
        payloads
            .iter()
            .all(|(_, payload)| payload == &json!({"email": "ada@example.com"}))
    );
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn failing_handler_is_retried_and_contained(wiring: Wiring, journal: Journal) {
    wiring
        .coordinator
        .register_event_handlers(Arc::new(UserService {
            journal: Arc::clone(&journal),
        }))
        .await
        .expect("registration should succeed");

    let event = BusEvent::new("user.deleted", json!({"protected": true})).expect("valid event");
    let result = wiring.bus.dispatch(event).await;

    assert!(result.is_ok());
    assert_eq!(
        journal_methods(&journal),
        ["on_user_deleted", "on_user_deleted", "on_user_deleted"]
    );
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn capability_target_receives_events(wiring: Wiring, journal: Journal) {
    wiring
        .coordinator
        .register_event_handlers(Arc::new(MailerRegistration::new(
            Arc::clone(&journal),
            true,
        )))
        .await
        .expect("registration should succeed");

    let paid = BusEvent::new("order.paid", json!({"order": 42})).expect("valid event");
    let refunded = BusEvent::new("order.refunded", json!({"order": 42})).expect("valid event");
    let paid_receivers = wiring.bus.dispatch(paid).await.expect("dispatch should succeed");
    let refunded_receivers = wiring
        .bus
        .dispatch(refunded)
        .await
        .expect("dispatch should succeed");

    assert_eq!(paid_receivers, 1);
    assert_eq!(refunded_receivers, 0);
    assert_eq!(journal_methods(&journal), ["on_order_paid"]);
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn dispatch_counts_only_delivered_events(wiring: Wiring, journal: Journal) {
    wiring
        .coordinator
        .register_event_handlers(Arc::new(AuditTrail {
            journal: Arc::clone(&journal),
        }))
        .await
        .expect("registration should succeed");

    for event_type in ["audit.recorded", "audit.ignored", "audit.recorded"] {
        let event = BusEvent::new(event_type, json!({})).expect("valid event");
        wiring.bus.dispatch(event).await.expect("dispatch should succeed");
    }

    let stats = wiring
        .coordinator
        .consumer_stats()
        .await
        .expect("consumer stats readable");
    assert_eq!(stats.events_dispatched, 2);
    assert_eq!(journal_methods(&journal), ["append", "append"]);
}
