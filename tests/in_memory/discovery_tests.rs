//! In-memory integration tests for discovery passes and the ledger.

use std::sync::Arc;

use autowire::event_handler::{
    adapters::memory::{DeferredConsumerProvider, InMemoryEventConsumer, StaticInstanceSource},
    domain::{HandlerDescriptor, ServiceInstance},
    ports::EventConsumer,
    services::{DiscoverySummary, ReadinessConfig},
};
use rstest::rstest;

use super::helpers::{
    AuditTrail, Journal, MailerRegistration, UserRepository, UserService, Wiring, journal,
    wire, wiring,
};

fn host_services(journal: &Journal) -> Vec<Arc<dyn ServiceInstance>> {
    vec![
        Arc::new(UserService {
            journal: Arc::clone(journal),
        }),
        Arc::new(MailerRegistration::new(Arc::clone(journal), true)),
        Arc::new(AuditTrail {
            journal: Arc::clone(journal),
        }),
        Arc::new(UserRepository),
    ]
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn discovery_registers_each_mechanism(wiring: Wiring, journal: Journal) {
    let summary = wiring.coordinator.run_discovery(host_services(&journal)).await;

    assert_eq!(
        summary,
        DiscoverySummary {
            total_registered: 5,
            services_touched: 3,
        }
    );

    let stats = wiring
        .coordinator
        .registration_stats()
        .await
        .expect("stats should be readable");
    assert_eq!(stats.total_services, 3);
    assert_eq!(stats.total_handlers, 5);
    assert_eq!(stats.services_by_strategy.get("declared"), Some(&1));
    assert_eq!(stats.services_by_strategy.get("capability"), Some(&1));
    assert_eq!(stats.services_by_strategy.get("convention"), Some(&1));
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn capability_callback_sees_only_subscribed_handlers(wiring: Wiring, journal: Journal) {
    let registration = Arc::new(MailerRegistration::new(journal, true));

    let count = wiring
        .coordinator
        .register_event_handlers(registration.clone())
        .await
        .expect("registration should succeed");

    assert_eq!(count, 1);
    let registered = registration.registered.lock().expect("registered lock");
    let methods: Vec<&str> = registered.iter().map(HandlerDescriptor::method_name).collect();
    assert_eq!(methods, ["on_order_paid"]);
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn rejected_capability_registers_nothing(wiring: Wiring, journal: Journal) {
    let registration = Arc::new(MailerRegistration::new(journal, false));

    let count = wiring
        .coordinator
        .register_event_handlers(registration.clone())
        .await
        .expect("validation failure should be contained");

    assert_eq!(count, 0);
    assert_eq!(wiring.bus.stats().handler_count, 0);
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn discover_reads_the_host_container(wiring: Wiring, journal: Journal) {
    let source = StaticInstanceSource::new(host_services(&journal));

    let summary = wiring
        .coordinator
        .discover(&source)
        .await
        .expect("discovery should succeed");

    assert_eq!(summary.services_touched, 3);
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn late_bus_is_awaited_by_the_gate(journal: Journal) {
    let bus = InMemoryEventConsumer::new();
    let provider = DeferredConsumerProvider::new();
    let wiring = wire(bus.clone(), provider.clone(), ReadinessConfig::new(50, 5));

    let installer = tokio::spawn(async move {
        tokio::time::sleep(std::time::Duration::from_millis(20)).await;
        provider
            .install(Arc::new(bus))
            .expect("install should succeed");
    });
    let count = wiring
        .coordinator
        .register_event_handlers(Arc::new(UserService { journal }))
        .await
        .expect("registration should succeed");
    installer.await.expect("installer should finish");

    assert_eq!(count, 3);
    assert!(wiring.provider.lookups() > 1);
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn missing_bus_degrades_to_zero(journal: Journal) {
    let wiring = wire(
        InMemoryEventConsumer::new(),
        DeferredConsumerProvider::new(),
        ReadinessConfig::new(3, 1),
    );

    let summary = wiring.coordinator.run_discovery(host_services(&journal)).await;

    assert_eq!(summary, DiscoverySummary::default());
    assert!(wiring.provider.lookups() >= 3);
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn unregister_then_register_again(wiring: Wiring, journal: Journal) {
    let service: Arc<dyn ServiceInstance> = Arc::new(UserService { journal });
    wiring
        .coordinator
        .register_event_handlers(Arc::clone(&service))
        .await
        .expect("registration should succeed");

    let removed = wiring
        .coordinator
        .unregister_event_handlers(service.as_ref())
        .await
        .expect("unregistration should succeed");
    assert_eq!(removed, 3);
    assert_eq!(wiring.bus.stats().subscribed_event_types, 0);

    let count = wiring
        .coordinator
        .register_event_handlers(Arc::clone(&service))
        .await
        .expect("second registration should succeed");
    assert_eq!(count, 3);
    assert_eq!(wiring.bus.stats().handler_count, 3);
}
