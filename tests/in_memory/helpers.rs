//! Host services and wiring shared by the in-memory integration tests.

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use autowire::event_handler::{
    adapters::memory::{DeferredConsumerProvider, InMemoryEventConsumer, InMemoryRegistrationLedger},
    domain::{
        AutoRegister, BusEvent, ClassMetadata, EventHandlerCapability, HandlerDescriptor,
        HandlerInvocationError, HandlerSpec, HandlerTag, MethodEntry, RetryPolicy,
        ServiceIdentity, ServiceInstance,
    },
    services::{DiscoveryConfig, DiscoveryCoordinator, ReadinessConfig},
};
use mockable::DefaultClock;
use rstest::fixture;
use serde_json::Value;

/// Coordinator type used across the integration tests.
pub type TestCoordinator = DiscoveryCoordinator<InMemoryRegistrationLedger, DefaultClock>;

/// Journal of handler invocations, shared between a service and its test.
pub type Journal = Arc<Mutex<Vec<(String, Value)>>>;

/// Returns the method names recorded in `journal`.
pub fn journal_methods(journal: &Journal) -> Vec<String> {
    journal
        .lock()
        .expect("journal lock")
        .iter()
        .map(|(method, _)| method.clone())
        .collect()
}

fn record(journal: &Journal, method: &str, event: &BusEvent) {
    journal
        .lock()
        .expect("journal lock")
        .push((method.to_owned(), event.payload().clone()));
}

/// Service declaring its handlers with method tags.
pub struct UserService {
    pub journal: Journal,
}

#[async_trait]
impl ServiceInstance for UserService {
    fn identity(&self) -> ServiceIdentity {
        ServiceIdentity::of::<Self>()
    }

    fn class_metadata(&self) -> ClassMetadata {
        ClassMetadata::new()
            .with_auto_register(AutoRegister::declared())
            .with_method_tag(
                "send_welcome",
                HandlerTag::new("user.created").asynchronous(),
            )
    }

    fn method_table(&self) -> Vec<MethodEntry> {
        vec![
            MethodEntry::new("new"),
            MethodEntry::tagged("on_user_created", HandlerTag::new("user.created")),
            MethodEntry::tagged(
                "on_user_deleted",
                HandlerTag::new("user.deleted")
                    .with_retry(RetryPolicy::new(3, 1).expect("valid retry policy")),
            ),
            MethodEntry::new("send_welcome"),
            MethodEntry::new("find_by_email"),
        ]
    }

    async fn invoke(&self, method: &str, event: &BusEvent) -> Result<(), HandlerInvocationError> {
        match method {
            "on_user_created" | "send_welcome" => {
                record(&self.journal, method, event);
                Ok(())
            }
            "on_user_deleted" => {
                record(&self.journal, method, event);
                if event.payload().get("protected").is_some() {
                    return Err(HandlerInvocationError::failed(std::io::Error::other(
                        "protected users cannot be deleted",
                    )));
                }
                Ok(())
            }
            other => Err(HandlerInvocationError::UnknownMethod(other.to_owned())),
        }
    }
}

/// Handler target listed by [`MailerRegistration`].
pub struct Mailer {
    pub journal: Journal,
}

#[async_trait]
impl ServiceInstance for Mailer {
    fn identity(&self) -> ServiceIdentity {
        ServiceIdentity::of::<Self>()
    }

    fn method_table(&self) -> Vec<MethodEntry> {
        vec![MethodEntry::new("on_order_paid")]
    }

    async fn invoke(&self, method: &str, event: &BusEvent) -> Result<(), HandlerInvocationError> {
        if method != "on_order_paid" {
            return Err(HandlerInvocationError::UnknownMethod(method.to_owned()));
        }
        record(&self.journal, method, event);
        Ok(())
    }
}

/// Capability-style service listing the mailer's handlers.
pub struct MailerRegistration {
    pub mailer: Arc<Mailer>,
    pub accepted: bool,
    pub registered: Mutex<Vec<HandlerDescriptor>>,
}

impl MailerRegistration {
    /// Creates a registration over a fresh mailer.
    pub fn new(journal: Journal, accepted: bool) -> Self {
        Self {
            mailer: Arc::new(Mailer { journal }),
            accepted,
            registered: Mutex::new(Vec::new()),
        }
    }
}

#[async_trait]
impl ServiceInstance for MailerRegistration {
    fn identity(&self) -> ServiceIdentity {
        ServiceIdentity::of::<Self>()
    }

    fn as_capability(&self) -> Option<&dyn EventHandlerCapability> {
        Some(self)
    }

    async fn invoke(&self, method: &str, _event: &BusEvent) -> Result<(), HandlerInvocationError> {
        Err(HandlerInvocationError::UnknownMethod(method.to_owned()))
    }
}

impl EventHandlerCapability for MailerRegistration {
    fn event_handlers(&self) -> Vec<HandlerSpec> {
        vec![
            HandlerSpec::new("on_order_paid", HandlerTag::new("order.paid").with_priority(1)),
            HandlerSpec::new("on_order_refunded", HandlerTag::new("order.refunded")),
        ]
    }

    fn service_instance(&self) -> Option<Arc<dyn ServiceInstance>> {
        Some(self.mailer.clone())
    }

    fn validate_event_handlers(&self) -> bool {
        self.accepted
    }

    fn on_event_handlers_registered(&self, handlers: &[HandlerDescriptor]) {
        self.registered
            .lock()
            .expect("registered lock")
            .extend_from_slice(handlers);
    }
}

/// Service picked up because it derives from a recognized base type.
pub struct AuditTrail {
    pub journal: Journal,
}

#[async_trait]
impl ServiceInstance for AuditTrail {
    fn identity(&self) -> ServiceIdentity {
        ServiceIdentity::of::<Self>()
    }

    fn class_metadata(&self) -> ClassMetadata {
        ClassMetadata::new()
            .extends("BaseEventHandler")
            .with_class_tag(HandlerTag::new("audit.recorded"))
    }

    fn method_table(&self) -> Vec<MethodEntry> {
        vec![MethodEntry::new("append")]
    }

    async fn invoke(&self, method: &str, event: &BusEvent) -> Result<(), HandlerInvocationError> {
        record(&self.journal, method, event);
        Ok(())
    }
}

/// Service with no handler declarations at all.
pub struct UserRepository;

#[async_trait]
impl ServiceInstance for UserRepository {
    fn identity(&self) -> ServiceIdentity {
        ServiceIdentity::of::<Self>()
    }

    fn method_table(&self) -> Vec<MethodEntry> {
        vec![MethodEntry::new("save"), MethodEntry::new("load")]
    }

    async fn invoke(&self, method: &str, _event: &BusEvent) -> Result<(), HandlerInvocationError> {
        Err(HandlerInvocationError::UnknownMethod(method.to_owned()))
    }
}

/// Coordinator wired to an in-memory bus and ledger.
pub struct Wiring {
    pub coordinator: TestCoordinator,
    pub bus: InMemoryEventConsumer,
    pub provider: DeferredConsumerProvider,
}

/// Provides a fresh journal.
#[fixture]
pub fn journal() -> Journal {
    Arc::new(Mutex::new(Vec::new()))
}

/// Provides a coordinator whose bus is already wired.
#[fixture]
pub fn wiring() -> Wiring {
    let bus = InMemoryEventConsumer::new();
    let provider = DeferredConsumerProvider::ready(Arc::new(bus.clone()));
    wire(bus, provider, ReadinessConfig::immediate())
}

/// Builds a coordinator over the given bus, provider and polling policy.
pub fn wire(
    bus: InMemoryEventConsumer,
    provider: DeferredConsumerProvider,
    readiness: ReadinessConfig,
) -> Wiring {
    let config = DiscoveryConfig::default().with_readiness(readiness);
    let coordinator = DiscoveryCoordinator::new(
        Arc::new(InMemoryRegistrationLedger::new()),
        Arc::new(provider.clone()),
        Arc::new(DefaultClock),
        &config,
    );
    Wiring {
        coordinator,
        bus,
        provider,
    }
}
