//! Subscription primitive shared by the registration strategies.

use super::{ConsumerReadinessGate, RegistrationError, RegistrationResult};
use crate::event_handler::{
    domain::{BusEvent, EventType, HandlerDescriptor, HandlerInvocationError, ServiceInstance},
    ports::{EventConsumer, SubscribedHandler},
};
use async_trait::async_trait;
use futures::FutureExt;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, error, warn};

/// Subscribes bound handler methods to the event bus.
#[derive(Clone)]
pub struct HandlerSubscriber {
    gate: Arc<ConsumerReadinessGate>,
}

impl HandlerSubscriber {
    /// Creates a subscriber that acquires the consumer through `gate`.
    #[must_use]
    pub const fn new(gate: Arc<ConsumerReadinessGate>) -> Self {
        Self { gate }
    }

    /// Returns the readiness gate.
    #[must_use]
    pub const fn gate(&self) -> &Arc<ConsumerReadinessGate> {
        &self.gate
    }

    /// Subscribes each descriptor's method on `target`, in order.
    ///
    /// A descriptor that cannot be bound or subscribed is logged and
    /// skipped. Returns the descriptors that were subscribed.
    ///
    /// # Errors
    ///
    /// Returns [`RegistrationError::Readiness`] when the consumer cannot be
    /// acquired.
    pub async fn subscribe_all(
        &self,
        target: &Arc<dyn ServiceInstance>,
        descriptors: Vec<HandlerDescriptor>,
    ) -> RegistrationResult<Vec<HandlerDescriptor>> {
        if descriptors.is_empty() {
            return Ok(Vec::new());
        }
        let consumer = self.gate.acquire().await?;
        let identity = target.identity();

        let mut registered = Vec::with_capacity(descriptors.len());
        for descriptor in descriptors {
            match subscribe_one(consumer.as_ref(), target, &descriptor).await {
                Ok(()) => {
                    debug!(
                        service = %identity,
                        event_type = %descriptor.event_type(),
                        method = descriptor.method_name(),
                        "event handler subscribed"
                    );
                    registered.push(descriptor);
                }
                Err(err) => {
                    warn!(service = %identity, error = %err, "skipping event handler");
                }
            }
        }
        Ok(registered)
    }

    /// Removes the bus subscriptions for each event type.
    ///
    /// Failures are logged. Returns the number of event types unsubscribed.
    pub async fn unsubscribe_all(&self, event_types: &[EventType]) -> usize {
        let consumer = match self.gate.acquire().await {
            Ok(consumer) => consumer,
            Err(err) => {
                warn!(error = %err, "cannot unsubscribe event handlers");
                return 0;
            }
        };

        let mut removed = 0;
        for event_type in event_types {
            match consumer.unsubscribe(event_type).await {
                Ok(()) => removed += 1,
                Err(err) => {
                    warn!(event_type = %event_type, error = %err, "failed to unsubscribe");
                }
            }
        }
        removed
    }
}

async fn subscribe_one(
    consumer: &dyn EventConsumer,
    target: &Arc<dyn ServiceInstance>,
    descriptor: &HandlerDescriptor,
) -> RegistrationResult<()> {
    let failed = |reason: String| RegistrationError::HandlerRegistrationFailed {
        event_type: descriptor.event_type().clone(),
        method: descriptor.method_name().to_owned(),
        reason,
    };

    if !target.responds_to(descriptor.method_name()) {
        return Err(failed(
            HandlerInvocationError::UnknownMethod(descriptor.method_name().to_owned()).to_string(),
        ));
    }

    let handler: Arc<dyn SubscribedHandler> =
        Arc::new(BoundHandler::new(Arc::clone(target), descriptor.clone()));
    consumer
        .subscribe(descriptor.event_type(), handler)
        .await
        .map_err(|err| failed(err.to_string()))
}

/// A handler method bound to its service.
///
/// Invocation errors and panics are logged and never reach the bus.
struct BoundHandler {
    target: Arc<dyn ServiceInstance>,
    descriptor: HandlerDescriptor,
}

impl BoundHandler {
    const fn new(target: Arc<dyn ServiceInstance>, descriptor: HandlerDescriptor) -> Self {
        Self { target, descriptor }
    }

    async fn deliver(
        target: Arc<dyn ServiceInstance>,
        descriptor: HandlerDescriptor,
        event: BusEvent,
    ) {
        let outcome = AssertUnwindSafe(invoke_with_retry(target.as_ref(), &descriptor, &event))
            .catch_unwind()
            .await
            .unwrap_or_else(|payload| Err(HandlerInvocationError::panicked(&*payload)));
        if let Err(err) = outcome {
            error!(
                service = %target.identity(),
                method = descriptor.method_name(),
                event_type = %event.event_type(),
                event_id = %event.id(),
                error = %err,
                "event handler failed"
            );
        }
    }
}

async fn invoke_with_retry(
    target: &dyn ServiceInstance,
    descriptor: &HandlerDescriptor,
    event: &BusEvent,
) -> Result<(), HandlerInvocationError> {
    let (max_attempts, backoff) = descriptor
        .retry_policy()
        .map_or((1, Duration::ZERO), |policy| {
            (policy.max_attempts(), policy.backoff())
        });

    let mut attempt = 1;
    loop {
        match target.invoke(descriptor.method_name(), event).await {
            Ok(()) => return Ok(()),
            Err(err) if attempt < max_attempts => {
                debug!(
                    method = descriptor.method_name(),
                    attempt,
                    max_attempts,
                    error = %err,
                    "retrying event handler"
                );
                tokio::time::sleep(backoff).await;
                attempt += 1;
            }
            Err(err) => return Err(err),
        }
    }
}

#[async_trait]
impl SubscribedHandler for BoundHandler {
    async fn handle(&self, event: BusEvent) {
        let target = Arc::clone(&self.target);
        let descriptor = self.descriptor.clone();
        if descriptor.is_async() {
            drop(tokio::spawn(Self::deliver(target, descriptor, event)));
        } else {
            Self::deliver(target, descriptor, event).await;
        }
    }
}
