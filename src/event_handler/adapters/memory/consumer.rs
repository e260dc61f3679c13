//! In-memory event bus consumer and a late-bound provider for it.

use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicU32, AtomicU64, Ordering};
use std::sync::{Arc, RwLock};
use tracing::debug;

use crate::event_handler::{
    domain::{BusEvent, EventType},
    ports::{
        ConsumerError, ConsumerLookupError, ConsumerLookupResult, ConsumerProvider,
        ConsumerResult, ConsumerStats, EventConsumer, SubscribedHandler,
    },
};

/// In-memory event bus consumer.
///
/// Handlers are kept per event type and invoked in subscription order by
/// [`InMemoryEventConsumer::dispatch`]. Suitable for single-process wiring
/// and tests; a distributed deployment would adapt a real transport.
#[derive(Clone, Default)]
pub struct InMemoryEventConsumer {
    state: Arc<RwLock<ConsumerState>>,
    events_dispatched: Arc<AtomicU64>,
}

#[derive(Default)]
struct ConsumerState {
    handlers: HashMap<EventType, Vec<Arc<dyn SubscribedHandler>>>,
    rejected: HashSet<EventType>,
}

fn poisoned(err: impl ToString) -> ConsumerError {
    ConsumerError::transport(std::io::Error::other(err.to_string()))
}

impl InMemoryEventConsumer {
    /// Creates a consumer with no subscriptions.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes every later `subscribe` call for `event_type` fail.
    ///
    /// # Errors
    ///
    /// Returns transport errors when lock acquisition fails.
    pub fn reject_event_type(&self, event_type: EventType) -> ConsumerResult<()> {
        let mut state = self.state.write().map_err(poisoned)?;
        state.rejected.insert(event_type);
        Ok(())
    }

    /// Returns the number of handlers subscribed to `event_type`.
    ///
    /// # Errors
    ///
    /// Returns transport errors when lock acquisition fails.
    pub fn handler_count(&self, event_type: &EventType) -> ConsumerResult<usize> {
        let state = self.state.read().map_err(poisoned)?;
        Ok(state.handlers.get(event_type).map_or(0, Vec::len))
    }

    /// Delivers an event to every handler subscribed to its type.
    ///
    /// Handlers run one after another on the calling task. Returns the number
    /// of handlers the event was delivered to.
    ///
    /// # Errors
    ///
    /// Returns transport errors when lock acquisition fails.
    pub async fn dispatch(&self, event: BusEvent) -> ConsumerResult<usize> {
        let handlers = {
            let state = self.state.read().map_err(poisoned)?;
            state
                .handlers
                .get(event.event_type())
                .cloned()
                .unwrap_or_default()
        };

        if handlers.is_empty() {
            debug!(event_type = %event.event_type(), "event dropped (no handlers)");
            return Ok(0);
        }

        self.events_dispatched.fetch_add(1, Ordering::Relaxed);
        for handler in &handlers {
            handler.handle(event.clone()).await;
        }
        debug!(
            event_type = %event.event_type(),
            event_id = %event.id(),
            receivers = handlers.len(),
            "event dispatched"
        );
        Ok(handlers.len())
    }
}

#[async_trait]
impl EventConsumer for InMemoryEventConsumer {
    async fn subscribe(
        &self,
        event_type: &EventType,
        handler: Arc<dyn SubscribedHandler>,
    ) -> ConsumerResult<()> {
        let mut state = self.state.write().map_err(poisoned)?;
        if state.rejected.contains(event_type) {
            return Err(ConsumerError::Rejected {
                event_type: event_type.clone(),
                reason: "event type is not accepted by this bus".to_owned(),
            });
        }
        state
            .handlers
            .entry(event_type.clone())
            .or_default()
            .push(handler);
        Ok(())
    }

    async fn unsubscribe(&self, event_type: &EventType) -> ConsumerResult<()> {
        let mut state = self.state.write().map_err(poisoned)?;
        state.handlers.remove(event_type);
        Ok(())
    }

    fn stats(&self) -> ConsumerStats {
        let (subscribed_event_types, handler_count) = self.state.read().map_or((0, 0), |state| {
            (
                state.handlers.len(),
                state.handlers.values().map(Vec::len).sum(),
            )
        });
        ConsumerStats {
            subscribed_event_types,
            handler_count,
            events_dispatched: self.events_dispatched.load(Ordering::Relaxed),
        }
    }
}

/// Consumer provider whose consumer is installed after construction.
///
/// Models a host container that wires the bus asynchronously: lookups
/// report [`ConsumerLookupError::NotReady`] until [`install`] is called.
///
/// [`install`]: DeferredConsumerProvider::install
#[derive(Clone, Default)]
pub struct DeferredConsumerProvider {
    slot: Arc<RwLock<Option<Arc<dyn EventConsumer>>>>,
    lookups: Arc<AtomicU32>,
}

impl DeferredConsumerProvider {
    /// Creates a provider with no consumer installed.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a provider with a consumer already installed.
    #[must_use]
    pub fn ready(consumer: Arc<dyn EventConsumer>) -> Self {
        Self {
            slot: Arc::new(RwLock::new(Some(consumer))),
            lookups: Arc::new(AtomicU32::new(0)),
        }
    }

    /// Installs the consumer, making later lookups succeed.
    ///
    /// # Errors
    ///
    /// Returns [`ConsumerLookupError::Failed`] when lock acquisition fails.
    pub fn install(&self, consumer: Arc<dyn EventConsumer>) -> ConsumerLookupResult<()> {
        let mut slot = self.slot.write().map_err(|err| {
            ConsumerLookupError::failed(std::io::Error::other(err.to_string()))
        })?;
        *slot = Some(consumer);
        Ok(())
    }

    /// Returns how many lookups have been made.
    #[must_use]
    pub fn lookups(&self) -> u32 {
        self.lookups.load(Ordering::Relaxed)
    }
}

#[async_trait]
impl ConsumerProvider for DeferredConsumerProvider {
    async fn consumer(&self) -> ConsumerLookupResult<Arc<dyn EventConsumer>> {
        self.lookups.fetch_add(1, Ordering::Relaxed);
        let slot = self.slot.read().map_err(|err| {
            ConsumerLookupError::failed(std::io::Error::other(err.to_string()))
        })?;
        slot.clone().ok_or(ConsumerLookupError::NotReady)
    }
}
