//! Registration record owned by the ledger.

use super::{EventType, HandlerDescriptor, ServiceIdentity};
use chrono::{DateTime, Utc};
use mockable::Clock;
use serde::{Deserialize, Serialize};

/// Handlers one strategy subscribed on behalf of one service.
///
/// The descriptor list holds exactly the handlers whose `subscribe` call
/// succeeded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegistrationRecord {
    identity: ServiceIdentity,
    descriptors: Vec<HandlerDescriptor>,
    strategy_used: String,
    registered_at: DateTime<Utc>,
}

impl RegistrationRecord {
    /// Creates a record stamped with the current clock time.
    #[must_use]
    pub fn new(
        identity: ServiceIdentity,
        descriptors: Vec<HandlerDescriptor>,
        strategy_used: impl Into<String>,
        clock: &impl Clock,
    ) -> Self {
        Self {
            identity,
            descriptors,
            strategy_used: strategy_used.into(),
            registered_at: clock.utc(),
        }
    }

    /// Returns the service identity.
    #[must_use]
    pub const fn identity(&self) -> &ServiceIdentity {
        &self.identity
    }

    /// Returns the subscribed handler descriptors in registration order.
    #[must_use]
    pub fn descriptors(&self) -> &[HandlerDescriptor] {
        &self.descriptors
    }

    /// Returns the name of the strategy that produced this record.
    #[must_use]
    pub fn strategy_used(&self) -> &str {
        &self.strategy_used
    }

    /// Returns when the registration completed.
    #[must_use]
    pub const fn registered_at(&self) -> DateTime<Utc> {
        self.registered_at
    }

    /// Returns the number of subscribed handlers.
    #[must_use]
    pub fn handler_count(&self) -> usize {
        self.descriptors.len()
    }

    /// Returns each distinct event type once, in registration order.
    #[must_use]
    pub fn event_types(&self) -> Vec<EventType> {
        let mut types: Vec<EventType> = Vec::with_capacity(self.descriptors.len());
        for descriptor in &self.descriptors {
            if !types.contains(descriptor.event_type()) {
                types.push(descriptor.event_type().clone());
            }
        }
        types
    }

    /// Consumes the record, returning its descriptors.
    #[must_use]
    pub fn into_descriptors(self) -> Vec<HandlerDescriptor> {
        self.descriptors
    }
}
