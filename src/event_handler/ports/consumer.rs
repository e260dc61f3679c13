//! Event bus consumer port.

use crate::event_handler::domain::{BusEvent, EventType};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use thiserror::Error;

/// Result type for consumer operations.
pub type ConsumerResult<T> = Result<T, ConsumerError>;

/// Result type for consumer lookups.
pub type ConsumerLookupResult<T> = Result<T, ConsumerLookupError>;

/// Callback invoked by the bus for each delivered event.
///
/// Implementations own their error handling: nothing a handler does may
/// fail the bus's dispatch loop.
#[async_trait]
pub trait SubscribedHandler: Send + Sync {
    /// Handles one delivered event.
    async fn handle(&self, event: BusEvent);
}

/// Subscribe/unsubscribe side of the event bus.
#[async_trait]
pub trait EventConsumer: Send + Sync {
    /// Adds a handler for an event type.
    ///
    /// # Errors
    ///
    /// Returns [`ConsumerError`] when the bus rejects the subscription.
    async fn subscribe(
        &self,
        event_type: &EventType,
        handler: Arc<dyn SubscribedHandler>,
    ) -> ConsumerResult<()>;

    /// Removes every handler for an event type.
    ///
    /// # Errors
    ///
    /// Returns [`ConsumerError`] when the bus cannot remove the subscription.
    async fn unsubscribe(&self, event_type: &EventType) -> ConsumerResult<()>;

    /// Reports bus-side statistics.
    fn stats(&self) -> ConsumerStats;
}

/// Bus-side subscription statistics.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConsumerStats {
    /// Event types with at least one handler.
    pub subscribed_event_types: usize,
    /// Handlers across all event types.
    pub handler_count: usize,
    /// Events handed to at least one handler.
    pub events_dispatched: u64,
}

/// Errors returned by event bus consumers.
#[derive(Debug, Clone, Error)]
pub enum ConsumerError {
    /// The bus refused a subscription for the event type.
    #[error("subscription to '{event_type}' rejected: {reason}")]
    Rejected {
        /// Event type of the refused subscription.
        event_type: EventType,
        /// Reason reported by the bus.
        reason: String,
    },

    /// Transport-layer failure.
    #[error("event bus transport error: {0}")]
    Transport(Arc<dyn std::error::Error + Send + Sync>),
}

impl ConsumerError {
    /// Wraps a transport error.
    pub fn transport(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Transport(Arc::new(err))
    }
}

/// Access to the bus's consumer endpoint, which may be wired late.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ConsumerProvider: Send + Sync {
    /// Returns the consumer handle.
    ///
    /// # Errors
    ///
    /// Returns [`ConsumerLookupError::NotReady`] while the bus is still being
    /// constructed, or [`ConsumerLookupError::Failed`] when the lookup itself
    /// fails.
    async fn consumer(&self) -> ConsumerLookupResult<Arc<dyn EventConsumer>>;
}

/// Errors returned while looking up the consumer endpoint.
#[derive(Debug, Clone, Error)]
pub enum ConsumerLookupError {
    /// The consumer has not been constructed yet.
    #[error("event consumer is not ready")]
    NotReady,

    /// The lookup failed.
    #[error("event consumer lookup failed: {0}")]
    Failed(Arc<dyn std::error::Error + Send + Sync>),
}

impl ConsumerLookupError {
    /// Wraps a lookup failure.
    pub fn failed(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Failed(Arc::new(err))
    }
}
