//! Events delivered by the bus to registered handlers.

use super::{EventType, HandlerDomainError};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;
use uuid::Uuid;

/// Unique identifier for a delivered event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EventId(Uuid);

impl EventId {
    /// Creates a new random event identifier.
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for EventId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for EventId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Event envelope handed to subscribed handlers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BusEvent {
    id: EventId,
    event_type: EventType,
    payload: Value,
    metadata: Map<String, Value>,
}

impl BusEvent {
    /// Creates an event with a fresh identifier and empty metadata.
    ///
    /// # Errors
    ///
    /// Returns [`HandlerDomainError::EmptyEventType`] when the event type is
    /// empty after trimming.
    pub fn new(event_type: impl Into<String>, payload: Value) -> Result<Self, HandlerDomainError> {
        Ok(Self {
            id: EventId::new(),
            event_type: EventType::new(event_type)?,
            payload,
            metadata: Map::new(),
        })
    }

    /// Adds a metadata entry.
    #[must_use]
    pub fn with_metadata(mut self, key: impl Into<String>, value: Value) -> Self {
        self.metadata.insert(key.into(), value);
        self
    }

    /// Returns the event identifier.
    #[must_use]
    pub const fn id(&self) -> EventId {
        self.id
    }

    /// Returns the event type.
    #[must_use]
    pub const fn event_type(&self) -> &EventType {
        &self.event_type
    }

    /// Returns the event body.
    #[must_use]
    pub const fn payload(&self) -> &Value {
        &self.payload
    }

    /// Returns the event metadata.
    #[must_use]
    pub const fn metadata(&self) -> &Map<String, Value> {
        &self.metadata
    }
}
