//! Handler descriptors and the declaration tags they are built from.

use super::HandlerDomainError;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;
use std::time::Duration;

/// Validated, non-empty event type name such as `user.created`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct EventType(String);

impl EventType {
    /// Creates a validated event type.
    ///
    /// Surrounding whitespace is trimmed; case is preserved.
    ///
    /// # Errors
    ///
    /// Returns [`HandlerDomainError::EmptyEventType`] when the value is empty
    /// after trimming.
    pub fn new(value: impl Into<String>) -> Result<Self, HandlerDomainError> {
        let raw = value.into();
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(HandlerDomainError::EmptyEventType);
        }
        Ok(Self(trimmed.to_owned()))
    }

    /// Returns the event type as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for EventType {
    type Error = HandlerDomainError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<EventType> for String {
    fn from(value: EventType) -> Self {
        value.0
    }
}

impl AsRef<str> for EventType {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

impl fmt::Display for EventType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Redelivery policy applied when a handler method fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RetryPolicy {
    max_attempts: u32,
    backoff_ms: u64,
}

impl RetryPolicy {
    /// Creates a retry policy.
    ///
    /// `max_attempts` counts the first invocation, so `1` means no retries.
    ///
    /// # Errors
    ///
    /// Returns [`HandlerDomainError::ZeroRetryAttempts`] when `max_attempts`
    /// is zero.
    pub const fn new(max_attempts: u32, backoff_ms: u64) -> Result<Self, HandlerDomainError> {
        if max_attempts == 0 {
            return Err(HandlerDomainError::ZeroRetryAttempts);
        }
        Ok(Self {
            max_attempts,
            backoff_ms,
        })
    }

    /// Returns the total number of invocation attempts.
    #[must_use]
    pub const fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    /// Returns the pause between attempts in milliseconds.
    #[must_use]
    pub const fn backoff_ms(&self) -> u64 {
        self.backoff_ms
    }

    /// Returns the pause between attempts.
    #[must_use]
    pub const fn backoff(&self) -> Duration {
        Duration::from_millis(self.backoff_ms)
    }
}

/// Event handler tag attached to a method by the declaration layer.
///
/// Tags are raw declarations: nothing is validated until the tag is turned
/// into a [`HandlerDescriptor`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HandlerTag {
    /// Event type the method handles.
    pub event_type: String,
    /// Optional precedence; lower values win.
    pub priority: Option<i32>,
    /// Whether the handler runs detached from the delivering task.
    pub is_async: Option<bool>,
    /// Optional redelivery policy.
    pub retry: Option<RetryPolicy>,
    /// Free-form handler options.
    pub metadata: Map<String, Value>,
}

impl HandlerTag {
    /// Creates a tag for the given event type with default policy.
    #[must_use]
    pub fn new(event_type: impl Into<String>) -> Self {
        Self {
            event_type: event_type.into(),
            ..Self::default()
        }
    }

    /// Sets the handler priority.
    #[must_use]
    pub const fn with_priority(mut self, priority: i32) -> Self {
        self.priority = Some(priority);
        self
    }

    /// Marks the handler as asynchronous.
    #[must_use]
    pub const fn asynchronous(mut self) -> Self {
        self.is_async = Some(true);
        self
    }

    /// Sets the redelivery policy.
    #[must_use]
    pub const fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = Some(retry);
        self
    }

    /// Adds a free-form option.
    #[must_use]
    pub fn with_metadata(mut self, key: impl Into<String>, value: Value) -> Self {
        self.metadata.insert(key.into(), value);
        self
    }
}

/// One entry returned by [`super::EventHandlerCapability::event_handlers`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HandlerSpec {
    /// Method on the target service that handles the event.
    pub method_name: String,
    /// Declared handling policy.
    pub tag: HandlerTag,
}

impl HandlerSpec {
    /// Creates a handler entry.
    #[must_use]
    pub fn new(method_name: impl Into<String>, tag: HandlerTag) -> Self {
        Self {
            method_name: method_name.into(),
            tag,
        }
    }

    /// Validates the entry into a descriptor.
    ///
    /// # Errors
    ///
    /// Returns [`HandlerDomainError`] when the event type or method name is
    /// empty.
    pub fn to_descriptor(&self) -> Result<HandlerDescriptor, HandlerDomainError> {
        HandlerDescriptor::from_tag(&self.method_name, &self.tag)
    }
}

/// Validated binding from an event type to a handler method.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HandlerDescriptor {
    event_type: EventType,
    method_name: String,
    priority: i32,
    is_async: bool,
    retry_policy: Option<RetryPolicy>,
    options: Map<String, Value>,
}

impl HandlerDescriptor {
    /// Creates a descriptor with default policy.
    ///
    /// # Errors
    ///
    /// Returns [`HandlerDomainError::EmptyEventType`] or
    /// [`HandlerDomainError::EmptyMethodName`] when either value is empty
    /// after trimming.
    pub fn new(
        event_type: impl Into<String>,
        method_name: impl Into<String>,
    ) -> Result<Self, HandlerDomainError> {
        let validated_type = EventType::new(event_type)?;
        let raw_method = method_name.into();
        let method = raw_method.trim();
        if method.is_empty() {
            return Err(HandlerDomainError::EmptyMethodName);
        }
        Ok(Self {
            event_type: validated_type,
            method_name: method.to_owned(),
            priority: 0,
            is_async: false,
            retry_policy: None,
            options: Map::new(),
        })
    }

    /// Builds a descriptor from a declaration tag.
    ///
    /// # Errors
    ///
    /// Returns [`HandlerDomainError`] when the tag's event type or the method
    /// name is empty.
    pub fn from_tag(method_name: &str, tag: &HandlerTag) -> Result<Self, HandlerDomainError> {
        let mut descriptor = Self::new(tag.event_type.as_str(), method_name)?
            .with_priority(tag.priority.unwrap_or_default())
            .with_async(tag.is_async.unwrap_or_default())
            .with_options(tag.metadata.clone());
        descriptor.retry_policy = tag.retry;
        Ok(descriptor)
    }

    /// Sets the handler priority.
    #[must_use]
    pub const fn with_priority(mut self, priority: i32) -> Self {
        self.priority = priority;
        self
    }

    /// Sets whether the handler runs detached from the delivering task.
    #[must_use]
    pub const fn with_async(mut self, is_async: bool) -> Self {
        self.is_async = is_async;
        self
    }

    /// Sets the redelivery policy.
    #[must_use]
    pub const fn with_retry_policy(mut self, retry_policy: RetryPolicy) -> Self {
        self.retry_policy = Some(retry_policy);
        self
    }

    /// Replaces the free-form options.
    #[must_use]
    pub fn with_options(mut self, options: Map<String, Value>) -> Self {
        self.options = options;
        self
    }

    /// Returns the handled event type.
    #[must_use]
    pub const fn event_type(&self) -> &EventType {
        &self.event_type
    }

    /// Returns the handler method name.
    #[must_use]
    pub fn method_name(&self) -> &str {
        &self.method_name
    }

    /// Returns the handler priority.
    #[must_use]
    pub const fn priority(&self) -> i32 {
        self.priority
    }

    /// Returns whether the handler runs detached from the delivering task.
    #[must_use]
    pub const fn is_async(&self) -> bool {
        self.is_async
    }

    /// Returns the redelivery policy, if any.
    #[must_use]
    pub const fn retry_policy(&self) -> Option<RetryPolicy> {
        self.retry_policy
    }

    /// Returns the free-form options.
    #[must_use]
    pub const fn options(&self) -> &Map<String, Value> {
        &self.options
    }
}
