//! Error types for event handler domain validation and invocation.

use std::any::Any;
use std::sync::Arc;
use thiserror::Error;

/// Errors returned while constructing event handler domain values.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum HandlerDomainError {
    /// The event type is empty after trimming.
    #[error("event type must not be empty")]
    EmptyEventType,

    /// The handler method name is empty after trimming.
    #[error("handler method name must not be empty")]
    EmptyMethodName,

    /// The service identity is empty after trimming.
    #[error("service identity must not be empty")]
    EmptyServiceIdentity,

    /// A retry policy allows no attempts at all.
    #[error("retry policy must allow at least one attempt")]
    ZeroRetryAttempts,
}

/// Errors raised by a service while handling a delivered event.
#[derive(Debug, Clone, Error)]
pub enum HandlerInvocationError {
    /// The service does not expose the requested method.
    #[error("service does not respond to method '{0}'")]
    UnknownMethod(String),

    /// The handler method ran and failed.
    #[error("event handler failed: {0}")]
    Failed(Arc<dyn std::error::Error + Send + Sync>),

    /// The handler method panicked.
    #[error("event handler panicked: {0}")]
    Panicked(String),
}

impl HandlerInvocationError {
    /// Wraps an error raised by handler code.
    pub fn failed(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Failed(Arc::new(err))
    }

    /// Converts a caught panic payload into an invocation error.
    #[must_use]
    pub fn panicked(payload: &(dyn Any + Send)) -> Self {
        let message = payload
            .downcast_ref::<&str>()
            .map(|message| (*message).to_owned())
            .or_else(|| payload.downcast_ref::<String>().cloned())
            .unwrap_or_else(|| "non-string panic payload".to_owned());
        Self::Panicked(message)
    }
}
