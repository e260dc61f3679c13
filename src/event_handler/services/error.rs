//! Error taxonomy for discovery and registration.

use crate::event_handler::{
    domain::{EventType, ServiceIdentity},
    ports::{InstanceSourceError, LedgerError},
};
use thiserror::Error;

/// Errors returned by the consumer readiness gate.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ReadinessError {
    /// Every lookup attempt failed.
    #[error("event consumer unavailable after {attempts} attempts")]
    ConsumerUnavailable {
        /// Number of lookups made.
        attempts: u32,
    },

    /// The gate is configured with zero attempts and holds no handle.
    #[error("consumer readiness gate is configured with zero attempts")]
    NoAttemptsConfigured,
}

/// Result type for strategy registration.
pub type RegistrationResult<T> = Result<T, RegistrationError>;

/// Errors raised while registering one service's handlers.
///
/// These never escape a discovery pass: the strategy selector logs them
/// and treats the service as having registered nothing.
#[derive(Debug, Clone, Error)]
pub enum RegistrationError {
    /// The consumer could not be acquired.
    #[error(transparent)]
    Readiness(#[from] ReadinessError),

    /// Subscribing one handler failed.
    #[error("failed to register '{method}' for '{event_type}': {reason}")]
    HandlerRegistrationFailed {
        /// Event type of the failed handler.
        event_type: EventType,
        /// Method of the failed handler.
        method: String,
        /// Failure reported by the bus or binding step.
        reason: String,
    },

    /// A capability's validation gate refused registration.
    #[error("event handlers of {0} failed validation")]
    ValidationRejected(ServiceIdentity),
}

/// Result type for coordinator operations.
pub type DiscoveryResult<T> = Result<T, DiscoveryError>;

/// Errors surfaced to callers of the discovery coordinator.
#[derive(Debug, Clone, Error)]
pub enum DiscoveryError {
    /// The consumer gate was misused or is unavailable.
    #[error(transparent)]
    Readiness(#[from] ReadinessError),

    /// Ledger operation failed.
    #[error(transparent)]
    Ledger(#[from] LedgerError),

    /// The host container could not list its instances.
    #[error(transparent)]
    InstanceSource(#[from] InstanceSourceError),
}
