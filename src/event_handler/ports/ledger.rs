//! Registration ledger port.

use crate::event_handler::domain::{RegistrationRecord, RegistrationStats, ServiceIdentity};
use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;

/// Result type for ledger operations.
pub type LedgerResult<T> = Result<T, LedgerError>;

/// Record of which services have which handlers registered.
///
/// One writer is expected (the discovery coordinator); reads may happen at
/// any time.
#[async_trait]
pub trait RegistrationLedger: Send + Sync {
    /// Stores a record, replacing any record for the same identity.
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError::Persistence`] when the record cannot be stored.
    async fn put(&self, record: RegistrationRecord) -> LedgerResult<()>;

    /// Finds the record for an identity.
    ///
    /// Returns `None` when the service has no registration.
    async fn get(&self, identity: &ServiceIdentity) -> LedgerResult<Option<RegistrationRecord>>;

    /// Removes the record for an identity.
    ///
    /// Returns the number of handlers the removed record held, or `0` when
    /// the identity was absent.
    async fn remove(&self, identity: &ServiceIdentity) -> LedgerResult<usize>;

    /// Returns every record.
    async fn list(&self) -> LedgerResult<Vec<RegistrationRecord>>;

    /// Removes every record.
    async fn clear(&self) -> LedgerResult<()>;

    /// Returns aggregate statistics.
    async fn stats(&self) -> LedgerResult<RegistrationStats>;
}

/// Errors returned by ledger implementations.
#[derive(Debug, Clone, Error)]
pub enum LedgerError {
    /// Persistence-layer failure.
    #[error("ledger persistence error: {0}")]
    Persistence(Arc<dyn std::error::Error + Send + Sync>),
}

impl LedgerError {
    /// Wraps a persistence error.
    pub fn persistence(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Persistence(Arc::new(err))
    }
}
