//! Host container port supplying live service instances.

use crate::event_handler::domain::ServiceInstance;
use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;

/// Result type for instance source operations.
pub type InstanceSourceResult<T> = Result<T, InstanceSourceError>;

/// Supplies every live, constructed service instance.
#[async_trait]
pub trait InstanceSource: Send + Sync {
    /// Returns all live instances in container order.
    ///
    /// # Errors
    ///
    /// Returns [`InstanceSourceError`] when the container cannot enumerate
    /// its instances.
    async fn live_instances(&self) -> InstanceSourceResult<Vec<Arc<dyn ServiceInstance>>>;
}

/// Errors returned by host container adapters.
#[derive(Debug, Clone, Error)]
pub enum InstanceSourceError {
    /// The container has not finished constructing its instances.
    #[error("service container is not initialised")]
    NotInitialised,

    /// Container-level failure.
    #[error("service container error: {0}")]
    Container(Arc<dyn std::error::Error + Send + Sync>),
}

impl InstanceSourceError {
    /// Wraps a container error.
    pub fn container(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Container(Arc::new(err))
    }
}
