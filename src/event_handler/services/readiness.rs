//! Bounded wait for the event bus consumer endpoint.

use super::{ReadinessConfig, ReadinessError};
use crate::event_handler::ports::{ConsumerProvider, EventConsumer};
use std::sync::Arc;
use tokio::sync::OnceCell;
use tracing::{debug, warn};

/// Resolves the consumer handle, polling while the bus is still wiring up.
///
/// The first successful handle is cached; every strategy shares it
/// read-only.
pub struct ConsumerReadinessGate {
    provider: Arc<dyn ConsumerProvider>,
    config: ReadinessConfig,
    handle: OnceCell<Arc<dyn EventConsumer>>,
}

impl ConsumerReadinessGate {
    /// Creates a gate over a consumer provider.
    #[must_use]
    pub fn new(provider: Arc<dyn ConsumerProvider>, config: ReadinessConfig) -> Self {
        Self {
            provider,
            config,
            handle: OnceCell::new(),
        }
    }

    /// Returns `true` once a handle has been acquired.
    #[must_use]
    pub fn is_ready(&self) -> bool {
        self.handle.initialized()
    }

    /// Returns `true` when `acquire` would fail without asking the provider.
    #[must_use]
    pub fn is_misconfigured(&self) -> bool {
        !self.is_ready() && self.config.max_attempts == 0
    }

    /// Returns the consumer handle, polling the provider if necessary.
    ///
    /// # Errors
    ///
    /// Returns [`ReadinessError::NoAttemptsConfigured`] when no handle is
    /// cached and the policy allows zero attempts, or
    /// [`ReadinessError::ConsumerUnavailable`] once every attempt has failed.
    pub async fn acquire(&self) -> Result<Arc<dyn EventConsumer>, ReadinessError> {
        if let Some(handle) = self.handle.get() {
            return Ok(Arc::clone(handle));
        }
        if self.is_misconfigured() {
            return Err(ReadinessError::NoAttemptsConfigured);
        }
        let handle = self.handle.get_or_try_init(|| self.poll()).await?;
        Ok(Arc::clone(handle))
    }

    async fn poll(&self) -> Result<Arc<dyn EventConsumer>, ReadinessError> {
        let max_attempts = self.config.max_attempts;
        for attempt in 1..=max_attempts {
            match self.provider.consumer().await {
                Ok(consumer) => {
                    debug!(attempt, "event consumer ready");
                    return Ok(consumer);
                }
                Err(err) => {
                    debug!(attempt, max_attempts, error = %err, "event consumer not ready");
                }
            }
            if attempt < max_attempts {
                tokio::time::sleep(self.config.poll_interval()).await;
            }
        }
        warn!(attempts = max_attempts, "event consumer unavailable");
        Err(ReadinessError::ConsumerUnavailable {
            attempts: max_attempts,
        })
    }
}
