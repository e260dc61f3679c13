//! Configuration for event handler discovery.

use serde::Deserialize;
use std::time::Duration;

/// Polling policy for the consumer readiness gate.
///
/// # Examples
///
/// ```
/// use autowire::event_handler::services::ReadinessConfig;
///
/// let config = ReadinessConfig::default();
/// assert_eq!(config.max_attempts, 10);
///
/// let immediate = ReadinessConfig::immediate();
/// assert_eq!(immediate.max_attempts, 1);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ReadinessConfig {
    /// Maximum number of consumer lookups before giving up.
    pub max_attempts: u32,
    /// Pause between lookups in milliseconds.
    pub poll_interval_ms: u64,
}

impl Default for ReadinessConfig {
    fn default() -> Self {
        Self {
            max_attempts: 10,
            poll_interval_ms: 50,
        }
    }
}

impl ReadinessConfig {
    /// Creates a polling policy.
    #[must_use]
    pub const fn new(max_attempts: u32, poll_interval_ms: u64) -> Self {
        Self {
            max_attempts,
            poll_interval_ms,
        }
    }

    /// Single lookup with no waiting.
    ///
    /// Useful when the bus is known to be wired before discovery runs.
    #[must_use]
    pub const fn immediate() -> Self {
        Self::new(1, 0)
    }

    /// Longer polling for hosts with slow bus start-up.
    #[must_use]
    pub const fn patient() -> Self {
        Self::new(40, 100)
    }

    /// Returns the pause between lookups.
    #[must_use]
    pub const fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }
}

/// Top-level discovery configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct DiscoveryConfig {
    /// Consumer readiness polling policy.
    pub readiness: ReadinessConfig,
    /// Base type names that mark a service for convention-based
    /// registration.
    pub recognized_bases: Vec<String>,
}

impl Default for DiscoveryConfig {
    fn default() -> Self {
        Self {
            readiness: ReadinessConfig::default(),
            recognized_bases: vec!["BaseEventHandler".to_owned(), "EventHandlerBase".to_owned()],
        }
    }
}

impl DiscoveryConfig {
    /// Replaces the readiness policy.
    #[must_use]
    pub fn with_readiness(mut self, readiness: ReadinessConfig) -> Self {
        self.readiness = readiness;
        self
    }

    /// Adds a recognized base type name.
    #[must_use]
    pub fn with_recognized_base(mut self, base: impl Into<String>) -> Self {
        self.recognized_bases.push(base.into());
        self
    }
}
