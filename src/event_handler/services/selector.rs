//! Picks one registration strategy per service instance.

use super::{
    DiscoveryConfig, HandlerSubscriber, RegistrationError, RegistrationStrategy, StrategyKind,
};
use crate::event_handler::domain::{HandlerDescriptor, ServiceInstance};
use std::sync::Arc;
use tracing::{debug, warn};

/// Result of running the selected strategy for one instance.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SelectionOutcome {
    /// Name of the strategy that ran, if any applied.
    pub strategy: Option<String>,
    /// Descriptors the strategy subscribed.
    pub registered: Vec<HandlerDescriptor>,
}

impl SelectionOutcome {
    /// Returns the number of subscribed handlers.
    #[must_use]
    pub fn count(&self) -> usize {
        self.registered.len()
    }
}

/// Dispatches each instance to its highest-priority applicable strategy.
///
/// Failures inside a strategy are logged and reported as zero
/// registrations, so one misbehaving service cannot stop discovery of the
/// rest.
#[derive(Debug, Clone)]
pub struct StrategySelector<S = StrategyKind> {
    strategies: Vec<S>,
}

impl StrategySelector<StrategyKind> {
    /// Creates a selector over the standard strategy set.
    #[must_use]
    pub fn standard(config: &DiscoveryConfig) -> Self {
        Self::new(StrategyKind::standard_set(config))
    }
}

impl<S: RegistrationStrategy> StrategySelector<S> {
    /// Creates a selector over `strategies` in declaration order.
    #[must_use]
    pub const fn new(strategies: Vec<S>) -> Self {
        Self { strategies }
    }

    /// Returns the strategies in declaration order.
    #[must_use]
    pub fn strategies(&self) -> &[S] {
        &self.strategies
    }

    /// Returns the applicable strategy with the highest priority.
    ///
    /// Ties go to the strategy declared first.
    #[must_use]
    pub fn select(&self, instance: &dyn ServiceInstance) -> Option<&S> {
        self.strategies
            .iter()
            .filter(|strategy| strategy.can_handle(instance))
            .fold(None, |best: Option<&S>, candidate| match best {
                Some(current) if current.priority() >= candidate.priority() => Some(current),
                _ => Some(candidate),
            })
    }

    /// Runs the selected strategy for `instance`.
    ///
    /// Returns an empty outcome when no strategy applies or the chosen one
    /// fails.
    pub async fn select_and_register(
        &self,
        instance: &Arc<dyn ServiceInstance>,
        subscriber: &HandlerSubscriber,
    ) -> SelectionOutcome {
        let identity = instance.identity();
        let Some(strategy) = self.select(instance.as_ref()) else {
            debug!(service = %identity, "no registration strategy applies");
            return SelectionOutcome::default();
        };

        match strategy.register(instance, subscriber).await {
            Ok(registered) => SelectionOutcome {
                strategy: Some(strategy.name().to_owned()),
                registered,
            },
            Err(err @ RegistrationError::ValidationRejected(_)) => {
                warn!(
                    service = %identity,
                    strategy = strategy.name(),
                    error = %err,
                    "event handler validation rejected registration"
                );
                SelectionOutcome::default()
            }
            Err(err) => {
                warn!(
                    service = %identity,
                    strategy = strategy.name(),
                    error = %err,
                    "event handler registration failed"
                );
                SelectionOutcome::default()
            }
        }
    }
}
