//! Discovery coordinator: the entry point for event handler registration.
//!
//! The coordinator runs every supplied instance through the strategy
//! selector and records the outcome in the registration ledger. It also
//! serves the caller-facing queries over that ledger.

use super::{
    ConsumerReadinessGate, DiscoveryConfig, DiscoveryError, DiscoveryResult, HandlerSubscriber,
    ReadinessError, RegistrationStrategy, SelectionOutcome, StrategyKind, StrategySelector,
};
use crate::event_handler::{
    domain::{
        EventType, HandlerDescriptor, RegistrationRecord, RegistrationStats, ServiceIdentity,
        ServiceInstance,
    },
    ports::{ConsumerProvider, ConsumerStats, InstanceSource, RegistrationLedger},
};
use mockable::Clock;
use std::collections::HashSet;
use std::sync::Arc;
use tracing::{info, warn};

/// Totals for one discovery pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DiscoverySummary {
    /// Handlers subscribed across all services.
    pub total_registered: usize,
    /// Services that registered at least one handler.
    pub services_touched: usize,
}

/// Event handler discovery and registration orchestration service.
pub struct DiscoveryCoordinator<L, C, S = StrategyKind>
where
    L: RegistrationLedger,
    C: Clock + Send + Sync,
{
    ledger: Arc<L>,
    clock: Arc<C>,
    selector: StrategySelector<S>,
    subscriber: HandlerSubscriber,
}

impl<L, C> DiscoveryCoordinator<L, C, StrategyKind>
where
    L: RegistrationLedger,
    C: Clock + Send + Sync,
{
    /// Creates a coordinator with the standard strategy set.
    #[must_use]
    pub fn new(
        ledger: Arc<L>,
        provider: Arc<dyn ConsumerProvider>,
        clock: Arc<C>,
        config: &DiscoveryConfig,
    ) -> Self {
        let gate = Arc::new(ConsumerReadinessGate::new(
            provider,
            config.readiness.clone(),
        ));
        Self::with_selector(ledger, gate, clock, StrategySelector::standard(config))
    }
}

impl<L, C, S> DiscoveryCoordinator<L, C, S>
where
    L: RegistrationLedger,
    C: Clock + Send + Sync,
    S: RegistrationStrategy,
{
    /// Creates a coordinator with an explicit strategy selector.
    #[must_use]
    pub const fn with_selector(
        ledger: Arc<L>,
        gate: Arc<ConsumerReadinessGate>,
        clock: Arc<C>,
        selector: StrategySelector<S>,
    ) -> Self {
        Self {
            ledger,
            clock,
            selector,
            subscriber: HandlerSubscriber::new(gate),
        }
    }

    /// Runs one discovery pass over `instances`, in the order given.
    ///
    /// Per-service failures are logged and never end the pass early.
    pub async fn run_discovery(
        &self,
        instances: Vec<Arc<dyn ServiceInstance>>,
    ) -> DiscoverySummary {
        let mut summary = DiscoverySummary::default();
        let mut seen = HashSet::new();

        for instance in instances {
            let identity = instance.identity();
            if !seen.insert(identity.clone()) {
                warn!(
                    service = %identity,
                    "several live instances share one service identity; the ledger keeps the last"
                );
            }

            let outcome = self
                .selector
                .select_and_register(&instance, &self.subscriber)
                .await;
            match self.record(identity.clone(), outcome).await {
                Ok(0) => {}
                Ok(count) => {
                    summary.total_registered += count;
                    summary.services_touched += 1;
                }
                Err(err) => {
                    warn!(service = %identity, error = %err, "failed to record event handlers");
                }
            }
        }

        info!(
            total_registered = summary.total_registered,
            services_touched = summary.services_touched,
            "event handler discovery complete"
        );
        summary
    }

    /// Pulls the live instances from the host and runs a discovery pass.
    ///
    /// # Errors
    ///
    /// Returns [`DiscoveryError::InstanceSource`] when the host cannot list
    /// its instances.
    pub async fn discover(
        &self,
        source: &(impl InstanceSource + ?Sized),
    ) -> DiscoveryResult<DiscoverySummary> {
        let instances = source.live_instances().await?;
        Ok(self.run_discovery(instances).await)
    }

    /// Registers one instance's handlers outside a discovery pass.
    ///
    /// Returns the number of handlers subscribed.
    ///
    /// # Errors
    ///
    /// Returns [`DiscoveryError::Readiness`] when the readiness gate allows
    /// zero attempts and no consumer has been acquired, or
    /// [`DiscoveryError::Ledger`] when the record cannot be stored.
    pub async fn register_event_handlers(
        &self,
        instance: Arc<dyn ServiceInstance>,
    ) -> DiscoveryResult<usize> {
        if self.subscriber.gate().is_misconfigured() {
            return Err(ReadinessError::NoAttemptsConfigured.into());
        }
        let outcome = self
            .selector
            .select_and_register(&instance, &self.subscriber)
            .await;
        self.record(instance.identity(), outcome).await
    }

    /// Unsubscribes and forgets one instance's handlers.
    ///
    /// Returns the number of handlers removed from the ledger; `0` when the
    /// service was not registered.
    ///
    /// # Errors
    ///
    /// Returns [`DiscoveryError::Ledger`] when the ledger cannot be read or
    /// updated.
    pub async fn unregister_event_handlers(
        &self,
        instance: &dyn ServiceInstance,
    ) -> DiscoveryResult<usize> {
        let identity = instance.identity();
        let Some(record) = self.ledger.get(&identity).await? else {
            return Ok(0);
        };

        let event_types = record.event_types();
        for (other, shared) in self.sharing_records(&identity, &event_types).await? {
            warn!(
                service = %identity,
                other_service = %other,
                event_types = ?shared,
                "unsubscribing shared event types also drops the other service's handlers"
            );
        }
        let unsubscribed = self.subscriber.unsubscribe_all(&event_types).await;
        let removed = self.ledger.remove(&identity).await?;
        info!(
            service = %identity,
            handlers = removed,
            event_types = unsubscribed,
            "event handlers unregistered"
        );
        Ok(removed)
    }

    /// Returns the other registered services subscribed to any event type
    /// the instance handles, with the shared event types.
    ///
    /// The bus unsubscribes whole event types, so unregistering `instance`
    /// also removes these services' handlers from the bus.
    ///
    /// # Errors
    ///
    /// Returns [`DiscoveryError::Ledger`] when the ledger cannot be read.
    pub async fn services_sharing_event_types(
        &self,
        instance: &dyn ServiceInstance,
    ) -> DiscoveryResult<Vec<(ServiceIdentity, Vec<EventType>)>> {
        let identity = instance.identity();
        let Some(record) = self.ledger.get(&identity).await? else {
            return Ok(Vec::new());
        };
        self.sharing_records(&identity, &record.event_types()).await
    }

    async fn sharing_records(
        &self,
        identity: &ServiceIdentity,
        event_types: &[EventType],
    ) -> DiscoveryResult<Vec<(ServiceIdentity, Vec<EventType>)>> {
        let mut sharing: Vec<_> = self
            .ledger
            .list()
            .await?
            .into_iter()
            .filter(|record| record.identity() != identity)
            .filter_map(|record| {
                let shared: Vec<EventType> = record
                    .event_types()
                    .into_iter()
                    .filter(|event_type| event_types.contains(event_type))
                    .collect();
                (!shared.is_empty()).then(|| (record.identity().clone(), shared))
            })
            .collect();
        sharing.sort_by(|(left, _), (right, _)| left.cmp(right));
        Ok(sharing)
    }

    /// Returns the handlers registered for an instance's identity.
    ///
    /// # Errors
    ///
    /// Returns [`DiscoveryError::Ledger`] when the ledger cannot be read.
    pub async fn registered_handlers(
        &self,
        instance: &dyn ServiceInstance,
    ) -> DiscoveryResult<Vec<HandlerDescriptor>> {
        Ok(self
            .ledger
            .get(&instance.identity())
            .await?
            .map(RegistrationRecord::into_descriptors)
            .unwrap_or_default())
    }

    /// Returns aggregate registration statistics.
    ///
    /// # Errors
    ///
    /// Returns [`DiscoveryError::Ledger`] when the ledger cannot be read.
    pub async fn registration_stats(&self) -> DiscoveryResult<RegistrationStats> {
        Ok(self.ledger.stats().await?)
    }

    /// Returns the event bus's own statistics.
    ///
    /// # Errors
    ///
    /// Returns [`DiscoveryError::Readiness`] when the consumer cannot be
    /// acquired.
    pub async fn consumer_stats(&self) -> DiscoveryResult<ConsumerStats> {
        let consumer = self.subscriber.gate().acquire().await?;
        Ok(consumer.stats())
    }

    /// Forgets every registration without touching bus subscriptions.
    ///
    /// # Errors
    ///
    /// Returns [`DiscoveryError::Ledger`] when the ledger cannot be cleared.
    pub async fn clear(&self) -> DiscoveryResult<()> {
        Ok(self.ledger.clear().await?)
    }

    async fn record(
        &self,
        identity: ServiceIdentity,
        outcome: SelectionOutcome,
    ) -> Result<usize, DiscoveryError> {
        let SelectionOutcome {
            strategy,
            registered,
        } = outcome;
        let Some(strategy_used) = strategy else {
            return Ok(0);
        };
        if registered.is_empty() {
            return Ok(0);
        }

        // Earlier bus subscriptions for this identity stay in place.
        if let Some(previous) = self.ledger.get(&identity).await? {
            warn!(
                service = %identity,
                previous_handlers = previous.handler_count(),
                "replacing existing registration; earlier subscriptions are not removed"
            );
        }

        let count = registered.len();
        let record = RegistrationRecord::new(identity, registered, strategy_used, &*self.clock);
        self.ledger.put(record).await?;
        Ok(count)
    }
}
