//! Registration strategies.
//!
//! Each strategy decides whether it applies to a service and, when chosen,
//! subscribes that service's handlers. The production set is the closed
//! [`StrategyKind`] enum; the [`RegistrationStrategy`] trait is the seam the
//! selector dispatches through.

use super::{
    DiscoveryConfig, HandlerMetadataScanner, HandlerSubscriber, RegistrationError,
    RegistrationResult,
};
use crate::event_handler::domain::{AutoRegisterMode, HandlerDescriptor, ServiceInstance};
use async_trait::async_trait;
use std::sync::Arc;
use tracing::warn;

/// Capability contract shared by every registration strategy.
#[async_trait]
pub trait RegistrationStrategy: Send + Sync {
    /// Strategy name recorded in the ledger.
    fn name(&self) -> &str;

    /// Selection priority; higher wins.
    fn priority(&self) -> i32;

    /// Returns `true` when this strategy knows how to register `instance`.
    fn can_handle(&self, instance: &dyn ServiceInstance) -> bool;

    /// Subscribes the instance's handlers.
    ///
    /// Returns exactly the descriptors that were subscribed.
    ///
    /// # Errors
    ///
    /// Returns [`RegistrationError`] when registration cannot proceed for
    /// the instance as a whole.
    async fn register(
        &self,
        instance: &Arc<dyn ServiceInstance>,
        subscriber: &HandlerSubscriber,
    ) -> RegistrationResult<Vec<HandlerDescriptor>>;
}

/// Registers handlers declared by method tags.
#[derive(Debug, Clone, Copy, Default)]
pub struct DeclaredStrategy {
    scanner: HandlerMetadataScanner,
}

impl DeclaredStrategy {
    /// Ledger name of this strategy.
    pub const NAME: &'static str = "declared";
    /// Selection priority of this strategy.
    pub const PRIORITY: i32 = 100;

    /// Creates the strategy.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            scanner: HandlerMetadataScanner::new(),
        }
    }
}

#[async_trait]
impl RegistrationStrategy for DeclaredStrategy {
    fn name(&self) -> &str {
        Self::NAME
    }

    fn priority(&self) -> i32 {
        Self::PRIORITY
    }

    fn can_handle(&self, instance: &dyn ServiceInstance) -> bool {
        instance.class_metadata().auto_registers_declared()
    }

    async fn register(
        &self,
        instance: &Arc<dyn ServiceInstance>,
        subscriber: &HandlerSubscriber,
    ) -> RegistrationResult<Vec<HandlerDescriptor>> {
        let descriptors = self.scanner.scan(instance.as_ref());
        subscriber.subscribe_all(instance, descriptors).await
    }
}

/// Registers handlers listed by an [`EventHandlerCapability`].
///
/// [`EventHandlerCapability`]: crate::event_handler::domain::EventHandlerCapability
#[derive(Debug, Clone, Copy, Default)]
pub struct CapabilityStrategy;

impl CapabilityStrategy {
    /// Ledger name of this strategy.
    pub const NAME: &'static str = "capability";
    /// Selection priority of this strategy.
    pub const PRIORITY: i32 = 80;

    /// Creates the strategy.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

#[async_trait]
impl RegistrationStrategy for CapabilityStrategy {
    fn name(&self) -> &str {
        Self::NAME
    }

    fn priority(&self) -> i32 {
        Self::PRIORITY
    }

    fn can_handle(&self, instance: &dyn ServiceInstance) -> bool {
        if instance
            .class_metadata()
            .opts_out_of(AutoRegisterMode::Capability)
        {
            return false;
        }
        instance
            .as_capability()
            .is_some_and(|capability| capability.service_instance().is_some())
    }

    async fn register(
        &self,
        instance: &Arc<dyn ServiceInstance>,
        subscriber: &HandlerSubscriber,
    ) -> RegistrationResult<Vec<HandlerDescriptor>> {
        let Some(capability) = instance.as_capability() else {
            return Ok(Vec::new());
        };
        if !capability.validate_event_handlers() {
            return Err(RegistrationError::ValidationRejected(instance.identity()));
        }
        let Some(target) = capability.service_instance() else {
            return Ok(Vec::new());
        };

        let descriptors = capability
            .event_handlers()
            .into_iter()
            .filter_map(|spec| {
                spec.to_descriptor()
                    .inspect_err(|err| {
                        warn!(
                            service = %instance.identity(),
                            method = %spec.method_name,
                            error = %err,
                            "ignoring invalid event handler entry"
                        );
                    })
                    .ok()
            })
            .collect();

        let registered = subscriber.subscribe_all(&target, descriptors).await?;
        capability.on_event_handlers_registered(&registered);
        Ok(registered)
    }
}

/// Registers handlers of services deriving from a recognized base type.
#[derive(Debug, Clone, Default)]
pub struct ConventionStrategy {
    recognized_bases: Vec<String>,
    scanner: HandlerMetadataScanner,
}

impl ConventionStrategy {
    /// Ledger name of this strategy.
    pub const NAME: &'static str = "convention";
    /// Selection priority of this strategy.
    pub const PRIORITY: i32 = 60;

    /// Creates the strategy for the given base type names.
    #[must_use]
    pub fn new(recognized_bases: impl IntoIterator<Item = String>) -> Self {
        Self {
            recognized_bases: recognized_bases.into_iter().collect(),
            scanner: HandlerMetadataScanner::new(),
        }
    }

    fn is_recognized(&self, name: &str) -> bool {
        self.recognized_bases.iter().any(|base| base == name)
    }
}

#[async_trait]
impl RegistrationStrategy for ConventionStrategy {
    fn name(&self) -> &str {
        Self::NAME
    }

    fn priority(&self) -> i32 {
        Self::PRIORITY
    }

    fn can_handle(&self, instance: &dyn ServiceInstance) -> bool {
        let class = instance.class_metadata();
        if class.opts_out_of(AutoRegisterMode::Convention) {
            return false;
        }
        self.is_recognized(instance.identity().as_str())
            || class.base_types.iter().any(|base| self.is_recognized(base))
    }

    async fn register(
        &self,
        instance: &Arc<dyn ServiceInstance>,
        subscriber: &HandlerSubscriber,
    ) -> RegistrationResult<Vec<HandlerDescriptor>> {
        let descriptors = self.scanner.scan(instance.as_ref());
        subscriber.subscribe_all(instance, descriptors).await
    }
}

/// The fixed set of production registration strategies.
#[derive(Debug, Clone)]
pub enum StrategyKind {
    /// Method-tag declarations.
    Declared(DeclaredStrategy),
    /// Explicit capability listing.
    Capability(CapabilityStrategy),
    /// Recognized base type.
    Convention(ConventionStrategy),
}

impl StrategyKind {
    /// Builds the standard strategies in declaration order.
    #[must_use]
    pub fn standard_set(config: &DiscoveryConfig) -> Vec<Self> {
        vec![
            Self::Declared(DeclaredStrategy::new()),
            Self::Capability(CapabilityStrategy::new()),
            Self::Convention(ConventionStrategy::new(
                config.recognized_bases.iter().cloned(),
            )),
        ]
    }

    fn as_strategy(&self) -> &dyn RegistrationStrategy {
        match self {
            Self::Declared(strategy) => strategy,
            Self::Capability(strategy) => strategy,
            Self::Convention(strategy) => strategy,
        }
    }
}

#[async_trait]
impl RegistrationStrategy for StrategyKind {
    fn name(&self) -> &str {
        self.as_strategy().name()
    }

    fn priority(&self) -> i32 {
        self.as_strategy().priority()
    }

    fn can_handle(&self, instance: &dyn ServiceInstance) -> bool {
        self.as_strategy().can_handle(instance)
    }

    async fn register(
        &self,
        instance: &Arc<dyn ServiceInstance>,
        subscriber: &HandlerSubscriber,
    ) -> RegistrationResult<Vec<HandlerDescriptor>> {
        self.as_strategy().register(instance, subscriber).await
    }
}
