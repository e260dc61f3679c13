//! Application services for event handler discovery and registration.

mod config;
mod coordinator;
mod error;
mod readiness;
mod scanner;
mod selector;
mod strategy;
mod subscription;

pub use config::{DiscoveryConfig, ReadinessConfig};
pub use coordinator::{DiscoveryCoordinator, DiscoverySummary};
pub use error::{
    DiscoveryError, DiscoveryResult, ReadinessError, RegistrationError, RegistrationResult,
};
pub use readiness::ConsumerReadinessGate;
pub use scanner::HandlerMetadataScanner;
pub use selector::{SelectionOutcome, StrategySelector};
pub use strategy::{
    CapabilityStrategy, ConventionStrategy, DeclaredStrategy, RegistrationStrategy, StrategyKind,
};
pub use subscription::HandlerSubscriber;
