//! Port contracts for event handler discovery.
//!
//! Ports define infrastructure-agnostic interfaces for the event bus, the
//! host container, and registration persistence.

pub mod consumer;
pub mod instances;
pub mod ledger;

pub use consumer::{
    ConsumerError, ConsumerLookupError, ConsumerLookupResult, ConsumerProvider, ConsumerResult,
    ConsumerStats, EventConsumer, SubscribedHandler,
};
pub use instances::{InstanceSource, InstanceSourceError, InstanceSourceResult};
pub use ledger::{LedgerError, LedgerResult, RegistrationLedger};

#[cfg(test)]
pub use consumer::MockConsumerProvider;
