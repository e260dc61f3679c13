//! In-memory adapters for local wiring and tests.

mod consumer;
mod instances;
mod ledger;

pub use consumer::{DeferredConsumerProvider, InMemoryEventConsumer};
pub use instances::StaticInstanceSource;
pub use ledger::InMemoryRegistrationLedger;
