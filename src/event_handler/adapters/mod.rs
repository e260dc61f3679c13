//! Adapter implementations for event handler discovery ports.

pub mod memory;

pub use memory::{
    DeferredConsumerProvider, InMemoryEventConsumer, InMemoryRegistrationLedger,
    StaticInstanceSource,
};
