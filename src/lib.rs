//! Autowire: event handler discovery and registration.
//!
//! This crate finds the event handlers declared by live service instances
//! and subscribes them to an event bus, keeping a ledger of what was
//! registered for each service.
//!
//! # Architecture
//!
//! Autowire follows hexagonal architecture principles:
//!
//! - **Domain**: Handler declarations and registration records
//! - **Ports**: Abstract trait interfaces for the bus, ledger and host container
//! - **Adapters**: Concrete implementations of ports (in-memory bus and ledger)
//!
//! # Modules
//!
//! - [`event_handler`]: Handler discovery, strategy selection and registration

pub mod event_handler;
