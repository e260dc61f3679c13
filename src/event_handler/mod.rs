//! Event handler discovery and registration.
//!
//! Services declare which of their methods handle which event types. This
//! module discovers those declarations across the live instances supplied
//! by a host container, subscribes them to a shared event bus, and keeps a
//! ledger of what was registered. The module follows hexagonal
//! architecture:
//!
//! - Domain types in [`domain`]
//! - Port contracts in [`ports`]
//! - Adapter implementations in [`adapters`]
//! - Orchestration services in [`services`]

pub mod adapters;
pub mod domain;
pub mod ports;
pub mod services;

#[cfg(test)]
mod tests;
