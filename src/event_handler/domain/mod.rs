//! Domain model for event handler declarations and registrations.
//!
//! The domain describes what a service declares (tags, capabilities, method
//! tables) and what the coordinator produced from those declarations
//! (descriptors, registration records, statistics). No bus or container
//! concerns cross this boundary.

mod descriptor;
mod error;
mod event;
mod identity;
mod instance;
mod record;
mod stats;

pub use descriptor::{EventType, HandlerDescriptor, HandlerSpec, HandlerTag, RetryPolicy};
pub use error::{HandlerDomainError, HandlerInvocationError};
pub use event::{BusEvent, EventId};
pub use identity::ServiceIdentity;
pub use instance::{
    AutoRegister, AutoRegisterMode, ClassMetadata, EventHandlerCapability, MethodEntry,
    ServiceInstance,
};
pub use record::RegistrationRecord;
pub use stats::RegistrationStats;
