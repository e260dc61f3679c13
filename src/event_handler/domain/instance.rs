//! Declarations a live service instance exposes to the discovery layer.
//!
//! A service describes itself through [`ServiceInstance`]: its identity,
//! its type-level metadata, its method table, and optionally an
//! [`EventHandlerCapability`]. Everything the coordinator learns about a
//! service comes from these calls; there is no side registry.

use super::{
    BusEvent, HandlerDescriptor, HandlerInvocationError, HandlerSpec, HandlerTag, ServiceIdentity,
};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Registration mechanism named by a type-level auto-register flag.
///
/// An enabled `Declared` flag turns on method-tag registration. A
/// switched-off flag for any mode keeps that mechanism away from the type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AutoRegisterMode {
    /// Handlers are declared by tags on methods.
    Declared,
    /// Handlers are listed by an [`EventHandlerCapability`].
    Capability,
    /// Handlers are inherited from a recognized base type.
    Convention,
}

/// Type-level auto-register flag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AutoRegister {
    /// Whether automatic registration is enabled.
    pub enabled: bool,
    /// Requested registration mechanism.
    pub mode: AutoRegisterMode,
}

impl AutoRegister {
    /// Enables auto-registration from method tags.
    #[must_use]
    pub const fn declared() -> Self {
        Self {
            enabled: true,
            mode: AutoRegisterMode::Declared,
        }
    }

    /// A flag that is present but switched off.
    #[must_use]
    pub const fn disabled(mode: AutoRegisterMode) -> Self {
        Self {
            enabled: false,
            mode,
        }
    }
}

/// One slot in a service's method table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MethodEntry {
    name: String,
    tag: Option<HandlerTag>,
}

impl MethodEntry {
    /// Creates an untagged method entry.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            tag: None,
        }
    }

    /// Creates a method entry with a tag bound to the method itself.
    #[must_use]
    pub fn tagged(name: impl Into<String>, tag: HandlerTag) -> Self {
        Self {
            name: name.into(),
            tag: Some(tag),
        }
    }

    /// Returns the method name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the tag bound to the method, if any.
    #[must_use]
    pub const fn tag(&self) -> Option<&HandlerTag> {
        self.tag.as_ref()
    }
}

/// Metadata attached to a service type rather than to a method.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClassMetadata {
    /// Auto-register flag, if the type carries one.
    pub auto_register: Option<AutoRegister>,
    /// Names of the base types the service derives from, nearest first.
    pub base_types: Vec<String>,
    /// Tag attached to the type itself.
    pub class_tag: Option<HandlerTag>,
    /// Tags attached to the type's method slots, keyed by method name.
    pub method_tags: Vec<(String, HandlerTag)>,
}

impl ClassMetadata {
    /// Creates empty metadata.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the auto-register flag.
    #[must_use]
    pub const fn with_auto_register(mut self, auto_register: AutoRegister) -> Self {
        self.auto_register = Some(auto_register);
        self
    }

    /// Appends a base type to the inheritance chain.
    #[must_use]
    pub fn extends(mut self, base_type: impl Into<String>) -> Self {
        self.base_types.push(base_type.into());
        self
    }

    /// Sets the type-level tag.
    #[must_use]
    pub fn with_class_tag(mut self, tag: HandlerTag) -> Self {
        self.class_tag = Some(tag);
        self
    }

    /// Attaches a tag to a method slot.
    #[must_use]
    pub fn with_method_tag(mut self, method: impl Into<String>, tag: HandlerTag) -> Self {
        self.method_tags.push((method.into(), tag));
        self
    }

    /// Returns the slot tag for `method`, if any.
    #[must_use]
    pub fn method_tag(&self, method: &str) -> Option<&HandlerTag> {
        self.method_tags
            .iter()
            .find(|(name, _)| name == method)
            .map(|(_, tag)| tag)
    }

    /// Returns `true` when the type carries a switched-off flag for `mode`.
    #[must_use]
    pub fn opts_out_of(&self, mode: AutoRegisterMode) -> bool {
        self.auto_register
            .is_some_and(|flag| !flag.enabled && flag.mode == mode)
    }

    /// Returns `true` when auto-registration from method tags is enabled.
    #[must_use]
    pub fn auto_registers_declared(&self) -> bool {
        self.auto_register
            .is_some_and(|flag| flag.enabled && flag.mode == AutoRegisterMode::Declared)
    }
}

/// A live, constructed service supplied by the host container.
#[async_trait]
pub trait ServiceInstance: Send + Sync {
    /// Returns the ledger key for this service.
    ///
    /// Implementations normally return `ServiceIdentity::of::<Self>()`.
    fn identity(&self) -> ServiceIdentity;

    /// Returns metadata attached to the service type.
    fn class_metadata(&self) -> ClassMetadata {
        ClassMetadata::default()
    }

    /// Returns own and inherited methods, own methods first.
    fn method_table(&self) -> Vec<MethodEntry> {
        Vec::new()
    }

    /// Returns `true` when `method` can be invoked on this service.
    fn responds_to(&self, method: &str) -> bool {
        self.method_table().iter().any(|entry| entry.name() == method)
    }

    /// Returns the handler capability, when the service implements one.
    fn as_capability(&self) -> Option<&dyn EventHandlerCapability> {
        None
    }

    /// Invokes `method` with a delivered event.
    ///
    /// # Errors
    ///
    /// Returns [`HandlerInvocationError::UnknownMethod`] when the method does
    /// not exist, or [`HandlerInvocationError::Failed`] when it ran and
    /// failed.
    async fn invoke(&self, method: &str, event: &BusEvent) -> Result<(), HandlerInvocationError>;
}

/// Explicit handler listing implemented by capability-style services.
pub trait EventHandlerCapability: Send + Sync {
    /// Lists the handlers to register.
    fn event_handlers(&self) -> Vec<HandlerSpec>;

    /// Returns the service whose methods handle the listed events.
    fn service_instance(&self) -> Option<Arc<dyn ServiceInstance>>;

    /// Gate consulted before anything is registered.
    fn validate_event_handlers(&self) -> bool {
        true
    }

    /// Called with the handlers that were actually subscribed.
    fn on_event_handlers_registered(&self, handlers: &[HandlerDescriptor]) {
        let _ = handlers;
    }
}
