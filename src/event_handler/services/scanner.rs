//! Extracts handler descriptors from a service's declarations.

use crate::event_handler::domain::{
    ClassMetadata, HandlerDescriptor, HandlerTag, MethodEntry, ServiceInstance,
};
use std::collections::HashSet;
use tracing::warn;

/// Method slot that never carries handler metadata.
const CONSTRUCTOR: &str = "new";

/// Reads handler tags from a service's method table.
///
/// For each method the most specific tag wins: the tag bound on the method
/// entry, then the type's slot tag for that method, then the type-level
/// tag. Scanning is a pure function of the service's declarations.
#[derive(Debug, Clone, Copy, Default)]
pub struct HandlerMetadataScanner;

impl HandlerMetadataScanner {
    /// Creates a scanner.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    /// Returns one descriptor per tagged method, in method table order.
    ///
    /// Methods appearing more than once keep their first (own) entry.
    /// Tags that fail validation are logged and skipped.
    #[must_use]
    pub fn scan(&self, instance: &dyn ServiceInstance) -> Vec<HandlerDescriptor> {
        let class = instance.class_metadata();
        let mut seen = HashSet::new();
        instance
            .method_table()
            .into_iter()
            .filter(|entry| entry.name() != CONSTRUCTOR)
            .filter(|entry| seen.insert(entry.name().to_owned()))
            .filter_map(|entry| {
                let tag = resolve_tag(&entry, &class)?;
                HandlerDescriptor::from_tag(entry.name(), tag)
                    .inspect_err(|err| {
                        warn!(
                            service = %instance.identity(),
                            method = entry.name(),
                            error = %err,
                            "ignoring invalid event handler tag"
                        );
                    })
                    .ok()
            })
            .collect()
    }
}

fn resolve_tag<'a>(entry: &'a MethodEntry, class: &'a ClassMetadata) -> Option<&'a HandlerTag> {
    entry
        .tag()
        .or_else(|| class.method_tag(entry.name()))
        .or(class.class_tag.as_ref())
}
