//! Aggregate registration statistics.

use super::ServiceIdentity;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Snapshot of what the registration ledger currently holds.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegistrationStats {
    /// Number of services with a registration record.
    pub total_services: usize,
    /// Number of handlers across all records.
    pub total_handlers: usize,
    /// Handler count for each registered service.
    pub per_service: BTreeMap<ServiceIdentity, usize>,
    /// Number of services registered by each strategy.
    pub services_by_strategy: BTreeMap<String, usize>,
}
