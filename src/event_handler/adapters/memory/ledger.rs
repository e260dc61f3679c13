//! In-memory registration ledger.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use crate::event_handler::{
    domain::{RegistrationRecord, RegistrationStats, ServiceIdentity},
    ports::{LedgerError, LedgerResult, RegistrationLedger},
};

/// Thread-safe in-memory registration ledger.
#[derive(Debug, Clone, Default)]
pub struct InMemoryRegistrationLedger {
    records: Arc<RwLock<HashMap<ServiceIdentity, RegistrationRecord>>>,
}

impl InMemoryRegistrationLedger {
    /// Creates an empty ledger.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

fn poisoned(err: impl ToString) -> LedgerError {
    LedgerError::persistence(std::io::Error::other(err.to_string()))
}

#[async_trait]
impl RegistrationLedger for InMemoryRegistrationLedger {
    async fn put(&self, record: RegistrationRecord) -> LedgerResult<()> {
        let mut records = self.records.write().map_err(poisoned)?;
        records.insert(record.identity().clone(), record);
        Ok(())
    }

    async fn get(&self, identity: &ServiceIdentity) -> LedgerResult<Option<RegistrationRecord>> {
        let records = self.records.read().map_err(poisoned)?;
        Ok(records.get(identity).cloned())
    }

    async fn remove(&self, identity: &ServiceIdentity) -> LedgerResult<usize> {
        let mut records = self.records.write().map_err(poisoned)?;
        Ok(records
            .remove(identity)
            .map_or(0, |record| record.handler_count()))
    }

    async fn list(&self) -> LedgerResult<Vec<RegistrationRecord>> {
        let records = self.records.read().map_err(poisoned)?;
        let mut all: Vec<RegistrationRecord> = records.values().cloned().collect();
        all.sort_by(|a, b| a.identity().cmp(b.identity()));
        Ok(all)
    }

    async fn clear(&self) -> LedgerResult<()> {
        let mut records = self.records.write().map_err(poisoned)?;
        records.clear();
        Ok(())
    }

    async fn stats(&self) -> LedgerResult<RegistrationStats> {
        let records = self.records.read().map_err(poisoned)?;
        let mut stats = RegistrationStats {
            total_services: records.len(),
            ..RegistrationStats::default()
        };
        for record in records.values() {
            stats.total_handlers += record.handler_count();
            stats
                .per_service
                .insert(record.identity().clone(), record.handler_count());
            *stats
                .services_by_strategy
                .entry(record.strategy_used().to_owned())
                .or_insert(0) += 1;
        }
        Ok(stats)
    }
}
