//! Fixed list of instances standing in for a host container.

use async_trait::async_trait;
use std::sync::Arc;

use crate::event_handler::{
    domain::ServiceInstance,
    ports::{InstanceSource, InstanceSourceResult},
};

/// Instance source backed by a fixed list.
#[derive(Clone, Default)]
pub struct StaticInstanceSource {
    instances: Vec<Arc<dyn ServiceInstance>>,
}

impl StaticInstanceSource {
    /// Creates a source over the given instances.
    #[must_use]
    pub const fn new(instances: Vec<Arc<dyn ServiceInstance>>) -> Self {
        Self { instances }
    }

    /// Appends an instance.
    #[must_use]
    pub fn with_instance(mut self, instance: Arc<dyn ServiceInstance>) -> Self {
        self.instances.push(instance);
        self
    }
}

#[async_trait]
impl InstanceSource for StaticInstanceSource {
    async fn live_instances(&self) -> InstanceSourceResult<Vec<Arc<dyn ServiceInstance>>> {
        Ok(self.instances.clone())
    }
}
