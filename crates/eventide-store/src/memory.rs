//! In-process storage backend.

use std::collections::HashMap;

use async_trait::async_trait;
use eventide_types::{EventId, EventRecord};
use parking_lot::RwLock;

use crate::{PersistenceGateway, StoreError};

/// A backend that keeps snapshots in a process-local map.
///
/// Used in tests and in embedded deployments that accept losing history
/// on restart. Always healthy.
#[derive(Default)]
pub struct MemoryStore {
    records: RwLock<HashMap<EventId, EventRecord>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored snapshots.
    pub fn len(&self) -> usize {
        self.records.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.read().is_empty()
    }
}

#[async_trait]
impl PersistenceGateway for MemoryStore {
    async fn save_event(&self, record: &EventRecord) -> Result<(), StoreError> {
        self.records.write().insert(record.id, record.clone());
        Ok(())
    }

    async fn save_events(&self, batch: &[EventRecord]) -> Result<(), StoreError> {
        let mut records = self.records.write();
        for record in batch {
            records.insert(record.id, record.clone());
        }
        Ok(())
    }

    async fn load_event(&self, id: EventId) -> Result<Option<EventRecord>, StoreError> {
        Ok(self.records.read().get(&id).cloned())
    }

    async fn load_all_events(&self) -> Result<Vec<EventRecord>, StoreError> {
        Ok(self.records.read().values().cloned().collect())
    }

    async fn delete_event(&self, id: EventId) -> Result<bool, StoreError> {
        Ok(self.records.write().remove(&id).is_some())
    }

    fn is_healthy(&self) -> bool {
        true
    }

    async fn reconnect(&self) -> Result<(), StoreError> {
        Ok(())
    }
}
