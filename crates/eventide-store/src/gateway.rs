//! The storage contract the core depends on.

use async_trait::async_trait;
use eventide_types::{EventId, EventRecord};

use crate::StoreError;

/// Async save/load/delete of event snapshots.
///
/// This trait is the only thing the rest of the system knows about
/// storage. The backend is selected once at initialization and handed
/// around as `Arc<dyn PersistenceGateway>`.
///
/// Implementations must tolerate concurrent calls; the writer pool may
/// run several jobs at once.
#[async_trait]
pub trait PersistenceGateway: Send + Sync {
    /// Persists one event snapshot, overwriting any previous copy.
    async fn save_event(&self, record: &EventRecord) -> Result<(), StoreError>;

    /// Persists a batch of snapshots, reporting an error if any record
    /// fails. Callers chunk large flushes so one bad chunk cannot take
    /// down a whole autosave cycle.
    async fn save_events(&self, batch: &[EventRecord]) -> Result<(), StoreError>;

    /// Loads one snapshot, or `None` if the id is unknown.
    async fn load_event(&self, id: EventId) -> Result<Option<EventRecord>, StoreError>;

    /// Loads every persisted snapshot.
    async fn load_all_events(&self) -> Result<Vec<EventRecord>, StoreError>;

    /// Removes a persisted snapshot. Returns `true` if one existed.
    async fn delete_event(&self, id: EventId) -> Result<bool, StoreError>;

    /// Cheap liveness check, callable from sync contexts.
    fn is_healthy(&self) -> bool;

    /// Attempts to restore a failed backend to a usable state.
    async fn reconnect(&self) -> Result<(), StoreError>;
}
