//! The shared-state context object.

use std::sync::Arc;

use eventide_registry::EventRegistry;
use eventide_scheduler::{PresetCatalog, Scheduler};
use eventide_store::{PersistenceGateway, StoreWriter};

use crate::ServiceConfig;

/// Every shared component, constructed once by the service and passed
/// around explicitly. Nothing in Eventide reaches for a global; anything
/// that needs the registry or the catalog takes (a clone of) this.
pub struct Context {
    pub config: ServiceConfig,
    /// The storage backend, fixed for the lifetime of the service.
    pub gateway: Arc<dyn PersistenceGateway>,
    pub writer: Arc<StoreWriter>,
    pub registry: Arc<EventRegistry>,
    pub catalog: Arc<PresetCatalog>,
    pub scheduler: Arc<Scheduler>,
}
