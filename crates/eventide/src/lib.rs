//! Eventide: a pool of time-bounded, multi-participant events inside a
//! long-running server process.
//!
//! This crate is the composition root. It wires the registry, the
//! autonomous scheduler, and the persistence writer into an
//! [`EventService`] with three background loops (tick, scheduler poll,
//! autosave) and a cooperative shutdown. All shared state lives in an
//! explicit [`Context`] object handed out by the service; there are no
//! ambient statics.
//!
//! # Example
//!
//! ```rust,ignore
//! use eventide::prelude::*;
//!
//! let gateway = Arc::new(MemoryStore::new());
//! let service = EventService::builder()
//!     .gateway(gateway)
//!     .presets(my_presets)
//!     .start()
//!     .await?;
//!
//! let event = service.context().registry.create_event(params, now_ms())?;
//! // ...
//! service.shutdown().await;
//! ```

mod config;
mod context;
mod service;
mod task;

pub use config::ServiceConfig;
pub use context::Context;
pub use service::{EventService, EventServiceBuilder, ServiceError, now_ms};
pub use task::RepeatingTask;

/// One-line imports for embedders.
pub mod prelude {
    pub use crate::{Context, EventService, ServiceConfig, now_ms};
    pub use eventide_registry::{
        AnnounceKind, Announcer, EndReason, Event, EventFilter, EventOrder, EventParams,
        EventRegistry, HookBus, LeaveReason, LifecycleHooks, LogAnnouncer, RegistryConfig,
        RegistryError,
    };
    pub use eventide_scheduler::{EventPreset, PresetCatalog, Scheduler, SchedulerConfig};
    pub use eventide_store::{
        JsonFileStore, MemoryStore, PersistenceGateway, StoreConfig, StoreWriter,
    };
    pub use eventide_types::{EventId, EventKind, EventRecord, EventStatus, ParticipantId, Reward};
}

/// Installs a `tracing` subscriber reading `RUST_LOG`, for binaries that
/// have no logging setup of their own. Call at most once.
pub fn init_tracing() {
    use tracing_subscriber::EnvFilter;
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();
}
