//! Service lifecycle: wiring, background loops, cooperative shutdown.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use chrono::Utc;
use eventide_registry::{Announcer, EventRegistry, HookBus, LifecycleHooks, LogAnnouncer};
use eventide_scheduler::{EventPreset, PresetCatalog, Scheduler};
use eventide_store::{MemoryStore, PersistenceGateway, StoreError, StoreWriter};
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use crate::{Context, RepeatingTask, ServiceConfig};

/// Current wall-clock time as epoch milliseconds.
///
/// The single time source for the background loops. Lifecycle methods
/// take `now_ms` as a parameter precisely so that only the loops (and
/// embedders) call this.
pub fn now_ms() -> i64 {
    Utc::now().timestamp_millis()
}

/// Failures while bringing the service up.
#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    #[error("persistence backend failed during startup: {0}")]
    Store(#[from] StoreError),
}

// ---------------------------------------------------------------------------
// Builder
// ---------------------------------------------------------------------------

/// Configures and starts an [`EventService`].
pub struct EventServiceBuilder {
    config: ServiceConfig,
    gateway: Option<Arc<dyn PersistenceGateway>>,
    presets: Vec<EventPreset>,
    hooks: HookBus,
    announcer: Arc<dyn Announcer>,
}

impl EventServiceBuilder {
    pub fn new() -> Self {
        Self {
            config: ServiceConfig::default(),
            gateway: None,
            presets: Vec::new(),
            hooks: HookBus::new(),
            announcer: Arc::new(LogAnnouncer),
        }
    }

    pub fn config(mut self, config: ServiceConfig) -> Self {
        self.config = config;
        self
    }

    /// Selects the storage backend. This choice is final for the life of
    /// the service; there is no mid-session fallback. Defaults to an
    /// in-process [`MemoryStore`].
    pub fn gateway(mut self, gateway: Arc<dyn PersistenceGateway>) -> Self {
        self.gateway = Some(gateway);
        self
    }

    /// Seeds the preset catalog the scheduler draws from.
    pub fn presets(mut self, presets: Vec<EventPreset>) -> Self {
        self.presets = presets;
        self
    }

    /// Registers a lifecycle hook. May be called repeatedly.
    pub fn hook(mut self, hook: Arc<dyn LifecycleHooks>) -> Self {
        self.hooks.register(hook);
        self
    }

    pub fn announcer(mut self, announcer: Arc<dyn Announcer>) -> Self {
        self.announcer = announcer;
        self
    }

    /// Wires everything together, re-adopts persisted events, and spawns
    /// the three background loops.
    pub async fn start(self) -> Result<EventService, ServiceError> {
        let config = self.config.validated();
        let gateway = self.gateway.unwrap_or_else(|| {
            debug!("no gateway configured, using in-process memory store");
            Arc::new(MemoryStore::new())
        });
        if !gateway.is_healthy() {
            warn!("storage backend reports unhealthy at startup");
        }

        let writer = Arc::new(StoreWriter::spawn(gateway.clone(), config.store.clone()));
        let registry = Arc::new(EventRegistry::new(
            config.registry.clone(),
            self.hooks,
            self.announcer.clone(),
            writer.clone(),
        ));
        let adopted = registry.load_persisted(gateway.as_ref()).await?;

        let catalog = Arc::new(PresetCatalog::from_presets(self.presets));
        let scheduler = Arc::new(Scheduler::new(
            config.scheduler.clone(),
            catalog.clone(),
            registry.clone(),
            self.announcer.clone(),
        ));

        let tick = RepeatingTask::spawn("registry-tick", config.tick_interval, {
            let registry = registry.clone();
            move || registry.tick(now_ms())
        });
        let poll = RepeatingTask::spawn("scheduler-poll", config.scheduler_poll_interval, {
            let scheduler = scheduler.clone();
            move || scheduler.poll(now_ms())
        });
        let autosave = RepeatingTask::spawn("autosave", config.autosave_interval, {
            let registry = registry.clone();
            move || {
                registry.flush_all();
            }
        });

        let context = Arc::new(Context {
            config,
            gateway,
            writer,
            registry,
            catalog,
            scheduler,
        });

        info!(adopted, presets = context.catalog.len(), "event service started");
        Ok(EventService {
            context,
            tasks: Mutex::new(vec![tick, poll, autosave]),
            running: AtomicBool::new(true),
        })
    }
}

impl Default for EventServiceBuilder {
    fn default() -> Self {
        Self::new()
    }
}

// ---------------------------------------------------------------------------
// Service
// ---------------------------------------------------------------------------

/// The running event system: context plus background loops.
pub struct EventService {
    context: Arc<Context>,
    tasks: Mutex<Vec<RepeatingTask>>,
    running: AtomicBool,
}

impl EventService {
    pub fn builder() -> EventServiceBuilder {
        EventServiceBuilder::new()
    }

    /// The shared component handles.
    pub fn context(&self) -> &Arc<Context> {
        &self.context
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::Acquire)
    }

    /// Cooperative shutdown: stops the loops, performs a final flush,
    /// then drains the writer within its grace period. Idempotent; the
    /// second and later calls are no-ops.
    pub async fn shutdown(&self) {
        if !self.running.swap(false, Ordering::AcqRel) {
            return;
        }

        let tasks: Vec<RepeatingTask> = self.tasks.lock().await.drain(..).collect();
        for task in tasks {
            task.stop().await;
        }

        let flushed = self.context.registry.flush_all();
        self.context.writer.shutdown().await;
        info!(flushed, "event service stopped");
    }
}
