//! Fire-and-forget persistence dispatch.
//!
//! Lifecycle operations must never block on storage io, so they push jobs
//! into a bounded channel and move on. A small pool of worker tasks drains
//! the channel and talks to the gateway. Write failures are logged, the
//! backend's health is probed, and a reconnect is attempted; in-memory
//! state is never rolled back.

use std::sync::Arc;
use std::time::Duration;

use eventide_types::{EventId, EventRecord};
use parking_lot::Mutex;
use tokio::sync::{Mutex as AsyncMutex, mpsc};
use tokio::task::JoinHandle;
use tokio::time::{Instant, timeout_at};
use tracing::{debug, error, info, warn};

use crate::PersistenceGateway;

// ---------------------------------------------------------------------------
// Configuration
// ---------------------------------------------------------------------------

/// Settings for the background writer pool.
#[derive(Debug, Clone)]
pub struct StoreConfig {
    /// Bounded job queue depth. When full, new jobs are dropped (logged).
    pub queue_depth: usize,
    /// Number of worker tasks draining the queue.
    pub workers: usize,
    /// Batch flushes are split into chunks of this many records; each
    /// chunk saves atomically.
    pub batch_size: usize,
    /// How long shutdown waits for outstanding jobs before proceeding
    /// unconditionally.
    pub shutdown_grace: Duration,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            queue_depth: 256,
            workers: 2,
            batch_size: 25,
            shutdown_grace: Duration::from_secs(5),
        }
    }
}

impl StoreConfig {
    /// Fix out-of-range values so the config is safe to use.
    pub fn validated(mut self) -> Self {
        if self.queue_depth == 0 {
            warn!("store queue_depth of 0 is invalid, using 1");
            self.queue_depth = 1;
        }
        if self.workers == 0 {
            warn!("store worker count of 0 is invalid, using 1");
            self.workers = 1;
        }
        if self.batch_size == 0 {
            self.batch_size = 1;
        }
        self
    }
}

// ---------------------------------------------------------------------------
// Jobs
// ---------------------------------------------------------------------------

enum StoreJob {
    Save(EventRecord),
    SaveBatch(Vec<EventRecord>),
    Delete(EventId),
}

// ---------------------------------------------------------------------------
// Writer
// ---------------------------------------------------------------------------

/// Handle to the background writer pool.
///
/// All `queue_*` methods are non-blocking and infallible from the
/// caller's perspective: a full queue drops the job with a warning
/// rather than stalling a lifecycle operation. After [`shutdown`] the
/// queue is closed and further jobs are dropped silently.
///
/// [`shutdown`]: StoreWriter::shutdown
pub struct StoreWriter {
    /// `None` once shutdown has closed the queue.
    tx: Mutex<Option<mpsc::Sender<StoreJob>>>,
    workers: Mutex<Vec<JoinHandle<()>>>,
    shutdown_grace: Duration,
}

impl StoreWriter {
    /// Spawns the worker pool against the given backend.
    pub fn spawn(gateway: Arc<dyn PersistenceGateway>, config: StoreConfig) -> Self {
        let config = config.validated();
        let (tx, rx) = mpsc::channel(config.queue_depth);
        // Workers share one receiver; whichever is idle picks up the
        // next job.
        let rx = Arc::new(AsyncMutex::new(rx));

        let workers = (0..config.workers)
            .map(|worker| {
                let gateway = Arc::clone(&gateway);
                let rx = Arc::clone(&rx);
                let batch_size = config.batch_size;
                tokio::spawn(async move {
                    worker_loop(worker, gateway, rx, batch_size).await;
                })
            })
            .collect();

        debug!(
            workers = config.workers,
            queue_depth = config.queue_depth,
            "store writer started"
        );

        Self {
            tx: Mutex::new(Some(tx)),
            workers: Mutex::new(workers),
            shutdown_grace: config.shutdown_grace,
        }
    }

    fn enqueue(&self, job: StoreJob, what: &str, detail: impl FnOnce() -> String) {
        let guard = self.tx.lock();
        let Some(tx) = guard.as_ref() else {
            // Shutting down; new work is intentionally refused.
            return;
        };
        if tx.try_send(job).is_err() {
            warn!(what, detail = %detail(), "store queue full, dropping job");
        }
    }

    /// Queues a single-event save.
    pub fn queue_save(&self, record: EventRecord) {
        let id = record.id;
        self.enqueue(StoreJob::Save(record), "save", || id.to_string());
    }

    /// Queues a coalesced batch save (autosave / shutdown flush).
    pub fn queue_batch(&self, batch: Vec<EventRecord>) {
        if batch.is_empty() {
            return;
        }
        let count = batch.len();
        self.enqueue(StoreJob::SaveBatch(batch), "batch save", || {
            format!("{count} records")
        });
    }

    /// Queues removal of a persisted event.
    pub fn queue_delete(&self, id: EventId) {
        self.enqueue(StoreJob::Delete(id), "delete", || id.to_string());
    }

    /// Closes the queue and waits up to the configured grace period for
    /// workers to drain it. Workers still running after the deadline are
    /// abandoned; shutdown proceeds unconditionally.
    pub async fn shutdown(&self) {
        let tx = self.tx.lock().take();
        drop(tx);
        let workers = std::mem::take(&mut *self.workers.lock());
        let deadline = Instant::now() + self.shutdown_grace;
        for (worker, handle) in workers.into_iter().enumerate() {
            if timeout_at(deadline, handle).await.is_err() {
                warn!(worker, "store worker did not drain in time, abandoning");
            }
        }
        debug!("store writer stopped");
    }
}

async fn worker_loop(
    worker: usize,
    gateway: Arc<dyn PersistenceGateway>,
    rx: Arc<AsyncMutex<mpsc::Receiver<StoreJob>>>,
    batch_size: usize,
) {
    loop {
        // Hold the lock only while waiting for the next job, not while
        // running it, so other workers stay busy.
        let job = { rx.lock().await.recv().await };
        let Some(job) = job else { break };

        match job {
            StoreJob::Save(record) => {
                if let Err(err) = gateway.save_event(&record).await {
                    note_failure(&gateway, "save", &err).await;
                }
            }
            StoreJob::SaveBatch(batch) => {
                for chunk in batch.chunks(batch_size) {
                    if let Err(err) = gateway.save_events(chunk).await {
                        // One failed chunk must not sink the rest.
                        note_failure(&gateway, "batch save", &err).await;
                    }
                }
            }
            StoreJob::Delete(id) => {
                if let Err(err) = gateway.delete_event(id).await {
                    note_failure(&gateway, "delete", &err).await;
                }
            }
        }
    }
    debug!(worker, "store worker stopped");
}

/// Logs a write failure and probes backend health. The backend choice is
/// fixed at init: the reconnect targets the same backend, and its outcome
/// is logged rather than silently falling back anywhere.
async fn note_failure(
    gateway: &Arc<dyn PersistenceGateway>,
    operation: &str,
    err: &crate::StoreError,
) {
    warn!(%err, operation, "persistence write failed, in-memory state unaffected");
    if !gateway.is_healthy() {
        match gateway.reconnect().await {
            Ok(()) => info!("storage backend reconnected"),
            Err(err) => error!(%err, "storage backend reconnect failed"),
        }
    }
}
