//! File-backed storage: one JSON document per event.

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use eventide_types::{EventId, EventRecord};
use tokio::fs;
use tracing::{debug, warn};

use crate::{PersistenceGateway, StoreError};

/// A backend that writes each event to `<data_dir>/<event_id>.json`.
///
/// Writes go to a temp file first and are renamed into place, so a crash
/// mid-write never leaves a truncated document behind. The health flag
/// flips on the first io failure and stays down until [`reconnect`]
/// succeeds.
///
/// [`reconnect`]: PersistenceGateway::reconnect
pub struct JsonFileStore {
    data_dir: PathBuf,
    healthy: AtomicBool,
}

impl JsonFileStore {
    /// Opens (creating if needed) a store rooted at `data_dir`.
    pub async fn open(data_dir: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let data_dir = data_dir.into();
        fs::create_dir_all(&data_dir).await?;
        debug!(dir = %data_dir.display(), "json file store opened");
        Ok(Self {
            data_dir,
            healthy: AtomicBool::new(true),
        })
    }

    fn event_path(&self, id: EventId) -> PathBuf {
        self.data_dir.join(format!("{}.json", id.0))
    }

    /// Runs `op`, mapping an io failure into an unhealthy store.
    fn note_result<T>(&self, result: Result<T, StoreError>) -> Result<T, StoreError> {
        if result.is_err() {
            self.healthy.store(false, Ordering::Release);
        }
        result
    }

    async fn write_record(&self, record: &EventRecord) -> Result<(), StoreError> {
        let body = serde_json::to_vec_pretty(record)?;
        let final_path = self.event_path(record.id);
        let tmp_path = final_path.with_extension("json.tmp");
        fs::write(&tmp_path, &body).await?;
        fs::rename(&tmp_path, &final_path).await?;
        Ok(())
    }

    async fn read_record(path: &Path) -> Result<EventRecord, StoreError> {
        let body = fs::read(path).await?;
        Ok(serde_json::from_slice(&body)?)
    }
}

#[async_trait]
impl PersistenceGateway for JsonFileStore {
    async fn save_event(&self, record: &EventRecord) -> Result<(), StoreError> {
        let result = self.write_record(record).await;
        self.note_result(result)
    }

    async fn save_events(&self, batch: &[EventRecord]) -> Result<(), StoreError> {
        for record in batch {
            let result = self.write_record(record).await;
            self.note_result(result)?;
        }
        Ok(())
    }

    async fn load_event(&self, id: EventId) -> Result<Option<EventRecord>, StoreError> {
        let path = self.event_path(id);
        if !fs::try_exists(&path).await.unwrap_or(false) {
            return Ok(None);
        }
        let result = Self::read_record(&path).await.map(Some);
        self.note_result(result)
    }

    async fn load_all_events(&self) -> Result<Vec<EventRecord>, StoreError> {
        let mut records = Vec::new();
        let mut entries = fs::read_dir(&self.data_dir).await?;
        while let Some(entry) = entries.next_entry().await? {
            let path = entry.path();
            if path.extension().and_then(|e| e.to_str()) != Some("json") {
                continue;
            }
            // A single corrupt document must not hide the rest.
            match Self::read_record(&path).await {
                Ok(record) => records.push(record),
                Err(err) => {
                    warn!(file = %path.display(), %err, "skipping unreadable event file");
                }
            }
        }
        Ok(records)
    }

    async fn delete_event(&self, id: EventId) -> Result<bool, StoreError> {
        let path = self.event_path(id);
        match fs::remove_file(&path).await {
            Ok(()) => Ok(true),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(false),
            Err(err) => self.note_result(Err(err.into())),
        }
    }

    fn is_healthy(&self) -> bool {
        self.healthy.load(Ordering::Acquire)
    }

    async fn reconnect(&self) -> Result<(), StoreError> {
        // Re-establish the data directory and prove we can write to it.
        fs::create_dir_all(&self.data_dir).await?;
        let probe = self.data_dir.join(".probe");
        fs::write(&probe, b"ok").await?;
        fs::remove_file(&probe).await?;
        self.healthy.store(true, Ordering::Release);
        debug!(dir = %self.data_dir.display(), "json file store reconnected");
        Ok(())
    }
}
