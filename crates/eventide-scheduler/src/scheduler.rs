//! The autonomous event scheduler.

use std::collections::HashSet;
use std::sync::Arc;

use eventide_registry::{Announcer, Event, EventParams, EventRegistry, RegistryError};
use parking_lot::Mutex;
use rand::Rng;
use tracing::{debug, info, warn};

use crate::{EventPreset, PresetCatalog, SchedulerConfig, WeightedTable};

/// Mutable scheduler state, all behind one lock.
struct ScheduleState {
    /// When the next auto event fires, epoch ms. 0 = not planned yet.
    next_event_at: i64,
    /// Remaining-minute values already announced for the current slot.
    announced_minutes: HashSet<i64>,
}

/// Creates and starts events from the preset catalog on a randomized
/// timetable, and emits countdown reminders.
///
/// Drive it by calling [`poll`](Scheduler::poll) on a small fixed
/// interval; like the registry tick, it takes `now_ms` explicitly so the
/// composition root passes the wall clock and tests pass whatever they
/// need. Each poll is cheap when the slot is not due.
pub struct Scheduler {
    config: SchedulerConfig,
    catalog: Arc<PresetCatalog>,
    registry: Arc<EventRegistry>,
    announcer: Arc<dyn Announcer>,
    state: Mutex<ScheduleState>,
}

impl Scheduler {
    pub fn new(
        config: SchedulerConfig,
        catalog: Arc<PresetCatalog>,
        registry: Arc<EventRegistry>,
        announcer: Arc<dyn Announcer>,
    ) -> Self {
        Self {
            config: config.validated(),
            catalog,
            registry,
            announcer,
            state: Mutex::new(ScheduleState {
                next_event_at: 0,
                announced_minutes: HashSet::new(),
            }),
        }
    }

    /// The currently planned slot, epoch ms. 0 until the first poll.
    pub fn next_event_at(&self) -> i64 {
        self.state.lock().next_event_at
    }

    /// Forces the next poll to fire immediately (admin control).
    pub fn force_next(&self, now_ms: i64) {
        let mut state = self.state.lock();
        state.next_event_at = now_ms;
        state.announced_minutes.clear();
        info!("next auto event forced");
    }

    /// Swaps in a fresh preset catalog and replans the slot from scratch
    /// (admin restart).
    pub fn restart(&self, presets: Vec<EventPreset>, now_ms: i64) {
        self.catalog.replace_all(presets);
        let mut state = self.state.lock();
        state.next_event_at = now_ms + self.random_interval();
        state.announced_minutes.clear();
        info!(
            presets = self.catalog.len(),
            next_event_at = state.next_event_at,
            "scheduler restarted"
        );
    }

    /// Runtime enable/disable of one preset (admin control).
    pub fn set_preset_enabled(&self, id: &str, enabled: bool) -> bool {
        self.catalog.set_enabled(id, enabled)
    }

    /// One scheduler cycle.
    ///
    /// Plans the first slot on the first call. While inside the reminder
    /// lead window, announces each distinct remaining-minute value once.
    /// When the slot is due: draws an enabled preset by weight, creates
    /// and starts an event from it, and replans. The slot advances on
    /// success *and* on failure; only an empty enabled set leaves it in
    /// place to retry next poll.
    pub fn poll(&self, now_ms: i64) {
        let mut state = self.state.lock();

        if state.next_event_at == 0 {
            state.next_event_at = now_ms + self.random_interval();
            debug!(next_event_at = state.next_event_at, "first auto event planned");
            return;
        }

        let remaining = state.next_event_at - now_ms;
        if remaining > 0 {
            if remaining <= self.config.reminder_lead_ms {
                // Whole minutes left, rounded up: 90s away reads as
                // "2 minutes".
                let minutes_left = (remaining + 59_999) / 60_000;
                if state.announced_minutes.len() > self.config.announced_set_bound {
                    state.announced_minutes.clear();
                }
                if state.announced_minutes.insert(minutes_left) {
                    self.announcer.announce_upcoming(minutes_left);
                }
            }
            return;
        }

        let enabled = self.catalog.enabled();
        if enabled.is_empty() {
            // Leave the slot due; the next poll retries as soon as a
            // preset is enabled again.
            debug!("auto event due but no preset is enabled");
            return;
        }

        match self.draw_preset(&enabled) {
            Some(preset) => match self.spawn_from_preset(preset, now_ms) {
                Ok(event) => {
                    info!(
                        event_id = %event.id(),
                        preset = %preset.id,
                        "auto event created and started"
                    );
                }
                Err(err) => {
                    warn!(preset = %preset.id, %err, "auto event refused");
                }
            },
            None => {
                warn!("enabled presets have no selectable weight");
            }
        }

        // Success or failure, the slot advances; a bad cycle must never
        // stall the loop.
        state.next_event_at = now_ms + self.random_interval();
        state.announced_minutes.clear();
        debug!(next_event_at = state.next_event_at, "next auto event planned");
    }

    fn draw_preset<'a>(&self, enabled: &'a [EventPreset]) -> Option<&'a EventPreset> {
        let table = WeightedTable::new(enabled.iter().map(|p| p.weight))?;
        let index = table.pick(&mut rand::rng());
        enabled.get(index)
    }

    fn spawn_from_preset(
        &self,
        preset: &EventPreset,
        now_ms: i64,
    ) -> Result<Arc<Event>, RegistryError> {
        let end_ms = now_ms + (preset.duration_secs as i64) * 1000;
        let metadata = [
            ("preset".to_string(), preset.id.clone()),
            (
                "min_participants".to_string(),
                preset.min_participants.to_string(),
            ),
        ]
        .into_iter()
        .collect();

        let params = EventParams {
            name: preset.name.clone(),
            description: preset.description.clone(),
            kind: Some(preset.kind),
            created_by: None,
            max_participants: preset.max_participants,
            start_ms: now_ms,
            end_ms,
            rewards: preset.rewards.clone(),
            requirements: None,
            metadata: Some(metadata),
        };

        let event = self.registry.create_event(params, now_ms)?;
        self.registry.start_event(event.id(), now_ms)?;
        Ok(event)
    }

    fn random_interval(&self) -> i64 {
        rand::rng().random_range(self.config.min_interval_ms..=self.config.max_interval_ms)
    }
}
