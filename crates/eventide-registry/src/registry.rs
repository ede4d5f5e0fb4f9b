//! The authoritative event store and lifecycle API.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use eventide_store::{PersistenceGateway, StoreError, StoreWriter};
use eventide_types::{EventId, EventStatus, ParticipantId};
use parking_lot::{Mutex, RwLock};
use tracing::{debug, info, trace, warn};

use crate::{
    AnnounceKind, Announcer, EndReason, Event, EventFilter, EventOrder, EventParams, HookBus,
    LeaveReason, RegistryConfig, RegistryError,
};

/// Owns every event and mediates every mutation.
///
/// All lifecycle methods are synchronous and callable from any thread;
/// persistence is dispatched fire-and-forget through the store writer.
/// Timing-sensitive entry points take `now_ms` (epoch milliseconds)
/// explicitly, so the background loops pass the wall clock and tests pass
/// whatever they need.
pub struct EventRegistry {
    config: RegistryConfig,
    /// Every event ever registered (terminal events are retained until
    /// explicitly deleted).
    events: RwLock<HashMap<EventId, Arc<Event>>>,
    /// Ids of non-terminal events; the subset the tick scans.
    live: RwLock<HashSet<EventId>>,
    /// Leave timestamps for the join cooldown, epoch ms.
    cooldowns: Mutex<HashMap<ParticipantId, i64>>,
    hooks: HookBus,
    announcer: Arc<dyn Announcer>,
    writer: Arc<StoreWriter>,
    ticks: AtomicU64,
}

impl EventRegistry {
    pub fn new(
        config: RegistryConfig,
        hooks: HookBus,
        announcer: Arc<dyn Announcer>,
        writer: Arc<StoreWriter>,
    ) -> Self {
        Self {
            config: config.validated(),
            events: RwLock::new(HashMap::new()),
            live: RwLock::new(HashSet::new()),
            cooldowns: Mutex::new(HashMap::new()),
            hooks,
            announcer,
            writer,
            ticks: AtomicU64::new(0),
        }
    }

    // -- creation and removal ----------------------------------------------

    /// Creates and registers a new event.
    ///
    /// Checks run in order, first failure wins, nothing is mutated on
    /// refusal: input well-formedness, the global active cap, the
    /// per-creator quota, then the `pre_create` hook.
    pub fn create_event(
        &self,
        params: EventParams,
        now_ms: i64,
    ) -> Result<Arc<Event>, RegistryError> {
        if params.name.trim().is_empty() {
            return Err(RegistryError::InvalidInput("event name is empty".into()));
        }
        if params.start_ms < 0 || params.end_ms < 0 {
            return Err(RegistryError::InvalidInput(
                "timestamps must not be negative".into(),
            ));
        }
        if params.start_ms > 0 && params.end_ms > 0 && params.start_ms > params.end_ms {
            return Err(RegistryError::InvalidInput(
                "start time is after end time".into(),
            ));
        }

        let cap = self.config.max_active_events;
        if cap > 0 && self.active_count() >= cap {
            return Err(RegistryError::ActiveCapReached(cap));
        }

        if let Some(creator) = params.created_by {
            let quota = self.config.creator_event_quota;
            if quota > 0 {
                let owned = self
                    .live_events()
                    .iter()
                    .filter(|e| e.created_by() == Some(creator))
                    .count();
                if owned >= quota {
                    return Err(RegistryError::CreatorQuotaReached(creator, quota));
                }
            }
        }

        let event = Arc::new(Event::new(EventId::new(), params, now_ms));
        if !self.hooks.pre_create(&event) {
            return Err(RegistryError::Vetoed);
        }

        self.events.write().insert(event.id(), Arc::clone(&event));
        self.live.write().insert(event.id());

        info!(event_id = %event.id(), name = event.name(), kind = %event.kind(), "event created");
        self.writer.queue_save(event.to_record());
        self.hooks.post_create(&event);
        self.announcer.announce(&event, AnnounceKind::Created);
        Ok(event)
    }

    /// Unregisters an event and removes its persisted copy.
    pub fn delete_event(&self, id: EventId) -> Result<(), RegistryError> {
        let removed = self.events.write().remove(&id);
        let Some(event) = removed else {
            return Err(RegistryError::NotFound(id));
        };
        self.live.write().remove(&id);
        self.writer.queue_delete(id);
        info!(event_id = %id, name = event.name(), "event deleted");
        Ok(())
    }

    // -- state transitions -------------------------------------------------

    /// Assigns a start (and optionally end) time to a created event,
    /// moving it to `Scheduled`.
    pub fn schedule_event(
        &self,
        id: EventId,
        start_ms: i64,
        end_ms: i64,
    ) -> Result<(), RegistryError> {
        if start_ms <= 0 {
            return Err(RegistryError::InvalidInput(
                "scheduled start time must be positive".into(),
            ));
        }
        if end_ms != 0 && end_ms < start_ms {
            return Err(RegistryError::InvalidInput(
                "end time is before start time".into(),
            ));
        }
        let event = self.get_or_err(id)?;
        if end_ms == 0 && event.end_ms() != 0 && start_ms > event.end_ms() {
            return Err(RegistryError::InvalidInput(
                "start time is after the event's existing end time".into(),
            ));
        }
        event.guarded_transition(EventStatus::Scheduled, || true, |e| {
            e.set_start_ms(start_ms);
            if end_ms > 0 {
                e.set_end_ms(end_ms);
            }
        })?;
        debug!(event_id = %id, start_ms, end_ms, "event scheduled");
        self.writer.queue_save(event.to_record());
        Ok(())
    }

    /// Starts an event now. Sets the actual start time if none was
    /// scheduled. Subject to the global active cap and the `pre_start`
    /// hook.
    pub fn start_event(&self, id: EventId, now_ms: i64) -> Result<(), RegistryError> {
        let event = self.get_or_err(id)?;

        let cap = self.config.max_active_events;
        if cap > 0 && self.active_count() >= cap {
            return Err(RegistryError::ActiveCapReached(cap));
        }

        event.guarded_transition(
            EventStatus::Active,
            || self.hooks.pre_start(&event),
            |e| {
                if e.start_ms() == 0 {
                    e.set_start_ms(now_ms);
                }
            },
        )?;

        info!(event_id = %id, name = event.name(), "event started");
        self.writer.queue_save(event.to_record());
        self.hooks.post_start(&event);
        self.announcer.announce(&event, AnnounceKind::Starting);
        Ok(())
    }

    /// Ends an active event now (manual end).
    pub fn end_event(&self, id: EventId, now_ms: i64) -> Result<(), RegistryError> {
        self.end_event_with(id, EndReason::Manual, now_ms)
    }

    fn end_event_with(
        &self,
        id: EventId,
        reason: EndReason,
        now_ms: i64,
    ) -> Result<(), RegistryError> {
        let event = self.get_or_err(id)?;
        event.guarded_transition(EventStatus::Completed, || true, |e| {
            // Record the actual end time if it ended early or was
            // open-ended.
            let end = e.end_ms();
            if end == 0 || end > now_ms {
                e.set_end_ms(now_ms);
            }
        })?;

        self.live.write().remove(&id);
        info!(event_id = %id, name = event.name(), ?reason, "event completed");
        self.writer.queue_save(event.to_record());
        self.hooks.post_end(&event, reason);
        self.announcer.announce(&event, AnnounceKind::Ended);
        Ok(())
    }

    /// Cancels any non-terminal event.
    pub fn cancel_event(&self, id: EventId) -> Result<(), RegistryError> {
        let event = self.get_or_err(id)?;
        event.guarded_transition(EventStatus::Cancelled, || true, |_| {})?;

        self.live.write().remove(&id);
        info!(event_id = %id, name = event.name(), "event cancelled");
        self.writer.queue_save(event.to_record());
        self.hooks.post_end(&event, EndReason::Cancelled);
        for participant in event.participants() {
            self.hooks
                .post_leave(participant, &event, LeaveReason::EventCancelled);
        }
        self.announcer
            .broadcast_to_participants(&event, "The event has been cancelled.");
        self.announcer.announce(&event, AnnounceKind::Ended);
        Ok(())
    }

    /// Suspends an active event. Reversible, no timing side effects.
    pub fn pause_event(&self, id: EventId) -> Result<(), RegistryError> {
        let event = self.get_or_err(id)?;
        event.guarded_transition(EventStatus::Paused, || true, |_| {})?;
        debug!(event_id = %id, "event paused");
        self.writer.queue_save(event.to_record());
        Ok(())
    }

    /// Resumes a paused event.
    pub fn resume_event(&self, id: EventId) -> Result<(), RegistryError> {
        let event = self.get_or_err(id)?;
        event.guarded_transition(EventStatus::Active, || true, |_| {})?;
        debug!(event_id = %id, "event resumed");
        self.writer.queue_save(event.to_record());
        Ok(())
    }

    // -- participants ------------------------------------------------------

    /// Admits a participant.
    ///
    /// Checks run in order, first failure wins: join cooldown, the
    /// per-participant simultaneous-event cap, the `pre_join` hook, then
    /// the event's own atomic check-and-add (state, capacity, duplicate).
    pub fn join_event(
        &self,
        id: EventId,
        participant: ParticipantId,
        now_ms: i64,
    ) -> Result<(), RegistryError> {
        let event = self.get_or_err(id)?;

        let cooldown = self.config.join_cooldown_ms;
        if cooldown > 0 {
            let mut cooldowns = self.cooldowns.lock();
            if let Some(&left_at) = cooldowns.get(&participant) {
                let ready_at = left_at.saturating_add(cooldown);
                if now_ms < ready_at {
                    return Err(RegistryError::OnCooldown(participant, ready_at - now_ms));
                }
                // Expired, drop the entry so the map stays small.
                cooldowns.remove(&participant);
            }
        }

        let cap = self.config.participant_event_cap;
        if cap > 0 {
            let memberships = self
                .live_events()
                .iter()
                .filter(|e| e.contains(participant))
                .count();
            if memberships >= cap {
                return Err(RegistryError::ParticipantCapReached(participant, cap));
            }
        }

        if !self.hooks.pre_join(participant, &event) {
            return Err(RegistryError::Vetoed);
        }

        let count = event.try_join(participant)?;
        trace!(event_id = %id, %participant, count, "participant joined");
        self.writer.queue_save(event.to_record());
        self.hooks.post_join(participant, &event);
        Ok(())
    }

    /// Removes a participant and starts their join cooldown.
    pub fn leave_event(
        &self,
        id: EventId,
        participant: ParticipantId,
        now_ms: i64,
    ) -> Result<(), RegistryError> {
        let event = self.get_or_err(id)?;
        let count = event.try_leave(participant)?;

        if self.config.join_cooldown_ms > 0 {
            self.cooldowns.lock().insert(participant, now_ms);
        }

        trace!(event_id = %id, %participant, count, "participant left");
        self.writer.queue_save(event.to_record());
        self.hooks
            .post_leave(participant, &event, LeaveReason::Voluntary);
        Ok(())
    }

    // -- read accessors ----------------------------------------------------

    pub fn get(&self, id: EventId) -> Option<Arc<Event>> {
        self.events.read().get(&id).cloned()
    }

    /// Every registered event, terminal ones included.
    pub fn all(&self) -> Vec<Arc<Event>> {
        self.events.read().values().cloned().collect()
    }

    /// Events currently in `Active` status.
    pub fn active_events(&self) -> Vec<Arc<Event>> {
        self.live_events()
            .into_iter()
            .filter(|e| e.status() == EventStatus::Active)
            .collect()
    }

    /// Events matching `filter`, optionally sorted by `order`.
    pub fn find(&self, filter: EventFilter, order: Option<EventOrder>) -> Vec<Arc<Event>> {
        let mut matches: Vec<Arc<Event>> = self
            .events
            .read()
            .values()
            .filter(|e| filter.matches(e))
            .cloned()
            .collect();
        if let Some(order) = order {
            matches.sort_by(order.comparator());
        }
        matches
    }

    /// Non-terminal events a participant is currently in.
    pub fn events_of_participant(&self, participant: ParticipantId) -> Vec<Arc<Event>> {
        self.live_events()
            .into_iter()
            .filter(|e| e.contains(participant))
            .collect()
    }

    /// Total registered events.
    pub fn count(&self) -> usize {
        self.events.read().len()
    }

    /// Number of events currently in `Active` status.
    pub fn active_count(&self) -> usize {
        self.live_events()
            .iter()
            .filter(|e| e.status() == EventStatus::Active)
            .count()
    }

    fn get_or_err(&self, id: EventId) -> Result<Arc<Event>, RegistryError> {
        self.get(id).ok_or(RegistryError::NotFound(id))
    }

    /// Snapshot of all non-terminal events.
    fn live_events(&self) -> Vec<Arc<Event>> {
        let events = self.events.read();
        self.live
            .read()
            .iter()
            .filter_map(|id| events.get(id).cloned())
            .collect()
    }

    // -- background processing ---------------------------------------------

    /// One pass of the periodic state scan.
    ///
    /// Snapshots the live set, then processes each event independently:
    /// scheduled events whose start time has arrived are started, active
    /// events whose end time has passed are ended. A refusal on one event
    /// (lost race, cap, veto) is logged and never stops the scan. Every
    /// `update_hook_every` ticks, the throttled `post_update` hook runs
    /// over the active events.
    pub fn tick(&self, now_ms: i64) {
        let snapshot = self.live_events();
        for event in &snapshot {
            match event.status() {
                EventStatus::Scheduled => {
                    let start = event.start_ms();
                    if start > 0 && now_ms >= start {
                        self.note_tick_outcome(event, "auto-start", self.start_event(event.id(), now_ms));
                    }
                }
                EventStatus::Active => {
                    let end = event.end_ms();
                    if end > 0 && now_ms >= end {
                        self.note_tick_outcome(
                            event,
                            "auto-end",
                            self.end_event_with(event.id(), EndReason::Expired, now_ms),
                        );
                    }
                }
                _ => {}
            }
        }

        let ticks = self.ticks.fetch_add(1, Ordering::Relaxed) + 1;
        let every = self.config.update_hook_every;
        if every > 0 && ticks % every == 0 {
            for event in snapshot.iter().filter(|e| e.status() == EventStatus::Active) {
                self.hooks.post_update(event);
            }
        }
    }

    fn note_tick_outcome(&self, event: &Event, action: &str, result: Result<(), RegistryError>) {
        match result {
            Ok(()) => {}
            Err(err) if err.is_benign_conflict() => {
                trace!(event_id = %event.id(), action, "lost transition race, already handled");
            }
            Err(err) => {
                warn!(event_id = %event.id(), action, %err, "tick action refused");
            }
        }
    }

    /// Queues a coalesced batch save of every live event.
    pub fn flush_all(&self) -> usize {
        let records: Vec<_> = self.live_events().iter().map(|e| e.to_record()).collect();
        let count = records.len();
        if count > 0 {
            trace!(count, "flushing live events");
            self.writer.queue_batch(records);
        }
        count
    }

    /// Loads persisted events and re-adopts the non-terminal ones.
    ///
    /// Called once at startup, before the background loops run. Terminal
    /// snapshots stay on disk but are not resurrected into memory.
    pub async fn load_persisted(
        &self,
        gateway: &dyn PersistenceGateway,
    ) -> Result<usize, StoreError> {
        let records = gateway.load_all_events().await?;
        let mut adopted = 0;
        for record in records {
            if record.status.is_terminal() {
                continue;
            }
            let event = Arc::new(Event::from_record(record));
            self.events.write().insert(event.id(), Arc::clone(&event));
            self.live.write().insert(event.id());
            adopted += 1;
        }
        info!(adopted, "persisted events loaded");
        Ok(adopted)
    }
}
