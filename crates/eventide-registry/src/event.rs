//! The live event entity.
//!
//! An [`Event`] is shared as `Arc<Event>` between the registry, the tick
//! loop, the scheduler, and arbitrary caller threads. Identity fields are
//! plain immutable data; the three mutable pieces each carry their own
//! guard:
//!
//! - `status` is an `AtomicU8`, readable lock-free anywhere, written only
//!   inside the transition guard, so every transition has exactly one
//!   winner.
//! - the participant set lives behind an `RwLock`, with the count mirrored
//!   into an atomic before the write guard drops, so a count read is
//!   always consistent with the latest completed mutation.
//! - `start_ms`/`end_ms` are atomics written by the winning transition.

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicI64, AtomicU8, AtomicUsize, Ordering};

use eventide_types::{EventId, EventKind, EventRecord, EventStatus, ParticipantId, Reward};
use parking_lot::{Mutex, RwLock};

use crate::RegistryError;

// ---------------------------------------------------------------------------
// EventParams
// ---------------------------------------------------------------------------

/// Everything needed to construct a new event.
///
/// `max_participants` of 0 (or negative) means unlimited; `start_ms` and
/// `end_ms` of 0 mean unscheduled/open-ended.
#[derive(Debug, Clone, Default)]
pub struct EventParams {
    pub name: String,
    pub description: String,
    pub kind: Option<EventKind>,
    pub created_by: Option<ParticipantId>,
    pub max_participants: i32,
    pub start_ms: i64,
    pub end_ms: i64,
    pub rewards: Vec<Reward>,
    pub requirements: Option<HashMap<String, String>>,
    pub metadata: Option<HashMap<String, String>>,
}

impl EventParams {
    pub fn new(name: impl Into<String>, description: impl Into<String>, kind: EventKind) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            kind: Some(kind),
            ..Self::default()
        }
    }
}

// ---------------------------------------------------------------------------
// Event
// ---------------------------------------------------------------------------

/// One live event.
///
/// Mutated only through registry-mediated operations; external code gets
/// `Arc<Event>` handles with read access.
#[derive(Debug)]
pub struct Event {
    id: EventId,
    name: String,
    description: String,
    kind: EventKind,
    created_by: Option<ParticipantId>,
    created_at: i64,
    max_participants: i32,
    rewards: Vec<Reward>,
    requirements: Option<HashMap<String, String>>,
    metadata: Option<HashMap<String, String>>,

    status: AtomicU8,
    /// Single-writer guard: every state transition runs inside this lock,
    /// so racing callers produce exactly one winner and the loser sees
    /// the already-updated status.
    transition_lock: Mutex<()>,
    participants: RwLock<HashSet<ParticipantId>>,
    participant_count: AtomicUsize,
    start_ms: AtomicI64,
    end_ms: AtomicI64,
}

impl Event {
    pub(crate) fn new(id: EventId, params: EventParams, created_at: i64) -> Self {
        Self {
            id,
            name: params.name,
            description: params.description,
            kind: params.kind.unwrap_or(EventKind::Custom),
            created_by: params.created_by,
            created_at,
            max_participants: params.max_participants,
            rewards: params.rewards,
            requirements: params.requirements,
            metadata: params.metadata,
            status: AtomicU8::new(EventStatus::Created as u8),
            transition_lock: Mutex::new(()),
            participants: RwLock::new(HashSet::new()),
            participant_count: AtomicUsize::new(0),
            start_ms: AtomicI64::new(params.start_ms),
            end_ms: AtomicI64::new(params.end_ms),
        }
    }

    // -- identity ----------------------------------------------------------

    pub fn id(&self) -> EventId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn kind(&self) -> EventKind {
        self.kind
    }

    pub fn created_by(&self) -> Option<ParticipantId> {
        self.created_by
    }

    /// Creation time, epoch milliseconds.
    pub fn created_at(&self) -> i64 {
        self.created_at
    }

    pub fn rewards(&self) -> &[Reward] {
        &self.rewards
    }

    pub fn requirements(&self) -> Option<&HashMap<String, String>> {
        self.requirements.as_ref()
    }

    pub fn metadata(&self) -> Option<&HashMap<String, String>> {
        self.metadata.as_ref()
    }

    /// Participant cap; 0 or negative means unlimited.
    pub fn max_participants(&self) -> i32 {
        self.max_participants
    }

    // -- status and timing -------------------------------------------------

    pub fn status(&self) -> EventStatus {
        let byte = self.status.load(Ordering::Acquire);
        EventStatus::from_u8(byte).expect("status byte is only ever written from EventStatus")
    }

    /// Scheduled/actual start, epoch milliseconds. 0 = not scheduled.
    pub fn start_ms(&self) -> i64 {
        self.start_ms.load(Ordering::Acquire)
    }

    /// Scheduled end, epoch milliseconds. 0 = open-ended.
    pub fn end_ms(&self) -> i64 {
        self.end_ms.load(Ordering::Acquire)
    }

    /// Runs a state transition under the single-writer guard.
    ///
    /// Order inside the guard: transition validity, then the vetoable
    /// `pre` callback, then `apply` (timing side effects), then the
    /// status write. A caller that loses the race fails the validity
    /// check and returns before `pre` runs, so the loser produces zero
    /// side effects.
    ///
    /// `pre` must not call back into lifecycle operations on this event.
    pub(crate) fn guarded_transition(
        &self,
        to: EventStatus,
        pre: impl FnOnce() -> bool,
        apply: impl FnOnce(&Self),
    ) -> Result<EventStatus, RegistryError> {
        let _guard = self.transition_lock.lock();
        let from = self.status();
        if !from.can_transition_to(to) {
            return Err(RegistryError::InvalidTransition {
                id: self.id,
                from,
                to,
            });
        }
        if !pre() {
            return Err(RegistryError::Vetoed);
        }
        apply(self);
        self.status.store(to as u8, Ordering::Release);
        Ok(from)
    }

    pub(crate) fn set_start_ms(&self, start_ms: i64) {
        self.start_ms.store(start_ms, Ordering::Release);
    }

    pub(crate) fn set_end_ms(&self, end_ms: i64) {
        self.end_ms.store(end_ms, Ordering::Release);
    }

    // -- participants ------------------------------------------------------

    /// Number of current participants.
    ///
    /// Lock-free; always reflects the latest completed join/leave.
    pub fn participant_count(&self) -> usize {
        self.participant_count.load(Ordering::Acquire)
    }

    /// Whether the cap is in effect and reached.
    pub fn is_full(&self) -> bool {
        self.max_participants > 0
            && self.participant_count() >= self.max_participants as usize
    }

    pub fn contains(&self, participant: ParticipantId) -> bool {
        self.participants.read().contains(&participant)
    }

    /// A point-in-time copy of the participant set.
    pub fn participants(&self) -> Vec<ParticipantId> {
        self.participants.read().iter().copied().collect()
    }

    /// Atomic check-and-add admission.
    ///
    /// The joinable/full/duplicate checks and the insert happen under one
    /// write guard, so the cap can never be exceeded no matter how many
    /// joins race, and the mirrored count is updated before the guard
    /// drops.
    pub(crate) fn try_join(&self, participant: ParticipantId) -> Result<usize, RegistryError> {
        let mut participants = self.participants.write();
        if !self.status().is_joinable() {
            return Err(RegistryError::NotJoinable(self.id));
        }
        if self.max_participants > 0 && participants.len() >= self.max_participants as usize {
            return Err(RegistryError::EventFull(self.id));
        }
        if !participants.insert(participant) {
            return Err(RegistryError::AlreadyJoined(participant, self.id));
        }
        let count = participants.len();
        self.participant_count.store(count, Ordering::Release);
        Ok(count)
    }

    pub(crate) fn try_leave(&self, participant: ParticipantId) -> Result<usize, RegistryError> {
        let mut participants = self.participants.write();
        if !participants.remove(&participant) {
            return Err(RegistryError::NotJoined(participant, self.id));
        }
        let count = participants.len();
        self.participant_count.store(count, Ordering::Release);
        Ok(count)
    }

    // -- persistence snapshot ----------------------------------------------

    /// Snapshot for the persistence gateway. Participants are sorted so
    /// saved documents are deterministic.
    pub fn to_record(&self) -> EventRecord {
        let mut participants = self.participants();
        participants.sort_by_key(|p| p.0);
        EventRecord {
            id: self.id,
            name: self.name.clone(),
            description: self.description.clone(),
            kind: self.kind,
            status: self.status(),
            max_participants: self.max_participants,
            participants,
            start_ms: self.start_ms(),
            end_ms: self.end_ms(),
            created_by: self.created_by,
            created_at: self.created_at,
            rewards: self.rewards.clone(),
            requirements: self.requirements.clone(),
            metadata: self.metadata.clone(),
        }
    }

    /// Rebuilds a live event from a persisted snapshot.
    pub fn from_record(record: EventRecord) -> Self {
        let participants: HashSet<ParticipantId> = record.participants.into_iter().collect();
        let count = participants.len();
        Self {
            id: record.id,
            name: record.name,
            description: record.description,
            kind: record.kind,
            created_by: record.created_by,
            created_at: record.created_at,
            max_participants: record.max_participants,
            rewards: record.rewards,
            requirements: record.requirements,
            metadata: record.metadata,
            status: AtomicU8::new(record.status as u8),
            transition_lock: Mutex::new(()),
            participants: RwLock::new(participants),
            participant_count: AtomicUsize::new(count),
            start_ms: AtomicI64::new(record.start_ms),
            end_ms: AtomicI64::new(record.end_ms),
        }
    }
}
