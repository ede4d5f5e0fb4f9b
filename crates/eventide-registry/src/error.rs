//! Error types for the registry.

use eventide_types::{EventId, EventStatus, ParticipantId};

/// Every way a lifecycle operation can be refused.
///
/// These are expected business conditions, not faults: callers surface
/// them as "why it didn't happen", and nothing here ever partially
/// mutates an event. Only [`RegistryError::InvalidTransition`] is special:
/// losing a transition race is a benign no-op, see
/// [`is_benign_conflict`](RegistryError::is_benign_conflict).
#[derive(Debug, thiserror::Error)]
pub enum RegistryError {
    /// No event with this id is registered.
    #[error("event {0} not found")]
    NotFound(EventId),

    /// Malformed input, rejected before any mutation.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// The event has no participant slots left.
    #[error("event {0} is full")]
    EventFull(EventId),

    /// The event's state does not admit participants.
    #[error("event {0} is not accepting participants")]
    NotJoinable(EventId),

    /// The global cap on concurrently active events is reached.
    #[error("active event cap of {0} reached")]
    ActiveCapReached(usize),

    /// The creator already has their quota of live events.
    #[error("creator {0} reached the quota of {1} events")]
    CreatorQuotaReached(ParticipantId, usize),

    /// The participant is already in their cap of simultaneous events.
    #[error("participant {0} reached the cap of {1} simultaneous events")]
    ParticipantCapReached(ParticipantId, usize),

    /// The participant left an event too recently.
    #[error("participant {0} is on join cooldown for another {1} ms")]
    OnCooldown(ParticipantId, i64),

    /// The participant is already in this event.
    #[error("participant {0} already joined event {1}")]
    AlreadyJoined(ParticipantId, EventId),

    /// The participant is not in this event.
    #[error("participant {0} has not joined event {1}")]
    NotJoined(ParticipantId, EventId),

    /// The requested transition is not valid from the event's current
    /// state. Under concurrency this is how the loser of a race reports:
    /// the winner already moved the event on.
    #[error("event {id} cannot move from {from} to {to}")]
    InvalidTransition {
        id: EventId,
        from: EventStatus,
        to: EventStatus,
    },

    /// A pre-hook declined the operation. Clean abort, zero side effects.
    #[error("operation vetoed by a lifecycle hook")]
    Vetoed,
}

impl RegistryError {
    /// Whether this refusal is an expected concurrency outcome rather
    /// than a caller mistake. Tick processing logs these at trace only.
    pub fn is_benign_conflict(&self) -> bool {
        matches!(self, Self::InvalidTransition { .. })
    }
}
