//! The event lifecycle state machine.

use std::fmt;

use serde::{Deserialize, Serialize};

/// The lifecycle state of an event.
///
/// ```text
/// Created ──→ Scheduled ──→ Active ⇄ Paused
///    │            │           │
///    │            │           └──→ Completed (terminal)
///    └────────────┴──→ Cancelled (terminal, from any non-terminal state)
/// ```
///
/// - **Created**: exists, no start time assigned yet. Joinable.
/// - **Scheduled**: a future start time is assigned. Joinable.
/// - **Active**: running. Joinable until full.
/// - **Paused**: temporarily suspended, no timing side effects. Resumable.
/// - **Completed**: ended, manually or by reaching its end time. Terminal.
/// - **Cancelled**: aborted by an operator. Terminal.
///
/// The discriminant values are fixed because live events store the status
/// in an `AtomicU8`; see `eventide-registry`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[repr(u8)]
pub enum EventStatus {
    Created = 0,
    Scheduled = 1,
    Active = 2,
    Paused = 3,
    Completed = 4,
    Cancelled = 5,
}

impl EventStatus {
    /// Reconstructs a status from its `repr(u8)` discriminant.
    ///
    /// Returns `None` for values outside the enum range.
    pub fn from_u8(value: u8) -> Option<Self> {
        match value {
            0 => Some(Self::Created),
            1 => Some(Self::Scheduled),
            2 => Some(Self::Active),
            3 => Some(Self::Paused),
            4 => Some(Self::Completed),
            5 => Some(Self::Cancelled),
            _ => None,
        }
    }

    /// Returns `true` for states no event ever leaves.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed | Self::Cancelled)
    }

    /// Returns `true` if an event in this state may be started.
    pub fn can_start(&self) -> bool {
        matches!(self, Self::Created | Self::Scheduled)
    }

    /// Returns `true` if new participants may be admitted in this state.
    ///
    /// Admission is still subject to the capacity check; this only covers
    /// the state-machine half of `canJoin`.
    pub fn is_joinable(&self) -> bool {
        matches!(self, Self::Created | Self::Scheduled | Self::Active)
    }

    /// Returns `true` if transitioning to `target` is valid.
    pub fn can_transition_to(self, target: Self) -> bool {
        use EventStatus::*;
        match (self, target) {
            (Created, Scheduled) => true,
            (Created | Scheduled, Active) => true,
            (Active, Paused) | (Paused, Active) => true,
            (Active, Completed) => true,
            // Manual cancel from any non-terminal state.
            (from, Cancelled) => !from.is_terminal(),
            _ => false,
        }
    }
}

impl fmt::Display for EventStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Created => "created",
            Self::Scheduled => "scheduled",
            Self::Active => "active",
            Self::Paused => "paused",
            Self::Completed => "completed",
            Self::Cancelled => "cancelled",
        };
        f.write_str(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_u8_round_trips_all_states() {
        for status in [
            EventStatus::Created,
            EventStatus::Scheduled,
            EventStatus::Active,
            EventStatus::Paused,
            EventStatus::Completed,
            EventStatus::Cancelled,
        ] {
            assert_eq!(EventStatus::from_u8(status as u8), Some(status));
        }
        assert_eq!(EventStatus::from_u8(6), None);
        assert_eq!(EventStatus::from_u8(255), None);
    }

    #[test]
    fn test_terminal_states() {
        assert!(EventStatus::Completed.is_terminal());
        assert!(EventStatus::Cancelled.is_terminal());
        assert!(!EventStatus::Created.is_terminal());
        assert!(!EventStatus::Active.is_terminal());
        assert!(!EventStatus::Paused.is_terminal());
    }

    #[test]
    fn test_can_start_only_from_created_or_scheduled() {
        assert!(EventStatus::Created.can_start());
        assert!(EventStatus::Scheduled.can_start());
        assert!(!EventStatus::Active.can_start());
        assert!(!EventStatus::Paused.can_start());
        assert!(!EventStatus::Completed.can_start());
        assert!(!EventStatus::Cancelled.can_start());
    }

    #[test]
    fn test_joinable_states() {
        assert!(EventStatus::Created.is_joinable());
        assert!(EventStatus::Scheduled.is_joinable());
        assert!(EventStatus::Active.is_joinable());
        assert!(!EventStatus::Paused.is_joinable());
        assert!(!EventStatus::Completed.is_joinable());
        assert!(!EventStatus::Cancelled.is_joinable());
    }

    #[test]
    fn test_valid_transitions() {
        use EventStatus::*;
        assert!(Created.can_transition_to(Scheduled));
        assert!(Created.can_transition_to(Active));
        assert!(Scheduled.can_transition_to(Active));
        assert!(Active.can_transition_to(Paused));
        assert!(Paused.can_transition_to(Active));
        assert!(Active.can_transition_to(Completed));
    }

    #[test]
    fn test_cancel_from_any_non_terminal() {
        use EventStatus::*;
        for from in [Created, Scheduled, Active, Paused] {
            assert!(from.can_transition_to(Cancelled), "{from} should cancel");
        }
        assert!(!Completed.can_transition_to(Cancelled));
        assert!(!Cancelled.can_transition_to(Cancelled));
    }

    #[test]
    fn test_invalid_transitions() {
        use EventStatus::*;
        assert!(!Scheduled.can_transition_to(Created));
        assert!(!Paused.can_transition_to(Completed));
        assert!(!Completed.can_transition_to(Active));
        assert!(!Cancelled.can_transition_to(Active));
        assert!(!Created.can_transition_to(Completed));
    }

    #[test]
    fn test_serde_snake_case() {
        let json = serde_json::to_string(&EventStatus::Active).unwrap();
        assert_eq!(json, "\"active\"");
        let back: EventStatus = serde_json::from_str("\"cancelled\"").unwrap();
        assert_eq!(back, EventStatus::Cancelled);
    }
}
