//! Event category tags, reward descriptors, and the persistence snapshot.

use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::{EventId, EventStatus, ParticipantId};

// ---------------------------------------------------------------------------
// EventKind
// ---------------------------------------------------------------------------

/// The category of an event. A closed set: presentation layers key icons,
/// colors, and command completion off these tags.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventKind {
    /// Head-to-head competition with a bracket or ladder.
    Tournament,
    /// Timed race to a goal.
    Race,
    /// Search/collection event.
    Hunt,
    /// Free-form gathering, no win condition.
    Social,
    /// Operator-defined, behavior driven entirely by metadata.
    Custom,
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Tournament => "tournament",
            Self::Race => "race",
            Self::Hunt => "hunt",
            Self::Social => "social",
            Self::Custom => "custom",
        };
        f.write_str(name)
    }
}

// ---------------------------------------------------------------------------
// Reward
// ---------------------------------------------------------------------------

/// An opaque reward descriptor.
///
/// The core never interprets rewards; it stores them in order and hands
/// them to whatever grants them when an event completes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reward {
    /// What is granted, e.g. `"currency"`, `"item:compass"`.
    pub kind: String,
    /// How much of it.
    pub amount: i64,
}

impl Reward {
    pub fn new(kind: impl Into<String>, amount: i64) -> Self {
        Self {
            kind: kind.into(),
            amount,
        }
    }
}

// ---------------------------------------------------------------------------
// EventRecord
// ---------------------------------------------------------------------------

/// The full serializable snapshot of one event.
///
/// This is the shape that crosses the persistence gateway. A live event
/// (with its atomics and locks) converts to and from this record; the
/// save/load round trip must preserve every field here.
///
/// `requirements` and `metadata` are optional maps and stay absent
/// (not empty) when unused, both in memory and on disk.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventRecord {
    pub id: EventId,
    pub name: String,
    pub description: String,
    pub kind: EventKind,
    pub status: EventStatus,
    /// Maximum participants; zero or negative means unlimited.
    pub max_participants: i32,
    pub participants: Vec<ParticipantId>,
    /// Scheduled/actual start, epoch milliseconds. 0 = not scheduled.
    pub start_ms: i64,
    /// Scheduled end, epoch milliseconds. 0 = open-ended.
    pub end_ms: i64,
    pub created_by: Option<ParticipantId>,
    /// Creation time, epoch milliseconds. Immutable.
    pub created_at: i64,
    pub rewards: Vec<Reward>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub requirements: Option<HashMap<String, String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<HashMap<String, String>>,
}

impl EventRecord {
    /// Returns `true` when a participant cap is in effect.
    pub fn is_capped(&self) -> bool {
        self.max_participants > 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_record() -> EventRecord {
        EventRecord {
            id: EventId::new(),
            name: "Harvest Hunt".into(),
            description: "Find the hidden caches".into(),
            kind: EventKind::Hunt,
            status: EventStatus::Active,
            max_participants: 16,
            participants: vec![ParticipantId::new(), ParticipantId::new()],
            start_ms: 1_700_000_000_000,
            end_ms: 1_700_000_600_000,
            created_by: Some(ParticipantId::new()),
            created_at: 1_699_999_999_000,
            rewards: vec![Reward::new("currency", 250)],
            requirements: None,
            metadata: None,
        }
    }

    #[test]
    fn test_record_json_round_trip() {
        let record = sample_record();
        let json = serde_json::to_string(&record).unwrap();
        let back: EventRecord = serde_json::from_str(&json).unwrap();
        assert_eq!(record, back);
    }

    #[test]
    fn test_absent_maps_are_omitted_from_json() {
        let record = sample_record();
        let json = serde_json::to_string(&record).unwrap();
        assert!(!json.contains("requirements"));
        assert!(!json.contains("metadata"));
    }

    #[test]
    fn test_present_maps_round_trip() {
        let mut record = sample_record();
        let mut meta = HashMap::new();
        meta.insert("arena".to_string(), "north".to_string());
        record.metadata = Some(meta);

        let json = serde_json::to_string(&record).unwrap();
        let back: EventRecord = serde_json::from_str(&json).unwrap();
        assert_eq!(back.metadata.as_ref().unwrap()["arena"], "north");
    }

    #[test]
    fn test_is_capped() {
        let mut record = sample_record();
        assert!(record.is_capped());
        record.max_participants = 0;
        assert!(!record.is_capped());
        record.max_participants = -1;
        assert!(!record.is_capped());
    }

    #[test]
    fn test_kind_serializes_snake_case() {
        let json = serde_json::to_string(&EventKind::Tournament).unwrap();
        assert_eq!(json, "\"tournament\"");
    }
}
