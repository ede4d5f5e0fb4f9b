//! Event templates.

use eventide_types::{EventKind, Reward};
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::PresetError;

fn default_enabled() -> bool {
    true
}

fn default_weight() -> u32 {
    1
}

fn default_min_participants() -> u32 {
    1
}

/// A named, weighted template the scheduler manufactures events from.
///
/// Definitions come from operators (config files, admin commands), so
/// every numeric field is defensively clamped or rejected by
/// [`validated`](EventPreset::validated) before a preset enters the
/// catalog. The `enabled` flag is runtime state and independent of
/// validity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventPreset {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub kind: EventKind,
    /// How long a manufactured event runs. Must be positive.
    pub duration_secs: u64,
    /// Participant cap for manufactured events; 0 or negative = unlimited.
    #[serde(default)]
    pub max_participants: i32,
    /// Advisory minimum head-count, clamped to at least 1.
    #[serde(default = "default_min_participants")]
    pub min_participants: u32,
    #[serde(default)]
    pub rewards: Vec<Reward>,
    #[serde(default = "default_enabled")]
    pub enabled: bool,
    /// Selection weight, clamped up to at least 1.
    #[serde(default = "default_weight")]
    pub weight: u32,
}

impl EventPreset {
    pub fn new(id: impl Into<String>, name: impl Into<String>, kind: EventKind, duration_secs: u64) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            description: String::new(),
            kind,
            duration_secs,
            max_participants: 0,
            min_participants: 1,
            rewards: Vec::new(),
            enabled: true,
            weight: 1,
        }
    }

    /// Clamps repairable fields and rejects unrepairable definitions.
    ///
    /// - weight is raised to at least 1
    /// - `min_participants` is raised to at least 1
    /// - a capped `max_participants` is raised to at least the minimum
    /// - a non-positive duration rejects the preset outright
    pub fn validated(mut self) -> Result<Self, PresetError> {
        if self.id.trim().is_empty() {
            return Err(PresetError::EmptyId);
        }
        if self.duration_secs == 0 {
            return Err(PresetError::InvalidDuration(self.id));
        }
        if self.weight < 1 {
            warn!(preset = %self.id, "weight below 1, clamping");
            self.weight = 1;
        }
        if self.min_participants < 1 {
            warn!(preset = %self.id, "min_participants below 1, clamping");
            self.min_participants = 1;
        }
        if self.max_participants > 0 && (self.max_participants as u32) < self.min_participants {
            warn!(
                preset = %self.id,
                max = self.max_participants,
                min = self.min_participants,
                "max_participants below min_participants, raising to min"
            );
            self.max_participants = self.min_participants as i32;
        }
        Ok(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validated_accepts_sane_preset() {
        let preset = EventPreset::new("gold_rush", "Gold Rush", EventKind::Hunt, 600)
            .validated()
            .unwrap();
        assert_eq!(preset.weight, 1);
        assert_eq!(preset.min_participants, 1);
    }

    #[test]
    fn test_validated_rejects_zero_duration() {
        let preset = EventPreset::new("bad", "Bad", EventKind::Race, 0);
        assert!(matches!(
            preset.validated(),
            Err(PresetError::InvalidDuration(_))
        ));
    }

    #[test]
    fn test_validated_rejects_empty_id() {
        let preset = EventPreset::new("  ", "Anon", EventKind::Race, 60);
        assert!(matches!(preset.validated(), Err(PresetError::EmptyId)));
    }

    #[test]
    fn test_validated_clamps_weight_and_minimum() {
        let preset = EventPreset {
            weight: 0,
            min_participants: 0,
            ..EventPreset::new("clamped", "Clamped", EventKind::Social, 60)
        }
        .validated()
        .unwrap();
        assert_eq!(preset.weight, 1);
        assert_eq!(preset.min_participants, 1);
    }

    #[test]
    fn test_validated_raises_cap_to_minimum() {
        let preset = EventPreset {
            max_participants: 2,
            min_participants: 5,
            ..EventPreset::new("squeeze", "Squeeze", EventKind::Tournament, 60)
        }
        .validated()
        .unwrap();
        assert_eq!(preset.max_participants, 5);
    }

    #[test]
    fn test_unlimited_cap_is_untouched() {
        let preset = EventPreset {
            max_participants: 0,
            min_participants: 5,
            ..EventPreset::new("open", "Open", EventKind::Social, 60)
        }
        .validated()
        .unwrap();
        assert_eq!(preset.max_participants, 0);
    }

    #[test]
    fn test_serde_defaults() {
        let json = r#"{
            "id": "minimal",
            "name": "Minimal",
            "kind": "race",
            "duration_secs": 120
        }"#;
        let preset: EventPreset = serde_json::from_str(json).unwrap();
        assert!(preset.enabled);
        assert_eq!(preset.weight, 1);
        assert_eq!(preset.min_participants, 1);
        assert_eq!(preset.max_participants, 0);
        assert!(preset.rewards.is_empty());
    }
}
