//! Registry configuration.

use tracing::warn;

/// Limits and cadences enforced by the registry.
///
/// A value of 0 disables the corresponding limit.
#[derive(Debug, Clone)]
pub struct RegistryConfig {
    /// Global cap on concurrently active events. 0 = unlimited.
    pub max_active_events: usize,

    /// How many live (non-terminal) events one creator may own at once.
    /// 0 = unlimited.
    pub creator_event_quota: usize,

    /// After leaving any event, a participant may not join again for this
    /// long. 0 = no cooldown.
    pub join_cooldown_ms: i64,

    /// How many non-terminal events one participant may be in at once.
    /// 0 = unlimited.
    pub participant_event_cap: usize,

    /// The throttled `post_update` hook fires over the active set once
    /// every this many ticks, decoupled from the tick cadence itself.
    /// 0 = never.
    pub update_hook_every: u64,
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            max_active_events: 5,
            creator_event_quota: 3,
            join_cooldown_ms: 30_000,
            participant_event_cap: 3,
            update_hook_every: 60,
        }
    }
}

impl RegistryConfig {
    /// Fix out-of-range values so the config is safe to use.
    pub fn validated(mut self) -> Self {
        if self.join_cooldown_ms < 0 {
            warn!(
                cooldown_ms = self.join_cooldown_ms,
                "negative join cooldown, treating as disabled"
            );
            self.join_cooldown_ms = 0;
        }
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = RegistryConfig::default();
        assert_eq!(config.max_active_events, 5);
        assert_eq!(config.creator_event_quota, 3);
        assert_eq!(config.join_cooldown_ms, 30_000);
        assert_eq!(config.participant_event_cap, 3);
        assert_eq!(config.update_hook_every, 60);
    }

    #[test]
    fn test_validated_clamps_negative_cooldown() {
        let config = RegistryConfig {
            join_cooldown_ms: -5,
            ..RegistryConfig::default()
        }
        .validated();
        assert_eq!(config.join_cooldown_ms, 0);
    }
}
