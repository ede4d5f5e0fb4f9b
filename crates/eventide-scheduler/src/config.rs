//! Scheduler configuration.

use tracing::warn;

/// Timing knobs for the autonomous scheduler.
#[derive(Debug, Clone)]
pub struct SchedulerConfig {
    /// Shortest gap between auto-created events.
    pub min_interval_ms: i64,
    /// Longest gap between auto-created events.
    pub max_interval_ms: i64,
    /// How far ahead of the next event reminders start.
    pub reminder_lead_ms: i64,
    /// Size bound on the remembered reminder minutes; the set is cleared
    /// once it grows past this.
    pub announced_set_bound: usize,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            // 15 to 45 minutes between auto events.
            min_interval_ms: 15 * 60 * 1000,
            max_interval_ms: 45 * 60 * 1000,
            // Remind over the last 5 minutes.
            reminder_lead_ms: 5 * 60 * 1000,
            announced_set_bound: 16,
        }
    }
}

impl SchedulerConfig {
    /// Fix out-of-range values so the config is safe to use.
    pub fn validated(mut self) -> Self {
        if self.min_interval_ms < 1 {
            warn!(min = self.min_interval_ms, "min_interval_ms too small, using 1");
            self.min_interval_ms = 1;
        }
        if self.max_interval_ms < self.min_interval_ms {
            warn!(
                min = self.min_interval_ms,
                max = self.max_interval_ms,
                "max_interval_ms below min, raising to min"
            );
            self.max_interval_ms = self.min_interval_ms;
        }
        if self.reminder_lead_ms < 0 {
            self.reminder_lead_ms = 0;
        }
        if self.announced_set_bound == 0 {
            self.announced_set_bound = 1;
        }
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_valid() {
        let config = SchedulerConfig::default().validated();
        assert!(config.min_interval_ms <= config.max_interval_ms);
        assert!(config.reminder_lead_ms >= 0);
    }

    #[test]
    fn test_validated_orders_interval_bounds() {
        let config = SchedulerConfig {
            min_interval_ms: 10_000,
            max_interval_ms: 5_000,
            ..SchedulerConfig::default()
        }
        .validated();
        assert_eq!(config.max_interval_ms, 10_000);
    }

    #[test]
    fn test_validated_clamps_degenerate_values() {
        let config = SchedulerConfig {
            min_interval_ms: 0,
            max_interval_ms: 0,
            reminder_lead_ms: -1,
            announced_set_bound: 0,
            ..SchedulerConfig::default()
        }
        .validated();
        assert_eq!(config.min_interval_ms, 1);
        assert_eq!(config.max_interval_ms, 1);
        assert_eq!(config.reminder_lead_ms, 0);
        assert_eq!(config.announced_set_bound, 1);
    }
}
