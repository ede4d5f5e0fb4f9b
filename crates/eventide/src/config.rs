//! Top-level service configuration.

use std::time::Duration;

use eventide_registry::RegistryConfig;
use eventide_scheduler::SchedulerConfig;
use eventide_store::StoreConfig;
use tracing::warn;

/// Everything the service needs tuned, in one place.
///
/// Component configs are owned by their crates; this aggregates them and
/// adds the loop cadences the composition root controls.
#[derive(Debug, Clone)]
pub struct ServiceConfig {
    /// Cadence of the registry's state-transition scan.
    pub tick_interval: Duration,
    /// Cadence of the scheduler's slot check.
    pub scheduler_poll_interval: Duration,
    /// Cadence of the coalesced full flush.
    pub autosave_interval: Duration,
    pub registry: RegistryConfig,
    pub scheduler: SchedulerConfig,
    pub store: StoreConfig,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            tick_interval: Duration::from_secs(1),
            scheduler_poll_interval: Duration::from_secs(1),
            autosave_interval: Duration::from_secs(5 * 60),
            registry: RegistryConfig::default(),
            scheduler: SchedulerConfig::default(),
            store: StoreConfig::default(),
        }
    }
}

impl ServiceConfig {
    /// Minimum loop cadence; anything faster is clamped.
    const MIN_INTERVAL: Duration = Duration::from_millis(10);

    /// Fix out-of-range values so the config is safe to use.
    pub fn validated(mut self) -> Self {
        for (name, interval) in [
            ("tick_interval", &mut self.tick_interval),
            ("scheduler_poll_interval", &mut self.scheduler_poll_interval),
            ("autosave_interval", &mut self.autosave_interval),
        ] {
            if *interval < Self::MIN_INTERVAL {
                warn!(name, ?interval, "interval too small, clamping to 10ms");
                *interval = Self::MIN_INTERVAL;
            }
        }
        self.registry = self.registry.validated();
        self.scheduler = self.scheduler.validated();
        self.store = self.store.validated();
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = ServiceConfig::default();
        assert_eq!(config.tick_interval, Duration::from_secs(1));
        assert_eq!(config.autosave_interval, Duration::from_secs(300));
    }

    #[test]
    fn test_validated_clamps_tiny_intervals() {
        let config = ServiceConfig {
            tick_interval: Duration::from_millis(1),
            ..ServiceConfig::default()
        }
        .validated();
        assert_eq!(config.tick_interval, Duration::from_millis(10));
    }
}
