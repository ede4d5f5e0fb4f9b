//! A periodic background loop with an owned cancellation handle.

use std::time::Duration;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{self, MissedTickBehavior};
use tracing::debug;

/// Runs a job on a fixed cadence until stopped.
///
/// The loop is non-reentrant by construction: the job runs to completion
/// inside one task before the next tick is considered, and missed ticks
/// are skipped rather than bursted. Dropping the handle without calling
/// [`stop`](RepeatingTask::stop) also ends the loop: the cancellation
/// channel closes and the task exits at its next await point, just
/// without anyone waiting for it.
pub struct RepeatingTask {
    name: &'static str,
    handle: JoinHandle<()>,
    shutdown: watch::Sender<bool>,
}

impl RepeatingTask {
    /// Spawns the loop. The first run happens one full period after
    /// spawn, not immediately.
    pub fn spawn<F>(name: &'static str, period: Duration, mut job: F) -> Self
    where
        F: FnMut() + Send + 'static,
    {
        let (shutdown, mut stop_rx) = watch::channel(false);
        let handle = tokio::spawn(async move {
            let mut interval = time::interval(period);
            interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
            // interval's first tick is immediate; swallow it.
            interval.tick().await;
            loop {
                tokio::select! {
                    _ = interval.tick() => job(),
                    _ = stop_rx.changed() => break,
                }
            }
            debug!(name, "repeating task stopped");
        });
        debug!(name, ?period, "repeating task started");
        Self {
            name,
            handle,
            shutdown,
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Signals the loop to stop and waits for it to finish its current
    /// run. The job itself is never interrupted mid-execution.
    pub async fn stop(self) {
        let _ = self.shutdown.send(true);
        let _ = self.handle.await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[tokio::test(start_paused = true)]
    async fn test_job_runs_on_cadence() {
        let runs = Arc::new(AtomicUsize::new(0));
        let task = {
            let runs = runs.clone();
            RepeatingTask::spawn("counter", Duration::from_millis(100), move || {
                runs.fetch_add(1, Ordering::SeqCst);
            })
        };

        tokio::time::sleep(Duration::from_millis(350)).await;
        task.stop().await;

        assert_eq!(runs.load(Ordering::SeqCst), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_no_run_before_first_period() {
        let runs = Arc::new(AtomicUsize::new(0));
        let task = {
            let runs = runs.clone();
            RepeatingTask::spawn("slow", Duration::from_secs(60), move || {
                runs.fetch_add(1, Ordering::SeqCst);
            })
        };

        tokio::time::sleep(Duration::from_secs(1)).await;
        assert_eq!(runs.load(Ordering::SeqCst), 0);
        task.stop().await;
    }

    #[tokio::test(start_paused = true)]
    async fn test_stop_prevents_further_runs() {
        let runs = Arc::new(AtomicUsize::new(0));
        let task = {
            let runs = runs.clone();
            RepeatingTask::spawn("stopped", Duration::from_millis(50), move || {
                runs.fetch_add(1, Ordering::SeqCst);
            })
        };

        tokio::time::sleep(Duration::from_millis(120)).await;
        task.stop().await;
        let after_stop = runs.load(Ordering::SeqCst);

        tokio::time::sleep(Duration::from_millis(500)).await;
        assert_eq!(runs.load(Ordering::SeqCst), after_stop);
    }

    #[tokio::test]
    async fn test_name_accessor() {
        let task = RepeatingTask::spawn("named", Duration::from_secs(60), || {});
        assert_eq!(task.name(), "named");
        task.stop().await;
    }
}
