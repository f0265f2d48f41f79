//! The sampling task.

use std::time::Duration;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use crate::sample::HealthSample;

/// Sampling period used by [`Monitor::default`].
pub const DEFAULT_INTERVAL: Duration = Duration::from_secs(5);

const MIN_INTERVAL: Duration = Duration::from_millis(1);

/// Samples process health on a fixed interval.
#[derive(Debug, Clone)]
pub struct Monitor {
    interval: Duration,
}

impl Default for Monitor {
    fn default() -> Self {
        Self::new(DEFAULT_INTERVAL)
    }
}

impl Monitor {
    pub fn new(interval: Duration) -> Self {
        Self {
            interval: interval.max(MIN_INTERVAL),
        }
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Start sampling on the current tokio runtime.
    ///
    /// The first sample is taken immediately. The task ends when `cancel`
    /// fires; the receiver always holds the most recent sample.
    pub fn spawn(
        self,
        cancel: CancellationToken,
    ) -> (JoinHandle<()>, watch::Receiver<Option<HealthSample>>) {
        let (tx, rx) = watch::channel(None);
        let handle = tokio::spawn(self.run(cancel, tx));
        (handle, rx)
    }

    /// Sampling loop. Runs until `cancel` fires.
    pub async fn run(self, cancel: CancellationToken, tx: watch::Sender<Option<HealthSample>>) {
        let mut ticker = tokio::time::interval(self.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        debug!(interval_ms = self.interval.as_millis() as u64, "health monitor started");

        loop {
            tokio::select! {
                biased;
                _ = cancel.cancelled() => break,
                _ = ticker.tick() => {
                    let sample = HealthSample::capture();
                    info!(
                        threads = sample.threads,
                        resident_kb = sample.resident_kb,
                        "process health"
                    );
                    tx.send_replace(Some(sample));
                }
            }
        }

        debug!("health monitor stopped");
    }
}
