//! Sweep scheduler - the long-lived background loop.
//!
//! Each cycle runs the reminder pass, then the expiry pass, then sleeps.
//! A failed cycle is logged and retried after a shorter backoff; the loop
//! itself never terminates because of one bad cycle. Shutdown is observed
//! both at the top of each cycle and during any sleep.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;

use crate::domain::foundation::Timestamp;

use super::lifecycle::{SubscriptionLifecycle, SweepError};

/// Timing for the sweep loop.
#[derive(Debug, Clone)]
pub struct SchedulerConfig {
    /// Normal pause between cycles.
    pub interval: Duration,

    /// Pause before retrying after a failed cycle.
    pub retry_interval: Duration,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(3600),
            retry_interval: Duration::from_secs(300),
        }
    }
}

/// Periodic driver for the lifecycle manager's sweep transitions.
pub struct SweepScheduler {
    lifecycle: Arc<SubscriptionLifecycle>,
    config: SchedulerConfig,
}

impl SweepScheduler {
    pub fn new(lifecycle: Arc<SubscriptionLifecycle>, config: SchedulerConfig) -> Self {
        Self { lifecycle, config }
    }

    /// Run the sweep loop until the shutdown signal flips to true.
    pub async fn run(&self, mut shutdown: watch::Receiver<bool>) {
        loop {
            if *shutdown.borrow() {
                tracing::info!("sweep scheduler stopping");
                return;
            }

            let delay = match self.run_cycle().await {
                Ok((reminders, expired)) => {
                    tracing::info!(reminders, expired, "sweep cycle complete");
                    self.config.interval
                }
                Err(error) => {
                    tracing::error!(error = %error, "sweep cycle failed, backing off");
                    self.config.retry_interval
                }
            };

            tokio::select! {
                _ = shutdown.changed() => {
                    if *shutdown.borrow() {
                        tracing::info!("sweep scheduler stopping");
                        return;
                    }
                }
                _ = tokio::time::sleep(delay) => {}
            }
        }
    }

    /// Execute one sweep: reminders first, then expiries.
    ///
    /// Exposed separately so tests can drive cycles without the loop.
    pub async fn run_cycle(&self) -> Result<(usize, usize), SweepError> {
        let now = Timestamp::now();
        let reminders = self.lifecycle.run_reminder_pass(now).await?;
        let expired = self.lifecycle.run_expiry_pass(now).await?;
        Ok((reminders, expired))
    }
}
