//! Rice Price Sync Job
//!
//! Fires the ingestion driver on a fixed interval. The first run happens as
//! soon as the job starts. A run that fails is logged and the next tick
//! proceeds as usual.

use parking_lot::Mutex;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{MissedTickBehavior, interval};
use tracing::{error, info};

use crate::services::ingestion::{IngestionDriver, IngestionError};

/// Default scrape interval in seconds (1 hour)
pub const DEFAULT_SCRAPE_INTERVAL_SECS: u64 = 3600;

/// Owns the background timer task. Created by the process entry point and
/// stopped explicitly on shutdown.
pub struct IngestionScheduler {
    driver: Arc<IngestionDriver>,
    period: Duration,
    shutdown: watch::Sender<bool>,
    task: Mutex<Option<JoinHandle<()>>>,
}

impl IngestionScheduler {
    pub fn new(driver: Arc<IngestionDriver>, period: Duration) -> Self {
        let (shutdown, _) = watch::channel(false);
        Self {
            driver,
            period,
            shutdown,
            task: Mutex::new(None),
        }
    }

    /// Spawn the timer task. Calling `start` on a running scheduler is a no-op.
    pub fn start(&self) {
        let mut task = self.task.lock();
        if task.as_ref().is_some_and(|t| !t.is_finished()) {
            return;
        }

        self.shutdown.send_replace(false);
        let driver = self.driver.clone();
        let shutdown = self.shutdown.subscribe();
        let period = self.period;

        info!(
            interval_secs = period.as_secs(),
            item = %driver.item_name(),
            "Rice price sync job started"
        );
        *task = Some(tokio::spawn(run_schedule(driver, period, shutdown)));
    }

    /// Signal the timer task and wait for it to exit. An in-flight run is
    /// cancelled; its transaction is rolled back and its browser released.
    pub async fn stop(&self) {
        let task = self.task.lock().take();
        let Some(task) = task else {
            return;
        };

        self.shutdown.send_replace(true);
        if let Err(e) = task.await {
            error!(error = %e, "Rice price sync task ended abnormally");
        }
        info!("Rice price sync job stopped");
    }

    pub fn is_started(&self) -> bool {
        self.task
            .lock()
            .as_ref()
            .is_some_and(|t| !t.is_finished())
    }
}

async fn run_schedule(
    driver: Arc<IngestionDriver>,
    period: Duration,
    mut shutdown: watch::Receiver<bool>,
) {
    let mut ticker = interval(period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            biased;
            _ = shutdown.changed() => break,
            _ = ticker.tick() => {}
        }

        tokio::select! {
            biased;
            _ = shutdown.changed() => {
                info!("Shutdown requested during ingestion run, cancelling it");
                break;
            }
            _ = run_scheduled(&driver) => {}
        }
    }
}

async fn run_scheduled(driver: &IngestionDriver) {
    info!("Starting scheduled rice price sync");

    match driver.run_once().await {
        Ok(result) => {
            info!(inserted = result.inserted_count, "Scheduled rice price sync completed");
        }
        Err(IngestionError::RunInProgress) => {
            info!("Skipping scheduled sync - a manual run is in progress");
        }
        Err(e) => {
            // Already recorded by the driver; the next tick retries
            error!(error = %e, "Scheduled rice price sync failed");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_interval() {
        assert_eq!(DEFAULT_SCRAPE_INTERVAL_SECS, 3600);
    }
}
