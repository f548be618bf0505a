//! Ingestion driver: one scrape → normalize → commit run
//!
//! Runs are serialized through a run lock, so a manual trigger and a scheduled
//! tick can never interleave two batches. Every failure is contained here and
//! handed back as an [`IngestionError`]; nothing escapes to the scheduler loop.

use chrono::{DateTime, FixedOffset, Utc};
use parking_lot::RwLock;
use sea_orm::{DatabaseConnection, DbErr};
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tracing::{Instrument, error, info, info_span, warn};
use uuid::Uuid;

use crate::scrapers::{RowSource, ScrapeError};
use crate::services::normalizer::Normalizer;
use crate::services::price_store;
use crate::services::sync_status::{self, jobs};

/// Default upper bound for one full run, browser included
pub const DEFAULT_RUN_TIMEOUT_SECS: u64 = 120;

#[derive(Debug, thiserror::Error)]
pub enum IngestionError {
    #[error("scrape failed: {0}")]
    Scrape(#[from] ScrapeError),
    #[error("persistence failed: {0}")]
    Persistence(#[from] DbErr),
    #[error("an ingestion run is already in progress")]
    RunInProgress,
    #[error("ingestion run timed out after {0:?}")]
    Timeout(Duration),
}

impl IngestionError {
    /// Machine-readable code for API responses
    pub fn code(&self) -> &'static str {
        match self {
            IngestionError::Scrape(_) => "SCRAPE_FAILED",
            IngestionError::Persistence(_) => "PERSISTENCE_FAILED",
            IngestionError::RunInProgress => "RUN_IN_PROGRESS",
            IngestionError::Timeout(_) => "TIMEOUT",
        }
    }
}

/// Where the current run is
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RunPhase {
    Idle,
    Fetching,
    Normalizing,
    Committing,
    Failed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct IngestionResult {
    pub inserted_count: usize,
    /// Shared timestamp of the committed batch; `None` when nothing was inserted
    pub observed_at: Option<DateTime<FixedOffset>>,
}

pub struct IngestionDriver {
    db: DatabaseConnection,
    source: Arc<dyn RowSource>,
    normalizer: Normalizer,
    run_timeout: Duration,
    run_lock: Mutex<()>,
    phase: RwLock<RunPhase>,
}

impl IngestionDriver {
    pub fn new(
        db: DatabaseConnection,
        source: Arc<dyn RowSource>,
        normalizer: Normalizer,
        run_timeout: Duration,
    ) -> Self {
        Self {
            db,
            source,
            normalizer,
            run_timeout,
            run_lock: Mutex::new(()),
            phase: RwLock::new(RunPhase::Idle),
        }
    }

    pub fn phase(&self) -> RunPhase {
        *self.phase.read()
    }

    pub fn item_name(&self) -> &str {
        self.normalizer.item_name()
    }

    pub fn is_running(&self) -> bool {
        self.phase() != RunPhase::Idle
    }

    /// Run the pipeline once and commit the result as a new batch.
    ///
    /// Returns [`IngestionError::RunInProgress`] immediately if another run
    /// holds the lock.
    pub async fn run_once(&self) -> Result<IngestionResult, IngestionError> {
        let _guard = self
            .run_lock
            .try_lock()
            .map_err(|_| IngestionError::RunInProgress)?;

        let _reset = PhaseReset(&self.phase);
        let run_id = Uuid::new_v4();
        let span = info_span!("ingestion_run", %run_id, item = %self.item_name());

        async {
            info!("Starting rice price ingestion");

            let outcome = match tokio::time::timeout(self.run_timeout, self.run_pipeline()).await {
                Ok(result) => result,
                Err(_) => Err(IngestionError::Timeout(self.run_timeout)),
            };

            match &outcome {
                Ok(result) => {
                    info!(inserted = result.inserted_count, "Ingestion run completed");
                    if let Err(e) = sync_status::record_success(
                        &self.db,
                        jobs::RICE_PRICE_INGESTION,
                        result.inserted_count,
                    )
                    .await
                    {
                        warn!(error = %e, "Failed to record sync success");
                    }
                }
                Err(e) => {
                    self.set_phase(RunPhase::Failed);
                    error!(error = %e, code = e.code(), "Ingestion run failed");
                    if let Err(status_err) = sync_status::record_failure(
                        &self.db,
                        jobs::RICE_PRICE_INGESTION,
                        &e.to_string(),
                    )
                    .await
                    {
                        warn!(error = %status_err, "Failed to record sync failure");
                    }
                }
            }

            outcome
        }
        .instrument(span)
        .await
    }

    async fn run_pipeline(&self) -> Result<IngestionResult, IngestionError> {
        self.set_phase(RunPhase::Fetching);
        let rows = self.source.fetch_raw_rows().await?;

        self.set_phase(RunPhase::Normalizing);
        let candidates = self.normalizer.normalize(&rows);
        info!(
            rows = rows.len(),
            candidates = candidates.len(),
            "Normalized scraped rows"
        );

        if candidates.is_empty() {
            warn!("No valid price rows found, nothing to commit");
            return Ok(IngestionResult {
                inserted_count: 0,
                observed_at: None,
            });
        }

        self.set_phase(RunPhase::Committing);
        let batch =
            price_store::append_batch(&self.db, &candidates, Utc::now().fixed_offset()).await?;

        Ok(IngestionResult {
            inserted_count: batch.inserted,
            observed_at: Some(batch.observed_at),
        })
    }

    fn set_phase(&self, phase: RunPhase) {
        *self.phase.write() = phase;
    }
}

/// Puts the driver back to `Idle` however the run ends, including when the
/// run future is dropped by a caller's cancellation.
struct PhaseReset<'a>(&'a RwLock<RunPhase>);

impl Drop for PhaseReset<'_> {
    fn drop(&mut self) {
        *self.0.write() = RunPhase::Idle;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_codes_distinguish_failures() {
        let scrape = IngestionError::from(ScrapeError::PageLoad("timeout".to_string()));
        let persistence = IngestionError::from(DbErr::Custom("disk full".to_string()));

        assert_eq!(scrape.code(), "SCRAPE_FAILED");
        assert_eq!(persistence.code(), "PERSISTENCE_FAILED");
        assert_eq!(IngestionError::RunInProgress.code(), "RUN_IN_PROGRESS");
        assert_eq!(IngestionError::Timeout(Duration::from_secs(1)).code(), "TIMEOUT");
    }

    #[test]
    fn test_error_display() {
        let err = IngestionError::from(ScrapeError::SelectorNotFound("no table".to_string()));
        assert!(err.to_string().contains("scrape failed"));
        assert!(err.to_string().contains("no table"));
    }

    #[test]
    fn test_run_phase_serializes_snake_case() {
        assert_eq!(
            serde_json::to_string(&RunPhase::Committing).unwrap(),
            "\"committing\""
        );
    }
}
