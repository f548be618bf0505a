use chrono::{DateTime, FixedOffset};
use serde::Serialize;

use crate::entities::sync_status;
use crate::services::ingestion::{IngestionResult, RunPhase};

/// Response for POST /api/ingestion/run
#[derive(Debug, Clone, Serialize)]
pub struct IngestionRunResponse {
    pub inserted_count: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub observed_at: Option<DateTime<FixedOffset>>,
}

impl From<IngestionResult> for IngestionRunResponse {
    fn from(result: IngestionResult) -> Self {
        Self {
            inserted_count: result.inserted_count,
            observed_at: result.observed_at,
        }
    }
}

/// Persisted outcome of past runs
#[derive(Debug, Clone, Serialize)]
pub struct JobStatus {
    pub last_success_at: Option<DateTime<FixedOffset>>,
    pub last_attempt_at: Option<DateTime<FixedOffset>>,
    pub last_error: Option<String>,
    pub last_inserted_count: i32,
    pub success_count: i64,
    pub error_count: i64,
}

impl From<sync_status::Model> for JobStatus {
    fn from(record: sync_status::Model) -> Self {
        Self {
            last_success_at: record.last_success_at,
            last_attempt_at: record.last_attempt_at,
            last_error: record.last_error,
            last_inserted_count: record.last_inserted_count,
            success_count: record.success_count,
            error_count: record.error_count,
        }
    }
}

/// Response for GET /api/ingestion/status
#[derive(Debug, Clone, Serialize)]
pub struct IngestionStatusResponse {
    pub item_name: String,
    pub phase: RunPhase,
    pub running: bool,
    /// `None` until the first run finishes
    pub job: Option<JobStatus>,
}
