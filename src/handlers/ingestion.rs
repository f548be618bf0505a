//! Manual ingestion trigger and status

use axum::{Json, extract::State, http::StatusCode};
use tracing::{info, warn};

use super::{ApiError, database_error};
use crate::AppState;
use crate::models::ErrorResponse;
use crate::models::ingestion::{IngestionRunResponse, IngestionStatusResponse};
use crate::services::ingestion::IngestionError;
use crate::services::sync_status::{self, jobs};

/// POST /api/ingestion/run
///
/// Runs one ingestion synchronously.
///
/// # Response
/// - 200: Number of records inserted
/// - 409: Another run is in progress
/// - 500: Storage commit failed (batch rolled back)
/// - 502: Scraping the source page failed
/// - 504: Run exceeded its timeout
pub async fn trigger_ingestion(
    State(state): State<AppState>,
) -> Result<Json<IngestionRunResponse>, ApiError> {
    info!("Manual ingestion requested");

    let result = state.ingestion.run_once().await.map_err(|e| {
        warn!(error = %e, "Manual ingestion failed");
        (
            status_for(&e),
            Json(ErrorResponse {
                error: e.to_string(),
                code: Some(e.code().to_string()),
            }),
        )
    })?;

    Ok(Json(result.into()))
}

/// GET /api/ingestion/status
pub async fn get_ingestion_status(
    State(state): State<AppState>,
) -> Result<Json<IngestionStatusResponse>, ApiError> {
    let job = sync_status::get_status(&state.db, jobs::RICE_PRICE_INGESTION)
        .await
        .map_err(database_error)?;

    Ok(Json(IngestionStatusResponse {
        item_name: state.ingestion.item_name().to_string(),
        phase: state.ingestion.phase(),
        running: state.ingestion.is_running(),
        job: job.map(Into::into),
    }))
}

fn status_for(error: &IngestionError) -> StatusCode {
    match error {
        IngestionError::Scrape(_) => StatusCode::BAD_GATEWAY,
        IngestionError::Persistence(_) => StatusCode::INTERNAL_SERVER_ERROR,
        IngestionError::RunInProgress => StatusCode::CONFLICT,
        IngestionError::Timeout(_) => StatusCode::GATEWAY_TIMEOUT,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scrapers::ScrapeError;
    use std::time::Duration;

    #[test]
    fn test_status_codes() {
        assert_eq!(
            status_for(&IngestionError::Scrape(ScrapeError::PageLoad("x".into()))),
            StatusCode::BAD_GATEWAY
        );
        assert_eq!(
            status_for(&IngestionError::Persistence(sea_orm::DbErr::Custom("x".into()))),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(status_for(&IngestionError::RunInProgress), StatusCode::CONFLICT);
        assert_eq!(
            status_for(&IngestionError::Timeout(Duration::from_secs(1))),
            StatusCode::GATEWAY_TIMEOUT
        );
    }
}
