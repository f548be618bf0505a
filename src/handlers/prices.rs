//! Read API over the stored price log

use axum::{Json, extract::State};
use tracing::info;

use super::{ApiError, database_error};
use crate::AppState;
use crate::models::rice_price::{PriceHistoryResponse, SnapshotResponse};
use crate::services::price_store;
use crate::services::snapshot::current_snapshot;

/// GET /api/prices
///
/// Every stored record, most recent first.
pub async fn get_price_history(
    State(state): State<AppState>,
) -> Result<Json<PriceHistoryResponse>, ApiError> {
    let records = price_store::history(&state.db).await.map_err(database_error)?;
    info!(count = records.len(), "Price history query completed");

    Ok(Json(records.into()))
}

/// GET /api/prices/snapshot
///
/// The latest batch, one record per location. An empty log is a normal
/// 200 response with `"status": "empty"`.
pub async fn get_current_snapshot(
    State(state): State<AppState>,
) -> Result<Json<SnapshotResponse>, ApiError> {
    let records = price_store::history(&state.db).await.map_err(database_error)?;
    let snapshot = current_snapshot(&records);

    Ok(Json(snapshot.into()))
}

/// GET /api/prices/average
pub async fn get_national_average_history(
    State(state): State<AppState>,
) -> Result<Json<PriceHistoryResponse>, ApiError> {
    let records = price_store::national_average_history(&state.db)
        .await
        .map_err(database_error)?;

    Ok(Json(records.into()))
}
