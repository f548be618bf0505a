use axum::Json;

use crate::models::health::HealthResponse;

/// GET /
pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse::default())
}
