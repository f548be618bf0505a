pub mod health;
pub mod ingestion;
pub mod prices;

use axum::{Json, http::StatusCode};

use crate::models::ErrorResponse;

pub(crate) type ApiError = (StatusCode, Json<ErrorResponse>);

pub(crate) fn database_error(e: sea_orm::DbErr) -> ApiError {
    tracing::error!(error = %e, "Database error");
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(ErrorResponse {
            error: format!("Database error: {}", e),
            code: Some("DATABASE_ERROR".to_string()),
        }),
    )
}
