// src/lib.rs

use axum::{
    Router,
    routing::{get, post},
};
use sea_orm::DatabaseConnection;
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use services::ingestion::IngestionDriver;

#[derive(Clone)]
pub struct AppState {
    pub db: DatabaseConnection,
    pub ingestion: Arc<IngestionDriver>,
}

pub mod entities {
    pub mod prelude;
    pub mod rice_prices;
    pub mod sync_status;
}

pub mod services {
    pub mod ingestion;
    pub mod normalizer;
    pub mod price_store;
    pub mod region;
    pub mod snapshot;
    pub mod sync_status;
}

pub mod config;
pub mod handlers;
pub mod jobs;
pub mod models;
pub mod scrapers;

/// HTTP routes for the read API and the manual ingestion trigger
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(handlers::health::health))
        .route("/api/prices", get(handlers::prices::get_price_history))
        .route(
            "/api/prices/snapshot",
            get(handlers::prices::get_current_snapshot),
        )
        .route(
            "/api/prices/average",
            get(handlers::prices::get_national_average_history),
        )
        .route(
            "/api/ingestion/run",
            post(handlers::ingestion::trigger_ingestion),
        )
        .route(
            "/api/ingestion/status",
            get(handlers::ingestion::get_ingestion_status),
        )
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
