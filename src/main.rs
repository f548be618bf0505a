use sea_orm::Database;
use sea_orm_migration::MigratorTrait;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use rice_price_backend::config::AppConfig;
use rice_price_backend::jobs::rice_price_sync::IngestionScheduler;
use rice_price_backend::scrapers::kamis::KamisScraper;
use rice_price_backend::services::ingestion::IngestionDriver;
use rice_price_backend::services::normalizer::Normalizer;
use rice_price_backend::{AppState, build_router};

#[tokio::main]
async fn main() {
    // Load environment variables
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,rice_price_backend=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = AppConfig::from_env().expect("Invalid configuration");

    // Connect to database
    tracing::info!("Connecting to database...");
    let db = Database::connect(&config.database_url)
        .await
        .expect("Failed to connect to database");

    // Run migrations
    tracing::info!("Running migrations...");
    migration::Migrator::up(&db, None)
        .await
        .expect("Failed to run migrations");

    let source = Arc::new(KamisScraper::new(config.scraper.clone()));
    let ingestion = Arc::new(IngestionDriver::new(
        db.clone(),
        source,
        Normalizer::new(&config.item_name),
        config.run_timeout,
    ));

    let scheduler = IngestionScheduler::new(ingestion.clone(), config.scrape_interval);
    if config.scrape_enabled {
        scheduler.start();
    } else {
        tracing::warn!("RICE_SCRAPE_ENABLED=false - background scraping disabled");
    }

    let app = build_router(AppState { db, ingestion });

    // Start server
    let listener = tokio::net::TcpListener::bind(&config.bind_addr)
        .await
        .expect("Failed to bind listener");

    tracing::info!("Server listening on {}", config.bind_addr);

    if let Err(e) = axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
    {
        tracing::error!("Server error: {}", e);
    }

    scheduler.stop().await;
    tracing::info!("Shutdown complete");
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}
