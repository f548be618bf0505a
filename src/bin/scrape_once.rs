//! Run a single rice price ingestion from the command line.
//!
//! Usage: scrape_once [--dry-run]
//!
//! With `--dry-run` the page is scraped and normalized but nothing is written;
//! no database is needed in that mode.

use sea_orm::Database;
use sea_orm_migration::MigratorTrait;
use std::env;
use std::sync::Arc;

use rice_price_backend::config::{self, AppConfig};
use rice_price_backend::scrapers::RowSource;
use rice_price_backend::scrapers::kamis::KamisScraper;
use rice_price_backend::services::ingestion::IngestionDriver;
use rice_price_backend::services::normalizer::Normalizer;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args: Vec<String> = env::args().collect();
    let dry_run = match args.get(1).map(String::as_str) {
        None => false,
        Some("--dry-run") => true,
        Some(_) => {
            eprintln!("Usage: {} [--dry-run]", args[0]);
            std::process::exit(1);
        }
    };

    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    if dry_run {
        let rows = KamisScraper::new(config::scraper_config_from_env())
            .fetch_raw_rows()
            .await?;
        let candidates = Normalizer::new(config::item_name_from_env()).normalize(&rows);

        println!("{} rows scraped, {} valid prices:", rows.len(), candidates.len());
        for candidate in &candidates {
            println!("  {:<4} {:>8}원", candidate.location.as_str(), candidate.price);
        }
        return Ok(());
    }

    let app_config = AppConfig::from_env()?;
    let db = Database::connect(&app_config.database_url).await?;
    migration::Migrator::up(&db, None).await?;

    let driver = IngestionDriver::new(
        db,
        Arc::new(KamisScraper::new(app_config.scraper.clone())),
        Normalizer::new(&app_config.item_name),
        app_config.run_timeout,
    );

    let result = driver.run_once().await?;
    println!("✓ Inserted {} records", result.inserted_count);
    if let Some(observed_at) = result.observed_at {
        println!("  observed_at: {}", observed_at);
    }

    Ok(())
}
