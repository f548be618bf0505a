#![allow(dead_code)]

use async_trait::async_trait;
use sea_orm::{ConnectOptions, ConnectionTrait, Database, DatabaseConnection, DbErr};
use sea_orm_migration::MigratorTrait;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;
use tokio::sync::Notify;

use rice_price_backend::scrapers::{RawRow, RowSource, ScrapeError};
use rice_price_backend::services::ingestion::IngestionDriver;
use rice_price_backend::services::normalizer::Normalizer;

/// Set up a migrated in-memory SQLite database
pub async fn setup_test_db() -> Result<DatabaseConnection, DbErr> {
    let mut options = ConnectOptions::new("sqlite::memory:");
    // Each pooled connection would otherwise see its own empty database
    options
        .max_connections(1)
        .min_connections(1)
        .sqlx_logging(false);

    let db = Database::connect(options).await?;
    migration::Migrator::up(&db, None).await?;
    Ok(db)
}

/// Make every insert for `location` fail inside the database
pub async fn poison_location(db: &DatabaseConnection, location: &str) -> Result<(), DbErr> {
    db.execute_unprepared(&format!(
        "CREATE TRIGGER reject_location BEFORE INSERT ON rice_prices \
         WHEN NEW.location = '{}' \
         BEGIN SELECT RAISE(ABORT, 'simulated storage failure'); END;",
        location
    ))
    .await?;
    Ok(())
}

pub async fn clear_poison(db: &DatabaseConnection) -> Result<(), DbErr> {
    db.execute_unprepared("DROP TRIGGER reject_location").await?;
    Ok(())
}

pub fn rows(table: &[&[&str]]) -> Vec<RawRow> {
    table
        .iter()
        .map(|row| row.iter().map(|cell| cell.to_string()).collect())
        .collect()
}

/// The duplicated-Seoul table from the source page
pub fn sample_table() -> Vec<RawRow> {
    rows(&[
        &["평균", "48500"],
        &["서울", "20kg", "49000"],
        &["서울", "20kg", "49100"],
    ])
}

pub fn driver(db: &DatabaseConnection, source: Arc<dyn RowSource>) -> IngestionDriver {
    driver_with_timeout(db, source, Duration::from_secs(10))
}

pub fn driver_with_timeout(
    db: &DatabaseConnection,
    source: Arc<dyn RowSource>,
    timeout: Duration,
) -> IngestionDriver {
    IngestionDriver::new(db.clone(), source, Normalizer::default(), timeout)
}

/// Always returns the same table
pub struct FixedTable(pub Vec<RawRow>);

#[async_trait]
impl RowSource for FixedTable {
    async fn fetch_raw_rows(&self) -> Result<Vec<RawRow>, ScrapeError> {
        Ok(self.0.clone())
    }
}

/// Fails the first `failures` calls, then returns the table
pub struct FlakySource {
    pub failures: usize,
    pub table: Vec<RawRow>,
    pub calls: AtomicUsize,
}

impl FlakySource {
    pub fn new(failures: usize, table: Vec<RawRow>) -> Self {
        Self {
            failures,
            table,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl RowSource for FlakySource {
    async fn fetch_raw_rows(&self) -> Result<Vec<RawRow>, ScrapeError> {
        let call = self.calls.fetch_add(1, Ordering::SeqCst);
        if call < self.failures {
            Err(ScrapeError::PageLoad("net::ERR_CONNECTION_RESET".to_string()))
        } else {
            Ok(self.table.clone())
        }
    }
}

/// Signals `entered` when a fetch starts, then waits for `release`
pub struct GatedSource {
    pub entered: Arc<Notify>,
    pub release: Arc<Notify>,
    pub table: Vec<RawRow>,
}

impl GatedSource {
    pub fn new(table: Vec<RawRow>) -> Self {
        Self {
            entered: Arc::new(Notify::new()),
            release: Arc::new(Notify::new()),
            table,
        }
    }
}

#[async_trait]
impl RowSource for GatedSource {
    async fn fetch_raw_rows(&self) -> Result<Vec<RawRow>, ScrapeError> {
        self.entered.notify_one();
        self.release.notified().await;
        Ok(self.table.clone())
    }
}

/// A browser session that never finishes loading
pub struct HangingSource;

#[async_trait]
impl RowSource for HangingSource {
    async fn fetch_raw_rows(&self) -> Result<Vec<RawRow>, ScrapeError> {
        std::future::pending::<()>().await;
        Ok(Vec::new())
    }
}
