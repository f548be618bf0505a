mod common;

use std::sync::Arc;
use std::time::Duration;

use rice_price_backend::jobs::rice_price_sync::IngestionScheduler;
use rice_price_backend::services::price_store;

use crate::common::{
    FixedTable, FlakySource, HangingSource, driver, driver_with_timeout, sample_table,
    setup_test_db,
};

#[tokio::test]
async fn test_runs_immediately_and_on_interval() {
    let db = setup_test_db().await.unwrap();
    let driver = Arc::new(driver(&db, Arc::new(FixedTable(sample_table()))));
    let scheduler = IngestionScheduler::new(driver, Duration::from_millis(100));

    scheduler.start();
    assert!(scheduler.is_started());
    tokio::time::sleep(Duration::from_millis(350)).await;
    scheduler.stop().await;
    assert!(!scheduler.is_started());

    let stored = price_store::history(&db).await.unwrap().len();
    // 2 rows per run, at least the startup run and one tick
    assert!(stored >= 4, "expected at least two runs, got {} rows", stored);

    tokio::time::sleep(Duration::from_millis(250)).await;
    assert_eq!(price_store::history(&db).await.unwrap().len(), stored);
}

#[tokio::test]
async fn test_failed_run_does_not_stop_schedule() {
    let db = setup_test_db().await.unwrap();
    let source = Arc::new(FlakySource::new(1, sample_table()));
    let driver = Arc::new(driver(&db, source.clone()));
    let scheduler = IngestionScheduler::new(driver, Duration::from_millis(100));

    scheduler.start();
    tokio::time::sleep(Duration::from_millis(250)).await;
    scheduler.stop().await;

    assert!(source.calls() >= 2);
    assert!(!price_store::history(&db).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_stop_cancels_hung_run() {
    let db = setup_test_db().await.unwrap();
    let driver = Arc::new(driver_with_timeout(
        &db,
        Arc::new(HangingSource),
        Duration::from_secs(60),
    ));
    let scheduler = IngestionScheduler::new(driver.clone(), Duration::from_secs(3600));

    scheduler.start();
    tokio::time::sleep(Duration::from_millis(50)).await;
    assert!(driver.is_running());

    tokio::time::timeout(Duration::from_secs(2), scheduler.stop())
        .await
        .expect("stop should not wait for the hung run");
}

#[tokio::test]
async fn test_start_twice_is_noop() {
    let db = setup_test_db().await.unwrap();
    let driver = Arc::new(driver(&db, Arc::new(FixedTable(sample_table()))));
    let scheduler = IngestionScheduler::new(driver, Duration::from_secs(3600));

    scheduler.start();
    scheduler.start();
    tokio::time::sleep(Duration::from_millis(100)).await;
    scheduler.stop().await;

    // One startup run only
    assert_eq!(price_store::history(&db).await.unwrap().len(), 2);
}
