//! Sync status service for tracking background job outcomes
//!
//! Each ingestion run records its outcome here so operators can see when the
//! last successful scrape happened without digging through logs.

use chrono::Utc;
use sea_orm::{ActiveModelTrait, ColumnTrait, DatabaseConnection, DbErr, EntityTrait, QueryFilter, Set};

use crate::entities::sync_status::{self, Entity as SyncStatus};

/// Job names for tracking sync status
pub mod jobs {
    pub const RICE_PRICE_INGESTION: &str = "rice_price_ingestion";
}

/// Fetch the status row for a job, if it ever ran
pub async fn get_status(
    db: &DatabaseConnection,
    job_name: &str,
) -> Result<Option<sync_status::Model>, DbErr> {
    SyncStatus::find()
        .filter(sync_status::Column::JobName.eq(job_name))
        .one(db)
        .await
}

/// Record a successful run
pub async fn record_success(
    db: &DatabaseConnection,
    job_name: &str,
    inserted: usize,
) -> Result<(), DbErr> {
    let now = Utc::now().fixed_offset();
    let inserted = i32::try_from(inserted).unwrap_or(i32::MAX);

    match get_status(db, job_name).await? {
        Some(record) => {
            let success_count = record.success_count + 1;
            let mut active_model: sync_status::ActiveModel = record.into();
            active_model.last_success_at = Set(Some(now));
            active_model.last_attempt_at = Set(Some(now));
            active_model.last_error = Set(None);
            active_model.last_inserted_count = Set(inserted);
            active_model.success_count = Set(success_count);
            active_model.update(db).await?;
        }
        None => {
            let new_record = sync_status::ActiveModel {
                job_name: Set(job_name.to_string()),
                last_success_at: Set(Some(now)),
                last_attempt_at: Set(Some(now)),
                last_error: Set(None),
                last_inserted_count: Set(inserted),
                success_count: Set(1),
                error_count: Set(0),
                ..Default::default()
            };
            new_record.insert(db).await?;
        }
    }

    tracing::debug!("[{}] Recorded successful sync", job_name);
    Ok(())
}

/// Record a failed run
pub async fn record_failure(
    db: &DatabaseConnection,
    job_name: &str,
    error: &str,
) -> Result<(), DbErr> {
    let now = Utc::now().fixed_offset();

    match get_status(db, job_name).await? {
        Some(record) => {
            let error_count = record.error_count + 1;
            let mut active_model: sync_status::ActiveModel = record.into();
            active_model.last_attempt_at = Set(Some(now));
            active_model.last_error = Set(Some(error.to_string()));
            active_model.error_count = Set(error_count);
            active_model.update(db).await?;
        }
        None => {
            let new_record = sync_status::ActiveModel {
                job_name: Set(job_name.to_string()),
                last_success_at: Set(None),
                last_attempt_at: Set(Some(now)),
                last_error: Set(Some(error.to_string())),
                last_inserted_count: Set(0),
                success_count: Set(0),
                error_count: Set(1),
                ..Default::default()
            };
            new_record.insert(db).await?;
        }
    }

    tracing::debug!("[{}] Recorded failed sync: {}", job_name, error);
    Ok(())
}
