//! Storage access for the rice_prices log
//!
//! Writes happen only through [`append_batch`], one transaction per ingestion
//! run. There is no update or delete path.

use chrono::{DateTime, FixedOffset};
use sea_orm::{
    ColumnTrait, ConnectionTrait, DbErr, EntityTrait, Order, QueryFilter, QueryOrder, QuerySelect,
    Set, TransactionTrait,
};
use tracing::{debug, error};

use crate::entities::{prelude::RicePrices, rice_prices};
use crate::services::normalizer::PriceCandidate;
use crate::services::region::NATIONAL_AVERAGE_LABEL;

/// Outcome of a committed batch
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AppendedBatch {
    pub inserted: usize,
    pub observed_at: DateTime<FixedOffset>,
}

/// Insert every candidate with one shared timestamp, all-or-nothing.
///
/// `observed_at` is raised to the newest stored timestamp if the clock went
/// backwards, so the log stays non-decreasing.
pub async fn append_batch<C>(
    db: &C,
    candidates: &[PriceCandidate],
    observed_at: DateTime<FixedOffset>,
) -> Result<AppendedBatch, DbErr>
where
    C: TransactionTrait,
{
    let txn = db.begin().await?;

    let latest = latest_observed_at(&txn).await;
    let observed_at = match latest {
        Ok(Some(latest)) if latest > observed_at => latest,
        Ok(_) => observed_at,
        Err(e) => return Err(rollback(txn, e).await),
    };

    for candidate in candidates {
        let record = rice_prices::ActiveModel {
            price: Set(i64::from(candidate.price)),
            item_name: Set(candidate.item_name.clone()),
            location: Set(candidate.location.as_str().to_string()),
            created_at: Set(observed_at),
            ..Default::default()
        };

        let inserted = RicePrices::insert(record).exec(&txn).await;
        if let Err(e) = inserted {
            return Err(rollback(txn, e).await);
        }
    }

    txn.commit().await?;

    debug!(
        inserted = candidates.len(),
        observed_at = %observed_at,
        "Committed price batch"
    );

    Ok(AppendedBatch {
        inserted: candidates.len(),
        observed_at,
    })
}

async fn rollback(txn: sea_orm::DatabaseTransaction, cause: DbErr) -> DbErr {
    if let Err(e) = txn.rollback().await {
        // Dropping the connection discards the transaction anyway
        error!(error = %e, "Rollback failed after: {}", cause);
    }
    cause
}

/// Newest `created_at` in the log
pub async fn latest_observed_at<C>(db: &C) -> Result<Option<DateTime<FixedOffset>>, DbErr>
where
    C: ConnectionTrait,
{
    let latest = RicePrices::find()
        .order_by(rice_prices::Column::CreatedAt, Order::Desc)
        .limit(1)
        .one(db)
        .await?;

    Ok(latest.map(|r| r.created_at))
}

/// Every stored record, most recent first
pub async fn history<C>(db: &C) -> Result<Vec<rice_prices::Model>, DbErr>
where
    C: ConnectionTrait,
{
    RicePrices::find()
        .order_by(rice_prices::Column::CreatedAt, Order::Desc)
        .order_by(rice_prices::Column::Id, Order::Desc)
        .all(db)
        .await
}

/// National-average records only, most recent first
pub async fn national_average_history<C>(db: &C) -> Result<Vec<rice_prices::Model>, DbErr>
where
    C: ConnectionTrait,
{
    RicePrices::find()
        .filter(rice_prices::Column::Location.eq(NATIONAL_AVERAGE_LABEL))
        .order_by(rice_prices::Column::CreatedAt, Order::Desc)
        .order_by(rice_prices::Column::Id, Order::Desc)
        .all(db)
        .await
}
