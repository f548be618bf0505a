//! Rice price request/response models

use chrono::{DateTime, FixedOffset};
use serde::Serialize;
use std::collections::BTreeMap;

use crate::entities::rice_prices;
use crate::services::snapshot::Snapshot;

/// One stored price record
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PriceRecordResponse {
    pub id: i64,
    pub item_name: String,
    pub price: i64,
    pub location: String,
    pub observed_at: DateTime<FixedOffset>,
}

impl From<rice_prices::Model> for PriceRecordResponse {
    fn from(record: rice_prices::Model) -> Self {
        Self {
            id: record.id,
            item_name: record.item_name,
            price: record.price,
            location: record.location,
            observed_at: record.created_at,
        }
    }
}

/// Response for the history endpoints
#[derive(Debug, Clone, Serialize)]
pub struct PriceHistoryResponse {
    pub count: usize,
    /// Most recent first
    pub data: Vec<PriceRecordResponse>,
}

impl From<Vec<rice_prices::Model>> for PriceHistoryResponse {
    fn from(records: Vec<rice_prices::Model>) -> Self {
        let data: Vec<PriceRecordResponse> = records.into_iter().map(Into::into).collect();
        Self {
            count: data.len(),
            data,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SnapshotStatus {
    Current,
    Empty,
}

/// Response for GET /api/prices/snapshot
#[derive(Debug, Clone, Serialize)]
pub struct SnapshotResponse {
    pub status: SnapshotStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub observed_at: Option<DateTime<FixedOffset>>,
    pub national_average: Option<i64>,
    /// Keyed by region label
    pub by_location: BTreeMap<String, PriceRecordResponse>,
    /// Region labels, most expensive first
    pub ranking: Vec<String>,
}

impl From<Snapshot> for SnapshotResponse {
    fn from(snapshot: Snapshot) -> Self {
        match snapshot {
            Snapshot::Empty => Self {
                status: SnapshotStatus::Empty,
                observed_at: None,
                national_average: None,
                by_location: BTreeMap::new(),
                ranking: Vec::new(),
            },
            Snapshot::Current(current) => {
                let ranking = current
                    .ranked_by_price()
                    .into_iter()
                    .map(|r| r.location.clone())
                    .collect();

                Self {
                    status: SnapshotStatus::Current,
                    observed_at: Some(current.observed_at),
                    national_average: current.national_average.map(|r| r.price),
                    by_location: current
                        .by_location
                        .into_values()
                        .map(|r| (r.location.clone(), r.into()))
                        .collect(),
                    ranking,
                }
            }
        }
    }
}
