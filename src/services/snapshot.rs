//! Current-snapshot selection over the append-only price log
//!
//! Batches are not stored: a batch is every record within
//! [`BATCH_WINDOW_MINUTES`] of the newest record. Inside that window the newest
//! record per location wins (ties broken by the larger id).

use chrono::{DateTime, Duration, FixedOffset};
use std::collections::BTreeMap;

use crate::entities::rice_prices;
use crate::services::region::{Location, Region};

pub const BATCH_WINDOW_MINUTES: i64 = 10;

#[derive(Debug, Clone, PartialEq)]
pub enum Snapshot {
    /// Nothing has been collected yet
    Empty,
    Current(CurrentSnapshot),
}

#[derive(Debug, Clone, PartialEq)]
pub struct CurrentSnapshot {
    /// Newest `created_at` in the log; the batch ends here
    pub observed_at: DateTime<FixedOffset>,
    pub national_average: Option<rice_prices::Model>,
    pub by_location: BTreeMap<Region, rice_prices::Model>,
}

impl Snapshot {
    pub fn is_empty(&self) -> bool {
        matches!(self, Snapshot::Empty)
    }

    pub fn national_average_price(&self) -> Option<i64> {
        match self {
            Snapshot::Empty => None,
            Snapshot::Current(current) => current.national_average.as_ref().map(|r| r.price),
        }
    }
}

impl CurrentSnapshot {
    /// Regional records, most expensive first
    pub fn ranked_by_price(&self) -> Vec<&rice_prices::Model> {
        let mut ranked: Vec<&rice_prices::Model> = self.by_location.values().collect();
        ranked.sort_by(|a, b| b.price.cmp(&a.price).then_with(|| a.location.cmp(&b.location)));
        ranked
    }
}

/// Select the current snapshot from the full record history.
///
/// Records outside the location whitelist are ignored. The result does not
/// depend on the order of `records`.
pub fn current_snapshot(records: &[rice_prices::Model]) -> Snapshot {
    let known: Vec<(Location, &rice_prices::Model)> = records
        .iter()
        .filter_map(|r| Location::from_label(&r.location).map(|loc| (loc, r)))
        .collect();

    let Some(latest) = known.iter().map(|(_, r)| r.created_at).max() else {
        return Snapshot::Empty;
    };
    let window_start = latest - Duration::minutes(BATCH_WINDOW_MINUTES);

    let mut newest: BTreeMap<Location, &rice_prices::Model> = BTreeMap::new();
    for (location, record) in known {
        if record.created_at < window_start {
            continue;
        }
        newest
            .entry(location)
            .and_modify(|current| {
                if is_newer(record, *current) {
                    *current = record;
                }
            })
            .or_insert(record);
    }

    let mut national_average = None;
    let mut by_location = BTreeMap::new();
    for (location, record) in newest {
        match location {
            Location::NationalAverage => national_average = Some(record.clone()),
            Location::Region(region) => {
                by_location.insert(region, record.clone());
            }
        }
    }

    Snapshot::Current(CurrentSnapshot {
        observed_at: latest,
        national_average,
        by_location,
    })
}

fn is_newer(candidate: &rice_prices::Model, current: &rice_prices::Model) -> bool {
    (candidate.created_at, candidate.id) > (current.created_at, current.id)
}
