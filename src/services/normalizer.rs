//! Raw table rows → typed price candidates
//!
//! All knowledge of the source table's column layout lives in
//! [`classify_row`]. The average row is `[평균, price, ...]`; region rows carry
//! a packaging-size column first: `[region, 20kg, price, ...]`.

use lazy_static::lazy_static;
use regex::Regex;

use crate::scrapers::RawRow;
use crate::services::region::{Location, NATIONAL_AVERAGE_LABEL, Region};

/// Commodity label stored with every record
pub const DEFAULT_ITEM_NAME: &str = "쌀(일반계/20kg/상품)";

lazy_static! {
    static ref PRICE_REGEX: Regex = Regex::new(r"^[0-9]+$").unwrap();
}

/// Shape of one non-empty-cell row
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RowShape<'a> {
    AverageRow { price: &'a str },
    RegionRow { region: Region, price: &'a str },
    Unrecognized,
}

/// A normalized observation that has not been persisted yet
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PriceCandidate {
    pub item_name: String,
    pub price: u32,
    pub location: Location,
}

/// Classify a row whose empty cells were already removed
pub fn classify_row<'a>(cells: &[&'a str]) -> RowShape<'a> {
    match *cells {
        [first, price, ..] if first == NATIONAL_AVERAGE_LABEL => RowShape::AverageRow { price },
        [first, _size, price, ..] => match Region::from_label(first) {
            Some(region) => RowShape::RegionRow { region, price },
            None => RowShape::Unrecognized,
        },
        _ => RowShape::Unrecognized,
    }
}

/// Accept only plain decimal digits (after removing thousands separators)
pub fn parse_price(raw: &str) -> Option<u32> {
    let digits = raw.replace(',', "");
    if PRICE_REGEX.is_match(&digits) {
        digits.parse().ok()
    } else {
        None
    }
}

#[derive(Debug, Clone)]
pub struct Normalizer {
    item_name: String,
}

impl Default for Normalizer {
    fn default() -> Self {
        Self::new(DEFAULT_ITEM_NAME)
    }
}

impl Normalizer {
    pub fn new(item_name: impl Into<String>) -> Self {
        Self {
            item_name: item_name.into(),
        }
    }

    pub fn item_name(&self) -> &str {
        &self.item_name
    }

    /// Convert raw rows into candidates, at most one per location.
    ///
    /// Malformed rows are skipped silently. When a location shows up twice
    /// (re-rendered or duplicated rows) the later row wins, keeping the position
    /// of the first occurrence.
    pub fn normalize(&self, rows: &[RawRow]) -> Vec<PriceCandidate> {
        let mut candidates: Vec<PriceCandidate> = Vec::new();

        for row in rows {
            let Some(candidate) = self.normalize_row(row) else {
                continue;
            };

            match candidates
                .iter_mut()
                .find(|c| c.location == candidate.location)
            {
                Some(existing) => *existing = candidate,
                None => candidates.push(candidate),
            }
        }

        candidates
    }

    fn normalize_row(&self, row: &RawRow) -> Option<PriceCandidate> {
        let cells: Vec<&str> = row
            .iter()
            .map(|c| c.trim())
            .filter(|c| !c.is_empty())
            .collect();

        let (location, raw_price) = match classify_row(&cells) {
            RowShape::AverageRow { price } => (Location::NationalAverage, price),
            RowShape::RegionRow { region, price } => (Location::Region(region), price),
            RowShape::Unrecognized => return None,
        };

        let price = parse_price(raw_price)?;

        Some(PriceCandidate {
            item_name: self.item_name.clone(),
            price,
            location,
        })
    }
}
