//! Canonical location whitelist
//!
//! The source table lists wholesale markets by city name plus one national
//! average row. Every component that filters by location goes through
//! [`Location::from_label`], so there is exactly one list to maintain.

use std::fmt;

/// Label the source table uses for the all-region aggregate row.
/// Also the stored `location` value for national-average records.
pub const NATIONAL_AVERAGE_LABEL: &str = "평균";

/// Wholesale market regions reported on the price page
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Region {
    Seoul,
    Busan,
    Daegu,
    Incheon,
    Gwangju,
    Daejeon,
    Ulsan,
    Suwon,
    Chuncheon,
    Cheongju,
    Jeonju,
    Pohang,
    Jeju,
}

impl Region {
    pub const ALL: [Region; 13] = [
        Region::Seoul,
        Region::Busan,
        Region::Daegu,
        Region::Incheon,
        Region::Gwangju,
        Region::Daejeon,
        Region::Ulsan,
        Region::Suwon,
        Region::Chuncheon,
        Region::Cheongju,
        Region::Jeonju,
        Region::Pohang,
        Region::Jeju,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            Region::Seoul => "서울",
            Region::Busan => "부산",
            Region::Daegu => "대구",
            Region::Incheon => "인천",
            Region::Gwangju => "광주",
            Region::Daejeon => "대전",
            Region::Ulsan => "울산",
            Region::Suwon => "수원",
            Region::Chuncheon => "춘천",
            Region::Cheongju => "청주",
            Region::Jeonju => "전주",
            Region::Pohang => "포항",
            Region::Jeju => "제주",
        }
    }

    pub fn from_label(label: &str) -> Option<Self> {
        Region::ALL.into_iter().find(|r| r.label() == label)
    }
}

/// A whitelisted location: a named region or the national average
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Location {
    NationalAverage,
    Region(Region),
}

impl Location {
    pub fn as_str(&self) -> &'static str {
        match self {
            Location::NationalAverage => NATIONAL_AVERAGE_LABEL,
            Location::Region(region) => region.label(),
        }
    }

    /// Returns `None` for anything outside the whitelist
    pub fn from_label(label: &str) -> Option<Self> {
        if label == NATIONAL_AVERAGE_LABEL {
            Some(Location::NationalAverage)
        } else {
            Region::from_label(label).map(Location::Region)
        }
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
