//! Canonical calendar-day identifiers.
//!
//! A [`DayId`] names one calendar day in the observer's zone and prints as
//! `YYYY-MM-DD`. Every identifier derived from a clock reading goes through
//! [`DayId::from_instant`]; every other identifier is parsed strictly or
//! computed from an existing one with [`DayId::offset`].

use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;

use chrono::{DateTime, Datelike, Days, NaiveDate, Utc};
use regex::Regex;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use thiserror::Error;

use crate::zone::Zone;

pub const DAY_FORMAT: &str = "%Y-%m-%d";

const MIN_YEAR: i32 = 0;
const MAX_YEAR: i32 = 9999;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DayError {
    #[error("malformed day identifier {0:?}: expected YYYY-MM-DD")]
    Malformed(String),

    #[error("not a calendar date: {0}")]
    InvalidDate(String),

    #[error("{day} offset by {offset} days leaves the range 0000-01-01..=9999-12-31")]
    OutOfRange { day: DayId, offset: i64 },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct DayId(NaiveDate);

impl DayId {
    /// Parses exactly `YYYY-MM-DD`. Single-digit months, surrounding
    /// whitespace or a trailing time are rejected.
    pub fn parse(raw: &str) -> Result<Self, DayError> {
        if !DAY_PATTERN.is_match(raw) {
            return Err(DayError::Malformed(raw.to_string()));
        }

        let date = NaiveDate::parse_from_str(raw, DAY_FORMAT)
            .map_err(|_| DayError::InvalidDate(raw.to_string()))?;
        Ok(Self(date))
    }

    /// The local calendar day containing `instant` in `zone`. Time of day
    /// is discarded by taking the zone's date, never by truncating UTC.
    #[must_use]
    pub fn from_instant(instant: DateTime<Utc>, zone: &Zone) -> Self {
        Self(zone.date_of(instant))
    }

    /// Moves by whole calendar days, so DST transitions in any zone have no
    /// effect on the result.
    pub fn offset(self, days: i64) -> Result<Self, DayError> {
        let shifted = if days >= 0 {
            self.0.checked_add_days(Days::new(days.unsigned_abs()))
        } else {
            self.0.checked_sub_days(Days::new(days.unsigned_abs()))
        };

        shifted
            .filter(|date| (MIN_YEAR..=MAX_YEAR).contains(&date.year()))
            .map(Self)
            .ok_or(DayError::OutOfRange { day: self, offset: days })
    }

    /// Signed number of days from `self` to `other`.
    #[must_use]
    pub fn days_until(self, other: DayId) -> i64 {
        other.0.signed_duration_since(self.0).num_days()
    }
}

static DAY_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d{4}-\d{2}-\d{2}$").expect("day pattern compiles"));

impl fmt::Display for DayId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.format(DAY_FORMAT))
    }
}

impl FromStr for DayId {
    type Err = DayError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl Serialize for DayId {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for DayId {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        DayId::parse(&raw).map_err(serde::de::Error::custom)
    }
}
