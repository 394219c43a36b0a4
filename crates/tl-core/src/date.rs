//! Calendar dates.

use std::fmt;
use std::str::FromStr;

use chrono::{Datelike, NaiveDate, TimeDelta};
use serde::{Deserialize, Serialize};

use crate::Error;

/// A validated calendar date.
///
/// Dates are totally ordered by (year, month, day). The canonical text form is
/// `YYYY-MM-DD`; `YYYY/MM/DD` is accepted on input as well.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Date(NaiveDate);

impl Date {
    /// Creates a date, rejecting days and months that do not exist in `year`.
    pub fn new(year: i32, month: u32, day: u32) -> Result<Self, Error> {
        NaiveDate::from_ymd_opt(year, month, day)
            .map(Self)
            .ok_or_else(|| Error::InvalidDate(format!("{year:04}-{month:02}-{day:02}")))
    }

    #[must_use]
    pub fn year(self) -> i32 {
        self.0.year()
    }

    #[must_use]
    pub fn month(self) -> u32 {
        self.0.month()
    }

    #[must_use]
    pub fn day(self) -> u32 {
        self.0.day()
    }

    /// Shifts the date by `days` (negative values go back in time).
    ///
    /// Returns `None` only if the result leaves the supported calendar.
    #[must_use]
    pub fn plus_days(self, days: i64) -> Option<Self> {
        let delta = TimeDelta::try_days(days)?;
        self.0.checked_add_signed(delta).map(Self)
    }

    /// Returns the underlying `chrono` date.
    #[must_use]
    pub const fn as_naive(self) -> NaiveDate {
        self.0
    }
}

impl From<NaiveDate> for Date {
    fn from(date: NaiveDate) -> Self {
        Self(date)
    }
}

impl fmt::Display for Date {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}-{:02}", self.year(), self.month(), self.day())
    }
}

impl FromStr for Date {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || Error::InvalidDate(s.to_string());
        let bytes = s.as_bytes();
        if bytes.len() != 10 || bytes[4] != bytes[7] || !matches!(bytes[4], b'-' | b'/') {
            return Err(invalid());
        }
        let digits = |range: std::ops::Range<usize>| -> Result<u32, Error> {
            let part = &s[range];
            if !part.bytes().all(|b| b.is_ascii_digit()) {
                return Err(invalid());
            }
            part.parse().map_err(|_| invalid())
        };
        let year = i32::try_from(digits(0..4)?).map_err(|_| invalid())?;
        let month = digits(5..7)?;
        let day = digits(8..10)?;
        Self::new(year, month, day).map_err(|_| invalid())
    }
}

canonical_string_conversions!(Date);
