//! Clock times relative to the start of a record's day.

use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;

use chrono::{NaiveTime, Timelike};
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::{Duration, Error};

static TIME_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(\d{1,2}):(\d{2})(>)?$").unwrap());

/// A time of day within a logical workday.
///
/// Hours past 24 denote times after midnight that still belong to the day the
/// record is dated: `25:30` is 01:30 on the next calendar day. The
/// representable window is `00:00` to `47:59`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Time {
    hour: u32,
    minute: u32,
}

impl Time {
    /// The latest representable hour.
    pub const MAX_HOUR: u32 = 47;

    /// Midnight at the start of the day.
    pub const MIDNIGHT: Self = Self { hour: 0, minute: 0 };

    pub fn new(hour: u32, minute: u32) -> Result<Self, Error> {
        if hour > Self::MAX_HOUR || minute > 59 {
            return Err(Error::InvalidTime(format!("{hour:02}:{minute:02}")));
        }
        Ok(Self { hour, minute })
    }

    /// Builds a time from minutes since the start of the day, if representable.
    #[must_use]
    pub fn from_minutes(minutes: i64) -> Option<Self> {
        let minutes = u32::try_from(minutes).ok()?;
        Self::new(minutes / 60, minutes % 60).ok()
    }

    #[must_use]
    pub const fn hour(self) -> u32 {
        self.hour
    }

    #[must_use]
    pub const fn minute(self) -> u32 {
        self.minute
    }

    /// Minutes elapsed since the start of the record's day.
    #[must_use]
    pub fn minutes_since_day_start(self) -> i64 {
        i64::from(self.hour * 60 + self.minute)
    }

    /// Whether this time falls on the calendar day after the record's date.
    #[must_use]
    pub const fn is_next_day(self) -> bool {
        self.hour >= 24
    }

    /// Adds a (possibly negative) duration.
    ///
    /// Returns `None` when the result would leave the `00:00`-`47:59` window;
    /// the value is never clamped.
    #[must_use]
    pub fn checked_add(self, duration: Duration) -> Option<Self> {
        let minutes = self
            .minutes_since_day_start()
            .checked_add(duration.in_minutes())?;
        Self::from_minutes(minutes)
    }

    /// The signed duration from `earlier` to `self`.
    #[must_use]
    pub fn since(self, earlier: Self) -> Duration {
        Duration::from_minutes(self.minutes_since_day_start() - earlier.minutes_since_day_start())
    }
}

impl From<NaiveTime> for Time {
    fn from(time: NaiveTime) -> Self {
        Self {
            hour: time.hour(),
            minute: time.minute(),
        }
    }
}

impl fmt::Display for Time {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}:{:02}", self.hour, self.minute)
    }
}

impl FromStr for Time {
    type Err = Error;

    /// Accepts `H:MM`, `HH:MM`, and a `>` suffix for "next day" (`1:30>` is `25:30`).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || Error::InvalidTime(s.to_string());
        let caps = TIME_RE.captures(s).ok_or_else(invalid)?;
        let hour: u32 = caps[1].parse().map_err(|_| invalid())?;
        let minute: u32 = caps[2].parse().map_err(|_| invalid())?;
        let hour = if caps.get(3).is_some() {
            if hour >= 24 {
                return Err(invalid());
            }
            hour + 24
        } else {
            hour
        };
        Self::new(hour, minute).map_err(|_| invalid())
    }
}

canonical_string_conversions!(Time);
