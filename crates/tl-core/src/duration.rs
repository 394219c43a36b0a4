//! Signed durations in whole minutes.

use std::fmt;
use std::iter::Sum;
use std::ops::{Add, Neg, Sub};
use std::str::FromStr;
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::Error;

static DURATION_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^([+-])?(?:(\d+)h)?(?:(\d+)m)?$").unwrap());

/// A signed amount of time with minute precision.
///
/// Renders as `XhYm` with zero components omitted (`2h`, `45m`, `-1h5m`);
/// zero renders as `0m`.
///
/// Parsed durations never exceed [`Duration::MAX_MINUTES`] in magnitude, so
/// sums over any realistic number of entries stay within `i64`.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(try_from = "String", into = "String")]
pub struct Duration(i64);

impl Duration {
    pub const ZERO: Self = Self(0);

    /// Largest magnitude accepted when parsing, about 1900 years.
    pub const MAX_MINUTES: i64 = 1_000_000_000;

    /// `hours * 60 + minutes`; both components may be negative.
    #[must_use]
    pub const fn new(hours: i64, minutes: i64) -> Self {
        Self(hours * 60 + minutes)
    }

    #[must_use]
    pub const fn from_minutes(minutes: i64) -> Self {
        Self(minutes)
    }

    #[must_use]
    pub const fn in_minutes(self) -> i64 {
        self.0
    }

    #[must_use]
    pub const fn plus(self, other: Self) -> Self {
        Self(self.0 + other.0)
    }

    #[must_use]
    pub const fn minus(self, other: Self) -> Self {
        Self(self.0 - other.0)
    }

    #[must_use]
    pub const fn is_negative(self) -> bool {
        self.0 < 0
    }

    /// Like `to_string`, but positive values get a leading `+`.
    #[must_use]
    pub fn to_string_with_sign(self) -> String {
        if self.0 > 0 {
            format!("+{self}")
        } else {
            self.to_string()
        }
    }
}

impl Add for Duration {
    type Output = Self;

    fn add(self, rhs: Self) -> Self::Output {
        self.plus(rhs)
    }
}

impl Sub for Duration {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self::Output {
        self.minus(rhs)
    }
}

impl Neg for Duration {
    type Output = Self;

    fn neg(self) -> Self::Output {
        Self(-self.0)
    }
}

impl Sum for Duration {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self::ZERO, Add::add)
    }
}

impl fmt::Display for Duration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0 == 0 {
            return write!(f, "0m");
        }
        if self.0 < 0 {
            write!(f, "-")?;
        }
        let abs = self.0.unsigned_abs();
        let (hours, minutes) = (abs / 60, abs % 60);
        if hours > 0 {
            write!(f, "{hours}h")?;
        }
        if minutes > 0 {
            write!(f, "{minutes}m")?;
        }
        Ok(())
    }
}

impl FromStr for Duration {
    type Err = Error;

    /// Accepts an optional sign followed by hours and/or minutes: `8h30m`,
    /// `-15m`, `+2h`, `90m`. Minutes must be below 60 when hours are given,
    /// and the total must not exceed [`Duration::MAX_MINUTES`].
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || Error::InvalidDuration(s.to_string());
        let caps = DURATION_RE.captures(s).ok_or_else(invalid)?;
        let hours = caps.get(2);
        let minutes = caps.get(3);
        if hours.is_none() && minutes.is_none() {
            return Err(invalid());
        }
        let parse = |m: Option<regex::Match<'_>>| -> Result<i64, Error> {
            m.map_or(Ok(0), |m| m.as_str().parse().map_err(|_| invalid()))
        };
        let h = parse(hours)?;
        let m = parse(minutes)?;
        if hours.is_some() && m >= 60 {
            return Err(invalid());
        }
        let total = h
            .checked_mul(60)
            .and_then(|h| h.checked_add(m))
            .filter(|total| *total <= Self::MAX_MINUTES)
            .ok_or_else(invalid)?;
        let sign = if caps.get(1).is_some_and(|s| s.as_str() == "-") {
            -1
        } else {
            1
        };
        Ok(Self(sign * total))
    }
}

canonical_string_conversions!(Duration);
