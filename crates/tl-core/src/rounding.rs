//! Rounding granularity for evaluated totals.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::{Duration, Error};

/// A rounding granularity of 5, 10, 15, 30 or 60 minutes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Rounding(u32);

impl Rounding {
    /// Granularities accepted by [`Rounding::new`].
    pub const ALLOWED: [u32; 5] = [5, 10, 15, 30, 60];

    pub fn new(minutes: u32) -> Result<Self, Error> {
        if Self::ALLOWED.contains(&minutes) {
            Ok(Self(minutes))
        } else {
            Err(Error::InvalidRounding(format!("{minutes}m")))
        }
    }

    #[must_use]
    pub const fn minutes(self) -> u32 {
        self.0
    }

    /// Rounds to the nearest multiple of the granularity.
    ///
    /// Halves round up in magnitude: ties go away from zero for both signs,
    /// so `round(-d) == -round(d)`.
    ///
    /// Computed in `i128`, so no input overflows. A duration within one step
    /// of the `i64` limits, whose rounded value is unrepresentable, comes
    /// back unchanged.
    #[must_use]
    pub fn round(self, duration: Duration) -> Duration {
        let n = i128::from(self.0);
        let minutes = i128::from(duration.in_minutes());
        let magnitude = (minutes.abs() * 2 + n) / (2 * n) * n;
        let rounded = if minutes < 0 { -magnitude } else { magnitude };
        i64::try_from(rounded).map_or(duration, Duration::from_minutes)
    }
}

impl fmt::Display for Rounding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}m", self.0)
    }
}

impl FromStr for Rounding {
    type Err = Error;

    /// Parses `15m`-style literals.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || Error::InvalidRounding(s.to_string());
        let minutes: u32 = s
            .strip_suffix('m')
            .filter(|digits| !digits.is_empty() && digits.bytes().all(|b| b.is_ascii_digit()))
            .ok_or_else(invalid)?
            .parse()
            .map_err(|_| invalid())?;
        Self::new(minutes).map_err(|_| invalid())
    }
}

canonical_string_conversions!(Rounding);

#[cfg(test)]
mod tests {
    use super::*;

    fn round(minutes: i64, n: u32) -> i64 {
        Rounding::new(n)
            .unwrap()
            .round(Duration::from_minutes(minutes))
            .in_minutes()
    }

    #[test]
    fn test_accepts_only_known_granularities() {
        for n in Rounding::ALLOWED {
            assert_eq!(Rounding::new(n).unwrap().minutes(), n);
        }
        for n in [0, 1, 7, 20, 25, 45, 90] {
            assert!(Rounding::new(n).is_err(), "{n} should be rejected");
        }
    }

    #[test]
    fn test_parses_minute_literals() {
        assert_eq!("15m".parse::<Rounding>().unwrap().minutes(), 15);
        assert_eq!("60m".parse::<Rounding>().unwrap().to_string(), "60m");
        for text in ["15", "25m", "m", "1h", "-5m", " 5m"] {
            assert!(text.parse::<Rounding>().is_err(), "{text} should be rejected");
        }
    }

    #[test]
    fn test_rounds_to_nearest_multiple() {
        assert_eq!(round(7, 15), 0);
        assert_eq!(round(8, 15), 15);
        assert_eq!(round(52, 15), 45);
        assert_eq!(round(53, 15), 60);
        assert_eq!(round(2, 5), 0);
        assert_eq!(round(3, 5), 5);
        assert_eq!(round(0, 60), 0);
    }

    #[test]
    fn test_ties_round_away_from_zero() {
        assert_eq!(round(5, 10), 10);
        assert_eq!(round(-5, 10), -10);
        assert_eq!(round(15, 30), 30);
        assert_eq!(round(-15, 30), -30);
        assert_eq!(round(90, 60), 120);
        assert_eq!(round(-90, 60), -120);
    }

    #[test]
    fn test_result_is_multiple_within_half_step() {
        for n in Rounding::ALLOWED {
            for minutes in -200..=200 {
                let rounded = round(minutes, n);
                let n = i64::from(n);
                assert_eq!(rounded % n, 0, "{minutes} rounded to {rounded} for {n}");
                assert!((rounded - minutes).abs() * 2 <= n);
            }
        }
    }

    #[test]
    fn test_extreme_durations_do_not_overflow() {
        assert_eq!(round(5_000_000_000_000_000_000, 15), 4_999_999_999_999_999_995);
        assert_eq!(round(-5_000_000_000_000_000_000, 15), -4_999_999_999_999_999_995);
        assert_eq!(round(i64::MAX, 60), i64::MAX - 7);
        // rounding up would leave the i64 range
        assert_eq!(round(i64::MAX, 10), i64::MAX);
        assert_eq!(round(i64::MIN + 1, 10), i64::MIN + 1);
        assert_eq!(round(Duration::MAX_MINUTES + 7, 15), Duration::MAX_MINUTES + 5);
    }

    #[test]
    fn test_symmetric_for_negative_values() {
        for n in Rounding::ALLOWED {
            for minutes in 0..=200 {
                assert_eq!(round(-minutes, n), -round(minutes, n));
            }
        }
    }
}
