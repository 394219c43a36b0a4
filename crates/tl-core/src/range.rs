//! Closed and open time ranges.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::{Duration, Error, Time};

/// A closed interval between two times of the same workday.
///
/// There is no implicit wrap at midnight: a range ending after midnight must
/// use the past-24 hour convention (`22:00 - 25:00`, or `1:00>` in text).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Range {
    start: Time,
    end: Time,
}

impl Range {
    pub fn new(start: Time, end: Time) -> Result<Self, Error> {
        if end < start {
            return Err(Error::InvalidRange { start, end });
        }
        Ok(Self { start, end })
    }

    #[must_use]
    pub const fn start(self) -> Time {
        self.start
    }

    #[must_use]
    pub const fn end(self) -> Time {
        self.end
    }

    /// Length of the range; never negative.
    #[must_use]
    pub fn duration(self) -> Duration {
        self.end.since(self.start)
    }
}

impl fmt::Display for Range {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} - {}", self.start, self.end)
    }
}

impl FromStr for Range {
    type Err = Error;

    /// Parses `9:00 - 12:30` (spaces around the dash are optional).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (start, end) = s
            .split_once('-')
            .ok_or_else(|| Error::InvalidTime(s.to_string()))?;
        Self::new(start.trim().parse()?, end.trim().parse()?)
    }
}

canonical_string_conversions!(Range);

/// A range that has started but not ended yet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct OpenRange {
    start: Time,
}

impl OpenRange {
    #[must_use]
    pub const fn new(start: Time) -> Self {
        Self { start }
    }

    #[must_use]
    pub const fn start(self) -> Time {
        self.start
    }

    /// Closes the range at `end`.
    pub fn close(self, end: Time) -> Result<Range, Error> {
        Range::new(self.start, end)
    }

    /// Duration from the start until `now`.
    ///
    /// Fails with [`Error::InvalidRange`] if `now` precedes the start; the
    /// caller is responsible for passing the `now` that belongs to the record's
    /// day.
    pub fn duration(self, now: Time) -> Result<Duration, Error> {
        self.close(now).map(Range::duration)
    }
}

impl fmt::Display for OpenRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} - ?", self.start)
    }
}

impl FromStr for OpenRange {
    type Err = Error;

    /// Parses `9:00 - ?` (any number of question marks).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (start, end) = s
            .split_once('-')
            .ok_or_else(|| Error::InvalidTime(s.to_string()))?;
        let end = end.trim();
        if end.is_empty() || !end.chars().all(|c| c == '?') {
            return Err(Error::InvalidTime(s.to_string()));
        }
        Ok(Self::new(start.trim().parse()?))
    }
}

canonical_string_conversions!(OpenRange);

#[cfg(test)]
mod tests {
    use super::*;

    fn time(h: u32, m: u32) -> Time {
        Time::new(h, m).unwrap()
    }

    fn range(start: (u32, u32), end: (u32, u32)) -> Range {
        Range::new(time(start.0, start.1), time(end.0, end.1)).unwrap()
    }

    // ========== Range Tests ==========

    #[test]
    fn test_duration_is_end_minus_start() {
        assert_eq!(range((9, 7), (12, 59)).duration(), Duration::new(3, 52));
        assert_eq!(range((13, 49), (17, 12)).duration(), Duration::new(3, 23));
        assert_eq!(range((8, 0), (8, 0)).duration(), Duration::ZERO);
    }

    #[test]
    fn test_crossing_midnight_uses_hour_convention() {
        assert_eq!(range((22, 0), (25, 30)).duration(), Duration::new(3, 30));
    }

    #[test]
    fn test_rejects_end_before_start() {
        let err = Range::new(time(22, 0), time(1, 0)).unwrap_err();
        assert_eq!(
            err,
            Error::InvalidRange {
                start: time(22, 0),
                end: time(1, 0)
            }
        );
        assert!(Range::new(time(9, 1), time(9, 0)).is_err());
    }

    #[test]
    fn test_duration_is_never_negative() {
        for start in (0..48 * 60).step_by(37) {
            for end in (0..48 * 60).step_by(41) {
                let (Some(s), Some(e)) = (Time::from_minutes(start), Time::from_minutes(end)) else {
                    continue;
                };
                match Range::new(s, e) {
                    Ok(r) => assert!(!r.duration().is_negative()),
                    Err(err) => {
                        assert!(end < start);
                        assert_eq!(err.code().as_str(), "invalid_range");
                    }
                }
            }
        }
    }

    #[test]
    fn test_range_text_round_trip() {
        let r = range((9, 0), (12, 30));
        assert_eq!(r.to_string(), "09:00 - 12:30");
        assert_eq!("9:00-12:30".parse::<Range>().unwrap(), r);
        assert_eq!("09:00 - 12:30".parse::<Range>().unwrap(), r);
        assert_eq!("23:00 - 1:00>".parse::<Range>().unwrap(), range((23, 0), (25, 0)));
        assert!("12:00 - 9:00".parse::<Range>().is_err());
        assert!("12:00".parse::<Range>().is_err());
    }

    // ========== OpenRange Tests ==========

    #[test]
    fn test_open_range_duration_until_now() {
        let open = OpenRange::new(time(9, 0));
        assert_eq!(open.duration(time(11, 45)).unwrap(), Duration::new(2, 45));
        assert_eq!(open.duration(time(9, 0)).unwrap(), Duration::ZERO);
        assert!(open.duration(time(8, 59)).is_err());
    }

    #[test]
    fn test_open_range_closes_into_range() {
        let open = OpenRange::new(time(9, 0));
        assert_eq!(open.close(time(10, 0)).unwrap(), range((9, 0), (10, 0)));
    }

    #[test]
    fn test_open_range_text_round_trip() {
        let open = OpenRange::new(time(8, 15));
        assert_eq!(open.to_string(), "08:15 - ?");
        assert_eq!("8:15 - ?".parse::<OpenRange>().unwrap(), open);
        assert_eq!("8:15-???".parse::<OpenRange>().unwrap(), open);
        assert!("8:15 - 9:00".parse::<OpenRange>().is_err());
        assert!("8:15 -".parse::<OpenRange>().is_err());
    }

    #[test]
    fn test_serde_uses_canonical_string() {
        let json = serde_json::to_string(&range((9, 0), (10, 0))).unwrap();
        assert_eq!(json, "\"09:00 - 10:00\"");
        assert!(serde_json::from_str::<Range>("\"10:00 - 09:00\"").is_err());
        let open: OpenRange = serde_json::from_str("\"07:30 - ?\"").unwrap();
        assert_eq!(open.start(), time(7, 30));
    }
}
