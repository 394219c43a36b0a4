//! Checks for records that read fine but are probably mistakes.

use std::fmt;

use crate::eval::{self, Now};
use crate::{Date, Duration, Record};

/// What is suspicious about a record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum WarningKind {
    /// An open range was never closed on a day that is over.
    UnclosedOpenRange,
    /// The record is dated after today.
    FutureRecord,
    /// The entries add up to more than a day.
    MoreThan24Hours,
}

impl WarningKind {
    #[must_use]
    pub const fn message(self) -> &'static str {
        match self {
            Self::UnclosedOpenRange => "unclosed open range",
            Self::FutureRecord => "record is dated in the future",
            Self::MoreThan24Hours => "total time exceeds 24h",
        }
    }
}

/// A suspicious record, identified by its date.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Warning {
    date: Date,
    kind: WarningKind,
}

impl Warning {
    #[must_use]
    pub const fn date(self) -> Date {
        self.date
    }

    #[must_use]
    pub const fn kind(self) -> WarningKind {
        self.kind
    }
}

impl fmt::Display for Warning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.date, self.kind.message())
    }
}

const ONE_DAY: Duration = Duration::new(24, 0);

/// Every warning for `records` as of `now`, ordered by date.
///
/// The total of a record with an open range on a past day cannot be
/// evaluated, so such a record is reported as unclosed and never as too long.
pub fn warnings<'a>(records: impl IntoIterator<Item = &'a Record>, now: Now) -> Vec<Warning> {
    let today = now.date();
    let mut found = Vec::new();
    for record in records {
        let date = record.date();
        let mut warn = |kind| found.push(Warning { date, kind });
        if date < today && record.open_ranges().next().is_some() {
            warn(WarningKind::UnclosedOpenRange);
        }
        if date > today {
            warn(WarningKind::FutureRecord);
        }
        if eval::total(record, &now).is_ok_and(|total| total > ONE_DAY) {
            warn(WarningKind::MoreThan24Hours);
        }
    }
    found.sort();
    tracing::debug!(warnings = found.len(), "checked records");
    found
}
