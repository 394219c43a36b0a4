//! Records, their entries and their targets.

use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::tag::{Tag, tags_in};
use crate::{Date, Duration, Error, OpenRange, Range, Rounding};

/// How an evaluated total is compared against its target.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Comparison {
    /// The total should match the target.
    #[default]
    Exact,
    /// The total should reach at least the target.
    AtLeast,
    /// The total should not exceed the target.
    AtMost,
}

impl Comparison {
    /// Text prefix used in should-total literals.
    #[must_use]
    pub const fn prefix(self) -> &'static str {
        match self {
            Self::Exact => "",
            Self::AtLeast => ">=",
            Self::AtMost => "<=",
        }
    }

    /// Combines two modes conservatively: at-least wins over everything, then
    /// at-most, then exact.
    #[must_use]
    pub const fn combine(self, other: Self) -> Self {
        match (self, other) {
            (Self::AtLeast, _) | (_, Self::AtLeast) => Self::AtLeast,
            (Self::AtMost, _) | (_, Self::AtMost) => Self::AtMost,
            (Self::Exact, Self::Exact) => Self::Exact,
        }
    }
}

/// The target duration a record is expected to meet.
///
/// Text form: `8h30m!` (exact), `>=8h!` (at least), `<=6h!` (at most).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ShouldTotal {
    target: Duration,
    comparison: Comparison,
}

impl ShouldTotal {
    /// An exact target of zero, the neutral element of summation.
    pub const NONE: Self = Self {
        target: Duration::ZERO,
        comparison: Comparison::Exact,
    };

    /// Creates a target; negative durations are rejected.
    pub fn new(target: Duration, comparison: Comparison) -> Result<Self, Error> {
        if target.is_negative() {
            return Err(Error::InvalidShouldTotal(target.to_string()));
        }
        Ok(Self { target, comparison })
    }

    #[must_use]
    pub const fn target(self) -> Duration {
        self.target
    }

    #[must_use]
    pub const fn comparison(self) -> Comparison {
        self.comparison
    }

    /// Whether `total` satisfies this target under its comparison mode.
    #[must_use]
    pub fn is_met_by(self, total: Duration) -> bool {
        match self.comparison {
            Comparison::Exact => total == self.target,
            Comparison::AtLeast => total >= self.target,
            Comparison::AtMost => total <= self.target,
        }
    }

    /// Adds another target, combining comparison modes conservatively.
    #[must_use]
    pub fn plus(self, other: Self) -> Self {
        Self {
            target: self.target + other.target,
            comparison: self.comparison.combine(other.comparison),
        }
    }
}

impl fmt::Display for ShouldTotal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}!", self.comparison.prefix(), self.target)
    }
}

impl FromStr for ShouldTotal {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || Error::InvalidShouldTotal(s.to_string());
        let body = s.strip_suffix('!').ok_or_else(invalid)?;
        let (comparison, duration) = if let Some(rest) = body.strip_prefix(">=") {
            (Comparison::AtLeast, rest)
        } else if let Some(rest) = body.strip_prefix("<=") {
            (Comparison::AtMost, rest)
        } else {
            (Comparison::Exact, body)
        };
        let target: Duration = duration.parse().map_err(|_| invalid())?;
        Self::new(target, comparison).map_err(|_| invalid())
    }
}

canonical_string_conversions!(ShouldTotal);

/// What an entry measures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum EntryKind {
    Duration(Duration),
    Range(Range),
    OpenRange(OpenRange),
}

impl From<Duration> for EntryKind {
    fn from(duration: Duration) -> Self {
        Self::Duration(duration)
    }
}

impl From<Range> for EntryKind {
    fn from(range: Range) -> Self {
        Self::Range(range)
    }
}

impl From<OpenRange> for EntryKind {
    fn from(open: OpenRange) -> Self {
        Self::OpenRange(open)
    }
}

impl fmt::Display for EntryKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Duration(d) => d.fmt(f),
            Self::Range(r) => r.fmt(f),
            Self::OpenRange(o) => o.fmt(f),
        }
    }
}

/// One line item of a record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Entry {
    #[serde(flatten)]
    kind: EntryKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    summary: Option<String>,
}

impl Entry {
    pub fn new(kind: impl Into<EntryKind>, summary: Option<String>) -> Self {
        Self {
            kind: kind.into(),
            summary: summary.filter(|s| !s.is_empty()),
        }
    }

    #[must_use]
    pub const fn kind(&self) -> &EntryKind {
        &self.kind
    }

    #[must_use]
    pub fn summary(&self) -> Option<&str> {
        self.summary.as_deref()
    }

    /// Tags mentioned in this entry's own summary.
    #[must_use]
    pub fn tags(&self) -> BTreeSet<Tag> {
        self.summary.as_deref().map(tags_in).unwrap_or_default()
    }
}

/// All time-tracking data for one calendar date.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Record {
    date: Date,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    summary: Option<String>,
    #[serde(default)]
    entries: Vec<Entry>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    should_total: Option<ShouldTotal>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    rounding: Option<Rounding>,
}

impl Record {
    #[must_use]
    pub const fn new(date: Date) -> Self {
        Self {
            date,
            summary: None,
            entries: Vec::new(),
            should_total: None,
            rounding: None,
        }
    }

    #[must_use]
    pub fn with_summary(mut self, summary: impl Into<String>) -> Self {
        self.summary = Some(summary.into()).filter(|s| !s.is_empty());
        self
    }

    #[must_use]
    pub const fn with_should_total(mut self, should_total: ShouldTotal) -> Self {
        self.should_total = Some(should_total);
        self
    }

    #[must_use]
    pub const fn with_rounding(mut self, rounding: Rounding) -> Self {
        self.rounding = Some(rounding);
        self
    }

    #[must_use]
    pub fn with_entry(mut self, entry: Entry) -> Self {
        self.entries.push(entry);
        self
    }

    pub fn add_entry(&mut self, entry: Entry) {
        self.entries.push(entry);
    }

    pub fn add_duration(&mut self, duration: Duration) {
        self.add_entry(Entry::new(duration, None));
    }

    pub fn add_range(&mut self, range: Range) {
        self.add_entry(Entry::new(range, None));
    }

    pub fn add_open_range(&mut self, open: OpenRange) {
        self.add_entry(Entry::new(open, None));
    }

    #[must_use]
    pub const fn date(&self) -> Date {
        self.date
    }

    #[must_use]
    pub fn summary(&self) -> Option<&str> {
        self.summary.as_deref()
    }

    #[must_use]
    pub fn entries(&self) -> &[Entry] {
        &self.entries
    }

    #[must_use]
    pub const fn should_total(&self) -> Option<ShouldTotal> {
        self.should_total
    }

    #[must_use]
    pub const fn rounding(&self) -> Option<Rounding> {
        self.rounding
    }

    /// Tags mentioned in the record summary; these apply to every entry.
    #[must_use]
    pub fn tags(&self) -> BTreeSet<Tag> {
        self.summary.as_deref().map(tags_in).unwrap_or_default()
    }

    /// The open ranges of this record, in entry order.
    pub fn open_ranges(&self) -> impl Iterator<Item = OpenRange> + '_ {
        self.entries.iter().filter_map(|e| match e.kind {
            EntryKind::OpenRange(o) => Some(o),
            EntryKind::Duration(_) | EntryKind::Range(_) => None,
        })
    }
}
