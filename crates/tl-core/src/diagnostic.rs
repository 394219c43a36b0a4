//! Located errors for rejected textual input.

use std::fmt;
use std::ops::Range;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::Error;

/// Stable identifiers for every kind of rejected input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DiagnosticCode {
    InvalidDate,
    InvalidTime,
    InvalidDuration,
    InvalidRange,
    InvalidRounding,
    InvalidShouldTotal,
    InvalidTag,
    OpenRangeInNonTodayRecord,
    MalformedEntry,
    IllegalIndentation,
    UnrecognisedText,
    DuplicateOpenRange,
}

impl DiagnosticCode {
    /// The identifier as it appears in output.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::InvalidDate => "invalid_date",
            Self::InvalidTime => "invalid_time",
            Self::InvalidDuration => "invalid_duration",
            Self::InvalidRange => "invalid_range",
            Self::InvalidRounding => "invalid_rounding",
            Self::InvalidShouldTotal => "invalid_should_total",
            Self::InvalidTag => "invalid_tag",
            Self::OpenRangeInNonTodayRecord => "open_range_in_non_today_record",
            Self::MalformedEntry => "malformed_entry",
            Self::IllegalIndentation => "illegal_indentation",
            Self::UnrecognisedText => "unrecognised_text",
            Self::DuplicateOpenRange => "duplicate_open_range",
        }
    }

    const ALL: [Self; 12] = [
        Self::InvalidDate,
        Self::InvalidTime,
        Self::InvalidDuration,
        Self::InvalidRange,
        Self::InvalidRounding,
        Self::InvalidShouldTotal,
        Self::InvalidTag,
        Self::OpenRangeInNonTodayRecord,
        Self::MalformedEntry,
        Self::IllegalIndentation,
        Self::UnrecognisedText,
        Self::DuplicateOpenRange,
    ];
}

impl fmt::Display for DiagnosticCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Returned when parsing an unknown diagnostic code.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown diagnostic code: {0}")]
pub struct UnknownDiagnosticCode(pub String);

impl FromStr for DiagnosticCode {
    type Err = UnknownDiagnosticCode;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|code| code.as_str() == s)
            .ok_or_else(|| UnknownDiagnosticCode(s.to_string()))
    }
}

/// A rejected piece of text and exactly where it is.
///
/// `line` is 1-based; `position` is the 0-based character offset of the
/// offending span within that line, and `length` its width in characters.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
#[error("line {line}, position {position}: {message}")]
pub struct Diagnostic {
    code: DiagnosticCode,
    line: usize,
    position: usize,
    length: usize,
    message: String,
}

impl Diagnostic {
    pub fn new(
        code: DiagnosticCode,
        line: usize,
        position: usize,
        length: usize,
        message: impl Into<String>,
    ) -> Self {
        Self {
            code,
            line,
            position,
            length,
            message: message.into(),
        }
    }

    /// Locates a value error at the given span.
    pub fn from_error(error: &Error, line: usize, position: usize, length: usize) -> Self {
        Self::new(error.code(), line, position, length, error.to_string())
    }

    #[must_use]
    pub const fn code(&self) -> DiagnosticCode {
        self.code
    }

    #[must_use]
    pub const fn line(&self) -> usize {
        self.line
    }

    #[must_use]
    pub const fn position(&self) -> usize {
        self.position
    }

    #[must_use]
    pub const fn length(&self) -> usize {
        self.length
    }

    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Character offsets covered within the line.
    #[must_use]
    pub const fn span(&self) -> Range<usize> {
        self.position..self.position + self.length
    }
}
