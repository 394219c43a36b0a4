//! Error taxonomy shared by value construction and evaluation.

use thiserror::Error;

use crate::date::Date;
use crate::diagnostic::DiagnosticCode;
use crate::time::Time;

/// Errors raised when a value cannot be constructed or evaluated.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum Error {
    /// The day or month is out of range for the given year.
    #[error("invalid date: {0}")]
    InvalidDate(String),

    /// Hour or minute outside the representable window.
    #[error("invalid time: {0}")]
    InvalidTime(String),

    /// Malformed duration literal.
    #[error("invalid duration: {0}")]
    InvalidDuration(String),

    /// The end of a range precedes its start.
    #[error("invalid range: {end} is before {start}")]
    InvalidRange { start: Time, end: Time },

    /// Rounding granularity is not one of 5, 10, 15, 30 or 60 minutes.
    #[error("invalid rounding: {0} (allowed: 5m, 10m, 15m, 30m, 60m)")]
    InvalidRounding(String),

    /// Malformed should-total literal.
    #[error("invalid should-total: {0}")]
    InvalidShouldTotal(String),

    /// Malformed tag literal.
    #[error("invalid tag: {0}")]
    InvalidTag(String),

    /// An open range was found on a record that is not dated today.
    #[error("open range in record {date} cannot be evaluated, because it is not today")]
    OpenRangeInNonTodayRecord { date: Date },
}

impl Error {
    /// The stable diagnostic code for this error.
    #[must_use]
    pub const fn code(&self) -> DiagnosticCode {
        match self {
            Self::InvalidDate(_) => DiagnosticCode::InvalidDate,
            Self::InvalidTime(_) => DiagnosticCode::InvalidTime,
            Self::InvalidDuration(_) => DiagnosticCode::InvalidDuration,
            Self::InvalidRange { .. } => DiagnosticCode::InvalidRange,
            Self::InvalidRounding(_) => DiagnosticCode::InvalidRounding,
            Self::InvalidShouldTotal(_) => DiagnosticCode::InvalidShouldTotal,
            Self::InvalidTag(_) => DiagnosticCode::InvalidTag,
            Self::OpenRangeInNonTodayRecord { .. } => DiagnosticCode::OpenRangeInNonTodayRecord,
        }
    }
}
