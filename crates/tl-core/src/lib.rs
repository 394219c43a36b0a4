//! Core domain logic for the `tl` time tracker.
//!
//! This crate contains the fundamental types and logic for:
//! - Temporal values: dates, workday times, signed durations and ranges
//! - Records: one date's entries with an optional target and rounding
//! - Evaluation: totals, should-totals, differences and projected end times
//! - Queries: filtering, sorting and tag-based grouping of records
//! - Diagnostics: exact locations for rejected textual input
//! - Warnings: records that read fine but are probably mistakes
//!
//! Everything here is synchronous and pure. "Now" is always passed in.

/// Implements the `String` conversions behind
/// `#[serde(try_from = "String", into = "String")]` for a value type with a
/// canonical text form, so deserialization goes through `FromStr` validation.
macro_rules! canonical_string_conversions {
    ($name:ident) => {
        impl TryFrom<String> for $name {
            type Error = crate::Error;

            fn try_from(value: String) -> Result<Self, Self::Error> {
                value.parse()
            }
        }

        impl From<$name> for String {
            fn from(value: $name) -> Self {
                value.to_string()
            }
        }
    };
}

mod date;
pub mod diagnostic;
mod duration;
mod error;
pub mod eval;
pub mod query;
mod range;
pub mod record;
mod rounding;
pub mod tag;
mod time;
pub mod warning;

pub use date::Date;
pub use diagnostic::{Diagnostic, DiagnosticCode};
pub use duration::Duration;
pub use error::Error;
pub use eval::{NoClock, Now, NowResolver};
pub use query::{EntryRef, Query, Selection};
pub use range::{OpenRange, Range};
pub use record::{Comparison, Entry, EntryKind, Record, ShouldTotal};
pub use rounding::Rounding;
pub use tag::Tag;
pub use time::Time;
pub use warning::{Warning, WarningKind};
