//! Evaluation of records into totals, targets, differences and projections.
//!
//! "Now" is never read from a clock here. Every function that needs it takes
//! it as an argument, either as a [`Now`] or through a [`NowResolver`].
//!
//! # Rounding
//!
//! A record with a rounding policy has every resolved open range and its final
//! total rounded to the policy's granularity (see [`crate::Rounding::round`]).

use chrono::NaiveDateTime;

use crate::query::EntryRef;
use crate::record::{Entry, EntryKind, Record, ShouldTotal};
use crate::{Date, Duration, Error, Time};

/// A point in time: the calendar date and the clock time on it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Now {
    date: Date,
    time: Time,
}

impl Now {
    #[must_use]
    pub const fn new(date: Date, time: Time) -> Self {
        Self { date, time }
    }

    #[must_use]
    pub const fn date(self) -> Date {
        self.date
    }

    #[must_use]
    pub const fn time(self) -> Time {
        self.time
    }
}

impl From<NaiveDateTime> for Now {
    fn from(datetime: NaiveDateTime) -> Self {
        Self::new(datetime.date().into(), datetime.time().into())
    }
}

/// Supplies the current time for a record's date, if there is one.
pub trait NowResolver {
    /// The time to close open ranges with on `date`, or `None` if open ranges
    /// on that date cannot be resolved.
    fn resolve(&self, date: Date) -> Option<Time>;
}

/// Resolves only for today.
impl NowResolver for Now {
    fn resolve(&self, date: Date) -> Option<Time> {
        (date == self.date).then_some(self.time)
    }
}

/// Resolves nothing; any open range makes evaluation fail.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoClock;

impl NowResolver for NoClock {
    fn resolve(&self, _date: Date) -> Option<Time> {
        None
    }
}

impl<R: NowResolver + ?Sized> NowResolver for &R {
    fn resolve(&self, date: Date) -> Option<Time> {
        (**self).resolve(date)
    }
}

/// Duration of a single entry of `record`, without final record rounding.
pub fn entry_duration(
    record: &Record,
    entry: &Entry,
    now: &impl NowResolver,
) -> Result<Duration, Error> {
    match entry.kind() {
        EntryKind::Duration(d) => Ok(*d),
        EntryKind::Range(r) => Ok(r.duration()),
        EntryKind::OpenRange(open) => {
            let date = record.date();
            let time = now
                .resolve(date)
                .ok_or(Error::OpenRangeInNonTodayRecord { date })?;
            let duration = open.duration(time)?;
            tracing::trace!(%date, start = %open.start(), %time, %duration, "resolved open range");
            Ok(round_for(record, duration))
        }
    }
}

/// Sum of all entries of `record`.
///
/// Open ranges are closed at the time `now` resolves for the record's date;
/// if it resolves none, the result is [`Error::OpenRangeInNonTodayRecord`].
pub fn total(record: &Record, now: &impl NowResolver) -> Result<Duration, Error> {
    let sum = record
        .entries()
        .iter()
        .map(|e| entry_duration(record, e, now))
        .sum::<Result<Duration, Error>>()?;
    Ok(round_for(record, sum))
}

/// Sum of [`total`] over several records.
pub fn total_sum<'a>(
    records: impl IntoIterator<Item = &'a Record>,
    now: &impl NowResolver,
) -> Result<Duration, Error> {
    records.into_iter().map(|r| total(r, now)).sum()
}

/// Total assuming every open range is still running at `now`.
///
/// The record dated the day before `now` sees `now` past 24:00, so a range
/// started yesterday evening keeps counting after midnight. Records of any
/// other date take `now`'s clock time as is. An open range that would end
/// before it starts contributes nothing.
pub fn hypothetical_total(record: &Record, now: Now) -> Duration {
    let until = running_until(record.date(), now);
    let sum = record
        .entries()
        .iter()
        .map(|entry| match entry.kind() {
            EntryKind::Duration(d) => *d,
            EntryKind::Range(r) => r.duration(),
            EntryKind::OpenRange(open) => match until.map(|t| open.duration(t)) {
                Some(Ok(duration)) => round_for(record, duration),
                Some(Err(_)) | None => {
                    tracing::debug!(date = %record.date(), start = %open.start(), "open range not counted");
                    Duration::ZERO
                }
            },
        })
        .sum();
    round_for(record, sum)
}

/// Sum of [`hypothetical_total`] over several records.
pub fn hypothetical_total_sum<'a>(
    records: impl IntoIterator<Item = &'a Record>,
    now: Now,
) -> Duration {
    records
        .into_iter()
        .map(|r| hypothetical_total(r, now))
        .sum()
}

fn running_until(date: Date, now: Now) -> Option<Time> {
    if now.date().plus_days(-1) == Some(date) {
        now.time().checked_add(Duration::new(24, 0))
    } else {
        Some(now.time())
    }
}

/// The record's target, if it has one.
pub const fn should_total(record: &Record) -> Option<ShouldTotal> {
    record.should_total()
}

/// Sum of all targets; records without one contribute nothing.
///
/// If any record demands "at least", so does the sum; otherwise any "at
/// most" makes the sum "at most".
pub fn should_total_sum<'a>(records: impl IntoIterator<Item = &'a Record>) -> ShouldTotal {
    records
        .into_iter()
        .filter_map(Record::should_total)
        .fold(ShouldTotal::NONE, ShouldTotal::plus)
}

/// Actual minus target.
#[must_use]
pub fn diff(total: Duration, should: ShouldTotal) -> Duration {
    total - should.target()
}

/// Clock time at which `should` is reached, given `total` so far at `now`.
///
/// Returns `None` (indeterminate) when the projection falls outside the
/// `00:00`-`47:59` window.
#[must_use]
pub fn eta(now: Time, total: Duration, should: ShouldTotal) -> Option<Time> {
    now.checked_add(should.target() - total)
}

/// Sum of individual entries, evaluated as [`total`] evaluates whole records.
///
/// Consecutive entries of the same record are summed and rounded together
/// with that record's policy, so the entries of one full record add up to
/// exactly its [`total`].
pub fn total_entries<'a>(
    entries: impl IntoIterator<Item = EntryRef<'a>>,
    now: &impl NowResolver,
) -> Result<Duration, Error> {
    let mut sum = Duration::ZERO;
    let mut group: Option<(&Record, Duration)> = None;
    for item in entries {
        let d = entry_duration(item.record, item.entry, now)?;
        group = match group {
            Some((record, subtotal)) if std::ptr::eq(record, item.record) => {
                Some((record, subtotal + d))
            }
            Some((record, subtotal)) => {
                sum = sum.plus(round_for(record, subtotal));
                Some((item.record, d))
            }
            None => Some((item.record, d)),
        };
    }
    if let Some((record, subtotal)) = group {
        sum = sum.plus(round_for(record, subtotal));
    }
    Ok(sum)
}

fn round_for(record: &Record, duration: Duration) -> Duration {
    record
        .rounding()
        .map_or(duration, |rounding| rounding.round(duration))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::query::entries_of;
    use crate::{OpenRange, Range, Rounding};

    fn date(y: i32, m: u32, d: u32) -> Date {
        Date::new(y, m, d).unwrap()
    }

    fn time(h: u32, m: u32) -> Time {
        Time::new(h, m).unwrap()
    }

    fn range(s: (u32, u32), e: (u32, u32)) -> Range {
        Range::new(time(s.0, s.1), time(e.0, e.1)).unwrap()
    }

    fn should(s: &str) -> ShouldTotal {
        s.parse().unwrap()
    }

    fn today() -> Now {
        Now::new(date(2020, 1, 1), time(15, 0))
    }

    // ========== Total Tests ==========

    #[test]
    fn test_sums_up_durations() {
        let mut r = Record::new(date(2020, 1, 1));
        r.add_duration(Duration::new(1, 0));
        r.add_duration(Duration::new(2, 0));
        assert_eq!(total(&r, &NoClock).unwrap(), Duration::new(3, 0));
    }

    #[test]
    fn test_sums_up_zero_if_no_entries() {
        let r = Record::new(date(2020, 1, 1));
        assert_eq!(total(&r, &NoClock).unwrap(), Duration::ZERO);
    }

    #[test]
    fn test_sums_up_ranges() {
        let mut r = Record::new(date(2020, 1, 1));
        r.add_range(range((9, 7), (12, 59)));
        r.add_range(range((13, 49), (17, 12)));
        assert_eq!(total(&r, &NoClock).unwrap(), Duration::new(7, 15));
    }

    #[test]
    fn test_sums_up_durations_and_ranges() {
        let mut r = Record::new(date(2020, 1, 1));
        r.add_duration(Duration::new(1, 33));
        r.add_range(range((8, 0), (12, 0)));
        assert_eq!(total(&r, &NoClock).unwrap(), Duration::new(5, 33));
    }

    #[test]
    fn test_negative_durations_reduce_total() {
        let mut r = Record::new(date(2020, 1, 1));
        r.add_range(range((8, 0), (12, 0)));
        r.add_duration(Duration::from_minutes(-30));
        assert_eq!(total(&r, &NoClock).unwrap(), Duration::new(3, 30));
    }

    #[test]
    fn test_duration_sum_is_order_independent() {
        let durations = [45, -10, 120, 0, 7].map(Duration::from_minutes);
        let mut forward = Record::new(date(2020, 1, 1));
        let mut backward = Record::new(date(2020, 1, 1));
        for d in durations {
            forward.add_duration(d);
        }
        for d in durations.iter().rev() {
            backward.add_duration(*d);
        }
        let expected: Duration = durations.into_iter().sum();
        assert_eq!(total(&forward, &NoClock).unwrap(), expected);
        assert_eq!(total(&backward, &NoClock).unwrap(), expected);
    }

    #[test]
    fn test_open_range_today_runs_until_now() {
        let mut r = Record::new(date(2020, 1, 1));
        r.add_range(range((8, 0), (12, 0)));
        r.add_open_range(OpenRange::new(time(13, 0)));
        assert_eq!(total(&r, &today()).unwrap(), Duration::new(6, 0));
    }

    #[test]
    fn test_open_range_on_other_day_is_an_error() {
        let mut r = Record::new(date(2019, 12, 31));
        r.add_open_range(OpenRange::new(time(13, 0)));
        assert_eq!(
            total(&r, &today()),
            Err(Error::OpenRangeInNonTodayRecord {
                date: date(2019, 12, 31)
            })
        );
        assert!(total(&r, &NoClock).is_err());
    }

    #[test]
    fn test_open_range_starting_after_now_is_invalid() {
        let mut r = Record::new(date(2020, 1, 1));
        r.add_open_range(OpenRange::new(time(16, 0)));
        assert!(matches!(
            total(&r, &today()),
            Err(Error::InvalidRange { .. })
        ));
    }

    #[test]
    fn test_rounding_applies_to_open_range_and_total() {
        let mut r = Record::new(date(2020, 1, 1)).with_rounding(Rounding::new(15).unwrap());
        r.add_duration(Duration::from_minutes(7));
        r.add_open_range(OpenRange::new(time(14, 52)));
        // open range: 8m -> 15m; sum 22m -> 15m
        assert_eq!(total(&r, &today()).unwrap(), Duration::from_minutes(15));

        let mut r = Record::new(date(2020, 1, 1)).with_rounding(Rounding::new(30).unwrap());
        r.add_duration(Duration::new(7, 45));
        assert_eq!(total(&r, &NoClock).unwrap(), Duration::new(8, 0));
    }

    #[test]
    fn test_total_sum_adds_records() {
        let mut a = Record::new(date(2020, 1, 1));
        a.add_duration(Duration::new(1, 0));
        let mut b = Record::new(date(2020, 1, 2));
        b.add_duration(Duration::new(2, 30));
        assert_eq!(total_sum([&a, &b], &NoClock).unwrap(), Duration::new(3, 30));
        assert_eq!(total_sum([], &NoClock).unwrap(), Duration::ZERO);
    }

    // ========== Hypothetical Total Tests ==========

    #[test]
    fn test_hypothetical_total_today() {
        let mut r = Record::new(date(2020, 1, 1));
        r.add_duration(Duration::new(1, 0));
        r.add_open_range(OpenRange::new(time(14, 0)));
        assert_eq!(hypothetical_total(&r, today()), Duration::new(2, 0));
    }

    #[test]
    fn test_hypothetical_total_yesterday_continues_past_midnight() {
        let mut r = Record::new(date(2019, 12, 31));
        r.add_open_range(OpenRange::new(time(22, 0)));
        let now = Now::new(date(2020, 1, 1), time(1, 30));
        assert_eq!(hypothetical_total(&r, now), Duration::new(3, 30));
    }

    #[test]
    fn test_hypothetical_total_ignores_date_otherwise() {
        let mut r = Record::new(date(2019, 6, 1));
        r.add_open_range(OpenRange::new(time(9, 0)));
        assert_eq!(hypothetical_total(&r, today()), Duration::new(6, 0));
    }

    #[test]
    fn test_hypothetical_total_skips_open_range_in_future() {
        let mut r = Record::new(date(2020, 1, 1));
        r.add_duration(Duration::new(1, 0));
        r.add_open_range(OpenRange::new(time(18, 0)));
        assert_eq!(hypothetical_total(&r, today()), Duration::new(1, 0));
    }

    #[test]
    fn test_hypothetical_total_sum_over_records() {
        let mut a = Record::new(date(2019, 12, 31));
        a.add_duration(Duration::new(8, 0));
        let mut b = Record::new(date(2020, 1, 1));
        b.add_open_range(OpenRange::new(time(9, 0)));
        assert_eq!(hypothetical_total_sum([&a, &b], today()), Duration::new(14, 0));
    }

    // ========== Should Total Tests ==========

    #[test]
    fn test_should_total_of_record() {
        let r = Record::new(date(2020, 1, 1)).with_should_total(should("8h!"));
        assert_eq!(should_total(&r), Some(should("8h!")));
        assert_eq!(should_total(&Record::new(date(2020, 1, 1))), None);
    }

    #[test]
    fn test_should_total_sum_combines_modes() {
        let a = Record::new(date(2020, 1, 1)).with_should_total(should("8h!"));
        let b = Record::new(date(2020, 1, 2)).with_should_total(should(">=6h!"));
        let c = Record::new(date(2020, 1, 3));
        let d = Record::new(date(2020, 1, 4)).with_should_total(should("<=2h!"));
        assert_eq!(should_total_sum([&a, &c]), should("8h!"));
        assert_eq!(should_total_sum([&a, &b, &c]), should(">=14h!"));
        assert_eq!(should_total_sum([&a, &d]), should("<=10h!"));
        assert_eq!(should_total_sum([&d, &b]), should(">=8h!"));
        assert_eq!(should_total_sum([]), ShouldTotal::NONE);
    }

    // ========== Diff / ETA Tests ==========

    #[test]
    fn test_diff_against_exact_should_total() {
        let d = diff(Duration::new(8, 0), should("8h30m!"));
        assert_eq!(d, Duration::from_minutes(-30));
        assert_eq!(d.to_string_with_sign(), "-30m");
        assert_eq!(
            diff(Duration::new(9, 15), should("8h!")).to_string_with_sign(),
            "+1h15m"
        );
    }

    #[test]
    fn test_eta_projects_remaining_time() {
        assert_eq!(
            eta(time(15, 0), Duration::new(5, 0), should("8h!")),
            Some(time(18, 0))
        );
        // already over target: ETA lies in the past
        assert_eq!(
            eta(time(15, 0), Duration::new(9, 0), should("8h!")),
            Some(time(14, 0))
        );
        assert_eq!(
            eta(time(23, 0), Duration::ZERO, should("8h!")),
            Some(time(31, 0))
        );
    }

    #[test]
    fn test_eta_is_indeterminate_outside_window() {
        assert_eq!(eta(time(1, 0), Duration::new(10, 0), should("8h!")), None);
        assert_eq!(eta(time(23, 0), Duration::ZERO, should("25h!")), None);
    }

    // ========== Total Entries Tests ==========

    #[test]
    fn test_total_entries_matches_total_for_whole_record() {
        let mut r = Record::new(date(2020, 1, 1)).with_rounding(Rounding::new(15).unwrap());
        r.add_duration(Duration::from_minutes(7));
        r.add_duration(Duration::from_minutes(7));
        r.add_range(range((9, 0), (9, 9)));
        let whole = total(&r, &NoClock).unwrap();
        assert_eq!(total_entries(entries_of(&r), &NoClock).unwrap(), whole);
        assert_eq!(whole, Duration::from_minutes(30));
    }

    #[test]
    fn test_total_entries_across_records() {
        let mut a = Record::new(date(2020, 1, 1));
        a.add_duration(Duration::new(1, 0));
        let mut b = Record::new(date(2020, 1, 2));
        b.add_range(range((9, 0), (9, 30)));
        let entries = entries_of(&a).chain(entries_of(&b));
        assert_eq!(total_entries(entries, &NoClock).unwrap(), Duration::new(1, 30));
        assert_eq!(total_entries([], &NoClock).unwrap(), Duration::ZERO);
    }

    #[test]
    fn test_total_entries_propagates_open_range_error() {
        let mut r = Record::new(date(2019, 1, 1));
        r.add_open_range(OpenRange::new(time(9, 0)));
        assert!(total_entries(entries_of(&r), &today()).is_err());
    }

    #[test]
    fn test_now_from_chrono() {
        let dt = chrono::NaiveDate::from_ymd_opt(2020, 1, 1)
            .unwrap()
            .and_hms_opt(15, 0, 42)
            .unwrap();
        assert_eq!(Now::from(dt), today());
    }
}
