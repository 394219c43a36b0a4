//! Reader for the plaintext record format.
//!
//! A file is a sequence of records separated by blank lines:
//!
//! ```text
//! 2020-01-01 (8h30m!)
//! Release day #project
//!     1h33m prep #meeting
//!     08:00 - 12:00 coding
//!         continued summary
//!     13:00 - ?
//! ```
//!
//! The headline holds the date and an optional should-total. Unindented lines
//! before the first entry form the record summary. Indented lines are entries;
//! lines indented deeper than the entries continue the previous entry's summary.
//!
//! Every rejected record produces one [`Diagnostic`] pointing at the exact
//! characters at fault. A record is either read completely or rejected.

use std::sync::LazyLock;

use regex::Regex;
use tl_core::{
    Date, Diagnostic, DiagnosticCode, Duration, Entry, EntryKind, Error, OpenRange, Range, Record,
    Rounding, ShouldTotal, Time,
};

static RANGE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(?P<start>[^\s-]+)\s*-\s*(?P<end>\S+)").unwrap());

/// A range start with its dash but nothing after it.
static DANGLING_RANGE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[^\s-]*:[^\s-]*\s*-$").unwrap());

/// Values applied to records that do not specify them.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReadOptions {
    pub default_should_total: Option<ShouldTotal>,
    pub default_rounding: Option<Rounding>,
}

/// Reads all records from `text`.
///
/// Reading continues past rejected records so that every problem in the
/// text is reported at once; any diagnostic fails the whole read.
pub fn read(text: &str, options: &ReadOptions) -> Result<Vec<Record>, Vec<Diagnostic>> {
    let mut records = Vec::new();
    let mut diagnostics = Vec::new();
    for block in blocks(text) {
        let Some((headline, rest)) = block.split_first() else {
            continue;
        };
        match read_record(headline, rest, options) {
            Ok(record) => records.push(record),
            Err(diagnostic) => {
                tracing::warn!(
                    line = diagnostic.line(),
                    code = %diagnostic.code(),
                    "rejected record"
                );
                diagnostics.push(diagnostic);
            }
        }
    }
    if diagnostics.is_empty() {
        Ok(records)
    } else {
        Err(diagnostics)
    }
}

/// A source line with its 1-based number.
#[derive(Debug, Clone, Copy)]
struct Line<'a> {
    number: usize,
    text: &'a str,
}

impl Line<'_> {
    /// Character column of a byte offset.
    fn column(&self, byte: usize) -> usize {
        self.text[..byte].chars().count()
    }

    fn diagnostic(&self, error: &Error, start: usize, end: usize) -> Diagnostic {
        Diagnostic::from_error(
            error,
            self.number,
            self.column(start),
            self.text[start..end].chars().count(),
        )
    }

    fn located(&self, code: DiagnosticCode, start: usize, end: usize, message: &str) -> Diagnostic {
        Diagnostic::new(
            code,
            self.number,
            self.column(start),
            self.text[start..end].chars().count(),
            message,
        )
    }

    fn indentation(&self) -> &str {
        let body = self.text.trim_start();
        &self.text[..self.text.len() - body.len()]
    }
}

fn blocks(text: &str) -> Vec<Vec<Line<'_>>> {
    let mut blocks = Vec::new();
    let mut current = Vec::new();
    for (index, text) in text.lines().enumerate() {
        if text.trim().is_empty() {
            if !current.is_empty() {
                blocks.push(std::mem::take(&mut current));
            }
        } else {
            current.push(Line {
                number: index + 1,
                text: text.trim_end(),
            });
        }
    }
    if !current.is_empty() {
        blocks.push(current);
    }
    blocks
}

struct PendingEntry {
    kind: EntryKind,
    summary: Vec<String>,
}

fn read_record(
    headline: &Line<'_>,
    rest: &[Line<'_>],
    options: &ReadOptions,
) -> Result<Record, Diagnostic> {
    let (date, should_total) = read_headline(headline)?;

    let mut summary: Vec<&str> = Vec::new();
    let mut entries: Vec<PendingEntry> = Vec::new();
    let mut entry_indentation: Option<&str> = None;
    let mut open_range_seen = false;

    for line in rest {
        let indentation = line.indentation();
        if indentation.is_empty() {
            if entry_indentation.is_some() {
                return Err(line.located(
                    DiagnosticCode::IllegalIndentation,
                    0,
                    line.text.len(),
                    "record summary must precede the entries; entries must be indented",
                ));
            }
            summary.push(line.text);
            continue;
        }

        let expected = *entry_indentation.get_or_insert(indentation);
        if indentation == expected {
            let entry = read_entry(line, indentation.len(), &mut open_range_seen)?;
            entries.push(entry);
        } else if let Some(previous) = entries
            .last_mut()
            .filter(|_| indentation.starts_with(expected))
        {
            previous.summary.push(line.text.trim_start().to_string());
        } else {
            return Err(line.located(
                DiagnosticCode::IllegalIndentation,
                0,
                indentation.len(),
                "indentation does not match the record's entries",
            ));
        }
    }

    let mut record = Record::new(date).with_summary(summary.join("\n"));
    if let Some(should) = should_total.or(options.default_should_total) {
        record = record.with_should_total(should);
    }
    if let Some(rounding) = options.default_rounding {
        record = record.with_rounding(rounding);
    }
    for entry in entries {
        let summary = (!entry.summary.is_empty()).then(|| entry.summary.join("\n"));
        record.add_entry(Entry::new(entry.kind, summary));
    }
    Ok(record)
}

fn read_headline(line: &Line<'_>) -> Result<(Date, Option<ShouldTotal>), Diagnostic> {
    let text = line.text;
    let indentation = line.indentation();
    if !indentation.is_empty() {
        return Err(line.located(
            DiagnosticCode::IllegalIndentation,
            0,
            indentation.len(),
            "a record must start with an unindented date",
        ));
    }

    let date_end = text.find(char::is_whitespace).unwrap_or(text.len());
    let date: Date = text[..date_end]
        .parse()
        .map_err(|e| line.diagnostic(&e, 0, date_end))?;

    let rest_start = text.len() - text[date_end..].trim_start().len();
    let rest = &text[rest_start..];
    if rest.is_empty() {
        return Ok((date, None));
    }

    let Some(inner) = rest.strip_prefix('(') else {
        return Err(line.located(
            DiagnosticCode::UnrecognisedText,
            rest_start,
            text.len(),
            "unexpected text after the date",
        ));
    };
    let Some(close) = inner.find(')') else {
        return Err(line.located(
            DiagnosticCode::InvalidShouldTotal,
            rest_start,
            text.len(),
            "should-total is missing its closing parenthesis",
        ));
    };
    let content_start = rest_start + 1;
    let content_end = content_start + close;
    let should: ShouldTotal = text[content_start..content_end].parse().map_err(|e| {
        if content_start == content_end {
            line.diagnostic(&e, rest_start, content_end + 1)
        } else {
            line.diagnostic(&e, content_start, content_end)
        }
    })?;

    let trailing = &text[content_end + 1..];
    let trailing_start = text.len() - trailing.trim_start().len();
    if trailing_start < text.len() {
        return Err(line.located(
            DiagnosticCode::UnrecognisedText,
            trailing_start,
            text.len(),
            "unexpected text after the should-total",
        ));
    }
    Ok((date, Some(should)))
}

fn read_entry(
    line: &Line<'_>,
    body_start: usize,
    open_range_seen: &mut bool,
) -> Result<PendingEntry, Diagnostic> {
    let text = line.text;
    let body = &text[body_start..];

    let (kind, value_end) = match RANGE_RE.captures(body) {
        Some(caps) if caps["start"].contains(':') => {
            let start = caps.name("start").map_or(0..0, |m| m.range());
            let end = caps.name("end").map_or(0..0, |m| m.range());
            let at = |r: std::ops::Range<usize>| (body_start + r.start, body_start + r.end);
            let (start_from, start_to) = at(start);
            let (end_from, end_to) = at(end);

            let start_time: Time = text[start_from..start_to]
                .parse()
                .map_err(|e| line.diagnostic(&e, start_from, start_to))?;
            let end_text = &text[end_from..end_to];
            let kind = if end_text.chars().all(|c| c == '?') {
                if *open_range_seen {
                    return Err(line.located(
                        DiagnosticCode::DuplicateOpenRange,
                        start_from,
                        end_to,
                        "a record may contain only one open range",
                    ));
                }
                *open_range_seen = true;
                EntryKind::OpenRange(OpenRange::new(start_time))
            } else {
                let end_time: Time = end_text
                    .parse()
                    .map_err(|e| line.diagnostic(&e, end_from, end_to))?;
                let range = Range::new(start_time, end_time)
                    .map_err(|e| line.diagnostic(&e, start_from, end_to))?;
                EntryKind::Range(range)
            };
            (kind, end_to)
        }
        _ if DANGLING_RANGE_RE.is_match(body) => {
            return Err(line.located(
                DiagnosticCode::MalformedEntry,
                body_start,
                text.len(),
                "range is missing its end time (use `?` for an open range)",
            ));
        }
        _ => {
            let token_len = body.find(char::is_whitespace).unwrap_or(body.len());
            let (from, to) = (body_start, body_start + token_len);
            let token = &text[from..to];
            match token.parse::<Duration>() {
                Ok(duration) => (EntryKind::Duration(duration), to),
                Err(e) if token.chars().any(|c| c.is_ascii_digit()) => {
                    return Err(line.diagnostic(&e, from, to));
                }
                Err(_) => {
                    return Err(line.located(
                        DiagnosticCode::MalformedEntry,
                        from,
                        to,
                        "an entry must start with a duration, a range or an open range",
                    ));
                }
            }
        }
    };

    let summary = text[value_end..].trim();
    Ok(PendingEntry {
        kind,
        summary: if summary.is_empty() {
            Vec::new()
        } else {
            vec![summary.to_string()]
        },
    })
}
