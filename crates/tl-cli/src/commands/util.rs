//! Shared utilities for CLI commands.

use std::fmt::Display;
use std::io::Write;
use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use tl_core::{Diagnostic, Duration, Now, Record, ShouldTotal, warning};
use tl_text::ReadOptions;

/// Reads all records from `files`, in file order.
///
/// Every diagnostic of every file is collected before failing, so one run
/// shows all problems at once.
pub fn load_records(files: &[PathBuf], options: &ReadOptions) -> Result<Vec<Record>> {
    let mut records = Vec::new();
    let mut report = Vec::new();
    for path in files {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))?;
        match tl_text::read(&text, options) {
            Ok(read) => records.extend(read),
            Err(diagnostics) => {
                let origin = path.display().to_string();
                report.extend(
                    diagnostics
                        .iter()
                        .map(|d| render_diagnostic(&origin, &text, d)),
                );
            }
        }
    }
    if !report.is_empty() {
        bail!(
            "{} malformed record(s)\n\n{}",
            report.len(),
            report.join("\n")
        );
    }
    tracing::debug!(files = files.len(), records = records.len(), "loaded records");
    Ok(records)
}

/// Renders a diagnostic with its source line and a caret underline.
///
/// Tabs before the offending span are kept so the carets line up with the
/// source however wide the terminal draws them.
pub fn render_diagnostic(origin: &str, text: &str, diagnostic: &Diagnostic) -> String {
    let source = text
        .lines()
        .nth(diagnostic.line().saturating_sub(1))
        .unwrap_or_default()
        .trim_end();
    let lead: String = source
        .chars()
        .take(diagnostic.position())
        .map(|c| if c == '\t' { '\t' } else { ' ' })
        .collect();
    format!(
        "{origin}:{}:{}: error[{}]: {}\n  | {source}\n  | {lead}{}\n",
        diagnostic.line(),
        diagnostic.position() + 1,
        diagnostic.code(),
        diagnostic.message(),
        "^".repeat(diagnostic.length()),
    )
}

/// One `Warning: ...` line per suspicious record.
pub fn warning_lines<'a>(
    records: impl IntoIterator<Item = &'a Record>,
    now: Now,
) -> Vec<String> {
    warning::warnings(records, now)
        .iter()
        .map(|w| format!("Warning: {w}"))
        .collect()
}

/// Prints the warnings for `records` to stderr unless `hidden`.
pub fn print_warnings<'a>(
    records: impl IntoIterator<Item = &'a Record>,
    now: Now,
    hidden: bool,
) {
    if hidden {
        return;
    }
    for line in warning_lines(records, now) {
        eprintln!("{line}");
    }
}

/// `2h30m`, or the plain number of minutes when `decimal`.
pub fn format_duration(duration: Duration, decimal: bool) -> String {
    if decimal {
        duration.in_minutes().to_string()
    } else {
        duration.to_string()
    }
}

/// Like [`format_duration`], with a `+` on positive canonical values.
pub fn format_signed(duration: Duration, decimal: bool) -> String {
    if decimal {
        duration.in_minutes().to_string()
    } else {
        duration.to_string_with_sign()
    }
}

/// `>=8h!`, or the target in minutes when `decimal`.
pub fn format_should(should: ShouldTotal, decimal: bool) -> String {
    if decimal {
        should.target().in_minutes().to_string()
    } else {
        should.to_string()
    }
}

/// `In 1 record` / `In 3 records`.
pub fn record_count(count: usize) -> String {
    if count == 1 {
        "In 1 record".to_string()
    } else {
        format!("In {count} records")
    }
}

/// Writes one line of a two-column table: a name, then two right-aligned values.
pub fn write_row<W: Write>(
    writer: &mut W,
    name: &str,
    left: impl Display,
    right: impl Display,
) -> std::io::Result<()> {
    writeln!(
        writer,
        "{name:<7}{:>10}{:>11}",
        left.to_string(),
        right.to_string()
    )
}
