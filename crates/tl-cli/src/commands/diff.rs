//! Diff command comparing matching entries against the should-total.

use std::io::Write;

use anyhow::{Context, Result};
use clap::Args;
use tl_core::{Now, eval, query};

use super::util::{
    format_duration, format_should, format_signed, load_records, print_warnings, record_count,
};
use crate::{Config, FilterArgs, InputArgs, WarnArgs};

#[derive(Debug, Args)]
pub struct DiffArgs {
    #[command(flatten)]
    pub input: InputArgs,

    #[command(flatten)]
    pub filter: FilterArgs,

    #[command(flatten)]
    pub warn: WarnArgs,

    /// Print durations as plain numbers of minutes.
    #[arg(long)]
    pub decimal: bool,
}

/// Unlike `total`, only the entries matching the tag filter are counted,
/// while the should-total comes from every record contributing one of them.
pub fn run<W: Write>(writer: &mut W, args: &DiffArgs, config: &Config, now: Now) -> Result<()> {
    let records = load_records(&args.input.files, &config.read_options())?;
    let selection = query::find_filter(&records, &args.filter.to_query(now.date()));

    let total = eval::total_entries(selection.entries.iter().copied(), &now)
        .context("cannot evaluate the total")?;
    let should = eval::should_total_sum(selection.records.iter().copied());
    writeln!(writer, "Total: {}", format_duration(total, args.decimal))?;
    writeln!(writer, "Should: {}", format_should(should, args.decimal))?;
    writeln!(
        writer,
        "Diff: {}",
        format_signed(eval::diff(total, should), args.decimal)
    )?;
    writeln!(writer, "({})", record_count(selection.records.len()))?;
    print_warnings(
        selection.records.iter().copied(),
        now,
        args.warn.hidden(config),
    );
    Ok(())
}
