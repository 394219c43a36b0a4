//! Total command for evaluating the time of matching records.

use std::io::Write;

use anyhow::{Context, Result};
use clap::Args;
use tl_core::{Now, eval, query};

use super::util::{
    format_duration, format_should, format_signed, load_records, print_warnings, record_count,
};
use crate::{Config, FilterArgs, InputArgs, WarnArgs};

#[derive(Debug, Args)]
pub struct TotalArgs {
    #[command(flatten)]
    pub input: InputArgs,

    #[command(flatten)]
    pub filter: FilterArgs,

    #[command(flatten)]
    pub warn: WarnArgs,

    /// Also show the should-total and the difference.
    #[arg(long)]
    pub diff: bool,

    /// Print durations as plain numbers of minutes.
    #[arg(long)]
    pub decimal: bool,
}

pub fn run<W: Write>(writer: &mut W, args: &TotalArgs, config: &Config, now: Now) -> Result<()> {
    let records = load_records(&args.input.files, &config.read_options())?;
    let selected = query::filter(&records, &args.filter.to_query(now.date()));

    let total = eval::total_sum(selected.iter().copied(), &now)
        .context("cannot evaluate the total")?;
    writeln!(writer, "Total: {}", format_duration(total, args.decimal))?;
    if args.diff {
        let should = eval::should_total_sum(selected.iter().copied());
        writeln!(writer, "Should: {}", format_should(should, args.decimal))?;
        writeln!(
            writer,
            "Diff: {}",
            format_signed(eval::diff(total, should), args.decimal)
        )?;
    }
    writeln!(writer, "({})", record_count(selected.len()))?;
    print_warnings(selected.iter().copied(), now, args.warn.hidden(config));
    Ok(())
}
