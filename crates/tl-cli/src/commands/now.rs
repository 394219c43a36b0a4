//! Now command for evaluating the current day while it is still running.

use std::io::Write;

use anyhow::Result;
use clap::Args;
use tl_core::{Now, Query, Record, eval, query};

use super::util::{
    format_duration, format_should, format_signed, load_records, print_warnings, write_row,
};
use crate::{Config, InputArgs, WarnArgs};

#[derive(Debug, Args)]
pub struct NowArgs {
    #[command(flatten)]
    pub input: InputArgs,

    #[command(flatten)]
    pub warn: WarnArgs,

    /// Print durations as plain numbers of minutes.
    #[arg(long)]
    pub decimal: bool,

    /// Also show the should-total, the difference and the projected end time.
    #[arg(long)]
    pub diff: bool,
}

/// The most recent record dated today or, failing that, yesterday.
fn current_record(records: &[Record], now: Now) -> Option<&Record> {
    let today = now.date();
    let recent = Query::new().with_dates(std::iter::once(today).chain(today.plus_days(-1)));
    query::sort(query::filter(records, &recent), false)
        .first()
        .copied()
}

pub fn run<W: Write>(writer: &mut W, args: &NowArgs, config: &Config, now: Now) -> Result<()> {
    let records = load_records(&args.input.files, &config.read_options())?;
    let hidden = args.warn.hidden(config);
    let Some(current) = current_record(&records, now) else {
        writeln!(writer, "No record found for today")?;
        print_warnings(&records, now, hidden);
        return Ok(());
    };
    let decimal = args.decimal;

    let label = if current.date() == now.date() {
        "Today"
    } else {
        "Yesterday"
    };
    write_row(writer, "", label, "Overall")?;

    let total = eval::hypothetical_total(current, now);
    let grand_total = eval::hypothetical_total_sum(&records, now);
    write_row(
        writer,
        "Total",
        format_duration(total, decimal),
        format_duration(grand_total, decimal),
    )?;

    if args.diff {
        let should = eval::should_total_sum([current]);
        let grand_should = eval::should_total_sum(&records);
        write_row(
            writer,
            "Should",
            format_should(should, decimal),
            format_should(grand_should, decimal),
        )?;

        let diff = eval::diff(total, should);
        let grand_diff = eval::diff(grand_total, grand_should);
        write_row(
            writer,
            "Diff",
            format_signed(diff, decimal),
            format_signed(grand_diff, decimal),
        )?;

        let eta = |total, should| {
            eval::eta(now.time(), total, should)
                .map_or_else(|| "???".to_string(), |t| t.to_string())
        };
        write_row(
            writer,
            "E.T.A.",
            eta(total, should),
            eta(grand_total, grand_should),
        )?;
    }
    print_warnings(&records, now, hidden);
    Ok(())
}
