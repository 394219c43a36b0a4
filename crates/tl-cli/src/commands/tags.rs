//! Tags command for totals aggregated by tag.

use std::io::Write;

use anyhow::{Context, Result};
use clap::Args;
use tl_core::{Now, eval, query};

use super::util::{format_duration, load_records, print_warnings};
use crate::{Config, FilterArgs, InputArgs, WarnArgs};

#[derive(Debug, Args)]
pub struct TagsArgs {
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

pub fn run<W: Write>(writer: &mut W, args: &TagsArgs, config: &Config, now: Now) -> Result<()> {
    let records = load_records(&args.input.files, &config.read_options())?;
    let selected = query::filter(&records, &args.filter.to_query(now.date()));
    let lookup = query::entry_tag_lookup(selected.iter().copied());

    let labels: Vec<String> = lookup.keys().map(ToString::to_string).collect();
    let width = labels.iter().map(|l| l.chars().count()).max().unwrap_or(0);
    for (label, entries) in labels.iter().zip(lookup.values()) {
        let total = eval::total_entries(entries.iter().copied(), &now)
            .with_context(|| format!("cannot evaluate the total of {label}"))?;
        let total = format_duration(total, args.decimal);
        writeln!(writer, "{label:<width$} {total}")?;
    }
    tracing::debug!(tags = labels.len(), "listed tags");
    print_warnings(selected.iter().copied(), now, args.warn.hidden(config));
    Ok(())
}
