//! Command-line argument definitions.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use tl_core::{Date, Query, Tag};

use crate::Config;
use crate::commands::{diff, now, tags, total};

/// Plaintext time tracker.
///
/// Evaluates records of worked time kept in plain text files.
#[derive(Debug, Parser)]
#[command(name = "tl", version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output.
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Path to config file.
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available subcommands.
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Evaluate the total time of matching records.
    Total(total::TotalArgs),

    /// Print total times aggregated by tag.
    Tags(tags::TagsArgs),

    /// Compare the time of matching entries with the should-total.
    Diff(diff::DiffArgs),

    /// Evaluate the current day, counting open ranges up to now.
    Now(now::NowArgs),
}

/// Record files to read.
#[derive(Debug, Clone, Args)]
pub struct InputArgs {
    /// Files containing records.
    #[arg(required = true, value_name = "FILE")]
    pub files: Vec<PathBuf>,
}

/// Warning output shared by the evaluating commands.
#[derive(Debug, Clone, Default, Args)]
pub struct WarnArgs {
    /// Do not print warnings about suspicious records.
    #[arg(long)]
    pub no_warn: bool,
}

impl WarnArgs {
    /// Whether warnings are suppressed by this flag or by `config`.
    pub const fn hidden(&self, config: &Config) -> bool {
        self.no_warn || config.hide_warnings
    }
}

/// Record and entry selection shared by the evaluating commands.
#[derive(Debug, Clone, Default, Args)]
pub struct FilterArgs {
    /// Only records on this date (repeatable).
    #[arg(long = "date", value_name = "DATE")]
    pub dates: Vec<Date>,

    /// Only records on or after this date.
    #[arg(long, value_name = "DATE")]
    pub since: Option<Date>,

    /// Only records on or before this date.
    #[arg(long, value_name = "DATE")]
    pub until: Option<Date>,

    /// Only today's record.
    #[arg(long)]
    pub today: bool,

    /// Only yesterday's record.
    #[arg(long)]
    pub yesterday: bool,

    /// Only entries carrying this tag (repeatable; all must match).
    #[arg(long = "tag", value_name = "TAG")]
    pub tags: Vec<Tag>,
}

impl FilterArgs {
    /// Builds the query, resolving `--today`/`--yesterday` against `today`.
    pub fn to_query(&self, today: Date) -> Query {
        let mut dates = self.dates.clone();
        if self.today {
            dates.push(today);
        }
        if self.yesterday {
            dates.extend(today.plus_days(-1));
        }

        let mut query = Query::new().with_tags(self.tags.iter().cloned());
        if !dates.is_empty() {
            query = query.with_dates(dates);
        }
        if let Some(since) = self.since {
            query = query.since(since);
        }
        if let Some(until) = self.until {
            query = query.until(until);
        }
        query
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use clap::CommandFactory;
    use tl_core::Record;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parses_filters_into_typed_values() {
        let cli = Cli::parse_from([
            "tl", "tags", "a.tl", "b.tl", "--date", "2020-01-01", "--since", "2019/12/01", "--tag",
            "#Work", "--tag", "ticket=7",
        ]);
        let Some(Commands::Tags(args)) = cli.command else {
            panic!("expected tags command");
        };
        assert_eq!(args.input.files.len(), 2);
        assert_eq!(args.filter.dates, [Date::new(2020, 1, 1).unwrap()]);
        assert_eq!(args.filter.since, Some(Date::new(2019, 12, 1).unwrap()));
        assert_eq!(
            args.filter.tags,
            [
                Tag::new("work", None).unwrap(),
                Tag::new("ticket", Some("7")).unwrap()
            ]
        );
    }

    #[test]
    fn test_rejects_malformed_filter_values() {
        assert!(Cli::try_parse_from(["tl", "total", "a.tl", "--date", "2020-13-01"]).is_err());
        assert!(Cli::try_parse_from(["tl", "total", "a.tl", "--tag", "#"]).is_err());
    }

    #[test]
    fn test_parses_output_flags() {
        let cli = Cli::parse_from(["tl", "total", "a.tl", "--decimal", "--no-warn", "--diff"]);
        let Some(Commands::Total(args)) = cli.command else {
            panic!("expected total command");
        };
        assert!(args.decimal);
        assert!(args.diff);
        assert!(args.warn.no_warn);
    }

    #[test]
    fn test_warnings_hidden_by_flag_or_config() {
        let shown = WarnArgs::default();
        let hidden = WarnArgs { no_warn: true };
        let quiet = Config {
            hide_warnings: true,
            ..Config::default()
        };
        assert!(!shown.hidden(&Config::default()));
        assert!(hidden.hidden(&Config::default()));
        assert!(shown.hidden(&quiet));
    }

    #[test]
    fn test_requires_at_least_one_file() {
        assert!(Cli::try_parse_from(["tl", "total"]).is_err());
    }

    #[test]
    fn test_today_and_yesterday_resolve_against_given_date() {
        let today = Date::new(2020, 3, 1).unwrap();
        let filter = FilterArgs {
            yesterday: true,
            ..FilterArgs::default()
        };
        let query = filter.to_query(today);
        assert!(query.matches_record(&Record::new(Date::new(2020, 2, 29).unwrap())));
        assert!(!query.matches_record(&Record::new(today)));
    }

    #[test]
    fn test_empty_filter_matches_everything() {
        let query = FilterArgs::default().to_query(Date::new(2020, 3, 1).unwrap());
        assert!(query.matches_record(&Record::new(Date::new(1999, 1, 1).unwrap())));
    }
}
