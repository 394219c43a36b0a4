use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::EnvFilter;

use tl_cli::commands::{diff, now, tags, total};
use tl_cli::{Cli, Commands, Config};
use tl_core::Now;

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize tracing with verbose flag support
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::from_default_env()
    };
    // Use try_init to avoid panic if tracing is already initialized (e.g., in tests)
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();

    let Some(command) = &cli.command else {
        // No subcommand, show help
        use clap::CommandFactory;
        Cli::command().print_help()?;
        println!();
        return Ok(());
    };

    let config =
        Config::load_from(cli.config.as_deref()).context("failed to load configuration")?;
    tracing::debug!(?config, "loaded configuration");

    // The clock is read exactly once per run
    let clock = Now::from(chrono::Local::now().naive_local());
    let mut stdout = std::io::stdout().lock();

    match command {
        Commands::Total(args) => total::run(&mut stdout, args, &config, clock)?,
        Commands::Tags(args) => tags::run(&mut stdout, args, &config, clock)?,
        Commands::Diff(args) => diff::run(&mut stdout, args, &config, clock)?,
        Commands::Now(args) => now::run(&mut stdout, args, &config, clock)?,
    }

    Ok(())
}
