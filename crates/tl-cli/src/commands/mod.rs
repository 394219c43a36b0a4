//! CLI subcommand implementations.

pub mod diff;
pub mod now;
pub mod tags;
pub mod total;
pub mod util;
