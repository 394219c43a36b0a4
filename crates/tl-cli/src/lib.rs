//! Plaintext time tracking CLI library.
//!
//! This crate provides the CLI interface for the `tl` time tracker.

mod cli;
pub mod commands;
mod config;

pub use cli::{Cli, Commands, FilterArgs, InputArgs, WarnArgs};
pub use config::Config;
