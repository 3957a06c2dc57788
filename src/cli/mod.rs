//! Command-line interface
//!
//! - serve: load config, open the store, serve HTTP
//! - migrate: create tables and spatial indexes

mod args;
mod commands;
mod errors;

pub use args::{Cli, Command};
pub use commands::{apply_migration, migrate, open_store, run, run_command, serve};
pub use errors::{CliError, CliErrorCode, CliResult};
