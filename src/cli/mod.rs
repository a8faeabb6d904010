//! CLI module for sidx
//!
//! Provides command-line access to:
//! - view: Derive an index's backing view schema
//! - indexes: List a table's registered indexes
//! - dependents: Indexes depending on a column
//! - supports: Index capability for an operator
//! - table-name: Backing table name codec

mod args;
mod commands;
mod config;
mod errors;
mod io;

pub use args::{Cli, Command, TableNameAction, TableSource};
pub use commands::{execute, run};
pub use config::Config;
pub use errors::{CliError, CliErrorCode, CliResult};
pub use io::{error_response, ok_response, write_error, write_response};
