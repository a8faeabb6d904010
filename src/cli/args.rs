//! CLI argument definitions using clap
//!
//! Commands:
//! - sidx view --schema <file> --index <name> [--legacy-token]
//! - sidx indexes --schema <file>
//! - sidx dependents --schema <file> --column <name>
//! - sidx supports --schema <file> --index <name> --column <name> --op <op>
//! - sidx table-name encode|decode <name>
//!
//! Every table-reading command accepts `--table <keyspace.table>` instead of
//! `--schema`, resolved against the configured `schema_dir`.

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

/// sidx - secondary index backing-view tool
#[derive(Parser, Debug)]
#[command(name = "sidx")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Path to configuration file
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

/// Where to read the base table schema from
#[derive(Args, Debug, Clone)]
pub struct TableSource {
    /// Path to a table schema JSON file
    #[arg(long, conflicts_with = "table")]
    pub schema: Option<PathBuf>,

    /// Table as <keyspace>.<table>, looked up in the configured schema_dir
    #[arg(long)]
    pub table: Option<String>,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Derive the backing view schema of an index
    View {
        #[command(flatten)]
        source: TableSource,
        /// Index name
        #[arg(long)]
        index: String,
        /// Use the legacy token computation regardless of configuration
        #[arg(long)]
        legacy_token: bool,
    },

    /// List the indexes registered for a table
    Indexes {
        #[command(flatten)]
        source: TableSource,
    },

    /// List the indexes that depend on a column
    Dependents {
        #[command(flatten)]
        source: TableSource,
        /// Column name
        #[arg(long)]
        column: String,
    },

    /// Check whether an index can serve a restriction
    Supports {
        #[command(flatten)]
        source: TableSource,
        /// Index name
        #[arg(long)]
        index: String,
        /// Restricted column
        #[arg(long)]
        column: String,
        /// Operator, e.g. "=", "CONTAINS", "CONTAINS KEY"
        #[arg(long)]
        op: String,
    },

    /// Convert between index names and backing table names
    TableName {
        #[command(subcommand)]
        action: TableNameAction,
    },
}

#[derive(Subcommand, Debug)]
pub enum TableNameAction {
    /// Index name -> backing table name
    Encode { name: String },
    /// Backing table name -> index name
    Decode { name: String },
}

impl Cli {
    /// Parse command line arguments
    pub fn parse_args() -> Self {
        Cli::parse()
    }
}
