//! CLI command implementations
//!
//! Each command loads one table snapshot and answers from it. `indexes` and
//! `dependents` need the whole registry; `view` and `supports` only parse
//! the requested index, so an unrelated malformed index does not block them.
//! Nothing is written back.

use std::path::Path;

use serde_json::{json, Value};

use crate::index::{decode_table_name, encode_table_name, IndexDescriptor, IndexRegistry, Operator};
use crate::observability::{log_event_with_fields, Event, Logger};
use crate::schema::{read_table_file, ColumnDef, IndexMetadata, SchemaLoader, TableSchema};

use super::args::{Cli, Command, TableNameAction, TableSource};
use super::config::Config;
use super::errors::{CliError, CliResult};
use super::io::{write_error, write_response};

/// Run the CLI
///
/// The outcome is always written to stdout as a JSON envelope; an `Err`
/// is also returned so the binary can exit non-zero.
pub fn run() -> CliResult<()> {
    let cli = Cli::parse_args();

    match execute(cli) {
        Ok(data) => write_response(data),
        Err(e) => {
            write_error(e.code_str(), e.message())?;
            Err(e)
        }
    }
}

/// Execute parsed arguments and return the response payload
pub fn execute(cli: Cli) -> CliResult<Value> {
    let config = Config::load_or_default(cli.config.as_deref())?;
    Logger::set_min_severity(config.log_severity()?);
    if let Some(path) = &cli.config {
        let path = path.display().to_string();
        log_event_with_fields(Event::ConfigLoaded, &[("path", path.as_str())]);
    }

    match cli.command {
        Command::View {
            source,
            index,
            legacy_token,
        } => {
            let table = load_table(&config, &source)?;
            view(&table, &index, config.new_token_computation && !legacy_token)
        }
        Command::Indexes { source } => {
            let table = load_table(&config, &source)?;
            indexes(&table)
        }
        Command::Dependents { source, column } => {
            let table = load_table(&config, &source)?;
            dependents(&table, &column)
        }
        Command::Supports {
            source,
            index,
            column,
            op,
        } => {
            let table = load_table(&config, &source)?;
            supports(&table, &index, &column, &op)
        }
        Command::TableName { action } => table_name(action),
    }
}

fn load_table(config: &Config, source: &TableSource) -> CliResult<TableSchema> {
    if let Some(path) = &source.schema {
        return Ok(read_table_file(path)?);
    }

    let Some(qualified) = &source.table else {
        return Err(CliError::usage_error("One of --schema or --table is required"));
    };
    let (keyspace, table) = qualified.split_once('.').ok_or_else(|| {
        CliError::usage_error(format!("Expected <keyspace>.<table>, got '{}'", qualified))
    })?;
    let schema_dir = config
        .schema_dir
        .as_deref()
        .ok_or_else(|| CliError::config_error("--table requires schema_dir in the config file"))?;

    let loader = load_schema_dir(schema_dir)?;
    Ok(loader.require(keyspace, table)?.clone())
}

fn load_schema_dir(schema_dir: &Path) -> CliResult<SchemaLoader> {
    let mut loader = SchemaLoader::new(schema_dir);
    loader.load_all()?;

    let dir = loader.schema_dir().display().to_string();
    let count = loader.table_count().to_string();
    log_event_with_fields(
        Event::SchemasLoaded,
        &[("dir", dir.as_str()), ("tables", count.as_str())],
    );
    Ok(loader)
}

fn column<'a>(table: &'a TableSchema, name: &str) -> CliResult<&'a ColumnDef> {
    table.column(name).ok_or_else(|| {
        CliError::usage_error(format!("Table {} has no column '{}'", table.name, name))
    })
}

fn index_metadata<'a>(table: &'a TableSchema, name: &str) -> CliResult<&'a IndexMetadata> {
    table.index(name).ok_or_else(|| {
        CliError::usage_error(format!("Table {} has no index '{}'", table.name, name))
    })
}

fn descriptor_json(descriptor: &IndexDescriptor) -> Value {
    json!({
        "name": descriptor.name(),
        "local": descriptor.is_local(),
        "target_kind": descriptor.target_kind().as_str(),
        "target_column": descriptor.target_column(),
        "backing_table": encode_table_name(descriptor.name()),
    })
}

/// `sidx view`
fn view(table: &TableSchema, index: &str, use_new_token_computation: bool) -> CliResult<Value> {
    let metadata = index_metadata(table, index)?;
    let registry = IndexRegistry::new(table.clone());
    let spec = registry.create_view_for_index(metadata, use_new_token_computation)?;
    Ok(serde_json::to_value(spec)?)
}

/// `sidx indexes`
fn indexes(table: &TableSchema) -> CliResult<Value> {
    let registry = IndexRegistry::load(table.clone())?;
    let list: Vec<Value> = registry.list_indexes().iter().map(descriptor_json).collect();
    Ok(json!({
        "table": table.name,
        "indexes": list,
    }))
}

/// `sidx dependents`
fn dependents(table: &TableSchema, column_name: &str) -> CliResult<Value> {
    let registry = IndexRegistry::load(table.clone())?;
    let column = column(table, column_name)?;
    let dependent = registry.get_dependent_indices(column);
    Ok(json!({
        "column": column_name,
        "indexes": serde_json::to_value(dependent)?,
    }))
}

/// `sidx supports`
fn supports(table: &TableSchema, index: &str, column_name: &str, op: &str) -> CliResult<Value> {
    let operator = Operator::parse(op)
        .ok_or_else(|| CliError::usage_error(format!("Unknown operator '{}'", op)))?;
    let descriptor = IndexDescriptor::from_metadata(index_metadata(table, index)?.clone())?;
    let column = column(table, column_name)?;

    Ok(json!({
        "index": index,
        "column": column_name,
        "op": operator.as_str(),
        "supported": descriptor.supports_expression(column, operator),
    }))
}

/// `sidx table-name`
fn table_name(action: TableNameAction) -> CliResult<Value> {
    let (index, table) = match action {
        TableNameAction::Encode { name } => {
            let table = encode_table_name(&name);
            (name, table)
        }
        TableNameAction::Decode { name } => (decode_table_name(&name)?, name),
    };
    Ok(json!({ "index": index, "table": table }))
}
