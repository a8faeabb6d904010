//! Table schema loader
//!
//! - Table schemas are stored as `<schema_dir>/<keyspace>.<table>.json`
//! - One file per table
//! - Malformed files fail the whole load

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use super::errors::{SchemaError, SchemaResult};
use super::types::TableSchema;

/// Reads table schema files from disk and keeps them in an in-memory registry.
pub struct SchemaLoader {
    /// Directory containing schema files
    schema_dir: PathBuf,
    /// Loaded tables indexed by (keyspace, table)
    tables: BTreeMap<(String, String), TableSchema>,
}

impl SchemaLoader {
    /// Creates a new loader over the given schema directory.
    pub fn new(schema_dir: &Path) -> Self {
        Self {
            schema_dir: schema_dir.to_path_buf(),
            tables: BTreeMap::new(),
        }
    }

    /// Returns the schema directory path.
    pub fn schema_dir(&self) -> &Path {
        &self.schema_dir
    }

    /// Loads every `.json` file in the schema directory.
    ///
    /// A missing directory is treated as empty.
    pub fn load_all(&mut self) -> SchemaResult<()> {
        if !self.schema_dir.exists() {
            return Ok(());
        }

        let entries = fs::read_dir(&self.schema_dir).map_err(|e| {
            SchemaError::malformed_schema(
                self.schema_dir.display().to_string(),
                format!("Failed to read schema directory: {}", e),
            )
        })?;

        let mut paths = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|e| {
                SchemaError::malformed_schema(
                    self.schema_dir.display().to_string(),
                    format!("Failed to read directory entry: {}", e),
                )
            })?;

            let path = entry.path();
            if path.extension().map_or(true, |ext| ext != "json") {
                continue;
            }
            paths.push(path);
        }

        // Directory order is platform dependent
        paths.sort();
        for path in paths {
            self.load_file(&path)?;
        }

        Ok(())
    }

    /// Loads a single table schema file and registers it.
    pub fn load_file(&mut self, path: &Path) -> SchemaResult<&TableSchema> {
        let table = read_table_file(path)?;
        Ok(self.insert(table))
    }

    /// Registers a table schema directly, replacing any previous snapshot.
    pub fn register(&mut self, table: TableSchema) -> SchemaResult<()> {
        table
            .validate_structure()
            .map_err(|e| SchemaError::malformed_schema("<in-memory>", e))?;
        self.insert(table);
        Ok(())
    }

    fn insert(&mut self, table: TableSchema) -> &TableSchema {
        let key = (table.keyspace.clone(), table.name.clone());
        self.tables.insert(key.clone(), table);
        &self.tables[&key]
    }

    /// Gets a table by keyspace and name.
    pub fn get(&self, keyspace: &str, table: &str) -> Option<&TableSchema> {
        self.tables.get(&(keyspace.to_string(), table.to_string()))
    }

    /// Gets a table or fails with `SCHEMA_UNKNOWN_TABLE`.
    pub fn require(&self, keyspace: &str, table: &str) -> SchemaResult<&TableSchema> {
        self.get(keyspace, table)
            .ok_or_else(|| SchemaError::unknown_table(keyspace, table))
    }

    /// Returns the number of loaded tables.
    pub fn table_count(&self) -> usize {
        self.tables.len()
    }

    /// Saves a table schema to disk and returns the written path.
    pub fn save_table(&self, table: &TableSchema) -> SchemaResult<PathBuf> {
        let path = self
            .schema_dir
            .join(format!("{}.{}.json", table.keyspace, table.name));

        fs::create_dir_all(&self.schema_dir).map_err(|e| {
            SchemaError::malformed_schema(
                self.schema_dir.display().to_string(),
                format!("Failed to create schema directory: {}", e),
            )
        })?;

        let content = serde_json::to_string_pretty(table).map_err(|e| {
            SchemaError::malformed_schema(
                path.display().to_string(),
                format!("Failed to serialize schema: {}", e),
            )
        })?;

        fs::write(&path, content).map_err(|e| {
            SchemaError::malformed_schema(
                path.display().to_string(),
                format!("Failed to write file: {}", e),
            )
        })?;

        Ok(path)
    }
}

/// Reads and validates one table schema file.
pub fn read_table_file(path: &Path) -> SchemaResult<TableSchema> {
    let content = fs::read_to_string(path).map_err(|e| {
        SchemaError::malformed_schema(path.display().to_string(), format!("Failed to read file: {}", e))
    })?;

    let table: TableSchema = serde_json::from_str(&content).map_err(|e| {
        SchemaError::malformed_schema(path.display().to_string(), format!("Invalid JSON: {}", e))
    })?;

    table
        .validate_structure()
        .map_err(|e| SchemaError::malformed_schema(path.display().to_string(), e))?;

    Ok(table)
}
