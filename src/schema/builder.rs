//! Schema construction for backing views
//!
//! A `SchemaBuilder` accepts an ordered sequence of plain and computed
//! columns tagged by role, is told which base table the view materializes,
//! and finally yields an immutable `ViewSchemaSpec`.
//!
//! Column order within each role is the order of the `with_*` calls.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use super::errors::{SchemaError, SchemaResult};
use super::types::{ColumnKind, ColumnType, NamedTable, TableSchema};

/// Declared computation of a computed column.
///
/// The storage layer evaluates these at write time; this crate only
/// records which one applies.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "computation", rename_all = "snake_case")]
pub enum ColumnComputation {
    /// Keys of the source collection
    CollectionKeys { source: String },
    /// Values of the source collection
    CollectionValues { source: String },
    /// (key, value) entries of the source map
    CollectionEntries { source: String },
    /// Token of the base partition key, as a bigint
    TokenNew,
    /// Token of the base partition key, in the legacy byte encoding
    TokenLegacy,
}

impl ColumnComputation {
    pub fn name(&self) -> &'static str {
        match self {
            ColumnComputation::CollectionKeys { .. } => "collection_keys",
            ColumnComputation::CollectionValues { .. } => "collection_values",
            ColumnComputation::CollectionEntries { .. } => "collection_entries",
            ColumnComputation::TokenNew => "token_new",
            ColumnComputation::TokenLegacy => "token_legacy",
        }
    }

    /// Source collection column, for collection computations
    pub fn source_column(&self) -> Option<&str> {
        match self {
            ColumnComputation::CollectionKeys { source }
            | ColumnComputation::CollectionValues { source }
            | ColumnComputation::CollectionEntries { source } => Some(source),
            ColumnComputation::TokenNew | ColumnComputation::TokenLegacy => None,
        }
    }
}

/// A synthesized view column whose value is derived from the base row
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComputedColumnSpec {
    pub name: String,
    #[serde(rename = "type")]
    pub column_type: ColumnType,
    pub kind: ColumnKind,
    #[serde(flatten)]
    pub computation: ColumnComputation,
}

/// A key column of a backing view
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "origin", rename_all = "snake_case")]
pub enum ViewColumn {
    /// Copied from the base table
    Base {
        name: String,
        #[serde(rename = "type")]
        column_type: ColumnType,
    },
    /// Derived by a declared computation
    Computed(ComputedColumnSpec),
}

impl ViewColumn {
    pub fn name(&self) -> &str {
        match self {
            ViewColumn::Base { name, .. } => name,
            ViewColumn::Computed(spec) => &spec.name,
        }
    }

    pub fn column_type(&self) -> &ColumnType {
        match self {
            ViewColumn::Base { column_type, .. } => column_type,
            ViewColumn::Computed(spec) => &spec.column_type,
        }
    }

    /// Returns the computation, if this column is computed
    pub fn computation(&self) -> Option<&ColumnComputation> {
        match self {
            ViewColumn::Base { .. } => None,
            ViewColumn::Computed(spec) => Some(&spec.computation),
        }
    }

    pub fn is_computed(&self) -> bool {
        matches!(self, ViewColumn::Computed(_))
    }
}

/// Non-key view column replicated from a base regular column
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VirtualColumn {
    pub name: String,
    #[serde(rename = "type")]
    pub column_type: ColumnType,
}

/// Reference to the base table a view materializes
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BaseTableRef {
    pub keyspace: String,
    pub table: String,
}

/// Immutable backing-view schema
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ViewSchemaSpec {
    pub keyspace: String,
    pub table_name: String,
    pub partition_key: Vec<ViewColumn>,
    pub clustering_key: Vec<ViewColumn>,
    pub virtual_regular_columns: Vec<VirtualColumn>,
    pub filter_clause: String,
    pub base_table_ref: BaseTableRef,
    /// Whether every base column is included in the view
    pub include_all_columns: bool,
}

impl ViewSchemaSpec {
    /// Names of the partition key columns, in key order
    pub fn partition_key_names(&self) -> Vec<&str> {
        self.partition_key.iter().map(ViewColumn::name).collect()
    }

    /// Names of the clustering key columns, in key order
    pub fn clustering_key_names(&self) -> Vec<&str> {
        self.clustering_key.iter().map(ViewColumn::name).collect()
    }

    /// Looks up a key column by name
    pub fn key_column(&self, name: &str) -> Option<&ViewColumn> {
        self.partition_key
            .iter()
            .chain(self.clustering_key.iter())
            .find(|c| c.name() == name)
    }
}

impl NamedTable for ViewSchemaSpec {
    fn keyspace_name(&self) -> &str {
        &self.keyspace
    }

    fn table_name(&self) -> &str {
        &self.table_name
    }
}

/// Builder for `ViewSchemaSpec`
#[derive(Debug)]
pub struct SchemaBuilder {
    keyspace: String,
    table_name: String,
    partition_key: Vec<ViewColumn>,
    clustering_key: Vec<ViewColumn>,
    virtual_columns: Vec<VirtualColumn>,
    view_info: Option<(BaseTableRef, bool, String)>,
    /// First duplicate seen, reported by `build`
    duplicate: Option<String>,
    names: HashSet<String>,
}

impl SchemaBuilder {
    pub fn new(keyspace: impl Into<String>, table_name: impl Into<String>) -> Self {
        Self {
            keyspace: keyspace.into(),
            table_name: table_name.into(),
            partition_key: Vec::new(),
            clustering_key: Vec::new(),
            virtual_columns: Vec::new(),
            view_info: None,
            duplicate: None,
            names: HashSet::new(),
        }
    }

    fn claim(&mut self, name: &str) -> bool {
        if self.names.insert(name.to_string()) {
            return true;
        }
        if self.duplicate.is_none() {
            self.duplicate = Some(name.to_string());
        }
        false
    }

    fn push_key(&mut self, kind: ColumnKind, column: ViewColumn) {
        match kind {
            ColumnKind::PartitionKey => self.partition_key.push(column),
            ColumnKind::ClusteringKey => self.clustering_key.push(column),
            ColumnKind::Regular => self.virtual_columns.push(VirtualColumn {
                name: column.name().to_string(),
                column_type: column.column_type().clone(),
            }),
        }
    }

    /// Appends a column copied from the base table
    pub fn with_column(&mut self, name: &str, column_type: &ColumnType, kind: ColumnKind) -> &mut Self {
        if self.claim(name) {
            self.push_key(
                kind,
                ViewColumn::Base {
                    name: name.to_string(),
                    column_type: column_type.clone(),
                },
            );
        }
        self
    }

    /// Appends a computed column
    pub fn with_computed_column(
        &mut self,
        name: &str,
        column_type: ColumnType,
        kind: ColumnKind,
        computation: ColumnComputation,
    ) -> &mut Self {
        if self.claim(name) {
            self.push_key(
                kind,
                ViewColumn::Computed(ComputedColumnSpec {
                    name: name.to_string(),
                    column_type,
                    kind,
                    computation,
                }),
            );
        }
        self
    }

    /// Appends a non-key column mirroring a base regular column
    pub fn with_virtual_column(&mut self, name: &str, column_type: &ColumnType) -> &mut Self {
        if self.claim(name) {
            self.virtual_columns.push(VirtualColumn {
                name: name.to_string(),
                column_type: column_type.clone(),
            });
        }
        self
    }

    /// Marks the schema as a materialized view over `base`
    pub fn with_view_info(
        &mut self,
        base: &TableSchema,
        include_all_columns: bool,
        where_clause: impl Into<String>,
    ) -> &mut Self {
        let base_ref = BaseTableRef {
            keyspace: base.keyspace_name().to_string(),
            table: base.table_name().to_string(),
        };
        self.view_info = Some((base_ref, include_all_columns, where_clause.into()));
        self
    }

    /// Produces the immutable view schema
    pub fn build(self) -> SchemaResult<ViewSchemaSpec> {
        if let Some(name) = self.duplicate {
            return Err(SchemaError::duplicate_column(self.table_name, name));
        }
        if self.partition_key.is_empty() {
            return Err(SchemaError::malformed_schema(self.table_name, "view has no partition key"));
        }
        let Some((base_table_ref, include_all_columns, filter_clause)) = self.view_info else {
            return Err(SchemaError::malformed_schema(self.table_name, "view has no base table"));
        };

        Ok(ViewSchemaSpec {
            keyspace: self.keyspace,
            table_name: self.table_name,
            partition_key: self.partition_key,
            clustering_key: self.clustering_key,
            virtual_regular_columns: self.virtual_columns,
            filter_clause,
            base_table_ref,
            include_all_columns,
        })
    }
}
