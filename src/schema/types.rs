//! Table schema definitions consumed by the index layer
//!
//! Supported column types:
//! - scalars: ascii, text, boolean, int, bigint, double, blob, uuid, timeuuid, timestamp
//! - collections: map, set, list (optionally frozen)
//! - tuple: fixed-arity heterogeneous value
//!
//! Key order is significant: partition-key and clustering-key columns are
//! always returned sorted by their position within the role.

use std::collections::{BTreeMap, HashSet};
use std::fmt;

use serde::{Deserialize, Serialize};

/// Option key under which an index stores its raw target specification
pub const TARGET_OPTION_NAME: &str = "target";

/// Column data types
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ColumnType {
    Ascii,
    Text,
    Boolean,
    Int,
    BigInt,
    Double,
    Blob,
    Uuid,
    TimeUuid,
    Timestamp,
    /// Map from keys to values
    Map {
        key: Box<ColumnType>,
        value: Box<ColumnType>,
        #[serde(default)]
        frozen: bool,
    },
    /// Set of unique elements
    Set {
        element: Box<ColumnType>,
        #[serde(default)]
        frozen: bool,
    },
    /// Ordered list of elements
    List {
        element: Box<ColumnType>,
        #[serde(default)]
        frozen: bool,
    },
    /// Fixed-arity tuple
    Tuple { elements: Vec<ColumnType> },
}

impl ColumnType {
    /// Creates a non-frozen map type
    pub fn map(key: ColumnType, value: ColumnType) -> Self {
        ColumnType::Map {
            key: Box::new(key),
            value: Box::new(value),
            frozen: false,
        }
    }

    /// Creates a non-frozen set type
    pub fn set(element: ColumnType) -> Self {
        ColumnType::Set {
            element: Box::new(element),
            frozen: false,
        }
    }

    /// Creates a non-frozen list type
    pub fn list(element: ColumnType) -> Self {
        ColumnType::List {
            element: Box::new(element),
            frozen: false,
        }
    }

    /// Creates a tuple type
    pub fn tuple(elements: Vec<ColumnType>) -> Self {
        ColumnType::Tuple { elements }
    }

    /// Returns a frozen copy of a collection type; other types are returned unchanged
    pub fn frozen(self) -> Self {
        match self {
            ColumnType::Map { key, value, .. } => ColumnType::Map {
                key,
                value,
                frozen: true,
            },
            ColumnType::Set { element, .. } => ColumnType::Set {
                element,
                frozen: true,
            },
            ColumnType::List { element, .. } => ColumnType::List {
                element,
                frozen: true,
            },
            other => other,
        }
    }

    /// Returns true for map, set and list types, frozen or not
    pub fn is_collection(&self) -> bool {
        matches!(
            self,
            ColumnType::Map { .. } | ColumnType::Set { .. } | ColumnType::List { .. }
        )
    }

    /// Returns true for non-frozen collections, whose elements are stored as separate cells
    pub fn is_multi_cell(&self) -> bool {
        match self {
            ColumnType::Map { frozen, .. }
            | ColumnType::Set { frozen, .. }
            | ColumnType::List { frozen, .. } => !frozen,
            _ => false,
        }
    }
}

impl fmt::Display for ColumnType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ColumnType::Ascii => write!(f, "ascii"),
            ColumnType::Text => write!(f, "text"),
            ColumnType::Boolean => write!(f, "boolean"),
            ColumnType::Int => write!(f, "int"),
            ColumnType::BigInt => write!(f, "bigint"),
            ColumnType::Double => write!(f, "double"),
            ColumnType::Blob => write!(f, "blob"),
            ColumnType::Uuid => write!(f, "uuid"),
            ColumnType::TimeUuid => write!(f, "timeuuid"),
            ColumnType::Timestamp => write!(f, "timestamp"),
            ColumnType::Map { key, value, frozen } => {
                frozen_wrap(f, *frozen, format!("map<{}, {}>", key, value))
            }
            ColumnType::Set { element, frozen } => {
                frozen_wrap(f, *frozen, format!("set<{}>", element))
            }
            ColumnType::List { element, frozen } => {
                frozen_wrap(f, *frozen, format!("list<{}>", element))
            }
            ColumnType::Tuple { elements } => {
                let inner: Vec<String> = elements.iter().map(|t| t.to_string()).collect();
                write!(f, "tuple<{}>", inner.join(", "))
            }
        }
    }
}

fn frozen_wrap(f: &mut fmt::Formatter<'_>, frozen: bool, inner: String) -> fmt::Result {
    if frozen {
        write!(f, "frozen<{}>", inner)
    } else {
        write!(f, "{}", inner)
    }
}

/// Role of a column within its table
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ColumnKind {
    PartitionKey,
    ClusteringKey,
    Regular,
}

/// A column of a base table
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnDef {
    /// Column name, unique within the table
    pub name: String,
    /// Column data type
    #[serde(rename = "type")]
    pub column_type: ColumnType,
    /// Column role
    pub kind: ColumnKind,
    /// Position within the role (only meaningful for key columns)
    #[serde(default)]
    pub position: u32,
}

impl ColumnDef {
    pub fn new(name: impl Into<String>, column_type: ColumnType, kind: ColumnKind, position: u32) -> Self {
        Self {
            name: name.into(),
            column_type,
            kind,
            position,
        }
    }

    /// Create a partition key column at the given position
    pub fn partition_key(name: impl Into<String>, column_type: ColumnType, position: u32) -> Self {
        Self::new(name, column_type, ColumnKind::PartitionKey, position)
    }

    /// Create a clustering key column at the given position
    pub fn clustering_key(name: impl Into<String>, column_type: ColumnType, position: u32) -> Self {
        Self::new(name, column_type, ColumnKind::ClusteringKey, position)
    }

    /// Create a regular column
    pub fn regular(name: impl Into<String>, column_type: ColumnType) -> Self {
        Self::new(name, column_type, ColumnKind::Regular, 0)
    }

    pub fn is_partition_key(&self) -> bool {
        self.kind == ColumnKind::PartitionKey
    }

    pub fn is_clustering_key(&self) -> bool {
        self.kind == ColumnKind::ClusteringKey
    }

    /// Returns true if the column belongs to the primary key (partition or clustering)
    pub fn is_primary_key(&self) -> bool {
        self.is_partition_key() || self.is_clustering_key()
    }
}

/// Declared secondary index on a table
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexMetadata {
    /// Index name, unique within the table
    pub name: String,
    /// Whether the index is co-located with the base partition
    #[serde(default)]
    pub local: bool,
    /// Index options; the raw target lives under `target`
    #[serde(default)]
    pub options: BTreeMap<String, String>,
}

impl IndexMetadata {
    /// Create index metadata with the given raw target
    pub fn new(name: impl Into<String>, target: impl Into<String>, local: bool) -> Self {
        let mut options = BTreeMap::new();
        options.insert(TARGET_OPTION_NAME.to_string(), target.into());
        Self {
            name: name.into(),
            local,
            options,
        }
    }

    /// Create global index metadata
    pub fn global(name: impl Into<String>, target: impl Into<String>) -> Self {
        Self::new(name, target, false)
    }

    /// Create local index metadata
    pub fn local(name: impl Into<String>, target: impl Into<String>) -> Self {
        Self::new(name, target, true)
    }

    /// Returns the raw target specification, if present
    pub fn target(&self) -> Option<&str> {
        self.options.get(TARGET_OPTION_NAME).map(String::as_str)
    }

    pub fn is_local(&self) -> bool {
        self.local
    }
}

/// Anything stored under a physical table name
pub trait NamedTable {
    /// Keyspace the table lives in
    fn keyspace_name(&self) -> &str;

    /// Physical table name
    fn table_name(&self) -> &str;
}

/// Base table schema snapshot
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableSchema {
    /// Keyspace name
    pub keyspace: String,
    /// Physical table name
    pub name: String,
    /// Column definitions in declaration order
    pub columns: Vec<ColumnDef>,
    /// Declared secondary indexes
    #[serde(default)]
    pub indexes: Vec<IndexMetadata>,
}

impl TableSchema {
    /// Create a new table schema without indexes
    pub fn new(keyspace: impl Into<String>, name: impl Into<String>, columns: Vec<ColumnDef>) -> Self {
        Self {
            keyspace: keyspace.into(),
            name: name.into(),
            columns,
            indexes: Vec::new(),
        }
    }

    /// Builder-style variant of [`TableSchema::add_index`]
    pub fn with_index(mut self, index: IndexMetadata) -> Self {
        self.add_index(index);
        self
    }

    /// Declares an index, replacing any index of the same name
    pub fn add_index(&mut self, index: IndexMetadata) {
        match self.indexes.iter_mut().find(|im| im.name == index.name) {
            Some(existing) => *existing = index,
            None => self.indexes.push(index),
        }
    }

    /// Removes a declared index
    pub fn drop_index(&mut self, name: &str) -> Option<IndexMetadata> {
        let pos = self.indexes.iter().position(|im| im.name == name)?;
        Some(self.indexes.remove(pos))
    }

    /// Partition key columns in key order
    pub fn partition_key_columns(&self) -> Vec<&ColumnDef> {
        self.key_columns(ColumnKind::PartitionKey)
    }

    /// Clustering key columns in key order
    pub fn clustering_key_columns(&self) -> Vec<&ColumnDef> {
        self.key_columns(ColumnKind::ClusteringKey)
    }

    /// Regular columns in declaration order
    pub fn regular_columns(&self) -> Vec<&ColumnDef> {
        self.columns
            .iter()
            .filter(|c| c.kind == ColumnKind::Regular)
            .collect()
    }

    fn key_columns(&self, kind: ColumnKind) -> Vec<&ColumnDef> {
        let mut cols: Vec<&ColumnDef> = self.columns.iter().filter(|c| c.kind == kind).collect();
        cols.sort_by_key(|c| c.position);
        cols
    }

    /// Looks up a column by name
    pub fn column(&self, name: &str) -> Option<&ColumnDef> {
        self.columns.iter().find(|c| c.name == name)
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.column(name).is_some()
    }

    /// All currently declared indexes
    pub fn all_indices(&self) -> impl Iterator<Item = &IndexMetadata> {
        self.indexes.iter()
    }

    /// Looks up a declared index by name
    pub fn index(&self, name: &str) -> Option<&IndexMetadata> {
        self.indexes.iter().find(|im| im.name == name)
    }

    /// Validates the table structure itself
    pub fn validate_structure(&self) -> Result<(), String> {
        if self.partition_key_columns().is_empty() {
            return Err(format!("Table '{}' has no partition key", self.name));
        }

        let mut seen = HashSet::new();
        for col in &self.columns {
            if !seen.insert(col.name.as_str()) {
                return Err(format!("Duplicate column '{}' in table '{}'", col.name, self.name));
            }
        }

        let mut seen = HashSet::new();
        for im in &self.indexes {
            if !seen.insert(im.name.as_str()) {
                return Err(format!("Duplicate index '{}' on table '{}'", im.name, self.name));
            }
        }

        Ok(())
    }
}

impl NamedTable for TableSchema {
    fn keyspace_name(&self) -> &str {
        &self.keyspace
    }

    fn table_name(&self) -> &str {
        &self.name
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_table() -> TableSchema {
        TableSchema::new(
            "ks",
            "users",
            vec![
                ColumnDef::regular("email", ColumnType::Text),
                ColumnDef::clustering_key("c2", ColumnType::Int, 1),
                ColumnDef::partition_key("p", ColumnType::Uuid, 0),
                ColumnDef::clustering_key("c1", ColumnType::Int, 0),
                ColumnDef::regular("tags", ColumnType::set(ColumnType::Text)),
            ],
        )
    }

    #[test]
    fn test_key_columns_sorted_by_position() {
        let table = sample_table();
        let ck: Vec<&str> = table.clustering_key_columns().iter().map(|c| c.name.as_str()).collect();
        assert_eq!(ck, vec!["c1", "c2"]);

        let pk: Vec<&str> = table.partition_key_columns().iter().map(|c| c.name.as_str()).collect();
        assert_eq!(pk, vec!["p"]);
    }

    #[test]
    fn test_regular_columns_keep_declaration_order() {
        let table = sample_table();
        let regular: Vec<&str> = table.regular_columns().iter().map(|c| c.name.as_str()).collect();
        assert_eq!(regular, vec!["email", "tags"]);
    }

    #[test]
    fn test_structure_requires_partition_key() {
        let table = TableSchema::new("ks", "t", vec![ColumnDef::regular("v", ColumnType::Int)]);
        let result = table.validate_structure();
        assert!(result.is_err());
        assert!(result.unwrap_err().contains("partition key"));
    }

    #[test]
    fn test_structure_rejects_duplicate_columns() {
        let table = TableSchema::new(
            "ks",
            "t",
            vec![
                ColumnDef::partition_key("p", ColumnType::Int, 0),
                ColumnDef::regular("p", ColumnType::Text),
            ],
        );
        assert!(table.validate_structure().unwrap_err().contains("Duplicate column"));
    }

    #[test]
    fn test_add_index_replaces_same_name() {
        let mut table = sample_table();
        table.add_index(IndexMetadata::global("by_email", "email"));
        table.add_index(IndexMetadata::global("by_email", "tags"));

        assert_eq!(table.indexes.len(), 1);
        assert_eq!(table.index("by_email").unwrap().target(), Some("tags"));

        assert!(table.drop_index("by_email").is_some());
        assert!(table.drop_index("by_email").is_none());
    }

    #[test]
    fn test_column_type_display() {
        assert_eq!(ColumnType::map(ColumnType::Text, ColumnType::Int).to_string(), "map<text, int>");
        assert_eq!(ColumnType::set(ColumnType::Uuid).frozen().to_string(), "frozen<set<uuid>>");
        assert_eq!(
            ColumnType::tuple(vec![ColumnType::Text, ColumnType::BigInt]).to_string(),
            "tuple<text, bigint>"
        );
    }

    #[test]
    fn test_multi_cell_only_for_unfrozen_collections() {
        assert!(ColumnType::list(ColumnType::Int).is_multi_cell());
        assert!(!ColumnType::list(ColumnType::Int).frozen().is_multi_cell());
        assert!(!ColumnType::Text.is_multi_cell());
    }

    #[test]
    fn test_table_json_round_trip() {
        let table = sample_table().with_index(IndexMetadata::local("by_email", "email"));
        let json = serde_json::to_string(&table).unwrap();
        let parsed: TableSchema = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, table);
    }

    #[test]
    fn test_column_type_json_shape() {
        let parsed: ColumnType =
            serde_json::from_str(r#"{"type":"map","key":{"type":"text"},"value":{"type":"bigint"}}"#).unwrap();
        assert_eq!(parsed, ColumnType::map(ColumnType::Text, ColumnType::BigInt));
    }
}
