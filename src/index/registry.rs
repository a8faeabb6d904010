//! Index Registry
//!
//! Holds the descriptors of every index declared on one table.
//!
//! # API
//!
//! - `reload()` - Resynchronize with the table's declared indexes
//! - `add_index(metadata)` - Insert or replace one descriptor
//! - `list_indexes()` / `get(name)` - Read descriptors
//! - `get_dependent_indices(column)` - Indexes affected by a column change
//! - `is_index(table)` / `is_global_index(table)` - Backing view detection
//!
//! Mutation takes `&mut self`; the owner serializes schema changes and
//! shares the registry read-only in between.

use std::collections::BTreeMap;

use crate::observability::{log_event_with_fields, Event};
use crate::schema::{ColumnDef, IndexMetadata, NamedTable, TableSchema, ViewSchemaSpec};

use super::descriptor::IndexDescriptor;
use super::errors::IndexResult;
use super::table_name::encode_table_name;
use super::view_builder::ViewSchemaBuilder;

/// Registry of the indexes attached to a table
#[derive(Debug, Clone)]
pub struct IndexRegistry {
    /// Current snapshot of the owning table
    schema: TableSchema,
    /// Descriptors by index name
    indices: BTreeMap<String, IndexDescriptor>,
}

impl IndexRegistry {
    /// Creates an empty registry over `schema`; call `reload` to populate it.
    pub fn new(schema: TableSchema) -> Self {
        Self {
            schema,
            indices: BTreeMap::new(),
        }
    }

    /// Creates a registry already synchronized with `schema`.
    pub fn load(schema: TableSchema) -> IndexResult<Self> {
        let mut registry = Self::new(schema);
        registry.reload()?;
        Ok(registry)
    }

    /// The table snapshot the registry reads on `reload`
    pub fn schema(&self) -> &TableSchema {
        &self.schema
    }

    /// Replaces the table snapshot. Descriptors are untouched until `reload`.
    pub fn set_schema(&mut self, schema: TableSchema) {
        self.schema = schema;
    }

    /// Resynchronizes descriptors with the table's declared indexes.
    ///
    /// Indexes no longer declared are dropped and every declared index is
    /// (re)inserted. All targets are parsed before anything changes, so a
    /// failure leaves the registry as it was.
    pub fn reload(&mut self) -> IndexResult<()> {
        let desired = match self.desired_descriptors() {
            Ok(desired) => desired,
            Err(e) => {
                log_event_with_fields(
                    Event::IndexReloadFailed,
                    &[("table", self.schema.name.as_str()), ("reason", e.message())],
                );
                return Err(e);
            }
        };

        let stale: Vec<String> = self
            .indices
            .keys()
            .filter(|name| !desired.contains_key(*name))
            .cloned()
            .collect();
        for name in &stale {
            self.indices.remove(name);
            log_event_with_fields(
                Event::IndexDropped,
                &[("index", name.as_str()), ("table", self.schema.name.as_str())],
            );
        }

        for (name, descriptor) in desired {
            if self.indices.get(&name) != Some(&descriptor) {
                log_event_with_fields(
                    Event::IndexRegistered,
                    &[("index", name.as_str()), ("table", self.schema.name.as_str())],
                );
            }
            self.indices.insert(name, descriptor);
        }

        let count = self.indices.len().to_string();
        let dropped = stale.len().to_string();
        log_event_with_fields(
            Event::IndexReloadComplete,
            &[
                ("table", self.schema.name.as_str()),
                ("indexes", count.as_str()),
                ("dropped", dropped.as_str()),
            ],
        );
        Ok(())
    }

    fn desired_descriptors(&self) -> IndexResult<BTreeMap<String, IndexDescriptor>> {
        self.schema
            .all_indices()
            .map(|im| -> IndexResult<(String, IndexDescriptor)> {
                let descriptor = IndexDescriptor::from_metadata(im.clone())?;
                Ok((im.name.clone(), descriptor))
            })
            .collect()
    }

    /// Parses `metadata`'s target and inserts the descriptor, replacing any
    /// descriptor of the same name.
    pub fn add_index(&mut self, metadata: &IndexMetadata) -> IndexResult<()> {
        let descriptor = IndexDescriptor::from_metadata(metadata.clone())?;
        log_event_with_fields(
            Event::IndexRegistered,
            &[("index", metadata.name.as_str()), ("table", self.schema.name.as_str())],
        );
        self.indices.insert(metadata.name.clone(), descriptor);
        Ok(())
    }

    /// Looks up a descriptor by index name
    pub fn get(&self, name: &str) -> Option<&IndexDescriptor> {
        self.indices.get(name)
    }

    pub fn len(&self) -> usize {
        self.indices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }

    /// Registered index names, sorted
    pub fn index_names(&self) -> Vec<&str> {
        self.indices.keys().map(String::as_str).collect()
    }

    /// All descriptors
    pub fn list_indexes(&self) -> Vec<IndexDescriptor> {
        self.indices.values().cloned().collect()
    }

    /// Metadata of every index that depends on `column`
    pub fn get_dependent_indices(&self, column: &ColumnDef) -> Vec<IndexMetadata> {
        self.indices
            .values()
            .filter(|index| index.depends_on(column))
            .map(|index| index.metadata().clone())
            .collect()
    }

    /// Whether `table` is the backing view of a registered index
    pub fn is_index<T: NamedTable + ?Sized>(&self, table: &T) -> bool {
        self.indices
            .values()
            .any(|index| table.table_name() == encode_table_name(index.name()))
    }

    /// Whether `table` is the backing view of a registered global index
    pub fn is_global_index<T: NamedTable + ?Sized>(&self, table: &T) -> bool {
        self.indices
            .values()
            .any(|index| !index.is_local() && table.table_name() == encode_table_name(index.name()))
    }

    /// Derives the backing view for `metadata` against the current table snapshot.
    pub fn create_view_for_index(
        &self,
        metadata: &IndexMetadata,
        use_new_token_computation: bool,
    ) -> IndexResult<ViewSchemaSpec> {
        let descriptor = IndexDescriptor::from_metadata(metadata.clone())?;
        ViewSchemaBuilder::build(&descriptor, &self.schema, use_new_token_computation)
    }
}
