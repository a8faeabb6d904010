//! Collision-free names for synthesized view columns

use std::collections::HashSet;

use crate::schema::TableSchema;

/// Root of the token-ordering column name
pub const TOKEN_COLUMN_ROOT: &str = "idx_token";
/// Root of the computed collection-projection column name
pub const COLLECTION_COLUMN_ROOT: &str = "coll_value";
/// Root of the key column that keeps equal collection values apart
pub const VALUES_DISAMBIGUATION_ROOT: &str = "coll_keys_for_values_index";

/// Allocates column names that clash neither with the base schema nor with
/// each other within one view derivation.
#[derive(Debug)]
pub struct ColumnNameAllocator<'a> {
    schema: &'a TableSchema,
    allocated: HashSet<String>,
}

impl<'a> ColumnNameAllocator<'a> {
    pub fn new(schema: &'a TableSchema) -> Self {
        Self {
            schema,
            allocated: HashSet::new(),
        }
    }

    fn is_taken(&self, name: &str) -> bool {
        self.schema.has_column(name) || self.allocated.contains(name)
    }

    /// Returns `root`, or `root_1`, `root_2`, ... whichever is free first.
    pub fn allocate(&mut self, root: &str) -> String {
        let mut candidate = root.to_string();
        let mut i = 0u32;
        while self.is_taken(&candidate) {
            i += 1;
            candidate = format!("{}_{}", root, i);
        }
        self.allocated.insert(candidate.clone());
        candidate
    }
}

/// One-shot allocation against the base schema alone.
pub fn available_column_name(schema: &TableSchema, root: &str) -> String {
    ColumnNameAllocator::new(schema).allocate(root)
}
