//! Table and backing-view schema model
//!
//! Base table schemas are read-only snapshots supplied by the caller.
//! Backing-view schemas are produced by `SchemaBuilder` and never mutated
//! after `build`.

mod builder;
mod errors;
mod loader;
mod types;

pub use builder::{
    BaseTableRef, ColumnComputation, ComputedColumnSpec, SchemaBuilder, ViewColumn, ViewSchemaSpec,
    VirtualColumn,
};
pub use errors::{SchemaError, SchemaErrorCode, SchemaResult};
pub use loader::{read_table_file, SchemaLoader};
pub use types::{
    ColumnDef, ColumnKind, ColumnType, IndexMetadata, NamedTable, TableSchema, TARGET_OPTION_NAME,
};
