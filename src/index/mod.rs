//! Secondary index management
//!
//! Maps a table's declared secondary indexes to the backing views that
//! physically store them.
//!
//! # Design Principles
//!
//! - Derived state: descriptors mirror table metadata, never the source of truth
//! - Pure: no I/O, no threads; callers pass schema snapshots in
//! - Deterministic: same snapshot, same descriptors, same view schema
//!
//! # Invariants
//!
//! - After `reload`, registered names equal the table's declared index names
//! - A descriptor's target is always the parse of its metadata's target option
//! - Synthesized view columns never collide with base columns or each other

mod descriptor;
mod errors;
mod naming;
mod registry;
mod table_name;
mod target;
mod view_builder;

pub use descriptor::{IndexDescriptor, Operator};
pub use errors::{IndexError, IndexErrorCode, IndexResult, Severity};
pub use naming::{
    available_column_name, ColumnNameAllocator, COLLECTION_COLUMN_ROOT, TOKEN_COLUMN_ROOT,
    VALUES_DISAMBIGUATION_ROOT,
};
pub use registry::IndexRegistry;
pub use table_name::{decode_table_name, encode_table_name, BACKING_TABLE_SUFFIX};
pub use target::{format_target, parse_target, quote_identifier, IndexTargetKind, ParsedTarget, TargetParseError};
pub use view_builder::ViewSchemaBuilder;
