//! sidx - secondary index backing-view management
//!
//! Derives the physical schema of the views that back a table's secondary
//! indexes and keeps the per-table index registry in sync with metadata.

pub mod cli;
pub mod index;
pub mod observability;
pub mod schema;
