//! Backing view derivation
//!
//! Derives the schema of the view that physically stores an index.
//!
//! # Local indexes
//!
//! - Partition key: the base partition key, unchanged
//! - Clustering key: target column, then base clustering columns
//!
//! # Global indexes
//!
//! - Partition key: the target column, or a computed projection of it for
//!   collection targets
//! - Clustering key: token column, base partition key, base clustering key,
//!   and for `values(...)` targets a computed key column last
//!
//! The token column keeps paged index scans in base token order. Its
//! computation (`token_new` vs `token_legacy`) is chosen once, when the index
//! is created, and an existing index never changes mode.

use crate::observability::{log_event_with_fields, Event};
use crate::schema::{ColumnComputation, ColumnDef, ColumnKind, ColumnType, SchemaBuilder, TableSchema, ViewSchemaSpec};

use super::descriptor::IndexDescriptor;
use super::errors::{IndexError, IndexResult};
use super::naming::{ColumnNameAllocator, COLLECTION_COLUMN_ROOT, TOKEN_COLUMN_ROOT, VALUES_DISAMBIGUATION_ROOT};
use super::table_name::encode_table_name;
use super::target::{quote_identifier, IndexTargetKind};

/// Builds backing view schemas for indexes
pub struct ViewSchemaBuilder;

impl ViewSchemaBuilder {
    /// Derives the backing view of `index` over `base`.
    ///
    /// `use_new_token_computation` selects the token column's computation
    /// for a newly created index.
    pub fn build(index: &IndexDescriptor, base: &TableSchema, use_new_token_computation: bool) -> IndexResult<ViewSchemaSpec> {
        let result = derive_view(index, base, use_new_token_computation);

        match &result {
            Ok(view) => log_event_with_fields(
                Event::BackingViewDerived,
                &[
                    ("index", index.name()),
                    ("table", base.name.as_str()),
                    ("view", view.table_name.as_str()),
                    ("token_computation", if use_new_token_computation { "new" } else { "legacy" }),
                ],
            ),
            Err(e) => {
                let event = if e.is_fatal() {
                    Event::InvariantViolated
                } else {
                    Event::IndexDefinitionRejected
                };
                log_event_with_fields(event, &[("index", index.name()), ("reason", e.message())]);
            }
        }

        result
    }
}

fn derive_view(index: &IndexDescriptor, base: &TableSchema, use_new_token_computation: bool) -> IndexResult<ViewSchemaSpec> {
    let target = base.column(index.target_column()).ok_or_else(|| {
        IndexError::invalid_definition(
            index.name(),
            format!("target column '{}' does not exist in '{}'", index.target_column(), base.name),
        )
    })?;
    let target_kind = index.target_kind();
    check_target_type(index, target)?;

    let mut names = ColumnNameAllocator::new(base);
    let mut builder = SchemaBuilder::new(&base.keyspace, encode_table_name(index.name()));

    if index.is_local() {
        if target.is_partition_key() {
            return Err(IndexError::invalid_definition(
                index.name(),
                "Local indexing based on partition key column is not allowed, since whole base \
                 partition key must be used in queries anyway. Use global indexing instead.",
            ));
        }
        for col in base.partition_key_columns() {
            builder.with_column(&col.name, &col.column_type, ColumnKind::PartitionKey);
        }
        builder.with_column(&target.name, &target.column_type, ColumnKind::ClusteringKey);
    } else {
        match target_kind {
            IndexTargetKind::RegularValue => {
                builder.with_column(&target.name, &target.column_type, ColumnKind::PartitionKey);
            }
            IndexTargetKind::CollectionKeys | IndexTargetKind::CollectionValues | IndexTargetKind::CollectionEntries => {
                let name = names.allocate(COLLECTION_COLUMN_ROOT);
                let column_type = type_for_computed_column(target_kind, &target.column_type)?;
                let computation = collection_computation(target_kind, &target.name)?;
                builder.with_computed_column(&name, column_type, ColumnKind::PartitionKey, computation);
            }
        }

        let token_name = names.allocate(TOKEN_COLUMN_ROOT);
        let (token_type, token_computation) = if use_new_token_computation {
            (ColumnType::BigInt, ColumnComputation::TokenNew)
        } else {
            (ColumnType::Blob, ColumnComputation::TokenLegacy)
        };
        builder.with_computed_column(&token_name, token_type, ColumnKind::ClusteringKey, token_computation);

        for col in base.partition_key_columns() {
            if col.name == target.name {
                continue;
            }
            builder.with_column(&col.name, &col.column_type, ColumnKind::ClusteringKey);
        }
    }

    for col in base.clustering_key_columns() {
        if col.name == target.name {
            continue;
        }
        builder.with_column(&col.name, &col.column_type, ColumnKind::ClusteringKey);
    }

    // Two equal values under different keys would otherwise share a view
    // primary key and merge their liveness.
    if !index.is_local() && target_kind == IndexTargetKind::CollectionValues {
        let name = names.allocate(VALUES_DISAMBIGUATION_ROOT);
        let column_type = type_for_computed_column(IndexTargetKind::CollectionKeys, &target.column_type)?;
        let computation = collection_computation(IndexTargetKind::CollectionKeys, &target.name)?;
        builder.with_computed_column(&name, column_type, ColumnKind::ClusteringKey, computation);
    }

    if target.is_primary_key() {
        for def in base.regular_columns() {
            builder.with_virtual_column(&def.name, &def.column_type);
        }
    }

    let where_clause = format!("{} IS NOT NULL", quote_identifier(&target.name));
    builder.with_view_info(base, false, where_clause);
    Ok(builder.build()?)
}

/// Rejects target kinds the column's type cannot be projected into.
fn check_target_type(index: &IndexDescriptor, target: &ColumnDef) -> IndexResult<()> {
    let kind = index.target_kind();
    let ty = &target.column_type;

    let problem = match kind {
        IndexTargetKind::RegularValue if ty.is_multi_cell() => Some(format!(
            "non-frozen collection '{}' ({}) must be indexed through keys(), values() or entries()",
            target.name, ty
        )),
        IndexTargetKind::RegularValue => None,
        _ if index.is_local() => Some(format!("local indexes cannot target {}({})", kind, target.name)),
        _ if !ty.is_collection() => Some(format!(
            "{}() requires a collection column, '{}' is {}",
            kind, target.name, ty
        )),
        _ if !ty.is_multi_cell() => Some(format!(
            "{}() requires a non-frozen collection, '{}' is {}",
            kind, target.name, ty
        )),
        IndexTargetKind::CollectionEntries if !matches!(ty, ColumnType::Map { .. }) => Some(format!(
            "entries() requires a map, '{}' is {}",
            target.name, ty
        )),
        IndexTargetKind::CollectionKeys | IndexTargetKind::CollectionValues | IndexTargetKind::CollectionEntries => None,
    };

    match problem {
        Some(reason) => Err(IndexError::invalid_definition(index.name(), reason)),
        None => Ok(()),
    }
}

/// Type of the computed column projecting `collection` per `kind`.
fn type_for_computed_column(kind: IndexTargetKind, collection: &ColumnType) -> IndexResult<ColumnType> {
    let projected = match (kind, collection) {
        (IndexTargetKind::RegularValue, _) => {
            return Err(IndexError::invariant_violation(
                "reached regular values when only collection index target types were expected",
            ))
        }
        (IndexTargetKind::CollectionKeys, ColumnType::Map { key, .. }) => Some(key.as_ref().clone()),
        (IndexTargetKind::CollectionKeys, ColumnType::Set { element, .. }) => Some(element.as_ref().clone()),
        (IndexTargetKind::CollectionKeys, ColumnType::List { .. }) => Some(ColumnType::TimeUuid),
        (IndexTargetKind::CollectionValues, ColumnType::Map { value, .. }) => Some(value.as_ref().clone()),
        (IndexTargetKind::CollectionValues, ColumnType::Set { element, .. })
        | (IndexTargetKind::CollectionValues, ColumnType::List { element, .. }) => Some(element.as_ref().clone()),
        (IndexTargetKind::CollectionEntries, ColumnType::Map { key, value, .. }) => {
            Some(ColumnType::tuple(vec![key.as_ref().clone(), value.as_ref().clone()]))
        }
        _ => None,
    };

    projected.ok_or_else(|| {
        IndexError::invariant_violation(format!("cannot project {} out of {}", kind, collection))
    })
}

fn collection_computation(kind: IndexTargetKind, source: &str) -> IndexResult<ColumnComputation> {
    let source = source.to_string();
    match kind {
        IndexTargetKind::CollectionKeys => Ok(ColumnComputation::CollectionKeys { source }),
        IndexTargetKind::CollectionValues => Ok(ColumnComputation::CollectionValues { source }),
        IndexTargetKind::CollectionEntries => Ok(ColumnComputation::CollectionEntries { source }),
        IndexTargetKind::RegularValue => Err(IndexError::invariant_violation(format!(
            "invalid target kind {} for a collection computation",
            kind
        ))),
    }
}
