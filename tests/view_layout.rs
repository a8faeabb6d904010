//! Backing View Layout Tests
//!
//! Tests for backing view derivation:
//! - Global views are partitioned by the indexed value, ordered by token
//! - Local views keep the base partition
//! - Collection targets are projected through computed columns
//! - Synthesized names never collide with base columns
//! - Rejected definitions produce no view

use sidx::index::{IndexDescriptor, IndexErrorCode, ViewSchemaBuilder};
use sidx::schema::{
    ColumnComputation, ColumnDef, ColumnType, IndexMetadata, TableSchema, ViewColumn, ViewSchemaSpec,
};

// =============================================================================
// Helper Functions
// =============================================================================

/// pk [p], ck [c1, c2], regular v plus one collection of each kind
fn base_table() -> TableSchema {
    TableSchema::new(
        "shop",
        "orders",
        vec![
            ColumnDef::partition_key("p", ColumnType::Uuid, 0),
            ColumnDef::clustering_key("c1", ColumnType::Timestamp, 0),
            ColumnDef::clustering_key("c2", ColumnType::Int, 1),
            ColumnDef::regular("v", ColumnType::Text),
            ColumnDef::regular("prices", ColumnType::map(ColumnType::Text, ColumnType::Double)),
            ColumnDef::regular("labels", ColumnType::set(ColumnType::Ascii)),
            ColumnDef::regular("events", ColumnType::list(ColumnType::Text)),
            ColumnDef::regular("frozen_labels", ColumnType::set(ColumnType::Ascii).frozen()),
        ],
    )
}

fn derive(table: &TableSchema, metadata: IndexMetadata) -> ViewSchemaSpec {
    let descriptor = IndexDescriptor::from_metadata(metadata).unwrap();
    ViewSchemaBuilder::build(&descriptor, table, true).unwrap()
}

fn derive_err(table: &TableSchema, metadata: IndexMetadata) -> IndexErrorCode {
    let descriptor = IndexDescriptor::from_metadata(metadata).unwrap();
    ViewSchemaBuilder::build(&descriptor, table, true).unwrap_err().code()
}

// =============================================================================
// Global Index Tests
// =============================================================================

/// Global index on a regular column.
#[test]
fn test_global_regular_column() {
    let view = derive(&base_table(), IndexMetadata::global("by_v", "v"));

    assert_eq!(view.table_name, "by_v_index");
    assert_eq!(view.partition_key_names(), vec!["v"]);
    assert_eq!(view.clustering_key_names(), vec!["idx_token", "p", "c1", "c2"]);
    assert_eq!(view.filter_clause, "v IS NOT NULL");
    assert!(!view.include_all_columns);
    assert_eq!(view.base_table_ref.keyspace, "shop");
    assert_eq!(view.base_table_ref.table, "orders");
}

/// Legacy token computation uses a blob column.
#[test]
fn test_legacy_token_column() {
    let descriptor = IndexDescriptor::from_metadata(IndexMetadata::global("by_v", "v")).unwrap();
    let view = ViewSchemaBuilder::build(&descriptor, &base_table(), false).unwrap();

    let token = view.key_column("idx_token").unwrap();
    assert_eq!(token.column_type(), &ColumnType::Blob);
    assert_eq!(token.computation(), Some(&ColumnComputation::TokenLegacy));
}

/// Global index on a clustering column drops it from the clustering key and
/// replicates every regular column as virtual.
#[test]
fn test_global_clustering_column() {
    let view = derive(&base_table(), IndexMetadata::global("by_c2", "c2"));

    assert_eq!(view.partition_key_names(), vec!["c2"]);
    assert_eq!(view.clustering_key_names(), vec!["idx_token", "p", "c1"]);

    let virtual_names: Vec<&str> = view
        .virtual_regular_columns
        .iter()
        .map(|c| c.name.as_str())
        .collect();
    assert_eq!(
        virtual_names,
        vec!["v", "prices", "labels", "events", "frozen_labels"]
    );
}

/// Global index on a partition key column.
#[test]
fn test_global_partition_key_column() {
    let view = derive(&base_table(), IndexMetadata::global("by_p", "p"));

    assert_eq!(view.partition_key_names(), vec!["p"]);
    assert_eq!(view.clustering_key_names(), vec!["idx_token", "c1", "c2"]);
    assert!(!view.virtual_regular_columns.is_empty());
}

/// Frozen collections are indexed as plain values.
#[test]
fn test_frozen_collection_is_regular_value() {
    let view = derive(&base_table(), IndexMetadata::global("by_frozen", "frozen_labels"));

    assert_eq!(view.partition_key_names(), vec!["frozen_labels"]);
    assert!(!view.partition_key[0].is_computed());
}

// =============================================================================
// Collection Projection Tests
// =============================================================================

/// keys() of a map is partitioned by a computed key column.
#[test]
fn test_map_keys() {
    let view = derive(&base_table(), IndexMetadata::global("price_keys", "keys(prices)"));

    assert_eq!(view.partition_key_names(), vec!["coll_value"]);
    let pk = &view.partition_key[0];
    assert_eq!(pk.column_type(), &ColumnType::Text);
    assert_eq!(
        pk.computation(),
        Some(&ColumnComputation::CollectionKeys { source: "prices".to_string() })
    );
    assert_eq!(view.clustering_key_names(), vec!["idx_token", "p", "c1", "c2"]);
    assert_eq!(view.filter_clause, "prices IS NOT NULL");
}

/// values() of a map ends the clustering key with the map key.
#[test]
fn test_map_values_disambiguation() {
    let view = derive(&base_table(), IndexMetadata::global("price_values", "values(prices)"));

    assert_eq!(view.partition_key[0].column_type(), &ColumnType::Double);
    assert_eq!(
        view.clustering_key_names(),
        vec!["idx_token", "p", "c1", "c2", "coll_keys_for_values_index"]
    );

    let last = view.clustering_key.last().unwrap();
    assert_eq!(last.column_type(), &ColumnType::Text);
    assert_eq!(
        last.computation(),
        Some(&ColumnComputation::CollectionKeys { source: "prices".to_string() })
    );
}

/// values() of a list disambiguates by the list's timeuuid keys.
#[test]
fn test_list_values() {
    let view = derive(&base_table(), IndexMetadata::global("event_values", "values(events)"));

    assert_eq!(view.partition_key[0].column_type(), &ColumnType::Text);
    let last = view.clustering_key.last().unwrap();
    assert_eq!(last.name(), "coll_keys_for_values_index");
    assert_eq!(last.column_type(), &ColumnType::TimeUuid);
}

/// keys() and values() of a set both project the element type.
#[test]
fn test_set_projections() {
    let keys = derive(&base_table(), IndexMetadata::global("label_keys", "keys(labels)"));
    let values = derive(&base_table(), IndexMetadata::global("label_values", "values(labels)"));

    assert_eq!(keys.partition_key[0].column_type(), &ColumnType::Ascii);
    assert_eq!(values.partition_key[0].column_type(), &ColumnType::Ascii);
}

/// entries() of a map projects a (key, value) tuple.
#[test]
fn test_map_entries() {
    let view = derive(&base_table(), IndexMetadata::global("price_entries", "entries(prices)"));

    assert_eq!(
        view.partition_key[0].column_type(),
        &ColumnType::tuple(vec![ColumnType::Text, ColumnType::Double])
    );
    assert_eq!(view.clustering_key_names(), vec!["idx_token", "p", "c1", "c2"]);
}

// =============================================================================
// Local Index Tests
// =============================================================================

/// Local index keeps the base partition key and clusters by target first.
#[test]
fn test_local_regular_column() {
    let view = derive(&base_table(), IndexMetadata::local("local_v", "v"));

    assert_eq!(view.partition_key_names(), vec!["p"]);
    assert_eq!(view.clustering_key_names(), vec!["v", "c1", "c2"]);
    assert!(view.key_column("idx_token").is_none());
    assert!(view.virtual_regular_columns.is_empty());
}

/// Local index on a clustering column does not repeat it.
#[test]
fn test_local_clustering_column() {
    let view = derive(&base_table(), IndexMetadata::local("local_c2", "c2"));

    assert_eq!(view.clustering_key_names(), vec!["c2", "c1"]);
}

/// Local target given in the JSON form.
#[test]
fn test_local_json_target() {
    let view = derive(&base_table(), IndexMetadata::local("local_json", r#"{"pk":["p"],"ck":["v"]}"#));

    assert_eq!(view.clustering_key_names(), vec!["v", "c1", "c2"]);
}

// =============================================================================
// Naming Tests
// =============================================================================

/// Synthesized columns skip names the base table already uses.
#[test]
fn test_synthesized_names_avoid_base_columns() {
    let table = TableSchema::new(
        "ks",
        "t",
        vec![
            ColumnDef::partition_key("p", ColumnType::Int, 0),
            ColumnDef::regular("idx_token", ColumnType::Int),
            ColumnDef::regular("idx_token_1", ColumnType::Int),
            ColumnDef::regular("coll_value", ColumnType::Int),
            ColumnDef::regular("m", ColumnType::map(ColumnType::Int, ColumnType::Text)),
        ],
    );

    let view = derive(&table, IndexMetadata::global("m_values", "values(m)"));

    assert_eq!(view.partition_key_names(), vec!["coll_value_1"]);
    assert_eq!(
        view.clustering_key_names(),
        vec!["idx_token_2", "p", "coll_keys_for_values_index"]
    );
}

/// Upper-case target names are quoted in the filter clause.
#[test]
fn test_filter_clause_quotes_identifiers() {
    let table = TableSchema::new(
        "ks",
        "t",
        vec![
            ColumnDef::partition_key("p", ColumnType::Int, 0),
            ColumnDef::regular("Email", ColumnType::Text),
        ],
    );

    let view = derive(&table, IndexMetadata::global("by_email", "\"Email\""));
    assert_eq!(view.filter_clause, "\"Email\" IS NOT NULL");
    assert_eq!(view.partition_key_names(), vec!["Email"]);
}

/// Reserved-keyword target names are quoted in the filter clause.
#[test]
fn test_filter_clause_quotes_reserved_keywords() {
    let table = TableSchema::new(
        "ks",
        "t",
        vec![
            ColumnDef::partition_key("p", ColumnType::Int, 0),
            ColumnDef::regular("select", ColumnType::Text),
        ],
    );

    let view = derive(&table, IndexMetadata::global("s", "select"));
    assert_eq!(view.filter_clause, "\"select\" IS NOT NULL");
    assert_eq!(view.partition_key_names(), vec!["select"]);
}

// =============================================================================
// Rejection Tests
// =============================================================================

/// Local index on a partition key column is rejected.
#[test]
fn test_local_partition_key_rejected() {
    assert_eq!(
        derive_err(&base_table(), IndexMetadata::local("local_p", "p")),
        IndexErrorCode::InvalidIndexDefinition
    );
}

/// Unknown target column is rejected.
#[test]
fn test_missing_column_rejected() {
    assert_eq!(
        derive_err(&base_table(), IndexMetadata::global("ghost", "ghost")),
        IndexErrorCode::InvalidIndexDefinition
    );
}

/// Type mismatches between target kind and column type are rejected.
#[test]
fn test_type_mismatches_rejected() {
    let table = base_table();
    for metadata in [
        IndexMetadata::global("plain_map", "prices"),
        IndexMetadata::global("set_entries", "entries(labels)"),
        IndexMetadata::global("keys_of_text", "keys(v)"),
        IndexMetadata::global("keys_of_frozen", "keys(frozen_labels)"),
        IndexMetadata::local("local_keys", "keys(prices)"),
    ] {
        let name = metadata.name.clone();
        assert_eq!(
            derive_err(&table, metadata),
            IndexErrorCode::InvalidIndexDefinition,
            "{} should be rejected",
            name
        );
    }
}

// =============================================================================
// Determinism Tests
// =============================================================================

/// Same inputs derive the same view, and the view round-trips through JSON.
#[test]
fn test_derivation_is_deterministic() {
    let table = base_table();
    let first = derive(&table, IndexMetadata::global("price_values", "values(prices)"));

    for _ in 0..20 {
        assert_eq!(derive(&table, IndexMetadata::global("price_values", "values(prices)")), first);
    }

    let json = serde_json::to_string(&first).unwrap();
    let decoded: ViewSchemaSpec = serde_json::from_str(&json).unwrap();
    assert_eq!(decoded, first);
    assert!(matches!(decoded.clustering_key[1], ViewColumn::Base { .. }));
}
