//! Index descriptor: one declared index bound to its parsed target

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::schema::{ColumnDef, IndexMetadata};

use super::errors::{IndexError, IndexResult};
use super::target::{parse_target, IndexTargetKind};

/// Relational operator of a single-column restriction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Operator {
    Eq,
    Neq,
    Lt,
    Lte,
    Gt,
    Gte,
    In,
    Contains,
    ContainsKey,
    Like,
    IsNot,
}

impl Operator {
    /// All operators, in declaration order
    pub const ALL: [Operator; 11] = [
        Operator::Eq,
        Operator::Neq,
        Operator::Lt,
        Operator::Lte,
        Operator::Gt,
        Operator::Gte,
        Operator::In,
        Operator::Contains,
        Operator::ContainsKey,
        Operator::Like,
        Operator::IsNot,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Operator::Eq => "=",
            Operator::Neq => "!=",
            Operator::Lt => "<",
            Operator::Lte => "<=",
            Operator::Gt => ">",
            Operator::Gte => ">=",
            Operator::In => "IN",
            Operator::Contains => "CONTAINS",
            Operator::ContainsKey => "CONTAINS KEY",
            Operator::Like => "LIKE",
            Operator::IsNot => "IS NOT",
        }
    }

    /// Parses an operator from its CQL spelling or its upper snake-case name
    pub fn parse(s: &str) -> Option<Self> {
        let normalized = s.trim().to_ascii_uppercase().replace('_', " ");
        Self::ALL.into_iter().find(|op| {
            op.as_str() == normalized
                || format!("{:?}", op).to_ascii_uppercase() == normalized.replace(' ', "")
        })
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A declared index together with its parsed target.
///
/// The target fields are derived from `metadata` at construction and never
/// updated on their own; a metadata change means building a new descriptor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexDescriptor {
    metadata: IndexMetadata,
    target_kind: IndexTargetKind,
    target_column: String,
}

impl IndexDescriptor {
    /// Binds `metadata` to the parse of `raw_target`.
    pub fn new(raw_target: &str, metadata: IndexMetadata) -> IndexResult<Self> {
        let parsed = parse_target(raw_target)
            .map_err(|e| IndexError::invalid_target(&metadata.name, e.to_string()))?;
        Ok(Self {
            metadata,
            target_kind: parsed.kind,
            target_column: parsed.column,
        })
    }

    /// Builds a descriptor from the metadata's own `target` option.
    pub fn from_metadata(metadata: IndexMetadata) -> IndexResult<Self> {
        let raw_target = metadata
            .target()
            .ok_or_else(|| IndexError::invalid_target(&metadata.name, "missing 'target' option"))?
            .to_string();
        Self::new(&raw_target, metadata)
    }

    pub fn metadata(&self) -> &IndexMetadata {
        &self.metadata
    }

    pub fn name(&self) -> &str {
        &self.metadata.name
    }

    pub fn is_local(&self) -> bool {
        self.metadata.is_local()
    }

    pub fn target_kind(&self) -> IndexTargetKind {
        self.target_kind
    }

    pub fn target_column(&self) -> &str {
        &self.target_column
    }

    /// Whether altering or dropping `column` affects this index
    pub fn depends_on(&self, column: &ColumnDef) -> bool {
        column.name == self.target_column
    }

    /// Whether a restriction `column <op> ...` can be answered by this index
    pub fn supports_expression(&self, column: &ColumnDef, op: Operator) -> bool {
        if column.name != self.target_column {
            return false;
        }
        supports(self.target_kind, op)
    }
}

fn supports(kind: IndexTargetKind, op: Operator) -> bool {
    match (op, kind) {
        (Operator::Eq, IndexTargetKind::RegularValue) => true,
        (Operator::Contains, IndexTargetKind::CollectionValues) => true,
        (Operator::ContainsKey, IndexTargetKind::CollectionKeys) => true,
        (
            Operator::Eq
            | Operator::Neq
            | Operator::Lt
            | Operator::Lte
            | Operator::Gt
            | Operator::Gte
            | Operator::In
            | Operator::Contains
            | Operator::ContainsKey
            | Operator::Like
            | Operator::IsNot,
            IndexTargetKind::RegularValue
            | IndexTargetKind::CollectionKeys
            | IndexTargetKind::CollectionValues
            | IndexTargetKind::CollectionEntries,
        ) => false,
    }
}
