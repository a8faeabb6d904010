//! Index target parsing
//!
//! Accepted target forms:
//! - `col` / `"Quoted Col"`: index on the column's value
//! - `keys(col)`, `values(col)`, `entries(col)`: collection projections
//! - `full(col)`: whole frozen collection, indexed as a plain value
//! - `{"pk": [...], "ck": [...]}`: local index; the first `ck` entry is the target

use std::fmt;
use std::sync::OnceLock;

use regex::Regex;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// What part of the target column an index covers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IndexTargetKind {
    /// The column's value as a whole
    RegularValue,
    /// Keys of a collection
    CollectionKeys,
    /// Values of a collection
    CollectionValues,
    /// Key/value pairs of a map
    CollectionEntries,
}

impl IndexTargetKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            IndexTargetKind::RegularValue => "regular_values",
            IndexTargetKind::CollectionKeys => "keys",
            IndexTargetKind::CollectionValues => "values",
            IndexTargetKind::CollectionEntries => "entries",
        }
    }
}

impl fmt::Display for IndexTargetKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Failure to parse a raw target string
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TargetParseError {
    #[error("target is empty")]
    Empty,

    #[error("target names an empty column")]
    EmptyColumn,

    #[error("invalid local index target: {0}")]
    InvalidLocalTarget(String),

    #[error("local index target has no clustering column")]
    MissingLocalColumn,
}

/// Parsed target: the indexed column and how it is projected
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedTarget {
    pub kind: IndexTargetKind,
    pub column: String,
}

#[derive(Debug, Deserialize)]
struct LocalTarget {
    #[serde(default)]
    #[allow(dead_code)]
    pk: Vec<String>,
    #[serde(default)]
    ck: Vec<String>,
}

fn target_regex() -> &'static Regex {
    static TARGET_REGEX: OnceLock<Regex> = OnceLock::new();
    TARGET_REGEX.get_or_init(|| {
        Regex::new(r"^(keys|entries|values|full)\((.+)\)$").expect("target regex is valid")
    })
}

/// Parses a raw target string into its kind and column name.
pub fn parse_target(target: &str) -> Result<ParsedTarget, TargetParseError> {
    let target = target.trim();
    if target.is_empty() {
        return Err(TargetParseError::Empty);
    }

    if target.starts_with('{') {
        let local: LocalTarget = serde_json::from_str(target)
            .map_err(|e| TargetParseError::InvalidLocalTarget(e.to_string()))?;
        let column = local
            .ck
            .into_iter()
            .next()
            .ok_or(TargetParseError::MissingLocalColumn)?;
        return Ok(ParsedTarget {
            kind: IndexTargetKind::RegularValue,
            column: unquote_identifier(&column)?,
        });
    }

    if let Some(caps) = target_regex().captures(target) {
        let kind = match &caps[1] {
            "keys" => IndexTargetKind::CollectionKeys,
            "values" => IndexTargetKind::CollectionValues,
            "entries" => IndexTargetKind::CollectionEntries,
            _ => IndexTargetKind::RegularValue,
        };
        return Ok(ParsedTarget {
            kind,
            column: unquote_identifier(&caps[2])?,
        });
    }

    Ok(ParsedTarget {
        kind: IndexTargetKind::RegularValue,
        column: unquote_identifier(target)?,
    })
}

/// Renders a target back into its textual form.
pub fn format_target(kind: IndexTargetKind, column: &str) -> String {
    let column = quote_identifier(column);
    match kind {
        IndexTargetKind::RegularValue => column,
        other => format!("{}({})", other.as_str(), column),
    }
}

fn unquote_identifier(raw: &str) -> Result<String, TargetParseError> {
    let raw = raw.trim();
    let name = if raw.len() >= 2 && raw.starts_with('"') && raw.ends_with('"') {
        raw[1..raw.len() - 1].replace("\"\"", "\"")
    } else {
        raw.to_string()
    };
    if name.is_empty() {
        return Err(TargetParseError::EmptyColumn);
    }
    Ok(name)
}

/// Reserved CQL keywords, lowercase and sorted. These cannot appear bare as
/// column names.
const RESERVED_KEYWORDS: &[&str] = &[
    "add", "allow", "alter", "and", "apply", "asc", "authorize", "batch", "begin", "by",
    "columnfamily", "create", "delete", "desc", "describe", "drop", "entries", "execute", "from",
    "full", "grant", "if", "in", "index", "infinity", "insert", "into", "is", "keyspace", "limit",
    "materialized", "modify", "nan", "norecursive", "not", "null", "of", "on", "or", "order",
    "primary", "rename", "replace", "revoke", "schema", "select", "set", "table", "to", "token",
    "truncate", "unlogged", "update", "use", "using", "view", "where", "with",
];

fn is_reserved_keyword(name: &str) -> bool {
    RESERVED_KEYWORDS.binary_search(&name).is_ok()
}

/// Quotes a column name unless it is a plain lowercase identifier that is
/// not a reserved keyword.
pub fn quote_identifier(name: &str) -> String {
    let mut chars = name.chars();
    let plain = matches!(chars.next(), Some(c) if c.is_ascii_lowercase())
        && chars.all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_')
        && !is_reserved_keyword(name);
    if plain {
        name.to_string()
    } else {
        format!("\"{}\"", name.replace('"', "\"\""))
    }
}
