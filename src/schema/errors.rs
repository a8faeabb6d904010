//! Schema error types
//!
//! Error codes:
//! - SCHEMA_MALFORMED (REJECT)
//! - SCHEMA_UNKNOWN_TABLE (REJECT)
//! - SCHEMA_DUPLICATE_COLUMN (FATAL)

use std::fmt;

/// Severity levels for schema errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    /// Client request rejected
    Reject,
    /// Schema construction bug; the caller must not continue
    Fatal,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Reject => write!(f, "REJECT"),
            Severity::Fatal => write!(f, "FATAL"),
        }
    }
}

/// Schema-specific error codes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchemaErrorCode {
    /// Schema file or definition is structurally invalid
    SchemaMalformed,
    /// Requested table is not known
    SchemaUnknownTable,
    /// A schema under construction received the same column twice
    SchemaDuplicateColumn,
}

impl SchemaErrorCode {
    /// Returns the string code
    pub fn code(&self) -> &'static str {
        match self {
            SchemaErrorCode::SchemaMalformed => "SCHEMA_MALFORMED",
            SchemaErrorCode::SchemaUnknownTable => "SCHEMA_UNKNOWN_TABLE",
            SchemaErrorCode::SchemaDuplicateColumn => "SCHEMA_DUPLICATE_COLUMN",
        }
    }

    /// Returns the severity level for this error
    pub fn severity(&self) -> Severity {
        match self {
            SchemaErrorCode::SchemaDuplicateColumn => Severity::Fatal,
            _ => Severity::Reject,
        }
    }
}

impl fmt::Display for SchemaErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// Schema error type with full context
#[derive(Debug)]
pub struct SchemaError {
    /// Error code
    code: SchemaErrorCode,
    /// Human-readable message
    message: String,
    /// Table name if applicable
    table: Option<String>,
}

impl SchemaError {
    /// Create an error for a malformed schema file or definition
    pub fn malformed_schema(path: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            code: SchemaErrorCode::SchemaMalformed,
            message: format!("Malformed schema '{}': {}", path.into(), reason.into()),
            table: None,
        }
    }

    /// Create an unknown table error
    pub fn unknown_table(keyspace: impl Into<String>, table: impl Into<String>) -> Self {
        let ks = keyspace.into();
        let table = table.into();
        Self {
            code: SchemaErrorCode::SchemaUnknownTable,
            message: format!("Table '{}.{}' not found", ks, table),
            table: Some(table),
        }
    }

    /// Create a duplicate column error for a schema under construction
    pub fn duplicate_column(table: impl Into<String>, column: impl Into<String>) -> Self {
        let table = table.into();
        Self {
            code: SchemaErrorCode::SchemaDuplicateColumn,
            message: format!("Column '{}' declared twice in '{}'", column.into(), table),
            table: Some(table),
        }
    }

    /// Returns the error code
    pub fn code(&self) -> SchemaErrorCode {
        self.code
    }

    /// Returns the severity level
    pub fn severity(&self) -> Severity {
        self.code.severity()
    }

    /// Returns the error message
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Returns the table name if applicable
    pub fn table(&self) -> Option<&str> {
        self.table.as_deref()
    }

    /// Returns whether this is a fatal error
    pub fn is_fatal(&self) -> bool {
        self.severity() == Severity::Fatal
    }
}

impl fmt::Display for SchemaError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}: {}", self.code.severity(), self.code.code(), self.message)
    }
}

impl std::error::Error for SchemaError {}

/// Result type for schema operations
pub type SchemaResult<T> = Result<T, SchemaError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_codes() {
        assert_eq!(SchemaErrorCode::SchemaMalformed.code(), "SCHEMA_MALFORMED");
        assert_eq!(SchemaErrorCode::SchemaUnknownTable.code(), "SCHEMA_UNKNOWN_TABLE");
        assert_eq!(SchemaErrorCode::SchemaDuplicateColumn.code(), "SCHEMA_DUPLICATE_COLUMN");
    }

    #[test]
    fn test_severity_levels() {
        assert_eq!(SchemaErrorCode::SchemaMalformed.severity(), Severity::Reject);
        assert_eq!(SchemaErrorCode::SchemaUnknownTable.severity(), Severity::Reject);
        assert_eq!(SchemaErrorCode::SchemaDuplicateColumn.severity(), Severity::Fatal);
    }

    #[test]
    fn test_error_display() {
        let err = SchemaError::unknown_table("ks", "users");
        let display = format!("{}", err);
        assert!(display.contains("REJECT"));
        assert!(display.contains("SCHEMA_UNKNOWN_TABLE"));
        assert!(display.contains("ks.users"));
        assert_eq!(err.table(), Some("users"));
    }
}
