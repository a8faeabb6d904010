//! Index error types
//!
//! Error codes:
//! - SIDX_INVALID_INDEX_DEFINITION (REJECT)
//! - SIDX_MALFORMED_BACKING_NAME (REJECT)
//! - SIDX_INVALID_TARGET (REJECT)
//! - SIDX_INVARIANT_VIOLATION (FATAL)

use std::fmt;

use crate::schema::SchemaError;

/// Severity levels for index errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    /// Request rejected, never retried
    Reject,
    /// Programming-logic failure; the caller must not continue
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

/// Index-specific error codes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IndexErrorCode {
    /// The index cannot be backed by a view (e.g. local index on a partition key column)
    InvalidIndexDefinition,
    /// A table name does not carry the backing-table suffix
    MalformedBackingName,
    /// The raw target option is missing or unparsable
    InvalidTarget,
    /// Unreachable state in view derivation
    InvariantViolation,
}

impl IndexErrorCode {
    /// Returns the string code
    pub fn code(&self) -> &'static str {
        match self {
            IndexErrorCode::InvalidIndexDefinition => "SIDX_INVALID_INDEX_DEFINITION",
            IndexErrorCode::MalformedBackingName => "SIDX_MALFORMED_BACKING_NAME",
            IndexErrorCode::InvalidTarget => "SIDX_INVALID_TARGET",
            IndexErrorCode::InvariantViolation => "SIDX_INVARIANT_VIOLATION",
        }
    }

    /// Returns the severity level for this error
    pub fn severity(&self) -> Severity {
        match self {
            IndexErrorCode::InvariantViolation => Severity::Fatal,
            _ => Severity::Reject,
        }
    }
}

impl fmt::Display for IndexErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// Index error type with full context
#[derive(Debug)]
pub struct IndexError {
    /// Error code
    code: IndexErrorCode,
    /// Human-readable message
    message: String,
    /// Index name if applicable
    index: Option<String>,
}

impl IndexError {
    /// Create an invalid index definition error
    pub fn invalid_definition(index: impl Into<String>, reason: impl Into<String>) -> Self {
        let index = index.into();
        Self {
            code: IndexErrorCode::InvalidIndexDefinition,
            message: format!("Index '{}': {}", index, reason.into()),
            index: Some(index),
        }
    }

    /// Create a malformed backing name error
    pub fn malformed_backing_name(table_name: &str) -> Self {
        Self {
            code: IndexErrorCode::MalformedBackingName,
            message: format!("Table {} does not have _index suffix", table_name),
            index: None,
        }
    }

    /// Create an invalid target error
    pub fn invalid_target(index: impl Into<String>, reason: impl Into<String>) -> Self {
        let index = index.into();
        Self {
            code: IndexErrorCode::InvalidTarget,
            message: format!("Index '{}' has an invalid target: {}", index, reason.into()),
            index: Some(index),
        }
    }

    /// Create an invariant violation error (FATAL)
    pub fn invariant_violation(reason: impl Into<String>) -> Self {
        Self {
            code: IndexErrorCode::InvariantViolation,
            message: reason.into(),
            index: None,
        }
    }

    /// Returns the error code
    pub fn code(&self) -> IndexErrorCode {
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

    /// Returns the index name if applicable
    pub fn index(&self) -> Option<&str> {
        self.index.as_deref()
    }

    /// Returns whether this is a fatal error
    pub fn is_fatal(&self) -> bool {
        self.severity() == Severity::Fatal
    }
}

impl fmt::Display for IndexError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}: {}", self.code.severity(), self.code.code(), self.message)
    }
}

impl std::error::Error for IndexError {}

/// A view schema that fails to assemble means the derivation itself is wrong.
impl From<SchemaError> for IndexError {
    fn from(e: SchemaError) -> Self {
        Self::invariant_violation(format!("backing view rejected by schema builder: {}", e))
    }
}

/// Result type for index operations
pub type IndexResult<T> = Result<T, IndexError>;
