//! Error types and handling for nomenclature import operations

use std::path::PathBuf;
use thiserror::Error;

/// Main error type for nomenclature import operations
#[derive(Debug, Error)]
pub enum NomenError {
    /// The source document does not exist
    #[error("Document not found: {}", path.display())]
    DocumentNotFound { path: PathBuf },

    /// File system I/O errors
    #[error("IO error for path '{}': {source}", path.display())]
    IoError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The document is not well-formed markup
    #[error("Malformed document at byte {position}: {message}")]
    MalformedDocument { message: String, position: u64 },

    /// The document parsed but has no root element
    #[error("Document has no root element")]
    MissingRoot,

    /// Errors reported by the SQLite backend
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    /// Integrity faults raised by a store while constraints are enforced
    #[error("Constraint violation on '{table}': {message}")]
    ConstraintViolation { table: String, message: String },

    /// The target store lacks the nomenclature tables
    #[error("Store '{target}' has no nomenclature tables; create them from sql/schema.sql first")]
    SchemaMissing { target: String },

    /// Rendering a report failed
    #[error("Output error: {message}")]
    OutputError { message: String },

    /// Configuration loading or validation errors
    #[error("Configuration error: {message}")]
    ConfigError { message: String },
}

/// Error kind enumeration for categorizing errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Document,
    Io,
    Store,
    Config,
    Output,
}

impl NomenError {
    /// Get the error kind for this error
    pub fn kind(&self) -> ErrorKind {
        match self {
            NomenError::DocumentNotFound { .. }
            | NomenError::MalformedDocument { .. }
            | NomenError::MissingRoot => ErrorKind::Document,
            NomenError::IoError { .. } => ErrorKind::Io,
            NomenError::Database(_)
            | NomenError::ConstraintViolation { .. }
            | NomenError::SchemaMissing { .. } => ErrorKind::Store,
            NomenError::ConfigError { .. } => ErrorKind::Config,
            NomenError::OutputError { .. } => ErrorKind::Output,
        }
    }

    /// Whether this error can only be raised before any row is written
    pub fn is_pre_write(&self) -> bool {
        matches!(self.kind(), ErrorKind::Document | ErrorKind::Io | ErrorKind::Config)
            || matches!(self, NomenError::SchemaMissing { .. })
    }

    /// Create a configuration error
    pub fn config_error(message: impl Into<String>) -> Self {
        Self::ConfigError {
            message: message.into(),
        }
    }

    /// Create a constraint violation error
    pub fn constraint_violation(table: impl Into<String>, message: impl Into<String>) -> Self {
        Self::ConstraintViolation {
            table: table.into(),
            message: message.into(),
        }
    }

    /// Create an output error
    pub fn output_error(message: impl Into<String>) -> Self {
        Self::OutputError {
            message: message.into(),
        }
    }

    /// Create an IO error bound to a path
    pub fn io_error(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::IoError {
            path: path.into(),
            source,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_kinds() {
        assert_eq!(NomenError::MissingRoot.kind(), ErrorKind::Document);
        assert_eq!(
            NomenError::config_error("bad").kind(),
            ErrorKind::Config
        );
        assert_eq!(
            NomenError::constraint_violation("icd10_codes", "dangling").kind(),
            ErrorKind::Store
        );
    }

    #[test]
    fn test_pre_write_classification() {
        let not_found = NomenError::DocumentNotFound {
            path: PathBuf::from("missing.xml"),
        };
        assert!(not_found.is_pre_write());
        assert!(!NomenError::constraint_violation("icd10_notes", "x").is_pre_write());
        assert!(
            NomenError::SchemaMissing {
                target: "nomen.db".to_string()
            }
            .is_pre_write()
        );
    }

    #[test]
    fn test_error_display() {
        let err = NomenError::MalformedDocument {
            message: "unexpected end".to_string(),
            position: 42,
        };
        assert_eq!(
            err.to_string(),
            "Malformed document at byte 42: unexpected end"
        );
    }
}
