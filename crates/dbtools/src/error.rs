//! Error types for dbtools

use crate::ident::{IdentKind, InvalidReason};
use thiserror::Error;

/// Result type alias for dbtools operations
pub type DbResult<T> = Result<T, DbError>;

/// Error types for statement construction and execution
#[derive(Debug, Error)]
pub enum DbError {
    /// A table, field or field-list token failed the identifier policy
    #[error("Invalid {kind} identifier '{identifier}': {reason}")]
    InvalidIdentifier {
        kind: IdentKind,
        identifier: String,
        reason: InvalidReason,
    },

    /// A statement class that requires a WHERE condition was built without one
    #[error("Missing condition: {0} requires a non-empty WHERE condition")]
    MissingCondition(&'static str),

    /// `fields` and `values` have different lengths
    #[error("Field count mismatch: {fields} fields, {values} values")]
    FieldCountMismatch { fields: usize, values: usize },

    /// A placeholder in the SQL text has no bound parameter
    #[error("Unbound placeholder: {0}")]
    UnboundPlaceholder(String),

    /// The same parameter name was bound more than once
    #[error("Duplicate parameter: {0}")]
    DuplicateParameter(String),

    /// Reflection skipped fields that the caller required
    #[error("Reflection incomplete, skipped fields: {}", .0.join(", "))]
    ReflectionIncomplete(Vec<String>),

    /// The database rejected the statement
    #[error("Driver error{}: {message}", .code.as_deref().map(|c| format!(" [{c}]")).unwrap_or_default())]
    Driver {
        code: Option<String>,
        message: String,
    },

    /// Database connection error
    #[error("Connection error: {0}")]
    Connection(String),

    /// Invalid connection configuration
    #[error("Configuration error: {0}")]
    Config(String),

    /// Row decode error
    #[error("Decode error on column '{column}': {message}")]
    Decode { column: String, message: String },
}

impl DbError {
    /// Create an invalid identifier error
    pub fn invalid_identifier(
        kind: IdentKind,
        identifier: impl Into<String>,
        reason: InvalidReason,
    ) -> Self {
        Self::InvalidIdentifier {
            kind,
            identifier: identifier.into(),
            reason,
        }
    }

    /// Create a driver error without an SQLSTATE/vendor code
    pub fn driver(message: impl Into<String>) -> Self {
        Self::Driver {
            code: None,
            message: message.into(),
        }
    }

    /// Create a driver error carrying the vendor error code
    pub fn driver_with_code(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Driver {
            code: Some(code.into()),
            message: message.into(),
        }
    }

    /// Create a decode error for a specific column
    pub fn decode(column: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Decode {
            column: column.into(),
            message: message.into(),
        }
    }

    /// Check if this is an identifier validation error
    pub fn is_invalid_identifier(&self) -> bool {
        matches!(self, Self::InvalidIdentifier { .. })
    }

    /// Check if this is a missing condition error
    pub fn is_missing_condition(&self) -> bool {
        matches!(self, Self::MissingCondition(_))
    }

    /// Check if this error came from the database driver
    pub fn is_driver(&self) -> bool {
        matches!(self, Self::Driver { .. })
    }

    /// Errors raised before any SQL reaches the driver.
    ///
    /// These are programmer errors: fix the input, do not retry.
    pub fn is_local(&self) -> bool {
        matches!(
            self,
            Self::InvalidIdentifier { .. }
                | Self::MissingCondition(_)
                | Self::FieldCountMismatch { .. }
                | Self::UnboundPlaceholder(_)
                | Self::DuplicateParameter(_)
                | Self::ReflectionIncomplete(_)
        )
    }

    /// The identifier rejection reason, if this is an identifier error
    pub fn invalid_reason(&self) -> Option<&InvalidReason> {
        match self {
            Self::InvalidIdentifier { reason, .. } => Some(reason),
            _ => None,
        }
    }

    /// Map a tokio_postgres error, keeping the SQLSTATE code of server errors
    #[cfg(feature = "postgres")]
    pub fn from_pg_error(err: tokio_postgres::Error) -> Self {
        if let Some(db_err) = err.as_db_error() {
            return Self::driver_with_code(db_err.code().code(), db_err.message());
        }
        if err.is_closed() {
            return Self::Connection(err.to_string());
        }
        Self::driver(err.to_string())
    }
}
