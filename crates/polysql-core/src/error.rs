//! Core error types for polysql.
//!
//! This module provides the [`SqlError`] enum that covers every failure the
//! statement compiler can raise: malformed filters and joins, references to
//! fields absent from a model's registry, unsupported dialect selections,
//! values that cannot be represented for the target driver, and the
//! configuration and I/O errors of the settings layer.

use thiserror::Error;

/// The primary error type for polysql.
///
/// Every error is raised synchronously, before any SQL text is handed back
/// to the caller. The compiler never retries or recovers on its own.
#[derive(Error, Debug)]
pub enum SqlError {
    // ── Compilation errors ───────────────────────────────────────────

    /// A filter is missing, empty, or has an unsupported shape.
    #[error("Invalid filter: {0}")]
    InvalidFilter(String),

    /// A join was requested without an explicit field list, or through a
    /// field that carries no foreign key.
    #[error("Invalid join: {0}")]
    InvalidJoin(String),

    /// A statement references a field that is not in the model's registry.
    #[error("Unknown field '{field}' on model '{model}'")]
    UnknownField {
        /// The table name of the model that was searched.
        model: String,
        /// The field name that could not be resolved.
        field: String,
    },

    /// The engine/driver combination is not one of the supported dialects.
    #[error("Unsupported engine: {0}")]
    UnsupportedEngine(String),

    /// A declared column type name could not be recognized.
    #[error("Unsupported column type: {0}")]
    UnsupportedType(String),

    /// A field selection resolved to no columns at all.
    #[error("Invalid selection: {0}")]
    InvalidSelection(String),

    /// An INSERT or UPDATE payload is empty or malformed.
    #[error("Invalid payload: {0}")]
    InvalidPayload(String),

    /// A value cannot be represented under the parameter type its field requires.
    #[error("Invalid value: {0}")]
    InvalidValue(String),

    // ── Results ──────────────────────────────────────────────────────

    /// A raw result row could not be mapped back onto named fields.
    #[error("Database error: {0}")]
    DatabaseError(String),

    // ── Configuration ────────────────────────────────────────────────

    /// A configuration value is missing or invalid.
    #[error("Configuration error: {0}")]
    ConfigurationError(String),

    // ── Serialization ────────────────────────────────────────────────

    /// An error occurred during serialization or deserialization.
    #[error("Serialization error: {0}")]
    SerializationError(String),

    // ── IO ───────────────────────────────────────────────────────────

    /// An I/O error occurred.
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

impl SqlError {
    /// Creates an [`SqlError::UnknownField`] for the given model and field.
    pub fn unknown_field(model: impl Into<String>, field: impl Into<String>) -> Self {
        Self::UnknownField {
            model: model.into(),
            field: field.into(),
        }
    }

    /// Returns a stable, machine-readable code for this error.
    ///
    /// Codes never change between releases and are safe to match on in
    /// logs and client code:
    ///
    /// - `InvalidFilter` -> `invalid_filter`
    /// - `InvalidJoin` -> `invalid_join`
    /// - `UnknownField` -> `unknown_field`
    /// - `UnsupportedEngine` -> `unsupported_engine`
    /// - and so on for the remaining variants.
    pub const fn code(&self) -> &'static str {
        match self {
            Self::InvalidFilter(_) => "invalid_filter",
            Self::InvalidJoin(_) => "invalid_join",
            Self::UnknownField { .. } => "unknown_field",
            Self::UnsupportedEngine(_) => "unsupported_engine",
            Self::UnsupportedType(_) => "unsupported_type",
            Self::InvalidSelection(_) => "invalid_selection",
            Self::InvalidPayload(_) => "invalid_payload",
            Self::InvalidValue(_) => "invalid_value",
            Self::DatabaseError(_) => "database_error",
            Self::ConfigurationError(_) => "configuration_error",
            Self::SerializationError(_) => "serialization_error",
            Self::IoError(_) => "io_error",
        }
    }

    /// Returns `true` for errors caused by the shape of a statement
    /// description rather than by configuration or I/O.
    pub const fn is_compile_error(&self) -> bool {
        matches!(
            self,
            Self::InvalidFilter(_)
                | Self::InvalidJoin(_)
                | Self::UnknownField { .. }
                | Self::InvalidSelection(_)
                | Self::InvalidPayload(_)
                | Self::InvalidValue(_)
        )
    }
}

impl From<serde_json::Error> for SqlError {
    fn from(err: serde_json::Error) -> Self {
        Self::SerializationError(err.to_string())
    }
}

/// A convenience type alias for `Result<T, SqlError>`.
pub type SqlResult<T> = Result<T, SqlError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_codes() {
        assert_eq!(SqlError::InvalidFilter("x".into()).code(), "invalid_filter");
        assert_eq!(SqlError::InvalidJoin("x".into()).code(), "invalid_join");
        assert_eq!(SqlError::unknown_field("users", "x").code(), "unknown_field");
        assert_eq!(
            SqlError::UnsupportedEngine("x".into()).code(),
            "unsupported_engine"
        );
        assert_eq!(SqlError::UnsupportedType("x".into()).code(), "unsupported_type");
        assert_eq!(SqlError::InvalidPayload("x".into()).code(), "invalid_payload");
        assert_eq!(SqlError::DatabaseError("x".into()).code(), "database_error");
    }

    #[test]
    fn test_unknown_field_display() {
        let err = SqlError::unknown_field("users", "nickname");
        assert_eq!(err.to_string(), "Unknown field 'nickname' on model 'users'");
    }

    #[test]
    fn test_invalid_filter_display() {
        let err = SqlError::InvalidFilter("empty filter list".into());
        assert_eq!(err.to_string(), "Invalid filter: empty filter list");
    }

    #[test]
    fn test_is_compile_error() {
        assert!(SqlError::InvalidFilter("x".into()).is_compile_error());
        assert!(SqlError::unknown_field("users", "x").is_compile_error());
        assert!(!SqlError::UnsupportedEngine("x".into()).is_compile_error());
        assert!(!SqlError::ConfigurationError("x".into()).is_compile_error());
    }

    #[test]
    fn test_io_error_conversion() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file missing");
        let err: SqlError = io_err.into();
        assert_eq!(err.code(), "io_error");
        assert!(err.to_string().contains("file missing"));
    }

    #[test]
    fn test_serde_json_error_conversion() {
        let json_err = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        let err: SqlError = json_err.into();
        assert_eq!(err.code(), "serialization_error");
    }
}
