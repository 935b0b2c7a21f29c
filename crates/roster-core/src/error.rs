//! Unified error types for all layers of the application.

use serde::{Deserialize, Serialize};
use std::fmt::Debug;
use thiserror::Error;

/// Unified error type for all layers of Roster.
///
/// Handlers never terminate the process on any of these; the REST layer maps
/// each variant to a status code through [`RosterError::status_code`].
#[derive(Error, Debug)]
pub enum RosterError {
    // ============ Client Errors ============
    /// Resource not found
    #[error("Resource not found: {resource_type} with id {id}")]
    NotFound {
        resource_type: &'static str,
        id: String,
    },

    /// Request body could not be decoded
    #[error("Malformed request body: {0}")]
    Decode(String),

    /// Request parameter could not be coerced to its type
    #[error("Validation error: {0}")]
    Validation(String),

    /// Store constraint violation (unique, not-null, check, foreign key)
    #[error("Conflict: {0}")]
    Conflict(String),

    // ============ Infrastructure Errors ============
    /// Database error
    #[error("Database error: {0}")]
    Database(String),

    /// Redis/Cache error
    #[error("Cache error: {0}")]
    Cache(String),

    /// The request did not finish within the configured timeout
    #[error("Request timed out: {0}")]
    Timeout(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Configuration(String),

    // ============ Batch Errors ============
    /// A sequential import stopped part-way; earlier rows stay committed.
    #[error("Import aborted after {committed} inserted users: {source}")]
    ImportAborted {
        committed: usize,
        source: Box<RosterError>,
    },

    // ============ Internal Errors ============
    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),

    /// Generic error wrapper
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl RosterError {
    /// Returns the HTTP status code for this error.
    #[must_use]
    pub fn status_code(&self) -> u16 {
        match self {
            Self::NotFound { .. } => 404,
            Self::Decode(_) | Self::Validation(_) => 400,
            Self::Conflict(_) => 409,
            Self::Timeout(_) => 504,
            Self::ImportAborted { source, .. } => source.status_code(),
            Self::Database(_)
            | Self::Cache(_)
            | Self::Configuration(_)
            | Self::Internal(_)
            | Self::Other(_) => 500,
        }
    }

    /// Returns a machine-readable error code.
    #[must_use]
    pub const fn error_code(&self) -> &'static str {
        match self {
            Self::NotFound { .. } => "NOT_FOUND",
            Self::Decode(_) => "DECODE_ERROR",
            Self::Validation(_) => "VALIDATION_ERROR",
            Self::Conflict(_) => "CONFLICT",
            Self::Database(_) => "DATABASE_ERROR",
            Self::Cache(_) => "CACHE_ERROR",
            Self::Timeout(_) => "TIMEOUT",
            Self::Configuration(_) => "CONFIGURATION_ERROR",
            Self::ImportAborted { .. } => "IMPORT_ABORTED",
            Self::Internal(_) | Self::Other(_) => "INTERNAL_ERROR",
        }
    }

    /// Creates a not found error for a resource.
    #[must_use]
    pub fn not_found<T: ToString>(resource_type: &'static str, id: T) -> Self {
        Self::NotFound {
            resource_type,
            id: id.to_string(),
        }
    }

    /// Creates a decode error.
    #[must_use]
    pub fn decode<T: Into<String>>(message: T) -> Self {
        Self::Decode(message.into())
    }

    /// Creates a validation error.
    #[must_use]
    pub fn validation<T: Into<String>>(message: T) -> Self {
        Self::Validation(message.into())
    }

    /// Creates a conflict error.
    #[must_use]
    pub fn conflict<T: Into<String>>(message: T) -> Self {
        Self::Conflict(message.into())
    }

    /// Creates a cache error.
    #[must_use]
    pub fn cache<T: Into<String>>(message: T) -> Self {
        Self::Cache(message.into())
    }

    /// Creates a timeout error.
    #[must_use]
    pub fn timeout<T: Into<String>>(message: T) -> Self {
        Self::Timeout(message.into())
    }

    /// Creates an internal error.
    #[must_use]
    pub fn internal<T: Into<String>>(message: T) -> Self {
        Self::Internal(message.into())
    }

    /// Wraps the error that stopped a sequential import.
    #[must_use]
    pub fn import_aborted(committed: usize, cause: Self) -> Self {
        Self::ImportAborted {
            committed,
            source: Box::new(cause),
        }
    }

    /// Checks if this error is retriable.
    #[must_use]
    pub fn is_retriable(&self) -> bool {
        match self {
            Self::Database(_) | Self::Cache(_) | Self::Timeout(_) => true,
            Self::ImportAborted { source, .. } => source.is_retriable(),
            _ => false,
        }
    }
}

#[cfg(feature = "sqlx")]
impl From<sqlx::Error> for RosterError {
    fn from(err: sqlx::Error) -> Self {
        match &err {
            sqlx::Error::RowNotFound => Self::NotFound {
                resource_type: "database_row",
                id: "unknown".to_string(),
            },
            sqlx::Error::Database(db_err) => {
                // SQLSTATE class 23: integrity constraint violation
                if let Some(code) = db_err.code() {
                    if code.starts_with("23") {
                        return Self::Conflict(db_err.message().to_string());
                    }
                }
                Self::Database(err.to_string())
            }
            _ => Self::Database(err.to_string()),
        }
    }
}

impl From<serde_json::Error> for RosterError {
    fn from(err: serde_json::Error) -> Self {
        Self::Internal(format!("JSON serialization error: {}", err))
    }
}

/// Serializable error response for API responses.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct ErrorResponse {
    /// Machine-readable error code
    pub code: String,
    /// Human-readable error message
    pub message: String,
    /// Optional structured detail (e.g. rows committed before an import failed)
    #[serde(skip_serializing_if = "Option::is_none")]
    #[cfg_attr(feature = "openapi", schema(value_type = Option<Object>))]
    pub details: Option<serde_json::Value>,
}

impl ErrorResponse {
    /// Creates a new error response from a `RosterError`.
    #[must_use]
    pub fn from_error(error: &RosterError) -> Self {
        let details = match error {
            RosterError::ImportAborted { committed, .. } => {
                Some(serde_json::json!({ "committed": committed }))
            }
            _ => None,
        };

        Self {
            code: error.error_code().to_string(),
            message: error.to_string(),
            details,
        }
    }
}

impl From<&RosterError> for ErrorResponse {
    fn from(error: &RosterError) -> Self {
        Self::from_error(error)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_status_codes() {
        assert_eq!(RosterError::not_found("User", 1).status_code(), 404);
        assert_eq!(RosterError::decode("bad json").status_code(), 400);
        assert_eq!(RosterError::validation("bad id").status_code(), 400);
        assert_eq!(RosterError::conflict("duplicate").status_code(), 409);
        assert_eq!(RosterError::Database("down".to_string()).status_code(), 500);
        assert_eq!(RosterError::cache("down").status_code(), 500);
        assert_eq!(RosterError::internal("oops").status_code(), 500);
        assert_eq!(RosterError::timeout("slow store").status_code(), 504);
    }

    #[test]
    fn test_import_aborted_takes_status_of_cause() {
        let err = RosterError::import_aborted(1, RosterError::conflict("floor check"));
        assert_eq!(err.status_code(), 409);
        assert_eq!(err.error_code(), "IMPORT_ABORTED");

        let err = RosterError::import_aborted(0, RosterError::Database("gone".to_string()));
        assert_eq!(err.status_code(), 500);
        assert!(err.is_retriable());
    }

    #[test]
    fn test_error_codes() {
        assert_eq!(RosterError::not_found("User", 1).error_code(), "NOT_FOUND");
        assert_eq!(RosterError::decode("x").error_code(), "DECODE_ERROR");
        assert_eq!(RosterError::validation("x").error_code(), "VALIDATION_ERROR");
        assert_eq!(RosterError::conflict("x").error_code(), "CONFLICT");
        assert_eq!(RosterError::Database("x".to_string()).error_code(), "DATABASE_ERROR");
        assert_eq!(RosterError::cache("x").error_code(), "CACHE_ERROR");
        assert_eq!(RosterError::internal("x").error_code(), "INTERNAL_ERROR");
        assert_eq!(RosterError::timeout("x").error_code(), "TIMEOUT");
    }

    #[test]
    fn test_retriable_errors() {
        assert!(RosterError::Database("connection lost".to_string()).is_retriable());
        assert!(RosterError::cache("timeout").is_retriable());
        assert!(!RosterError::not_found("User", 1).is_retriable());
        assert!(!RosterError::decode("bad").is_retriable());
        assert!(!RosterError::conflict("dup").is_retriable());
    }

    #[test]
    fn test_error_constructors() {
        let not_found = RosterError::not_found("User", 42);
        assert!(not_found.to_string().contains("User"));
        assert!(not_found.to_string().contains("42"));

        let decode = RosterError::decode("expected value at line 1");
        assert!(decode.to_string().contains("expected value"));
    }

    #[test]
    fn test_error_response_from_error() {
        let err = RosterError::not_found("User", 1);
        let response = ErrorResponse::from_error(&err);
        assert_eq!(response.code, "NOT_FOUND");
        assert!(!response.message.is_empty());
        assert!(response.details.is_none());
    }

    #[test]
    fn test_error_response_reports_committed_rows() {
        let err = RosterError::import_aborted(2, RosterError::conflict("dup"));
        let response = ErrorResponse::from(&err);
        assert_eq!(response.code, "IMPORT_ABORTED");
        assert_eq!(response.details, Some(serde_json::json!({ "committed": 2 })));
    }
}
