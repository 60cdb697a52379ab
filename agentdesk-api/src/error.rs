//! Error Types for agentdesk API
//!
//! This module defines error handling for the API layer, including:
//! - ApiError struct carrying a code and a detailed message
//! - ErrorCode enum for categorizing errors
//! - IntoResponse implementation producing the uniform failure envelope
//!
//! Caller errors become HTTP 400 with their message; everything else becomes
//! HTTP 500 with a fixed message. The detail is only ever written to the log.

use agentdesk_core::{AgentError, StorageError};
use axum::{
    extract::rejection::{JsonRejection, PathRejection, QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::types::ApiResponse;

/// Message returned to callers for every server-side failure.
pub const GENERIC_ERROR_MESSAGE: &str = "Internal server error";

// ============================================================================
// ERROR CODE ENUM
// ============================================================================

/// Error codes for API responses.
///
/// Only two HTTP statuses are ever produced: 400 for anything the caller can
/// fix, 500 for everything else.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    // ========================================================================
    // Caller Errors (400)
    // ========================================================================
    /// Request body, path or query failed validation
    ValidationFailed,

    /// A live agent already holds the requested name
    NameConflict,

    /// No agent matches the id or name
    AgentNotFound,

    /// The agent exists but has been soft-deleted
    AgentDeleted,

    // ========================================================================
    // Server Errors (500)
    // ========================================================================
    /// Stale version on update
    ConcurrentModification,

    /// Database operation failed
    DatabaseError,

    /// Database connection pool unavailable
    ServiceUnavailable,

    /// Handler panicked or failed unexpectedly
    InternalError,
}

impl ErrorCode {
    /// Get the HTTP status code for this error code.
    pub fn status_code(&self) -> StatusCode {
        match self {
            ErrorCode::ValidationFailed
            | ErrorCode::NameConflict
            | ErrorCode::AgentNotFound
            | ErrorCode::AgentDeleted => StatusCode::BAD_REQUEST,

            ErrorCode::ConcurrentModification
            | ErrorCode::DatabaseError
            | ErrorCode::ServiceUnavailable
            | ErrorCode::InternalError => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Whether the detailed message may be shown to the caller.
    pub fn is_client_error(&self) -> bool {
        self.status_code().is_client_error()
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self)
    }
}

// ============================================================================
// API ERROR STRUCT
// ============================================================================

/// Error returned by every handler and by the agent service adapter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiError {
    /// Error code categorizing the error
    pub code: ErrorCode,

    /// Full detail; only exposed to the caller for 400-class codes
    pub message: String,
}

impl ApiError {
    /// Create a new API error with the given code and message.
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }

    /// Get the HTTP status code for this error.
    pub fn status_code(&self) -> StatusCode {
        self.code.status_code()
    }

    /// The message placed in the response envelope.
    pub fn public_message(&self) -> &str {
        if self.code.is_client_error() {
            &self.message
        } else {
            GENERIC_ERROR_MESSAGE
        }
    }

    // ========================================================================
    // Convenience constructors for common errors
    // ========================================================================

    /// Create a ValidationFailed error from individual field messages.
    pub fn validation_failed<I, S>(messages: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let messages: Vec<String> = messages.into_iter().map(Into::into).collect();
        AgentError::Validation { messages }.into()
    }

    /// Create a MissingParameter-style ValidationFailed error.
    pub fn missing_parameter(name: &str) -> Self {
        Self::validation_failed([format!("Required parameter '{}' is missing", name)])
    }

    /// Create an InternalError.
    pub fn internal_error(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::InternalError, message)
    }

    /// Create a DatabaseError.
    pub fn database_error(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::DatabaseError, message)
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.code, self.message)
    }
}

impl std::error::Error for ApiError {}

// ============================================================================
// AXUM INTEGRATION
// ============================================================================

/// Log the full error, then reduce it to the failure envelope.
impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::error!(code = %self.code, error = %self.message, "request failed");
        } else {
            tracing::warn!(code = %self.code, error = %self.message, "request rejected");
        }

        let body = Json(ApiResponse::<()>::error(self.public_message()));
        (status, body).into_response()
    }
}

// ============================================================================
// CONVERSIONS
// ============================================================================

impl From<AgentError> for ApiError {
    fn from(err: AgentError) -> Self {
        let code = match &err {
            AgentError::Validation { .. } => ErrorCode::ValidationFailed,
            AgentError::NameConflict { .. } => ErrorCode::NameConflict,
            AgentError::NotFound { .. }
            | AgentError::NotFoundByName { .. }
            | AgentError::NotFoundByNameAndType { .. } => ErrorCode::AgentNotFound,
            AgentError::Deleted { .. } => ErrorCode::AgentDeleted,
            AgentError::Storage(storage) => return ApiError::from(storage.clone()),
        };
        ApiError::new(code, err.to_string())
    }
}

impl From<StorageError> for ApiError {
    fn from(err: StorageError) -> Self {
        let code = match &err {
            StorageError::DuplicateName { name } => {
                return AgentError::NameConflict { name: name.clone() }.into()
            }
            StorageError::VersionConflict { .. } => ErrorCode::ConcurrentModification,
            StorageError::PoolUnavailable { .. } => ErrorCode::ServiceUnavailable,
            StorageError::NotFound { .. }
            | StorageError::LockPoisoned
            | StorageError::Backend { .. } => ErrorCode::DatabaseError,
        };
        ApiError::new(code, err.to_string())
    }
}

/// Convert from tokio_postgres::Error to ApiError.
impl From<tokio_postgres::Error> for ApiError {
    fn from(err: tokio_postgres::Error) -> Self {
        ApiError::database_error(format!("Database error: {:?}", err))
    }
}

/// Convert from deadpool_postgres::PoolError to ApiError.
impl From<deadpool_postgres::PoolError> for ApiError {
    fn from(err: deadpool_postgres::PoolError) -> Self {
        ApiError::new(
            ErrorCode::ServiceUnavailable,
            format!("Connection pool error: {:?}", err),
        )
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::validation_failed([rejection.body_text()])
    }
}

impl From<PathRejection> for ApiError {
    fn from(rejection: PathRejection) -> Self {
        ApiError::validation_failed([rejection.body_text()])
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        ApiError::validation_failed([rejection.body_text()])
    }
}

// ============================================================================
// RESULT TYPE ALIAS
// ============================================================================

/// Result type alias for API operations.
pub type ApiResult<T> = Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_code_status_mapping() {
        assert_eq!(ErrorCode::ValidationFailed.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(ErrorCode::NameConflict.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(ErrorCode::AgentNotFound.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(ErrorCode::AgentDeleted.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(
            ErrorCode::ConcurrentModification.status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(ErrorCode::DatabaseError.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(
            ErrorCode::ServiceUnavailable.status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_agent_error_conversion() {
        let err = ApiError::from(AgentError::NotFound { id: 12 });
        assert_eq!(err.code, ErrorCode::AgentNotFound);
        assert_eq!(err.public_message(), "Agent not found, id: 12");

        let err = ApiError::from(AgentError::Deleted { id: 12 });
        assert_eq!(err.code, ErrorCode::AgentDeleted);

        let err = ApiError::from(AgentError::NameConflict { name: "bot1".into() });
        assert_eq!(err.code, ErrorCode::NameConflict);
        assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn test_storage_faults_hide_detail() {
        let err = ApiError::from(AgentError::Storage(StorageError::VersionConflict {
            id: 4,
            expected: 2,
        }));
        assert_eq!(err.code, ErrorCode::ConcurrentModification);
        assert_eq!(err.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
        assert!(err.message.contains("Stale version"));
        assert_eq!(err.public_message(), GENERIC_ERROR_MESSAGE);
    }

    #[test]
    fn test_duplicate_name_from_store_is_conflict() {
        let err = ApiError::from(StorageError::DuplicateName { name: "dup".into() });
        assert_eq!(err.code, ErrorCode::NameConflict);
        assert_eq!(err.message, "Agent name already exists: dup");
    }

    #[test]
    fn test_validation_failed_joins_messages() {
        let err = ApiError::validation_failed(["a is bad", "b is bad"]);
        assert_eq!(err.code, ErrorCode::ValidationFailed);
        assert_eq!(err.message, "Validation failed: a is bad, b is bad");
    }

    #[test]
    fn test_error_display() {
        let err = ApiError::database_error("Connection failed");
        let display = format!("{}", err);

        assert!(display.contains("DatabaseError"));
        assert!(display.contains("Connection failed"));
    }
}
