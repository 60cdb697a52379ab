//! Error types for agentdesk operations

use crate::AgentId;
use thiserror::Error;

/// Record store errors.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum StorageError {
    #[error("Agent row not found: {id}")]
    NotFound { id: AgentId },

    #[error("Unique index violation: a live agent named '{name}' already exists")]
    DuplicateName { name: String },

    #[error("Stale version for agent {id}: expected {expected}")]
    VersionConflict { id: AgentId, expected: i64 },

    #[error("Storage lock poisoned")]
    LockPoisoned,

    #[error("Connection pool unavailable: {reason}")]
    PoolUnavailable { reason: String },

    #[error("Backend error: {reason}")]
    Backend { reason: String },
}

/// Business-rule failures raised by the agent service.
///
/// Everything except `Storage` is a caller error; `Storage` wraps faults the
/// caller cannot fix and is reported without detail.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum AgentError {
    #[error("Validation failed: {}", .messages.join(", "))]
    Validation { messages: Vec<String> },

    #[error("Agent name already exists: {name}")]
    NameConflict { name: String },

    #[error("Agent not found, id: {id}")]
    NotFound { id: AgentId },

    #[error("Agent not found, name: {name}")]
    NotFoundByName { name: String },

    #[error("Agent not found, name: {name}, type: {agent_type}")]
    NotFoundByNameAndType { name: String, agent_type: String },

    #[error("Agent has been deleted, id: {id}")]
    Deleted { id: AgentId },

    #[error("Storage error: {0}")]
    Storage(StorageError),
}

impl AgentError {
    /// Build a validation error from a single message.
    pub fn validation(message: impl Into<String>) -> Self {
        AgentError::Validation {
            messages: vec![message.into()],
        }
    }

    /// Whether the failure was caused by the request rather than the system.
    pub fn is_client_error(&self) -> bool {
        !matches!(self, AgentError::Storage(_))
    }
}

impl From<StorageError> for AgentError {
    fn from(err: StorageError) -> Self {
        match err {
            // The partial unique index is the last line behind the service's
            // own name check.
            StorageError::DuplicateName { name } => AgentError::NameConflict { name },
            other => AgentError::Storage(other),
        }
    }
}

/// Result type alias for storage operations.
pub type StorageResult<T> = Result<T, StorageError>;

/// Result type alias for agent service operations.
pub type AgentResult<T> = Result<T, AgentError>;
