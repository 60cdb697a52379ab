//! Uniform response envelope.

use serde::{Deserialize, Serialize};

/// Default message for successful reads.
pub const OK_MESSAGE: &str = "Operation succeeded";

/// Outcome flag carried by every envelope.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ResultFlag {
    Success,
    Error,
}

/// `{ result, message, data }` wrapper returned by every endpoint.
///
/// `data` is always present in the JSON, as `null` when there is no payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    pub result: ResultFlag,
    pub message: String,
    pub data: Option<T>,
}

impl<T> ApiResponse<T> {
    /// Success with the default message.
    pub fn success(data: T) -> Self {
        Self::success_with_message(OK_MESSAGE, data)
    }

    pub fn success_with_message(message: impl Into<String>, data: T) -> Self {
        Self {
            result: ResultFlag::Success,
            message: message.into(),
            data: Some(data),
        }
    }

    /// Success with no payload.
    pub fn empty(message: impl Into<String>) -> Self {
        Self {
            result: ResultFlag::Success,
            message: message.into(),
            data: None,
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            result: ResultFlag::Error,
            message: message.into(),
            data: None,
        }
    }

    pub fn is_success(&self) -> bool {
        self.result == ResultFlag::Success
    }
}
