//! Path extractor for agent ids.
//!
//! Unlike the standard `Path<i64>` extractor, a malformed id is rejected with
//! the uniform failure envelope (HTTP 400) instead of axum's plain-text body.

use agentdesk_core::AgentId;
use axum::{
    async_trait,
    extract::{FromRequestParts, Path},
    http::request::Parts,
};

use crate::error::ApiError;

/// Extractor for the `:id` segment of `/agents/:id` routes.
///
/// # Example
///
/// ```rust,ignore
/// async fn get_agent(
///     State(state): State<Arc<AgentState>>,
///     AgentIdPath(id): AgentIdPath,
/// ) -> ApiResult<Json<ApiResponse<AgentDto>>> {
///     // id is an i64
/// }
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AgentIdPath(pub AgentId);

#[async_trait]
impl<S> FromRequestParts<S> for AgentIdPath
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Path(id): Path<AgentId> = Path::from_request_parts(parts, state)
            .await
            .map_err(|e| {
                ApiError::validation_failed([format!(
                    "Invalid agent id in path '{}': {}",
                    parts.uri.path(),
                    e.body_text()
                )])
            })?;

        Ok(AgentIdPath(id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorCode;
    use axum::http::Request;
    use axum::{routing::get, Router};
    use tower::ServiceExt;

    async fn echo(AgentIdPath(id): AgentIdPath) -> String {
        id.to_string()
    }

    fn app() -> Router {
        Router::new().route("/agents/:id", get(echo))
    }

    #[tokio::test]
    async fn test_numeric_id_is_extracted() {
        let response = app()
            .oneshot(
                Request::builder()
                    .uri("/agents/42")
                    .body(axum::body::Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), axum::http::StatusCode::OK);

        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        assert_eq!(&body[..], b"42");
    }

    #[tokio::test]
    async fn test_non_numeric_id_is_a_400_envelope() {
        let response = app()
            .oneshot(
                Request::builder()
                    .uri("/agents/abc")
                    .body(axum::body::Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), ErrorCode::ValidationFailed.status_code());

        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json["result"], "ERROR");
        assert!(json["message"]
            .as_str()
            .unwrap_or_default()
            .contains("Invalid agent id"));
    }
}
