//! JSON body extractor that runs field validation.

use axum::{
    async_trait,
    extract::{FromRequest, Request},
    Json,
};
use serde::de::DeserializeOwned;

use crate::error::ApiError;
use crate::validation::Validate;

/// `Json<T>` followed by `T::validate`.
///
/// Malformed JSON, a wrong content type, and field violations are all
/// rejected as ValidationFailed before the handler runs.
#[derive(Debug, Clone)]
pub struct ValidatedJson<T>(pub T);

#[async_trait]
impl<S, T> FromRequest<S> for ValidatedJson<T>
where
    S: Send + Sync,
    T: DeserializeOwned + Validate,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state).await?;
        value.validate()?;
        Ok(ValidatedJson(value))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::AgentDraft;
    use axum::{body::Body, http::header, http::StatusCode, routing::post, Router};
    use tower::ServiceExt;

    async fn accept(ValidatedJson(draft): ValidatedJson<AgentDraft>) -> String {
        draft.name().to_string()
    }

    async fn send(body: &str, content_type: Option<&str>) -> (StatusCode, String) {
        let mut builder = axum::http::Request::builder().method("POST").uri("/");
        if let Some(ct) = content_type {
            builder = builder.header(header::CONTENT_TYPE, ct);
        }
        let response = Router::new()
            .route("/", post(accept))
            .oneshot(builder.body(Body::from(body.to_string())).unwrap())
            .await
            .unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, String::from_utf8_lossy(&bytes).into_owned())
    }

    #[tokio::test]
    async fn test_valid_body_reaches_handler() {
        let (status, body) = send(
            r#"{"name":"bot1","type":"chat","status":"ACTIVE"}"#,
            Some("application/json"),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, "bot1");
    }

    #[tokio::test]
    async fn test_invalid_fields_are_rejected() {
        let (status, body) = send(r#"{"name":"  ","type":"chat"}"#, Some("application/json")).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body.contains("Agent name must not be blank"));
        assert!(body.contains("Agent status must not be blank"));
    }

    #[tokio::test]
    async fn test_malformed_json_is_rejected() {
        let (status, body) = send("{not json", Some("application/json")).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body.contains("\"result\":\"ERROR\""));
    }

    #[tokio::test]
    async fn test_missing_content_type_is_rejected() {
        let (status, _) = send(r#"{"name":"bot1"}"#, None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }
}
