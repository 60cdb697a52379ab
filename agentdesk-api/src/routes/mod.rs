//! REST API Routes Module
//!
//! Assembles the agent routes under `/agents` and wraps them in the shared
//! middleware stack:
//! - request tracing
//! - CORS support for browser-based clients
//! - a per-request timeout
//! - panic recovery into the failure envelope

pub mod agent;

use std::any::Any;
use std::time::Duration;

use axum::{
    error_handling::HandleErrorLayer,
    http::{header, HeaderValue, Method, StatusCode},
    response::{IntoResponse, Response},
    BoxError, Json, Router,
};
use tower::{timeout::error::Elapsed, ServiceBuilder};
use tower_http::{
    catch_panic::CatchPanicLayer,
    cors::{Any as AnyOrigin, CorsLayer},
    trace::TraceLayer,
};

use crate::config::ApiConfig;
use crate::error::{ApiError, GENERIC_ERROR_MESSAGE};
use crate::services::AgentService;
use crate::types::ApiResponse;

// Re-export route creation functions for convenience
pub use agent::create_router as agent_router;

// ============================================================================
// MIDDLEWARE
// ============================================================================

/// Build the CORS layer from ApiConfig.
///
/// In development mode (empty origins), allows all origins.
/// In production mode, only allows configured origins.
fn build_cors_layer(config: &ApiConfig) -> CorsLayer {
    let cors = CorsLayer::new()
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([header::CONTENT_TYPE, header::ACCEPT])
        .max_age(Duration::from_secs(config.cors_max_age_secs));

    if config.cors_origins.is_empty() {
        tracing::info!("CORS: Development mode - allowing all origins");
        cors.allow_origin(AnyOrigin)
    } else {
        tracing::info!(
            "CORS: Production mode - allowing origins: {:?}",
            config.cors_origins
        );
        let origins: Vec<HeaderValue> = config
            .cors_origins
            .iter()
            .filter_map(|o| o.parse().ok())
            .collect();
        cors.allow_origin(origins)
    }
}

/// Turn a middleware failure (timeout or otherwise) into the 500 envelope.
async fn handle_middleware_error(err: BoxError) -> ApiError {
    if err.is::<Elapsed>() {
        ApiError::internal_error("Request timed out")
    } else {
        ApiError::internal_error(format!("Unhandled middleware error: {}", err))
    }
}

/// Response for a handler that panicked.
fn handle_panic(panic: Box<dyn Any + Send + 'static>) -> Response {
    let detail = if let Some(s) = panic.downcast_ref::<String>() {
        s.clone()
    } else if let Some(s) = panic.downcast_ref::<&str>() {
        s.to_string()
    } else {
        "unknown panic payload".to_string()
    };
    tracing::error!(panic = %detail, "handler panicked");

    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(ApiResponse::<()>::error(GENERIC_ERROR_MESSAGE)),
    )
        .into_response()
}

/// Apply tracing, CORS, timeout and panic recovery to `router`.
pub fn with_middleware(router: Router, config: &ApiConfig) -> Router {
    router.layer(
        ServiceBuilder::new()
            .layer(TraceLayer::new_for_http())
            .layer(build_cors_layer(config))
            .layer(HandleErrorLayer::new(handle_middleware_error))
            .timeout(config.request_timeout)
            .layer(CatchPanicLayer::custom(handle_panic)),
    )
}

// ============================================================================
// ROUTER ASSEMBLY
// ============================================================================

/// Create the complete API router.
///
/// - Agent CRUD routes under `/agents`
/// - Request tracing, CORS, request timeout and panic recovery
pub fn create_api_router(service: AgentService, config: &ApiConfig) -> Router {
    let router = Router::new().nest("/agents", agent_router(service));
    with_middleware(router, config)
}
