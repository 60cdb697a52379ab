//! Shared helpers for HTTP-level tests.
#![allow(dead_code)]

use std::sync::Arc;

use agentdesk_api::{create_api_router, AgentService, ApiConfig};
use agentdesk_storage::{AgentRepository, InMemoryAgentRepository};
use axum::{
    body::Body,
    http::{header, Method, Request, StatusCode},
    Router,
};
use serde_json::{json, Value};
use tower::ServiceExt;

/// Full router over a fresh in-memory store.
pub fn test_app() -> Router {
    app_with_repo(Arc::new(InMemoryAgentRepository::new()))
}

pub fn app_with_repo(repo: Arc<dyn AgentRepository>) -> Router {
    create_api_router(AgentService::new(repo), &ApiConfig::default())
}

/// Send one request and decode the JSON envelope.
pub async fn send(app: &Router, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let builder = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(json) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(json.to_string())),
        None => builder.body(Body::empty()),
    }
    .expect("request");

    send_request(app, request).await
}

pub async fn send_request(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.clone().oneshot(request).await.expect("response");
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body");
    let json = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, json)
}

pub async fn get(app: &Router, uri: &str) -> (StatusCode, Value) {
    send(app, Method::GET, uri, None).await
}

pub async fn put(app: &Router, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    send(app, Method::PUT, uri, body).await
}

pub async fn delete(app: &Router, uri: &str) -> (StatusCode, Value) {
    send(app, Method::DELETE, uri, None).await
}

pub fn draft(name: &str, agent_type: &str, status: &str) -> Value {
    json!({ "name": name, "type": agent_type, "status": status })
}

/// Create an agent and return the `data` of the envelope.
pub async fn create(app: &Router, name: &str, agent_type: &str, status: &str) -> Value {
    let (status_code, body) = send(
        app,
        Method::POST,
        "/agents",
        Some(draft(name, agent_type, status)),
    )
    .await;
    assert_eq!(status_code, StatusCode::OK, "create failed: {}", body);
    body["data"].clone()
}

pub fn id_of(agent: &Value) -> i64 {
    agent["id"].as_i64().expect("numeric id")
}
