//! agentdesk API - REST Layer for the Agent Registry
//!
//! Exposes agent records over a JSON REST API (Axum). Every response is
//! wrapped in the `{ result, message, data }` envelope; caller mistakes map
//! to HTTP 400 and everything else to HTTP 500.
//!
//! Records live in PostgreSQL (`DbClient`) or, for tests and database-less
//! runs, in the in-memory store from agentdesk-storage.

pub mod config;
pub mod db;
pub mod error;
pub mod extractors;
pub mod routes;
pub mod services;
pub mod telemetry;
pub mod types;
pub mod validation;

// Re-export commonly used types
pub use config::{ApiConfig, StoreBackend};
pub use db::{DbClient, DbConfig};
pub use error::{ApiError, ApiResult, ErrorCode};
pub use routes::create_api_router;
pub use services::AgentService;
pub use types::*;
