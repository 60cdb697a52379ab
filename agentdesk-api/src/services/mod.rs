//! Service Layer
//!
//! Business rules for agent records, kept out of the route handlers and the
//! record stores.

mod agent_service;

pub use agent_service::*;
