//! API Request and Response Types
//!
//! Wire shapes shared by every agent endpoint.

// Response envelope
mod response;
pub use response::*;

// Agent types
mod agent;
pub use agent::*;
