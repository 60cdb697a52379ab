//! agentdesk Core - Entity Types
//!
//! Plain data types and the error taxonomy shared by the storage and API
//! crates. No I/O lives here.

pub mod entities;
pub mod error;

pub use entities::{limits, Agent, AgentId, AgentStatus, NewAgent, Timestamp};
pub use error::{AgentError, AgentResult, StorageError, StorageResult};
