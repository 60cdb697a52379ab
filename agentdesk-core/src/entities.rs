//! Agent entity and insert payload.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Server-assigned agent identifier (`BIGSERIAL` in the record store).
pub type AgentId = i64;

/// Timestamp type using UTC timezone.
pub type Timestamp = DateTime<Utc>;

// ============================================================================
// FIELD LIMITS
// ============================================================================

/// Maximum lengths, in characters, of the bounded string columns.
pub mod limits {
    pub const NAME_MAX: usize = 100;
    pub const DESCRIPTION_MAX: usize = 500;
    pub const TYPE_MAX: usize = 50;
    pub const STATUS_MAX: usize = 20;
    pub const ACTOR_MAX: usize = 50;
}

// ============================================================================
// STATUS
// ============================================================================

/// Well-known agent status values.
///
/// The stored `status` column is free-form text; these are the values the
/// service itself writes (`Active` on create/activate, `Inactive` on
/// deactivate) plus `Training`, which clients may set through a full update.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AgentStatus {
    Active,
    Inactive,
    Training,
}

impl AgentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            AgentStatus::Active => "ACTIVE",
            AgentStatus::Inactive => "INACTIVE",
            AgentStatus::Training => "TRAINING",
        }
    }
}

impl fmt::Display for AgentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AgentStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "ACTIVE" => Ok(AgentStatus::Active),
            "INACTIVE" => Ok(AgentStatus::Inactive),
            "TRAINING" => Ok(AgentStatus::Training),
            other => Err(format!("Unknown agent status: {}", other)),
        }
    }
}

impl From<AgentStatus> for String {
    fn from(status: AgentStatus) -> Self {
        status.as_str().to_string()
    }
}

// ============================================================================
// ENTITY
// ============================================================================

/// A persisted agent row.
///
/// Rows are never physically removed; `is_deleted` hides them from every
/// read path except lookup by id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Agent {
    pub id: AgentId,
    pub name: String,
    pub description: Option<String>,
    pub agent_type: String,
    pub status: String,
    /// Opaque configuration text, stored as given.
    pub config: Option<String>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
    pub created_by: Option<String>,
    pub updated_by: Option<String>,
    pub is_deleted: bool,
    /// Optimistic-concurrency counter, bumped by the store on every update.
    pub version: i64,
}

impl Agent {
    /// Whether this row is visible to name/type/status/list queries.
    pub fn is_live(&self) -> bool {
        !self.is_deleted
    }

    pub fn set_status(&mut self, status: AgentStatus) {
        self.status = status.into();
    }
}

/// Column values for a new row. The store assigns `id`, timestamps and
/// `version`, and always inserts with `is_deleted = false`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewAgent {
    pub name: String,
    pub description: Option<String>,
    pub agent_type: String,
    pub status: String,
    pub config: Option<String>,
    pub created_by: Option<String>,
    pub updated_by: Option<String>,
}

impl NewAgent {
    /// Materialize the row the store will hold for this payload.
    pub fn into_agent(self, id: AgentId, now: Timestamp) -> Agent {
        Agent {
            id,
            name: self.name,
            description: self.description,
            agent_type: self.agent_type,
            status: self.status,
            config: self.config,
            created_at: now,
            updated_at: now,
            created_by: self.created_by,
            updated_by: self.updated_by,
            is_deleted: false,
            version: 0,
        }
    }
}
