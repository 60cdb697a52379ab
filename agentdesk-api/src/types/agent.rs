//! Agent-related API types
//!
//! `AgentDraft` is what clients send, `AgentDto` is what they get back. The
//! conversions to and from the stored `Agent` are spelled out field by field
//! so the wire shape and the table can change independently.

use agentdesk_core::{limits, Agent, AgentId, NewAgent, Timestamp};
use serde::{Deserialize, Serialize};

use crate::error::ApiResult;
use crate::validation::{Validate, ValidateMaxChars, ValidateNotBlank, Violations};

/// Request body for create and full update.
///
/// Server-controlled fields (`id`, `createdAt`, `updatedAt`, `isDeleted`,
/// `version`) are not part of the draft and are ignored if sent.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AgentDraft {
    /// Unique among live agents; required
    pub name: Option<String>,
    pub description: Option<String>,
    /// Free-form category tag; required
    #[serde(rename = "type")]
    pub agent_type: Option<String>,
    /// Required; ignored on create, which always stores ACTIVE
    pub status: Option<String>,
    /// Opaque configuration text
    pub config: Option<String>,
    pub created_by: Option<String>,
    pub updated_by: Option<String>,
}

impl AgentDraft {
    /// Draft with the three required fields set.
    pub fn new(
        name: impl Into<String>,
        agent_type: impl Into<String>,
        status: impl Into<String>,
    ) -> Self {
        Self {
            name: Some(name.into()),
            agent_type: Some(agent_type.into()),
            status: Some(status.into()),
            ..Self::default()
        }
    }

    pub fn name(&self) -> &str {
        self.name.as_deref().unwrap_or_default()
    }

    pub fn agent_type(&self) -> &str {
        self.agent_type.as_deref().unwrap_or_default()
    }

    pub fn status(&self) -> &str {
        self.status.as_deref().unwrap_or_default()
    }

    /// Draft → insert payload. Status is copied as given; the service
    /// overrides it before inserting.
    pub fn to_new_agent(&self) -> NewAgent {
        NewAgent {
            name: self.name().to_string(),
            description: self.description.clone(),
            agent_type: self.agent_type().to_string(),
            status: self.status().to_string(),
            config: self.config.clone(),
            created_by: self.created_by.clone(),
            updated_by: self.updated_by.clone(),
        }
    }

    /// Overwrite the client-editable columns of an existing row.
    ///
    /// `created_by` is fixed at creation and left alone.
    pub fn apply_to(&self, agent: &mut Agent) {
        agent.name = self.name().to_string();
        agent.description = self.description.clone();
        agent.agent_type = self.agent_type().to_string();
        agent.status = self.status().to_string();
        agent.config = self.config.clone();
        agent.updated_by = self.updated_by.clone();
    }
}

impl Validate for AgentDraft {
    fn validate(&self) -> ApiResult<()> {
        let mut violations = Violations::new();

        self.name.check_not_blank("Agent name", &mut violations);
        self.name
            .check_max_chars("Agent name", limits::NAME_MAX, &mut violations);
        self.description
            .check_max_chars("Agent description", limits::DESCRIPTION_MAX, &mut violations);
        self.agent_type.check_not_blank("Agent type", &mut violations);
        self.agent_type
            .check_max_chars("Agent type", limits::TYPE_MAX, &mut violations);
        self.status.check_not_blank("Agent status", &mut violations);
        self.status
            .check_max_chars("Agent status", limits::STATUS_MAX, &mut violations);
        self.created_by
            .check_max_chars("Creator", limits::ACTOR_MAX, &mut violations);
        self.updated_by
            .check_max_chars("Updater", limits::ACTOR_MAX, &mut violations);

        violations.into_result()
    }
}

/// Agent as exposed to clients. `isDeleted` stays internal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AgentDto {
    pub id: AgentId,
    pub name: String,
    pub description: Option<String>,
    #[serde(rename = "type")]
    pub agent_type: String,
    pub status: String,
    pub config: Option<String>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
    pub created_by: Option<String>,
    pub updated_by: Option<String>,
    pub version: i64,
}

impl From<&Agent> for AgentDto {
    fn from(agent: &Agent) -> Self {
        Self {
            id: agent.id,
            name: agent.name.clone(),
            description: agent.description.clone(),
            agent_type: agent.agent_type.clone(),
            status: agent.status.clone(),
            config: agent.config.clone(),
            created_at: agent.created_at,
            updated_at: agent.updated_at,
            created_by: agent.created_by.clone(),
            updated_by: agent.updated_by.clone(),
            version: agent.version,
        }
    }
}

impl From<Agent> for AgentDto {
    fn from(agent: Agent) -> Self {
        Self::from(&agent)
    }
}
