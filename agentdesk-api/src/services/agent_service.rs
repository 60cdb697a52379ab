//! Agent Service
//!
//! Business rules for agent records: live-name uniqueness, the soft-delete
//! guard on every by-id operation, and the status writes done by create,
//! activate and deactivate. Persistence goes through `AgentRepository`.

use std::sync::Arc;

use agentdesk_core::{Agent, AgentError, AgentId, AgentResult, AgentStatus};
use agentdesk_storage::AgentRepository;

use crate::types::{AgentDraft, AgentDto};

/// Domain service over an agent record store.
#[derive(Clone)]
pub struct AgentService {
    repo: Arc<dyn AgentRepository>,
}

impl AgentService {
    pub fn new(repo: Arc<dyn AgentRepository>) -> Self {
        Self { repo }
    }

    // ========================================================================
    // WRITES
    // ========================================================================

    /// Create a live agent. The stored status is always ACTIVE, whatever the
    /// draft says.
    ///
    /// # Errors
    /// `NameConflict` if a live agent already has the draft's name.
    pub async fn create(&self, draft: &AgentDraft) -> AgentResult<AgentDto> {
        tracing::info!(name = draft.name(), "Creating agent");

        if self.repo.find_by_name(draft.name()).await?.is_some() {
            return Err(AgentError::NameConflict {
                name: draft.name().to_string(),
            });
        }

        let mut new_agent = draft.to_new_agent();
        new_agent.status = AgentStatus::Active.into();

        let agent = self.repo.insert(&new_agent).await?;
        tracing::info!(id = agent.id, "Agent created");
        Ok(AgentDto::from(agent))
    }

    /// Overwrite the editable fields of a live agent.
    ///
    /// The name check only runs when the name changes, so resubmitting an
    /// agent's own name is fine.
    pub async fn update(&self, id: AgentId, draft: &AgentDraft) -> AgentResult<AgentDto> {
        tracing::info!(id, "Updating agent");

        let mut agent = self.load_live(id).await?;

        if draft.name() != agent.name && self.repo.find_by_name(draft.name()).await?.is_some() {
            return Err(AgentError::NameConflict {
                name: draft.name().to_string(),
            });
        }

        draft.apply_to(&mut agent);
        let agent = self.repo.update(&agent).await?;
        tracing::info!(id, "Agent updated");
        Ok(AgentDto::from(agent))
    }

    /// Soft-delete a live agent. Deleting twice fails with `Deleted`.
    pub async fn delete(&self, id: AgentId) -> AgentResult<()> {
        tracing::info!(id, "Deleting agent");

        let mut agent = self.load_live(id).await?;
        agent.is_deleted = true;
        self.repo.update(&agent).await?;

        tracing::info!(id, "Agent deleted");
        Ok(())
    }

    pub async fn activate(&self, id: AgentId) -> AgentResult<AgentDto> {
        tracing::info!(id, "Activating agent");
        let agent = self.set_status(id, AgentStatus::Active).await?;
        tracing::info!(id, "Agent activated");
        Ok(agent)
    }

    pub async fn deactivate(&self, id: AgentId) -> AgentResult<AgentDto> {
        tracing::info!(id, "Deactivating agent");
        let agent = self.set_status(id, AgentStatus::Inactive).await?;
        tracing::info!(id, "Agent deactivated");
        Ok(agent)
    }

    // ========================================================================
    // LOOKUPS
    // ========================================================================

    /// # Errors
    /// `NotFound` for an unknown id, `Deleted` for a soft-deleted one.
    pub async fn get_by_id(&self, id: AgentId) -> AgentResult<AgentDto> {
        tracing::info!(id, "Fetching agent by id");
        Ok(AgentDto::from(self.load_live(id).await?))
    }

    pub async fn get_by_name(&self, name: &str) -> AgentResult<AgentDto> {
        tracing::info!(name, "Fetching agent by name");
        self.repo
            .find_by_name(name)
            .await?
            .map(AgentDto::from)
            .ok_or_else(|| AgentError::NotFoundByName {
                name: name.to_string(),
            })
    }

    pub async fn get_by_name_and_type(
        &self,
        name: &str,
        agent_type: &str,
    ) -> AgentResult<AgentDto> {
        tracing::info!(name, agent_type, "Fetching agent by name and type");
        self.repo
            .find_by_name_and_type(name, agent_type)
            .await?
            .map(AgentDto::from)
            .ok_or_else(|| AgentError::NotFoundByNameAndType {
                name: name.to_string(),
                agent_type: agent_type.to_string(),
            })
    }

    // ========================================================================
    // LISTINGS AND COUNTS
    // ========================================================================

    pub async fn list_all(&self) -> AgentResult<Vec<AgentDto>> {
        tracing::info!("Listing all agents");
        Ok(to_dtos(self.repo.list_all().await?))
    }

    pub async fn list_by_type(&self, agent_type: &str) -> AgentResult<Vec<AgentDto>> {
        tracing::info!(agent_type, "Listing agents by type");
        Ok(to_dtos(self.repo.list_by_type(agent_type).await?))
    }

    pub async fn list_by_status(&self, status: &str) -> AgentResult<Vec<AgentDto>> {
        tracing::info!(status, "Listing agents by status");
        Ok(to_dtos(self.repo.list_by_status(status).await?))
    }

    pub async fn list_by_type_and_status(
        &self,
        agent_type: &str,
        status: &str,
    ) -> AgentResult<Vec<AgentDto>> {
        tracing::info!(agent_type, status, "Listing agents by type and status");
        Ok(to_dtos(
            self.repo.list_by_type_and_status(agent_type, status).await?,
        ))
    }

    /// Live agents whose name contains `name_part`, newest first.
    pub async fn search(&self, name_part: &str) -> AgentResult<Vec<AgentDto>> {
        tracing::info!(name_part, "Searching agents by name");
        Ok(to_dtos(self.repo.search_by_name(name_part).await?))
    }

    pub async fn count_by_type(&self, agent_type: &str) -> AgentResult<u64> {
        tracing::info!(agent_type, "Counting agents by type");
        Ok(self.repo.count_by_type(agent_type).await?)
    }

    pub async fn count_by_status(&self, status: &str) -> AgentResult<u64> {
        tracing::info!(status, "Counting agents by status");
        Ok(self.repo.count_by_status(status).await?)
    }

    // ========================================================================
    // HELPERS
    // ========================================================================

    async fn load_live(&self, id: AgentId) -> AgentResult<Agent> {
        match self.repo.find_by_id(id).await? {
            None => Err(AgentError::NotFound { id }),
            Some(agent) if agent.is_deleted => Err(AgentError::Deleted { id }),
            Some(agent) => Ok(agent),
        }
    }

    async fn set_status(&self, id: AgentId, status: AgentStatus) -> AgentResult<AgentDto> {
        let mut agent = self.load_live(id).await?;
        agent.set_status(status);
        Ok(AgentDto::from(self.repo.update(&agent).await?))
    }
}

fn to_dtos(agents: Vec<Agent>) -> Vec<AgentDto> {
    agents.iter().map(AgentDto::from).collect()
}

// =============================================================================
// TESTS
// =============================================================================
