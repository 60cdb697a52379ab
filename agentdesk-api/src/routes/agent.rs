//! Agent REST API Routes
//!
//! This module implements Axum route handlers for agent operations.
//! Every handler delegates to `AgentService` and wraps the outcome in the
//! `{ result, message, data }` envelope.

use axum::{
    extract::{
        rejection::{PathRejection, QueryRejection},
        Path, Query, State,
    },
    routing::{get, put},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::{
    error::{ApiError, ApiResult},
    extractors::{AgentIdPath, ValidatedJson},
    services::AgentService,
    types::{AgentDraft, AgentDto, ApiResponse},
};

pub const CREATED_MESSAGE: &str = "Agent created successfully";
pub const UPDATED_MESSAGE: &str = "Agent updated successfully";
pub const DELETED_MESSAGE: &str = "Agent deleted successfully";
pub const ACTIVATED_MESSAGE: &str = "Agent activated successfully";
pub const DEACTIVATED_MESSAGE: &str = "Agent deactivated successfully";

type AgentEnvelope = ApiResult<Json<ApiResponse<AgentDto>>>;
type AgentListEnvelope = ApiResult<Json<ApiResponse<Vec<AgentDto>>>>;
type CountEnvelope = ApiResult<Json<ApiResponse<u64>>>;

// ============================================================================
// SHARED STATE
// ============================================================================

/// Shared application state for agent routes.
#[derive(Clone)]
pub struct AgentState {
    pub service: AgentService,
}

impl AgentState {
    pub fn new(service: AgentService) -> Self {
        Self { service }
    }
}

/// Query string for `GET /agents/search`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SearchQuery {
    /// Substring to look for in agent names
    pub name: Option<String>,
}

// ============================================================================
// ROUTE HANDLERS
// ============================================================================

/// POST /agents - Create an agent (stored as ACTIVE)
pub async fn create_agent(
    State(state): State<Arc<AgentState>>,
    ValidatedJson(draft): ValidatedJson<AgentDraft>,
) -> AgentEnvelope {
    let agent = state.service.create(&draft).await?;
    Ok(Json(ApiResponse::success_with_message(CREATED_MESSAGE, agent)))
}

/// GET /agents/{id} - Get a live agent by id
pub async fn get_agent(
    State(state): State<Arc<AgentState>>,
    AgentIdPath(id): AgentIdPath,
) -> AgentEnvelope {
    let agent = state.service.get_by_id(id).await?;
    Ok(Json(ApiResponse::success(agent)))
}

/// GET /agents/name/{name} - Get a live agent by exact name
pub async fn get_agent_by_name(
    State(state): State<Arc<AgentState>>,
    path: Result<Path<String>, PathRejection>,
) -> AgentEnvelope {
    let Path(name) = path?;
    let agent = state.service.get_by_name(&name).await?;
    Ok(Json(ApiResponse::success(agent)))
}

/// GET /agents/name/{name}/type/{type} - Get a live agent by name and type
pub async fn get_agent_by_name_and_type(
    State(state): State<Arc<AgentState>>,
    path: Result<Path<(String, String)>, PathRejection>,
) -> AgentEnvelope {
    let Path((name, agent_type)) = path?;
    let agent = state.service.get_by_name_and_type(&name, &agent_type).await?;
    Ok(Json(ApiResponse::success(agent)))
}

/// GET /agents - List live agents, newest first
pub async fn list_agents(State(state): State<Arc<AgentState>>) -> AgentListEnvelope {
    let agents = state.service.list_all().await?;
    Ok(Json(ApiResponse::success(agents)))
}

/// GET /agents/type/{type} - List live agents of one type
pub async fn list_agents_by_type(
    State(state): State<Arc<AgentState>>,
    path: Result<Path<String>, PathRejection>,
) -> AgentListEnvelope {
    let Path(agent_type) = path?;
    let agents = state.service.list_by_type(&agent_type).await?;
    Ok(Json(ApiResponse::success(agents)))
}

/// GET /agents/status/{status} - List live agents with one status
pub async fn list_agents_by_status(
    State(state): State<Arc<AgentState>>,
    path: Result<Path<String>, PathRejection>,
) -> AgentListEnvelope {
    let Path(status) = path?;
    let agents = state.service.list_by_status(&status).await?;
    Ok(Json(ApiResponse::success(agents)))
}

/// GET /agents/type/{type}/status/{status} - List live agents by type and status
pub async fn list_agents_by_type_and_status(
    State(state): State<Arc<AgentState>>,
    path: Result<Path<(String, String)>, PathRejection>,
) -> AgentListEnvelope {
    let Path((agent_type, status)) = path?;
    let agents = state
        .service
        .list_by_type_and_status(&agent_type, &status)
        .await?;
    Ok(Json(ApiResponse::success(agents)))
}

/// GET /agents/search?name= - Substring search on name, newest first
pub async fn search_agents(
    State(state): State<Arc<AgentState>>,
    query: Result<Query<SearchQuery>, QueryRejection>,
) -> AgentListEnvelope {
    let Query(params) = query?;
    let name = params
        .name
        .ok_or_else(|| ApiError::missing_parameter("name"))?;
    let agents = state.service.search(&name).await?;
    Ok(Json(ApiResponse::success(agents)))
}

/// PUT /agents/{id} - Replace the editable fields of a live agent
pub async fn update_agent(
    State(state): State<Arc<AgentState>>,
    AgentIdPath(id): AgentIdPath,
    ValidatedJson(draft): ValidatedJson<AgentDraft>,
) -> AgentEnvelope {
    let agent = state.service.update(id, &draft).await?;
    Ok(Json(ApiResponse::success_with_message(UPDATED_MESSAGE, agent)))
}

/// DELETE /agents/{id} - Soft-delete a live agent
pub async fn delete_agent(
    State(state): State<Arc<AgentState>>,
    AgentIdPath(id): AgentIdPath,
) -> ApiResult<Json<ApiResponse<()>>> {
    state.service.delete(id).await?;
    Ok(Json(ApiResponse::empty(DELETED_MESSAGE)))
}

/// PUT /agents/{id}/activate - Set status to ACTIVE
pub async fn activate_agent(
    State(state): State<Arc<AgentState>>,
    AgentIdPath(id): AgentIdPath,
) -> AgentEnvelope {
    let agent = state.service.activate(id).await?;
    Ok(Json(ApiResponse::success_with_message(ACTIVATED_MESSAGE, agent)))
}

/// PUT /agents/{id}/deactivate - Set status to INACTIVE
pub async fn deactivate_agent(
    State(state): State<Arc<AgentState>>,
    AgentIdPath(id): AgentIdPath,
) -> AgentEnvelope {
    let agent = state.service.deactivate(id).await?;
    Ok(Json(ApiResponse::success_with_message(DEACTIVATED_MESSAGE, agent)))
}

/// GET /agents/count/type/{type} - Count live agents of one type
pub async fn count_agents_by_type(
    State(state): State<Arc<AgentState>>,
    path: Result<Path<String>, PathRejection>,
) -> CountEnvelope {
    let Path(agent_type) = path?;
    let count = state.service.count_by_type(&agent_type).await?;
    Ok(Json(ApiResponse::success(count)))
}

/// GET /agents/count/status/{status} - Count live agents with one status
pub async fn count_agents_by_status(
    State(state): State<Arc<AgentState>>,
    path: Result<Path<String>, PathRejection>,
) -> CountEnvelope {
    let Path(status) = path?;
    let count = state.service.count_by_status(&status).await?;
    Ok(Json(ApiResponse::success(count)))
}

// ============================================================================
// ROUTER SETUP
// ============================================================================

/// Create the agent routes router, to be nested under `/agents`.
pub fn create_router(service: AgentService) -> Router {
    let state = Arc::new(AgentState::new(service));

    Router::new()
        .route("/", get(list_agents).post(create_agent))
        .route("/search", get(search_agents))
        .route("/name/:name", get(get_agent_by_name))
        .route("/name/:name/type/:type", get(get_agent_by_name_and_type))
        .route("/type/:type", get(list_agents_by_type))
        .route("/type/:type/status/:status", get(list_agents_by_type_and_status))
        .route("/status/:status", get(list_agents_by_status))
        .route("/count/type/:type", get(count_agents_by_type))
        .route("/count/status/:status", get(count_agents_by_status))
        .route(
            "/:id",
            get(get_agent).put(update_agent).delete(delete_agent),
        )
        .route("/:id/activate", put(activate_agent))
        .route("/:id/deactivate", put(deactivate_agent))
        .with_state(state)
}
