//! agentdesk Storage - Repository Trait and In-Memory Store
//!
//! Defines the query surface over the agent record store. The PostgreSQL
//! implementation lives in agentdesk-api next to its connection pool.

pub mod memory;

pub use memory::InMemoryAgentRepository;

use agentdesk_core::{Agent, AgentId, NewAgent, StorageResult, Timestamp};
use async_trait::async_trait;
use chrono::{Duration, SubsecRound};

/// Query surface over the agent record store.
///
/// Every "by X" read returns an empty result for non-matches rather than an
/// error, and every read except `find_by_id` ignores soft-deleted rows.
/// Name uniqueness among live rows is enforced by `insert` and `update`.
#[async_trait]
pub trait AgentRepository: Send + Sync {
    // ========================================================================
    // LOOKUPS
    // ========================================================================

    /// Get a row by id, deleted or not.
    async fn find_by_id(&self, id: AgentId) -> StorageResult<Option<Agent>>;

    /// Get the live row with this exact name.
    async fn find_by_name(&self, name: &str) -> StorageResult<Option<Agent>>;

    /// Get the live row with this exact name and type.
    async fn find_by_name_and_type(
        &self,
        name: &str,
        agent_type: &str,
    ) -> StorageResult<Option<Agent>>;

    // ========================================================================
    // LISTINGS
    // ========================================================================

    /// All live rows, newest first.
    async fn list_all(&self) -> StorageResult<Vec<Agent>>;

    /// Live rows of one type, in id order.
    async fn list_by_type(&self, agent_type: &str) -> StorageResult<Vec<Agent>>;

    /// Live rows with one status, in id order.
    async fn list_by_status(&self, status: &str) -> StorageResult<Vec<Agent>>;

    /// Live rows whose name contains `fragment`, newest first.
    async fn search_by_name(&self, fragment: &str) -> StorageResult<Vec<Agent>>;

    /// Live rows matching both type and status, in id order.
    async fn list_by_type_and_status(
        &self,
        agent_type: &str,
        status: &str,
    ) -> StorageResult<Vec<Agent>>;

    // ========================================================================
    // COUNTS
    // ========================================================================

    async fn count_by_type(&self, agent_type: &str) -> StorageResult<u64>;

    async fn count_by_status(&self, status: &str) -> StorageResult<u64>;

    // ========================================================================
    // WRITES
    // ========================================================================

    /// Insert a new live row and return it with its assigned id and timestamps.
    async fn insert(&self, agent: &NewAgent) -> StorageResult<Agent>;

    /// Replace the mutable columns of `agent.id`.
    ///
    /// `agent.version` must equal the stored version; the stored row comes
    /// back with `version + 1` and a strictly later `updated_at`.
    /// `created_at` is never overwritten.
    async fn update(&self, agent: &Agent) -> StorageResult<Agent>;
}

/// Current time at the record store's resolution (microseconds).
pub fn store_now() -> Timestamp {
    chrono::Utc::now().trunc_subsecs(6)
}

/// The `updated_at` to stamp on a row last touched at `previous`.
///
/// Never equal to or earlier than `previous`, even when the clock has not
/// advanced a full tick since.
pub fn next_updated_at(previous: Timestamp, now: Timestamp) -> Timestamp {
    let floor = previous + Duration::microseconds(1);
    if now > floor {
        now
    } else {
        floor
    }
}

/// Substring test used by name search.
pub fn name_contains(name: &str, fragment: &str, case_sensitive: bool) -> bool {
    if case_sensitive {
        name.contains(fragment)
    } else {
        name.to_lowercase().contains(&fragment.to_lowercase())
    }
}
