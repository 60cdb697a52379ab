//! In-memory agent record store.
//!
//! Behaves like the PostgreSQL table: sequential ids, a unique name among
//! live rows, optimistic version checks, and the same result orderings.

use std::cmp::Reverse;
use std::collections::BTreeMap;
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use agentdesk_core::{Agent, AgentId, NewAgent, StorageError, StorageResult};
use async_trait::async_trait;

use crate::{name_contains, next_updated_at, store_now, AgentRepository};

#[derive(Debug)]
struct Table {
    rows: BTreeMap<AgentId, Agent>,
    next_id: AgentId,
}

impl Default for Table {
    fn default() -> Self {
        Self {
            rows: BTreeMap::new(),
            next_id: 1,
        }
    }
}

impl Table {
    fn live(&self) -> impl Iterator<Item = &Agent> {
        self.rows.values().filter(|a| a.is_live())
    }

    fn live_name_taken(&self, name: &str, except: Option<AgentId>) -> bool {
        self.live()
            .any(|a| a.name == name && Some(a.id) != except)
    }
}

/// In-memory agent store for tests and database-less runs.
#[derive(Debug, Clone)]
pub struct InMemoryAgentRepository {
    table: Arc<RwLock<Table>>,
    case_sensitive_search: bool,
}

impl Default for InMemoryAgentRepository {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryAgentRepository {
    /// Create an empty store with case-sensitive name search.
    pub fn new() -> Self {
        Self::with_case_sensitive_search(true)
    }

    pub fn with_case_sensitive_search(case_sensitive_search: bool) -> Self {
        Self {
            table: Arc::new(RwLock::new(Table::default())),
            case_sensitive_search,
        }
    }

    /// Number of stored rows, including soft-deleted ones.
    pub fn row_count(&self) -> StorageResult<usize> {
        Ok(self.read()?.rows.len())
    }

    fn read(&self) -> StorageResult<RwLockReadGuard<'_, Table>> {
        self.table.read().map_err(|_| StorageError::LockPoisoned)
    }

    fn write(&self) -> StorageResult<RwLockWriteGuard<'_, Table>> {
        self.table.write().map_err(|_| StorageError::LockPoisoned)
    }

    fn collect_live<F>(&self, predicate: F) -> StorageResult<Vec<Agent>>
    where
        F: Fn(&Agent) -> bool,
    {
        let table = self.read()?;
        Ok(table.live().filter(|a| predicate(a)).cloned().collect())
    }
}

fn newest_first(agents: &mut [Agent]) {
    agents.sort_by_key(|a| Reverse((a.created_at, a.id)));
}

#[async_trait]
impl AgentRepository for InMemoryAgentRepository {
    async fn find_by_id(&self, id: AgentId) -> StorageResult<Option<Agent>> {
        Ok(self.read()?.rows.get(&id).cloned())
    }

    async fn find_by_name(&self, name: &str) -> StorageResult<Option<Agent>> {
        Ok(self.read()?.live().find(|a| a.name == name).cloned())
    }

    async fn find_by_name_and_type(
        &self,
        name: &str,
        agent_type: &str,
    ) -> StorageResult<Option<Agent>> {
        Ok(self
            .read()?
            .live()
            .find(|a| a.name == name && a.agent_type == agent_type)
            .cloned())
    }

    async fn list_all(&self) -> StorageResult<Vec<Agent>> {
        let mut agents = self.collect_live(|_| true)?;
        newest_first(&mut agents);
        Ok(agents)
    }

    async fn list_by_type(&self, agent_type: &str) -> StorageResult<Vec<Agent>> {
        self.collect_live(|a| a.agent_type == agent_type)
    }

    async fn list_by_status(&self, status: &str) -> StorageResult<Vec<Agent>> {
        self.collect_live(|a| a.status == status)
    }

    async fn search_by_name(&self, fragment: &str) -> StorageResult<Vec<Agent>> {
        let case_sensitive = self.case_sensitive_search;
        let mut agents = self.collect_live(|a| name_contains(&a.name, fragment, case_sensitive))?;
        newest_first(&mut agents);
        Ok(agents)
    }

    async fn list_by_type_and_status(
        &self,
        agent_type: &str,
        status: &str,
    ) -> StorageResult<Vec<Agent>> {
        self.collect_live(|a| a.agent_type == agent_type && a.status == status)
    }

    async fn count_by_type(&self, agent_type: &str) -> StorageResult<u64> {
        Ok(self.read()?.live().filter(|a| a.agent_type == agent_type).count() as u64)
    }

    async fn count_by_status(&self, status: &str) -> StorageResult<u64> {
        Ok(self.read()?.live().filter(|a| a.status == status).count() as u64)
    }

    async fn insert(&self, agent: &NewAgent) -> StorageResult<Agent> {
        let mut table = self.write()?;

        if table.live_name_taken(&agent.name, None) {
            return Err(StorageError::DuplicateName {
                name: agent.name.clone(),
            });
        }

        let id = table.next_id;
        table.next_id += 1;

        let row = agent.clone().into_agent(id, store_now());
        table.rows.insert(id, row.clone());
        Ok(row)
    }

    async fn update(&self, agent: &Agent) -> StorageResult<Agent> {
        let mut table = self.write()?;

        let stored = table
            .rows
            .get(&agent.id)
            .ok_or(StorageError::NotFound { id: agent.id })?;

        if stored.version != agent.version {
            return Err(StorageError::VersionConflict {
                id: agent.id,
                expected: agent.version,
            });
        }

        if !agent.is_deleted && table.live_name_taken(&agent.name, Some(agent.id)) {
            return Err(StorageError::DuplicateName {
                name: agent.name.clone(),
            });
        }

        let row = Agent {
            created_at: stored.created_at,
            updated_at: next_updated_at(stored.updated_at, store_now()),
            version: stored.version + 1,
            ..agent.clone()
        };
        table.rows.insert(row.id, row.clone());
        Ok(row)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn new_agent(name: &str, agent_type: &str, status: &str) -> NewAgent {
        NewAgent {
            name: name.to_string(),
            description: None,
            agent_type: agent_type.to_string(),
            status: status.to_string(),
            config: None,
            created_by: None,
            updated_by: None,
        }
    }

    async fn soft_delete(repo: &InMemoryAgentRepository, id: AgentId) -> StorageResult<Agent> {
        let mut row = repo
            .find_by_id(id)
            .await?
            .ok_or(StorageError::NotFound { id })?;
        row.is_deleted = true;
        repo.update(&row).await
    }

    #[tokio::test]
    async fn test_insert_assigns_sequential_ids() -> StorageResult<()> {
        let repo = InMemoryAgentRepository::new();
        let a = repo.insert(&new_agent("a", "chat", "ACTIVE")).await?;
        let b = repo.insert(&new_agent("b", "chat", "ACTIVE")).await?;

        assert_eq!(a.id, 1);
        assert_eq!(b.id, 2);
        assert!(!a.is_deleted);
        assert_eq!(a.version, 0);
        assert_eq!(a.created_at, a.updated_at);
        Ok(())
    }

    #[tokio::test]
    async fn test_insert_rejects_live_duplicate_name() -> StorageResult<()> {
        let repo = InMemoryAgentRepository::new();
        repo.insert(&new_agent("dup", "chat", "ACTIVE")).await?;

        let err = repo.insert(&new_agent("dup", "other", "ACTIVE")).await;
        assert_eq!(err, Err(StorageError::DuplicateName { name: "dup".into() }));
        Ok(())
    }

    #[tokio::test]
    async fn test_deleted_name_can_be_reused() -> StorageResult<()> {
        let repo = InMemoryAgentRepository::new();
        let first = repo.insert(&new_agent("reuse", "chat", "ACTIVE")).await?;
        soft_delete(&repo, first.id).await?;

        let second = repo.insert(&new_agent("reuse", "chat", "ACTIVE")).await?;
        assert_ne!(first.id, second.id);
        assert_eq!(repo.find_by_name("reuse").await?.map(|a| a.id), Some(second.id));
        assert_eq!(repo.row_count()?, 2);
        Ok(())
    }

    #[tokio::test]
    async fn test_update_bumps_version_and_keeps_created_at() -> StorageResult<()> {
        let repo = InMemoryAgentRepository::new();
        let row = repo.insert(&new_agent("v", "chat", "ACTIVE")).await?;

        let mut changed = row.clone();
        changed.status = "TRAINING".to_string();
        changed.created_at = row.created_at + chrono::Duration::days(1);
        let updated = repo.update(&changed).await?;

        assert_eq!(updated.version, 1);
        assert_eq!(updated.created_at, row.created_at);
        assert!(updated.updated_at > row.updated_at);
        assert_eq!(updated.status, "TRAINING");
        Ok(())
    }

    #[tokio::test]
    async fn test_update_with_stale_version_fails() -> StorageResult<()> {
        let repo = InMemoryAgentRepository::new();
        let row = repo.insert(&new_agent("stale", "chat", "ACTIVE")).await?;
        repo.update(&row).await?;

        let err = repo.update(&row).await;
        assert_eq!(
            err,
            Err(StorageError::VersionConflict { id: row.id, expected: 0 })
        );
        Ok(())
    }

    #[tokio::test]
    async fn test_update_rename_onto_live_name_fails() -> StorageResult<()> {
        let repo = InMemoryAgentRepository::new();
        repo.insert(&new_agent("taken", "chat", "ACTIVE")).await?;
        let mut other = repo.insert(&new_agent("other", "chat", "ACTIVE")).await?;

        other.name = "taken".to_string();
        let err = repo.update(&other).await;
        assert!(matches!(err, Err(StorageError::DuplicateName { .. })));
        Ok(())
    }

    #[tokio::test]
    async fn test_update_missing_row() {
        let repo = InMemoryAgentRepository::new();
        let ghost = new_agent("ghost", "chat", "ACTIVE").into_agent(42, store_now());
        assert_eq!(
            repo.update(&ghost).await,
            Err(StorageError::NotFound { id: 42 })
        );
    }

    #[tokio::test]
    async fn test_reads_hide_deleted_rows() -> StorageResult<()> {
        let repo = InMemoryAgentRepository::new();
        let keep = repo.insert(&new_agent("keep", "chat", "ACTIVE")).await?;
        let gone = repo.insert(&new_agent("gone", "chat", "ACTIVE")).await?;
        soft_delete(&repo, gone.id).await?;

        assert!(repo.find_by_name("gone").await?.is_none());
        assert!(repo.find_by_name_and_type("gone", "chat").await?.is_none());
        assert_eq!(repo.list_all().await?.len(), 1);
        assert_eq!(repo.list_by_type("chat").await?[0].id, keep.id);
        assert_eq!(repo.count_by_type("chat").await?, 1);
        assert_eq!(repo.count_by_status("ACTIVE").await?, 1);
        assert!(repo.search_by_name("gone").await?.is_empty());

        // Direct lookup still surfaces the row.
        let found = repo.find_by_id(gone.id).await?;
        assert!(found.map(|a| a.is_deleted).unwrap_or(false));
        Ok(())
    }

    #[tokio::test]
    async fn test_list_all_is_newest_first() -> StorageResult<()> {
        let repo = InMemoryAgentRepository::new();
        for name in ["one", "two", "three"] {
            repo.insert(&new_agent(name, "chat", "ACTIVE")).await?;
        }

        let names: Vec<_> = repo.list_all().await?.into_iter().map(|a| a.name).collect();
        assert_eq!(names, vec!["three", "two", "one"]);
        Ok(())
    }

    #[tokio::test]
    async fn test_type_and_status_filters() -> StorageResult<()> {
        let repo = InMemoryAgentRepository::new();
        repo.insert(&new_agent("a", "chat", "ACTIVE")).await?;
        repo.insert(&new_agent("b", "chat", "INACTIVE")).await?;
        repo.insert(&new_agent("c", "vision", "ACTIVE")).await?;

        assert_eq!(repo.list_by_type_and_status("chat", "ACTIVE").await?.len(), 1);
        assert_eq!(repo.list_by_status("ACTIVE").await?.len(), 2);
        assert_eq!(repo.count_by_type("missing").await?, 0);
        assert!(repo.list_by_type("missing").await?.is_empty());
        Ok(())
    }

    #[tokio::test]
    async fn test_case_insensitive_search() -> StorageResult<()> {
        let repo = InMemoryAgentRepository::with_case_sensitive_search(false);
        repo.insert(&new_agent("SupportBot", "chat", "ACTIVE")).await?;

        assert_eq!(repo.search_by_name("supportbot").await?.len(), 1);
        Ok(())
    }

    proptest! {
        #[test]
        fn prop_search_matches_substring_filter(
            names in prop::collection::hash_set("[a-c]{1,4}", 1..12),
            fragment in "[a-c]{0,2}",
        ) {
            let rt = tokio::runtime::Builder::new_current_thread()
                .build()
                .map_err(|e| TestCaseError::fail(e.to_string()))?;
            rt.block_on(async {
                let repo = InMemoryAgentRepository::new();
                for name in &names {
                    repo.insert(&new_agent(name, "chat", "ACTIVE"))
                        .await
                        .map_err(|e| TestCaseError::fail(e.to_string()))?;
                }

                let found = repo
                    .search_by_name(&fragment)
                    .await
                    .map_err(|e| TestCaseError::fail(e.to_string()))?;

                let expected = names.iter().filter(|n| n.contains(fragment.as_str())).count();
                prop_assert_eq!(found.len(), expected);
                prop_assert!(found.iter().all(|a| a.name.contains(fragment.as_str())));
                prop_assert!(found.windows(2).all(|w| (w[0].created_at, w[0].id) > (w[1].created_at, w[1].id)));
                Ok::<(), TestCaseError>(())
            })?;
        }
    }
}
