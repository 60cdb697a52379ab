//! Database Connection Pool Module
//!
//! PostgreSQL connection pooling using deadpool-postgres, the `agents` table
//! schema, and the `AgentRepository` implementation over it.
//!
//! Live-name uniqueness is enforced by a partial unique index, so two
//! concurrent creates with the same name cannot both commit.

use agentdesk_core::{Agent, AgentId, NewAgent, StorageError, StorageResult};
use agentdesk_storage::{store_now, AgentRepository};
use async_trait::async_trait;
use deadpool_postgres::{Config, ManagerConfig, Pool, PoolConfig, RecyclingMethod, Runtime};
use std::time::Duration;
use tokio_postgres::{error::SqlState, NoTls, Row};

use crate::error::{ApiError, ApiResult};

// ============================================================================
// CONNECTION POOL CONFIGURATION
// ============================================================================

/// Database connection pool configuration.
#[derive(Debug, Clone)]
pub struct DbConfig {
    /// PostgreSQL host
    pub host: String,
    /// PostgreSQL port
    pub port: u16,
    /// Database name
    pub dbname: String,
    /// Database user
    pub user: String,
    /// Database password
    pub password: String,
    /// Maximum pool size
    pub max_size: usize,
    /// Wait and connect timeout for pool checkouts
    pub timeout: Duration,
}

impl Default for DbConfig {
    fn default() -> Self {
        Self {
            host: "localhost".to_string(),
            port: 5432,
            dbname: "agentdesk".to_string(),
            user: "postgres".to_string(),
            password: "".to_string(),
            max_size: 16,
            timeout: Duration::from_secs(30),
        }
    }
}

impl DbConfig {
    /// Create a new database configuration from environment variables.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            host: std::env::var("AGENTDESK_DB_HOST").unwrap_or(defaults.host),
            port: std::env::var("AGENTDESK_DB_PORT")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.port),
            dbname: std::env::var("AGENTDESK_DB_NAME").unwrap_or(defaults.dbname),
            user: std::env::var("AGENTDESK_DB_USER").unwrap_or(defaults.user),
            password: std::env::var("AGENTDESK_DB_PASSWORD").unwrap_or_default(),
            max_size: std::env::var("AGENTDESK_DB_POOL_SIZE")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.max_size),
            timeout: std::env::var("AGENTDESK_DB_TIMEOUT")
                .ok()
                .and_then(|s| s.parse().ok())
                .map(Duration::from_secs)
                .unwrap_or(defaults.timeout),
        }
    }

    /// Create a connection pool from this configuration.
    ///
    /// No connection is opened until the first checkout.
    pub fn create_pool(&self) -> ApiResult<Pool> {
        let mut cfg = Config::new();
        cfg.host = Some(self.host.clone());
        cfg.port = Some(self.port);
        cfg.dbname = Some(self.dbname.clone());
        cfg.user = Some(self.user.clone());
        cfg.password = Some(self.password.clone());

        cfg.manager = Some(ManagerConfig {
            recycling_method: RecyclingMethod::Fast,
        });

        let mut pool_cfg = PoolConfig::new(self.max_size);
        pool_cfg.timeouts.wait = Some(self.timeout);
        pool_cfg.timeouts.create = Some(self.timeout);
        cfg.pool = Some(pool_cfg);

        let pool = cfg
            .create_pool(Some(Runtime::Tokio1), NoTls)
            .map_err(|e| ApiError::database_error(format!("Failed to create pool: {}", e)))?;

        Ok(pool)
    }
}

// ============================================================================
// SCHEMA
// ============================================================================

/// Idempotent DDL for the agent table.
pub const SCHEMA_SQL: &str = r#"
CREATE TABLE IF NOT EXISTS agents (
    id          BIGSERIAL PRIMARY KEY,
    name        VARCHAR(100) NOT NULL,
    description VARCHAR(500),
    type        VARCHAR(50)  NOT NULL,
    status      VARCHAR(20)  NOT NULL,
    config      TEXT,
    created_at  TIMESTAMPTZ  NOT NULL,
    updated_at  TIMESTAMPTZ  NOT NULL,
    created_by  VARCHAR(50),
    updated_by  VARCHAR(50),
    is_deleted  BOOLEAN      NOT NULL DEFAULT FALSE,
    version     BIGINT       NOT NULL DEFAULT 0
);

CREATE INDEX IF NOT EXISTS idx_agents_type ON agents (type);
CREATE INDEX IF NOT EXISTS idx_agents_status ON agents (status);
CREATE INDEX IF NOT EXISTS idx_agents_created_at ON agents (created_at DESC);
CREATE UNIQUE INDEX IF NOT EXISTS uq_agents_live_name ON agents (name) WHERE is_deleted = FALSE;
"#;

const COLUMNS: &str = "id, name, description, type, status, config, created_at, updated_at, \
                       created_by, updated_by, is_deleted, version";

// ============================================================================
// DATABASE CLIENT WRAPPER
// ============================================================================

/// Database client that wraps a connection pool and implements the agent
/// record store over the `agents` table.
#[derive(Clone)]
pub struct DbClient {
    pool: Pool,
    case_sensitive_search: bool,
}

impl DbClient {
    /// Create a new database client with the given pool.
    pub fn new(pool: Pool) -> Self {
        Self {
            pool,
            case_sensitive_search: true,
        }
    }

    /// Create a new database client from configuration.
    pub fn from_config(config: &DbConfig) -> ApiResult<Self> {
        let pool = config.create_pool()?;
        Ok(Self::new(pool))
    }

    /// Use `ILIKE` instead of `LIKE` for name search when `false`.
    pub fn with_case_sensitive_search(mut self, case_sensitive: bool) -> Self {
        self.case_sensitive_search = case_sensitive;
        self
    }

    /// Get the current pool size for observability.
    pub fn pool_size(&self) -> usize {
        self.pool.status().size
    }

    /// Create the agent table and its indexes if they do not exist.
    pub async fn migrate(&self) -> ApiResult<()> {
        let conn = self.pool.get().await?;
        conn.batch_execute(SCHEMA_SQL).await?;
        tracing::info!("Agent schema is up to date");
        Ok(())
    }

    /// Get a connection from the pool.
    async fn get_conn(&self) -> StorageResult<deadpool_postgres::Object> {
        self.pool
            .get()
            .await
            .map_err(|e| StorageError::PoolUnavailable {
                reason: e.to_string(),
            })
    }

    async fn query_agents(
        &self,
        sql: &str,
        params: &[&(dyn tokio_postgres::types::ToSql + Sync)],
    ) -> StorageResult<Vec<Agent>> {
        let conn = self.get_conn().await?;
        let rows = conn.query(sql, params).await.map_err(backend_error)?;
        rows.iter()
            .map(|row| agent_from_row(row).map_err(backend_error))
            .collect()
    }

    async fn query_agent(
        &self,
        sql: &str,
        params: &[&(dyn tokio_postgres::types::ToSql + Sync)],
    ) -> StorageResult<Option<Agent>> {
        let conn = self.get_conn().await?;
        let row = conn.query_opt(sql, params).await.map_err(backend_error)?;
        row.as_ref()
            .map(|row| agent_from_row(row).map_err(backend_error))
            .transpose()
    }

    async fn count(
        &self,
        sql: &str,
        params: &[&(dyn tokio_postgres::types::ToSql + Sync)],
    ) -> StorageResult<u64> {
        let conn = self.get_conn().await?;
        let row = conn.query_one(sql, params).await.map_err(backend_error)?;
        let count: i64 = row.try_get(0).map_err(backend_error)?;
        Ok(u64::try_from(count).unwrap_or(0))
    }
}

#[async_trait]
impl AgentRepository for DbClient {
    async fn find_by_id(&self, id: AgentId) -> StorageResult<Option<Agent>> {
        let sql = format!("SELECT {COLUMNS} FROM agents WHERE id = $1");
        self.query_agent(&sql, &[&id]).await
    }

    async fn find_by_name(&self, name: &str) -> StorageResult<Option<Agent>> {
        let sql = format!("SELECT {COLUMNS} FROM agents WHERE name = $1 AND is_deleted = FALSE");
        self.query_agent(&sql, &[&name]).await
    }

    async fn find_by_name_and_type(
        &self,
        name: &str,
        agent_type: &str,
    ) -> StorageResult<Option<Agent>> {
        let sql = format!(
            "SELECT {COLUMNS} FROM agents WHERE name = $1 AND type = $2 AND is_deleted = FALSE"
        );
        self.query_agent(&sql, &[&name, &agent_type]).await
    }

    async fn list_all(&self) -> StorageResult<Vec<Agent>> {
        let sql = format!(
            "SELECT {COLUMNS} FROM agents WHERE is_deleted = FALSE \
             ORDER BY created_at DESC, id DESC"
        );
        self.query_agents(&sql, &[]).await
    }

    async fn list_by_type(&self, agent_type: &str) -> StorageResult<Vec<Agent>> {
        let sql = format!(
            "SELECT {COLUMNS} FROM agents WHERE type = $1 AND is_deleted = FALSE ORDER BY id"
        );
        self.query_agents(&sql, &[&agent_type]).await
    }

    async fn list_by_status(&self, status: &str) -> StorageResult<Vec<Agent>> {
        let sql = format!(
            "SELECT {COLUMNS} FROM agents WHERE status = $1 AND is_deleted = FALSE ORDER BY id"
        );
        self.query_agents(&sql, &[&status]).await
    }

    async fn search_by_name(&self, fragment: &str) -> StorageResult<Vec<Agent>> {
        let pattern = format!("%{}%", escape_like(fragment));
        self.query_agents(&search_sql(self.case_sensitive_search), &[&pattern])
            .await
    }

    async fn list_by_type_and_status(
        &self,
        agent_type: &str,
        status: &str,
    ) -> StorageResult<Vec<Agent>> {
        let sql = format!(
            "SELECT {COLUMNS} FROM agents \
             WHERE type = $1 AND status = $2 AND is_deleted = FALSE ORDER BY id"
        );
        self.query_agents(&sql, &[&agent_type, &status]).await
    }

    async fn count_by_type(&self, agent_type: &str) -> StorageResult<u64> {
        self.count(
            "SELECT COUNT(*) FROM agents WHERE type = $1 AND is_deleted = FALSE",
            &[&agent_type],
        )
        .await
    }

    async fn count_by_status(&self, status: &str) -> StorageResult<u64> {
        self.count(
            "SELECT COUNT(*) FROM agents WHERE status = $1 AND is_deleted = FALSE",
            &[&status],
        )
        .await
    }

    async fn insert(&self, agent: &NewAgent) -> StorageResult<Agent> {
        let conn = self.get_conn().await?;
        let now = store_now();
        let sql = format!(
            "INSERT INTO agents \
             (name, description, type, status, config, created_by, updated_by, \
              created_at, updated_at, is_deleted, version) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $8, FALSE, 0) \
             RETURNING {COLUMNS}"
        );

        let row = conn
            .query_one(
                &sql,
                &[
                    &agent.name,
                    &agent.description,
                    &agent.agent_type,
                    &agent.status,
                    &agent.config,
                    &agent.created_by,
                    &agent.updated_by,
                    &now,
                ],
            )
            .await
            .map_err(|e| write_error(e, &agent.name))?;

        agent_from_row(&row).map_err(backend_error)
    }

    async fn update(&self, agent: &Agent) -> StorageResult<Agent> {
        let conn = self.get_conn().await?;
        let sql = format!(
            "UPDATE agents SET \
             name = $2, description = $3, type = $4, status = $5, config = $6, \
             created_by = $7, updated_by = $8, is_deleted = $9, \
             updated_at = GREATEST(clock_timestamp(), updated_at + INTERVAL '1 microsecond'), \
             version = version + 1 \
             WHERE id = $1 AND version = $10 \
             RETURNING {COLUMNS}"
        );

        let row = conn
            .query_opt(
                &sql,
                &[
                    &agent.id,
                    &agent.name,
                    &agent.description,
                    &agent.agent_type,
                    &agent.status,
                    &agent.config,
                    &agent.created_by,
                    &agent.updated_by,
                    &agent.is_deleted,
                    &agent.version,
                ],
            )
            .await
            .map_err(|e| write_error(e, &agent.name))?;

        match row {
            Some(row) => agent_from_row(&row).map_err(backend_error),
            None => {
                let exists = conn
                    .query_opt("SELECT 1 FROM agents WHERE id = $1", &[&agent.id])
                    .await
                    .map_err(backend_error)?
                    .is_some();
                if exists {
                    Err(StorageError::VersionConflict {
                        id: agent.id,
                        expected: agent.version,
                    })
                } else {
                    Err(StorageError::NotFound { id: agent.id })
                }
            }
        }
    }
}

// ============================================================================
// ROW MAPPING AND HELPERS
// ============================================================================

fn agent_from_row(row: &Row) -> Result<Agent, tokio_postgres::Error> {
    Ok(Agent {
        id: row.try_get("id")?,
        name: row.try_get("name")?,
        description: row.try_get("description")?,
        agent_type: row.try_get("type")?,
        status: row.try_get("status")?,
        config: row.try_get("config")?,
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
        created_by: row.try_get("created_by")?,
        updated_by: row.try_get("updated_by")?,
        is_deleted: row.try_get("is_deleted")?,
        version: row.try_get("version")?,
    })
}

fn search_sql(case_sensitive: bool) -> String {
    let op = if case_sensitive { "LIKE" } else { "ILIKE" };
    format!(
        "SELECT {COLUMNS} FROM agents \
         WHERE is_deleted = FALSE AND name {op} $1 ESCAPE '\\' \
         ORDER BY created_at DESC, id DESC"
    )
}

/// Escape LIKE metacharacters so `fragment` matches literally.
pub fn escape_like(fragment: &str) -> String {
    let mut escaped = String::with_capacity(fragment.len());
    for c in fragment.chars() {
        if matches!(c, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

fn backend_error(err: tokio_postgres::Error) -> StorageError {
    StorageError::Backend {
        reason: err.to_string(),
    }
}

/// Map a failed INSERT/UPDATE, recognizing the live-name unique index.
fn write_error(err: tokio_postgres::Error, name: &str) -> StorageError {
    if let Some(db_error) = err.as_db_error() {
        if db_error.code() == &SqlState::UNIQUE_VIOLATION {
            return StorageError::DuplicateName {
                name: name.to_string(),
            };
        }
    }
    backend_error(err)
}
