//! API Configuration Module
//!
//! Listener address, CORS, request timeout, search behavior and the choice of
//! record store. Configuration is loaded from environment variables with
//! defaults suitable for development.

use std::fmt;
use std::net::SocketAddr;
use std::str::FromStr;
use std::time::Duration;

use crate::error::{ApiError, ApiResult};

// ============================================================================
// STORE BACKEND
// ============================================================================

/// Which record store backs the service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StoreBackend {
    /// PostgreSQL through the connection pool
    #[default]
    Postgres,
    /// Process-local store; contents are lost on exit
    Memory,
}

impl FromStr for StoreBackend {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "postgres" | "postgresql" | "pg" => Ok(StoreBackend::Postgres),
            "memory" | "in-memory" | "mem" => Ok(StoreBackend::Memory),
            other => Err(format!("Unknown store backend: {}", other)),
        }
    }
}

impl fmt::Display for StoreBackend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StoreBackend::Postgres => f.write_str("postgres"),
            StoreBackend::Memory => f.write_str("memory"),
        }
    }
}

// ============================================================================
// API CONFIGURATION
// ============================================================================

/// API configuration for the listener, CORS and request handling.
#[derive(Debug, Clone)]
pub struct ApiConfig {
    // ========================================================================
    // Listener
    // ========================================================================
    /// Interface to bind.
    pub bind_host: String,

    /// TCP port to bind.
    pub port: u16,

    // ========================================================================
    // CORS Configuration
    // ========================================================================
    /// Allowed CORS origins (comma-separated in env var).
    /// Empty means allow all origins (dev mode).
    pub cors_origins: Vec<String>,

    /// Max age for CORS preflight cache in seconds.
    pub cors_max_age_secs: u64,

    // ========================================================================
    // Request Handling
    // ========================================================================
    /// Requests running longer than this are aborted with a 500 envelope.
    pub request_timeout: Duration,

    /// Whether name search distinguishes letter case.
    pub search_case_sensitive: bool,

    /// Record store to use.
    pub store: StoreBackend,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            bind_host: "0.0.0.0".to_string(),
            port: 8080,
            cors_origins: Vec::new(), // Empty = allow all
            cors_max_age_secs: 86400, // 24 hours
            request_timeout: Duration::from_secs(30),
            search_case_sensitive: true,
            store: StoreBackend::Postgres,
        }
    }
}

impl ApiConfig {
    /// Create ApiConfig from environment variables.
    ///
    /// Environment variables:
    /// - `AGENTDESK_API_BIND`: Interface to bind (default: 0.0.0.0)
    /// - `PORT` or `AGENTDESK_API_PORT`: Port to bind (default: 8080)
    /// - `AGENTDESK_CORS_ORIGINS`: Comma-separated allowed origins (empty = allow all)
    /// - `AGENTDESK_CORS_MAX_AGE_SECS`: Preflight cache duration (default: 86400)
    /// - `AGENTDESK_REQUEST_TIMEOUT_SECS`: Per-request timeout (default: 30)
    /// - `AGENTDESK_SEARCH_CASE_SENSITIVE`: "true" or "false" (default: true)
    /// - `AGENTDESK_STORE`: "postgres" or "memory" (default: postgres)
    pub fn from_env() -> ApiResult<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build the configuration from an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> ApiResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let bind_host = lookup("AGENTDESK_API_BIND").unwrap_or(defaults.bind_host);

        let port = match lookup("PORT").or_else(|| lookup("AGENTDESK_API_PORT")) {
            Some(value) => value.trim().parse::<u16>().map_err(|_| {
                ApiError::internal_error(format!("Invalid port value: {}", value))
            })?,
            None => defaults.port,
        };

        let cors_origins = lookup("AGENTDESK_CORS_ORIGINS")
            .map(|s| {
                s.split(',')
                    .map(|o| o.trim().to_string())
                    .filter(|o| !o.is_empty())
                    .collect()
            })
            .unwrap_or_default();

        let cors_max_age_secs = lookup("AGENTDESK_CORS_MAX_AGE_SECS")
            .and_then(|s| s.parse().ok())
            .unwrap_or(defaults.cors_max_age_secs);

        let request_timeout = lookup("AGENTDESK_REQUEST_TIMEOUT_SECS")
            .and_then(|s| s.parse().ok())
            .map(Duration::from_secs)
            .unwrap_or(defaults.request_timeout);

        let search_case_sensitive = lookup("AGENTDESK_SEARCH_CASE_SENSITIVE")
            .map(|s| s.to_lowercase() != "false")
            .unwrap_or(defaults.search_case_sensitive);

        let store = match lookup("AGENTDESK_STORE") {
            Some(value) => value.parse().map_err(ApiError::internal_error)?,
            None => defaults.store,
        };

        Ok(Self {
            bind_host,
            port,
            cors_origins,
            cors_max_age_secs,
            request_timeout,
            search_case_sensitive,
            store,
        })
    }

    /// Socket address for the listener.
    pub fn bind_addr(&self) -> ApiResult<SocketAddr> {
        let addr = format!("{}:{}", self.bind_host, self.port);
        addr.parse::<SocketAddr>().map_err(|e| {
            ApiError::internal_error(format!("Invalid bind address {}: {}", addr, e))
        })
    }

    /// Check if running in production mode (strict CORS).
    pub fn is_production(&self) -> bool {
        !self.cors_origins.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_default_config() {
        let config = ApiConfig::default();
        assert_eq!(config.bind_host, "0.0.0.0");
        assert_eq!(config.port, 8080);
        assert!(config.cors_origins.is_empty());
        assert_eq!(config.cors_max_age_secs, 86400);
        assert_eq!(config.request_timeout, Duration::from_secs(30));
        assert!(config.search_case_sensitive);
        assert_eq!(config.store, StoreBackend::Postgres);
    }

    #[test]
    fn test_empty_environment_gives_defaults() {
        let config = ApiConfig::from_lookup(|_| None);
        assert_eq!(config.map(|c| c.port).ok(), Some(8080));
    }

    #[test]
    fn test_values_from_lookup() -> ApiResult<()> {
        let config = ApiConfig::from_lookup(lookup_from(&[
            ("AGENTDESK_API_BIND", "127.0.0.1"),
            ("AGENTDESK_API_PORT", "9000"),
            ("AGENTDESK_CORS_ORIGINS", "https://a.example, ,https://b.example"),
            ("AGENTDESK_REQUEST_TIMEOUT_SECS", "5"),
            ("AGENTDESK_SEARCH_CASE_SENSITIVE", "FALSE"),
            ("AGENTDESK_STORE", "memory"),
        ]))?;

        assert_eq!(config.bind_addr()?, "127.0.0.1:9000".parse::<SocketAddr>().unwrap());
        assert_eq!(
            config.cors_origins,
            vec!["https://a.example".to_string(), "https://b.example".to_string()]
        );
        assert!(config.is_production());
        assert_eq!(config.request_timeout, Duration::from_secs(5));
        assert!(!config.search_case_sensitive);
        assert_eq!(config.store, StoreBackend::Memory);
        Ok(())
    }

    #[test]
    fn test_port_env_takes_precedence() -> ApiResult<()> {
        let config = ApiConfig::from_lookup(lookup_from(&[
            ("PORT", "7000"),
            ("AGENTDESK_API_PORT", "9000"),
        ]))?;
        assert_eq!(config.port, 7000);
        Ok(())
    }

    #[test]
    fn test_invalid_port_fails() {
        let err = ApiConfig::from_lookup(lookup_from(&[("PORT", "http")])).err();
        assert!(err.map(|e| e.message.contains("Invalid port")).unwrap_or(false));
    }

    #[test]
    fn test_invalid_bind_host_fails() {
        let config = ApiConfig {
            bind_host: "not an address".to_string(),
            ..ApiConfig::default()
        };
        assert!(config.bind_addr().is_err());
    }

    #[test]
    fn test_store_backend_parsing() {
        assert_eq!("Postgres".parse::<StoreBackend>(), Ok(StoreBackend::Postgres));
        assert_eq!(" memory ".parse::<StoreBackend>(), Ok(StoreBackend::Memory));
        assert!("redis".parse::<StoreBackend>().is_err());
        assert!(ApiConfig::from_lookup(lookup_from(&[("AGENTDESK_STORE", "redis")])).is_err());
    }
}
