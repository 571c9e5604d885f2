//! Configuration Module
//!
//! Configuration is loaded from environment variables with sensible defaults
//! for development. Two Postgres pools are configured independently: the
//! relational store holding goods and projects, and the analytical store the
//! event writer flushes into.

use crate::error::{ApiError, ApiResult};
use deadpool_postgres::{Config, ManagerConfig, Pool, PoolConfig, RecyclingMethod, Runtime};
use std::time::Duration;
use tokio_postgres::NoTls;

// ============================================================================
// RELATIONAL STORE CONFIGURATION
// ============================================================================

/// Connection pool configuration for the relational store.
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
}

impl Default for DbConfig {
    fn default() -> Self {
        Self {
            host: "localhost".to_string(),
            port: 5432,
            dbname: "stockroom".to_string(),
            user: "postgres".to_string(),
            password: "".to_string(),
            max_size: 16,
        }
    }
}

impl DbConfig {
    /// Create a new database configuration from environment variables.
    pub fn from_env() -> Self {
        Self {
            host: std::env::var("STOCKROOM_DB_HOST").unwrap_or_else(|_| "localhost".to_string()),
            port: std::env::var("STOCKROOM_DB_PORT")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(5432),
            dbname: std::env::var("STOCKROOM_DB_NAME")
                .unwrap_or_else(|_| "stockroom".to_string()),
            user: std::env::var("STOCKROOM_DB_USER").unwrap_or_else(|_| "postgres".to_string()),
            password: std::env::var("STOCKROOM_DB_PASSWORD").unwrap_or_default(),
            max_size: std::env::var("STOCKROOM_DB_POOL_SIZE")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(16),
        }
    }

    /// Create a connection pool from this configuration.
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
        cfg.pool = Some(PoolConfig::new(self.max_size));

        let pool = cfg
            .create_pool(Some(Runtime::Tokio1), NoTls)
            .map_err(|e| ApiError::internal_error(format!("Failed to create pool: {}", e)))?;

        Ok(pool)
    }
}

// ============================================================================
// ANALYTICAL STORE CONFIGURATION
// ============================================================================

/// Connection pool configuration for the analytical store that receives
/// batched change events. A smaller pool: the event writer is the only
/// client and flushes are infrequent.
#[derive(Debug, Clone)]
pub struct AnalyticsConfig {
    pub host: String,
    pub port: u16,
    pub dbname: String,
    pub user: String,
    pub password: String,
    pub max_size: usize,
}

impl Default for AnalyticsConfig {
    fn default() -> Self {
        Self {
            host: "localhost".to_string(),
            port: 5432,
            dbname: "stockroom_analytics".to_string(),
            user: "postgres".to_string(),
            password: "".to_string(),
            max_size: 4,
        }
    }
}

impl AnalyticsConfig {
    /// Create an analytics configuration from environment variables.
    pub fn from_env() -> Self {
        Self {
            host: std::env::var("STOCKROOM_ANALYTICS_HOST")
                .unwrap_or_else(|_| "localhost".to_string()),
            port: std::env::var("STOCKROOM_ANALYTICS_PORT")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(5432),
            dbname: std::env::var("STOCKROOM_ANALYTICS_NAME")
                .unwrap_or_else(|_| "stockroom_analytics".to_string()),
            user: std::env::var("STOCKROOM_ANALYTICS_USER")
                .unwrap_or_else(|_| "postgres".to_string()),
            password: std::env::var("STOCKROOM_ANALYTICS_PASSWORD").unwrap_or_default(),
            max_size: std::env::var("STOCKROOM_ANALYTICS_POOL_SIZE")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(4),
        }
    }

    /// Create a connection pool from this configuration.
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
        cfg.pool = Some(PoolConfig::new(self.max_size));

        let pool = cfg
            .create_pool(Some(Runtime::Tokio1), NoTls)
            .map_err(|e| {
                ApiError::internal_error(format!("Failed to create analytics pool: {}", e))
            })?;

        Ok(pool)
    }
}

// ============================================================================
// API / ORCHESTRATION CONFIGURATION
// ============================================================================

/// Service-level settings: bind address, per-call timeout, event batching,
/// cache TTL.
#[derive(Debug, Clone)]
pub struct ApiConfig {
    /// Bind host for the HTTP server.
    pub bind_host: String,

    /// Bind port for the HTTP server.
    pub bind_port: u16,

    /// Deadline applied to every orchestration call. Exceeding it aborts
    /// the in-flight store operations and returns a timeout error.
    pub request_timeout: Duration,

    /// Number of buffered change events that triggers a flush to the
    /// analytical store.
    pub event_flush_threshold: usize,

    /// Capacity of the in-process broadcast channel carrying change
    /// notifications.
    pub broadcast_capacity: usize,

    /// TTL for the cached list page.
    pub cache_ttl: Duration,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            bind_host: "0.0.0.0".to_string(),
            bind_port: 3000,
            request_timeout: Duration::from_secs(10),
            event_flush_threshold: 100,
            broadcast_capacity: 1000,
            cache_ttl: Duration::from_secs(60),
        }
    }
}

impl ApiConfig {
    /// Create ApiConfig from environment variables.
    ///
    /// Environment variables:
    /// - `STOCKROOM_BIND`: Bind host (default: 0.0.0.0)
    /// - `PORT` / `STOCKROOM_PORT`: Bind port (default: 3000)
    /// - `STOCKROOM_REQUEST_TIMEOUT_SECS`: Per-call deadline (default: 10)
    /// - `STOCKROOM_EVENT_FLUSH_THRESHOLD`: Event batch size (default: 100)
    /// - `STOCKROOM_BROADCAST_CAPACITY`: Channel capacity (default: 1000)
    /// - `STOCKROOM_CACHE_TTL_SECS`: List cache TTL (default: 60)
    pub fn from_env() -> Self {
        let defaults = Self::default();

        Self {
            bind_host: std::env::var("STOCKROOM_BIND").unwrap_or(defaults.bind_host),
            bind_port: std::env::var("PORT")
                .ok()
                .or_else(|| std::env::var("STOCKROOM_PORT").ok())
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.bind_port),
            request_timeout: std::env::var("STOCKROOM_REQUEST_TIMEOUT_SECS")
                .ok()
                .and_then(|s| s.parse().ok())
                .map(Duration::from_secs)
                .unwrap_or(defaults.request_timeout),
            event_flush_threshold: std::env::var("STOCKROOM_EVENT_FLUSH_THRESHOLD")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.event_flush_threshold),
            broadcast_capacity: std::env::var("STOCKROOM_BROADCAST_CAPACITY")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.broadcast_capacity),
            cache_ttl: std::env::var("STOCKROOM_CACHE_TTL_SECS")
                .ok()
                .and_then(|s| s.parse().ok())
                .map(Duration::from_secs)
                .unwrap_or(defaults.cache_ttl),
        }
    }
}
