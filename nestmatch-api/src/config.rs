//! Configuration for the couples layer.
//!
//! Database settings come from `NESTMATCH_DB_*` environment variables;
//! cache bounds and the diagnostic cache toggle are set in code by the
//! embedding application.

use std::time::Duration;

use deadpool_postgres::{Config, ManagerConfig, Pool, PoolConfig, RecyclingMethod, Runtime};
use nestmatch_core::GatewayError;
use nestmatch_storage::CacheConfig;
use tokio_postgres::NoTls;

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
    /// Connection timeout
    pub timeout: Duration,
}

impl Default for DbConfig {
    fn default() -> Self {
        Self {
            host: "localhost".to_string(),
            port: 5432,
            dbname: "nestmatch".to_string(),
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
        Self {
            host: std::env::var("NESTMATCH_DB_HOST").unwrap_or_else(|_| "localhost".to_string()),
            port: std::env::var("NESTMATCH_DB_PORT")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(5432),
            dbname: std::env::var("NESTMATCH_DB_NAME")
                .unwrap_or_else(|_| "nestmatch".to_string()),
            user: std::env::var("NESTMATCH_DB_USER")
                .unwrap_or_else(|_| "postgres".to_string()),
            password: std::env::var("NESTMATCH_DB_PASSWORD").unwrap_or_default(),
            max_size: std::env::var("NESTMATCH_DB_POOL_SIZE")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(16),
            timeout: Duration::from_secs(
                std::env::var("NESTMATCH_DB_TIMEOUT")
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(30),
            ),
        }
    }

    /// Create a connection pool from this configuration.
    pub fn create_pool(&self) -> Result<Pool, GatewayError> {
        let mut cfg = Config::new();
        cfg.host = Some(self.host.clone());
        cfg.port = Some(self.port);
        cfg.dbname = Some(self.dbname.clone());
        cfg.user = Some(self.user.clone());
        cfg.password = Some(self.password.clone());

        cfg.manager = Some(ManagerConfig {
            recycling_method: RecyclingMethod::Fast,
        });

        let mut pool_config = PoolConfig::new(self.max_size);
        pool_config.timeouts.wait = Some(self.timeout);
        cfg.pool = Some(pool_config);

        cfg.create_pool(Some(Runtime::Tokio1), NoTls)
            .map_err(|e| GatewayError::Pool {
                reason: format!("failed to create pool: {e}"),
            })
    }
}

/// Behavior knobs for the couples service itself.
#[derive(Debug, Clone)]
pub struct CouplesConfig {
    /// When false, every read bypasses the caches (test/diagnostic mode).
    pub cache_enabled: bool,
    /// Bounds for the three household caches.
    pub cache: CacheConfig,
}

impl Default for CouplesConfig {
    fn default() -> Self {
        Self {
            cache_enabled: true,
            cache: CacheConfig::default(),
        }
    }
}

impl CouplesConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Disable the caches entirely.
    pub fn without_cache(mut self) -> Self {
        self.cache_enabled = false;
        self
    }

    /// Replace the cache bounds.
    pub fn with_cache(mut self, cache: CacheConfig) -> Self {
        self.cache = cache;
        self
    }
}
