//! API server configuration.
//!
//! Configuration is loaded from environment variables with fallback to defaults.
//!
//! | Variable                    | Default                     |
//! |-----------------------------|-----------------------------|
//! | `BAZAAR_HOST`               | `0.0.0.0`                   |
//! | `BAZAAR_PORT`               | `3000`                      |
//! | `BAZAAR_STORAGE`            | `memory` (or `sqlite`)      |
//! | `BAZAAR_DB_PATH`            | `<data dir>/bazaar.db` (sqlite only) |
//! | `BAZAAR_DB_MAX_CONNECTIONS` | `5`                         |
//! | `BAZAAR_STOCK_POLICY`       | `ignore` / `require_available` |
//! | `BAZAAR_STATUS_POLICY`      | `strict` / `permissive`     |

use std::collections::HashMap;
use std::env;
use std::fmt;
use std::path::PathBuf;

use directories::ProjectDirs;

use bazaar_core::{StatusPolicy, StockPolicy};

/// Where carts and orders live between restarts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageMode {
    /// Process memory only; everything is lost on shutdown.
    Memory,
    /// Write-through to SQLite, restored on startup.
    Sqlite,
}

impl StorageMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            StorageMode::Memory => "memory",
            StorageMode::Sqlite => "sqlite",
        }
    }
}

impl fmt::Display for StorageMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// API server configuration.
#[derive(Debug, Clone)]
pub struct ApiConfig {
    /// Bind host
    pub host: String,

    /// Bind port
    pub port: u16,

    /// Storage backend
    pub storage: StorageMode,

    /// SQLite file; always set when `storage` is `Sqlite`
    pub db_path: Option<PathBuf>,

    /// SQLite pool size
    pub db_max_connections: u32,

    /// Whether add-to-cart checks catalog availability
    pub stock_policy: StockPolicy,

    /// Whether order status changes follow the transition table
    pub status_policy: StatusPolicy,
}

impl ApiConfig {
    /// Load configuration from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load configuration from a map of variables (tests, embedding).
    pub fn from_vars(vars: &HashMap<String, String>) -> Result<Self, ConfigError> {
        Self::from_lookup(|key| vars.get(key).cloned())
    }

    fn from_lookup<F>(get: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let storage = match get("BAZAAR_STORAGE").as_deref().unwrap_or("memory") {
            "memory" => StorageMode::Memory,
            "sqlite" => StorageMode::Sqlite,
            _ => return Err(ConfigError::InvalidValue("BAZAAR_STORAGE".to_string())),
        };

        let stock_policy = match get("BAZAAR_STOCK_POLICY").as_deref().unwrap_or("ignore") {
            "ignore" => StockPolicy::Ignore,
            "require_available" => StockPolicy::RequireAvailable,
            _ => return Err(ConfigError::InvalidValue("BAZAAR_STOCK_POLICY".to_string())),
        };

        let status_policy = match get("BAZAAR_STATUS_POLICY").as_deref().unwrap_or("strict") {
            "strict" => StatusPolicy::Strict,
            "permissive" => StatusPolicy::Permissive,
            _ => return Err(ConfigError::InvalidValue("BAZAAR_STATUS_POLICY".to_string())),
        };

        let db_path = match (get("BAZAAR_DB_PATH"), storage) {
            (Some(path), _) => Some(PathBuf::from(path)),
            (None, StorageMode::Sqlite) => Some(default_db_path()?),
            (None, StorageMode::Memory) => None,
        };

        Ok(ApiConfig {
            host: get("BAZAAR_HOST").unwrap_or_else(|| "0.0.0.0".to_string()),

            port: get("BAZAAR_PORT")
                .unwrap_or_else(|| "3000".to_string())
                .parse()
                .map_err(|_| ConfigError::InvalidValue("BAZAAR_PORT".to_string()))?,

            storage,

            db_path,

            db_max_connections: get("BAZAAR_DB_MAX_CONNECTIONS")
                .unwrap_or_else(|| "5".to_string())
                .parse()
                .map_err(|_| ConfigError::InvalidValue("BAZAAR_DB_MAX_CONNECTIONS".to_string()))?,

            stock_policy,
            status_policy,
        })
    }

    /// `host:port` for the listener.
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Platform-specific data directory for the default database file.
///
/// ## Platform-Specific Paths
/// - **macOS**: `~/Library/Application Support/dev.bazaar.api/bazaar.db`
/// - **Windows**: `%APPDATA%\bazaar\api\data\bazaar.db`
/// - **Linux**: `~/.local/share/api/bazaar.db`
fn default_db_path() -> Result<PathBuf, ConfigError> {
    ProjectDirs::from("dev", "bazaar", "api")
        .map(|dirs| dirs.data_dir().join("bazaar.db"))
        .ok_or_else(|| ConfigError::MissingRequired("BAZAAR_DB_PATH".to_string()))
}

/// Configuration error types.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid value for {0}")]
    InvalidValue(String),

    #[error("Missing required configuration: {0}")]
    MissingRequired(String),
}
