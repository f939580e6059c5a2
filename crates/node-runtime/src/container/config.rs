//! # Node Configuration
//!
//! Every runtime parameter of the node, with defaults suitable for a local
//! development node. Values are overridden from `LK_*` environment variables:
//!
//! | Variable | Field |
//! |---|---|
//! | `LK_DATA_DIR` | `storage.data_dir` |
//! | `LK_STORAGE_BACKEND` | `storage.backend` (`memory` or `rocksdb`) |
//! | `LK_SYNC_WRITES` | `storage.sync_writes` |
//! | `LK_RETAIN_BLOCKS` | `application.retain_blocks` |
//! | `LK_BACKLOG_RETENTION` | `application.backlog_retention_blocks` |
//! | `LK_DEFAULT_POWER` | `application.default_power` |
//! | `LK_LOG` | `logging.filter` |
//! | `LK_LOG_JSON` | `logging.json` |
//! | `LK_BLOCK_LOG` | `replay.block_log` |

use lk_05_block_lifecycle::LifecycleConfig;
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;
use thiserror::Error;

/// Complete node configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NodeConfig {
    pub storage: StorageConfig,
    pub application: ApplicationConfig,
    pub logging: LoggingConfig,
    pub replay: ReplayConfig,
}

/// Configuration errors.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{var}={value:?} is not a valid value: {reason}")]
    InvalidValue {
        var: &'static str,
        value: String,
        reason: String,
    },

    #[error("{field} must not be negative (got {value})")]
    Negative { field: &'static str, value: i64 },

    #[error("storage backend `{0}` is not compiled into this binary")]
    BackendUnavailable(StorageBackend),
}

impl NodeConfig {
    /// Defaults overridden by the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    /// Defaults overridden by whatever `lookup` returns for each `LK_*` variable.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(dir) = lookup("LK_DATA_DIR") {
            config.storage.data_dir = PathBuf::from(dir);
        }
        override_parsed(&lookup, "LK_STORAGE_BACKEND", &mut config.storage.backend)?;
        override_flag(&lookup, "LK_SYNC_WRITES", &mut config.storage.sync_writes)?;
        override_parsed(&lookup, "LK_RETAIN_BLOCKS", &mut config.application.retain_blocks)?;
        override_parsed(
            &lookup,
            "LK_BACKLOG_RETENTION",
            &mut config.application.backlog_retention_blocks,
        )?;
        override_parsed(&lookup, "LK_DEFAULT_POWER", &mut config.application.default_power)?;
        if let Some(filter) = lookup("LK_LOG") {
            config.logging.filter = filter;
        }
        override_flag(&lookup, "LK_LOG_JSON", &mut config.logging.json)?;
        if let Some(path) = lookup("LK_BLOCK_LOG").filter(|p| !p.is_empty()) {
            config.replay.block_log = Some(PathBuf::from(path));
        }

        Ok(config)
    }

    /// Reject settings the node cannot start with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.application.retain_blocks < 0 {
            return Err(ConfigError::Negative {
                field: "retain_blocks",
                value: self.application.retain_blocks,
            });
        }
        if self.application.backlog_retention_blocks < 0 {
            return Err(ConfigError::Negative {
                field: "backlog_retention_blocks",
                value: self.application.backlog_retention_blocks,
            });
        }
        if self.storage.backend == StorageBackend::RocksDb && !cfg!(feature = "rocksdb") {
            return Err(ConfigError::BackendUnavailable(StorageBackend::RocksDb));
        }
        Ok(())
    }

    /// The part of the configuration the application itself consumes.
    pub fn lifecycle(&self) -> LifecycleConfig {
        LifecycleConfig {
            retain_blocks: self.application.retain_blocks,
            backlog_retention_blocks: self.application.backlog_retention_blocks,
            default_power: self.application.default_power,
        }
    }
}

fn override_parsed<F, T>(lookup: &F, var: &'static str, target: &mut T) -> Result<(), ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
    T::Err: fmt::Display,
{
    if let Some(value) = lookup(var) {
        *target = value
            .trim()
            .parse()
            .map_err(|e: T::Err| ConfigError::InvalidValue {
                var,
                value: value.clone(),
                reason: e.to_string(),
            })?;
    }
    Ok(())
}

fn override_flag<F>(lookup: &F, var: &'static str, target: &mut bool) -> Result<(), ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(value) = lookup(var) {
        *target = match value.trim().to_ascii_lowercase().as_str() {
            "1" | "true" | "yes" | "on" => true,
            "0" | "false" | "no" | "off" => false,
            _ => {
                return Err(ConfigError::InvalidValue {
                    var,
                    value,
                    reason: "expected a boolean".to_string(),
                })
            }
        };
    }
    Ok(())
}

/// Which `KeyValueStore` backs the application.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StorageBackend {
    /// Volatile; state is lost on exit.
    #[default]
    Memory,
    RocksDb,
}

impl fmt::Display for StorageBackend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StorageBackend::Memory => f.write_str("memory"),
            StorageBackend::RocksDb => f.write_str("rocksdb"),
        }
    }
}

impl FromStr for StorageBackend {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "memory" | "mem" => Ok(StorageBackend::Memory),
            "rocksdb" => Ok(StorageBackend::RocksDb),
            other => Err(format!("unknown storage backend `{other}`")),
        }
    }
}

/// Storage configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StorageConfig {
    pub backend: StorageBackend,
    /// Database directory (RocksDB only).
    pub data_dir: PathBuf,
    /// fsync every write (RocksDB only).
    pub sync_writes: bool,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            backend: StorageBackend::default(),
            data_dir: PathBuf::from("./data/linkis"),
            sync_writes: true,
        }
    }
}

/// Application tuning, mirrored into `LifecycleConfig`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApplicationConfig {
    /// Blocks the engine must keep; 0 keeps everything.
    pub retain_blocks: i64,
    /// Backlog window in blocks; 0 disables pruning.
    pub backlog_retention_blocks: i64,
    /// Power assigned at client/miner registration.
    pub default_power: u64,
}

impl Default for ApplicationConfig {
    fn default() -> Self {
        let lifecycle = LifecycleConfig::default();
        Self {
            retain_blocks: lifecycle.retain_blocks,
            backlog_retention_blocks: lifecycle.backlog_retention_blocks,
            default_power: lifecycle.default_power,
        }
    }
}

/// Logging configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoggingConfig {
    /// `EnvFilter` directive, e.g. `info,lk_04_marketplace=debug`.
    pub filter: String,
    /// Emit JSON lines instead of human-readable output.
    pub json: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: "info".to_string(),
            json: false,
        }
    }
}

/// Block log replay configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReplayConfig {
    /// JSON-lines file of blocks to execute at startup.
    pub block_log: Option<PathBuf>,
}
