//! # Application Container
//!
//! Owns the configured store and the `Application` built on top of it.
//!
//! - `config`: `NodeConfig` and its `LK_*` overrides
//! - `handle`: `AppHandle`, the lock every engine call goes through
//! - `store`: backend selection

pub mod config;
pub mod handle;
pub mod store;

pub use config::{
    ApplicationConfig, ConfigError, LoggingConfig, NodeConfig, ReplayConfig, StorageBackend,
    StorageConfig,
};
pub use handle::AppHandle;
pub use store::open_store;
