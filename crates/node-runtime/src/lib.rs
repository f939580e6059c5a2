//! # Node Runtime Library
//!
//! Everything the `node-runtime` binary wires together, exposed for tests.
//!
//! - `container`: configuration, store selection, the shared `AppHandle`
//! - `adapters`: storage backends (RocksDB behind the `rocksdb` feature)
//! - `replay`: block-log driver
//! - `logging`: tracing subscriber setup

pub mod adapters;
pub mod container;
pub mod logging;
pub mod replay;

use anyhow::Context;
use lk_05_block_lifecycle::Application;
use tracing::info;

pub use container::{AppHandle, NodeConfig};
pub use replay::{execute_block, replay_file, replay_reader, BlockRecord, ReplayError, ReplaySummary};

/// Open the configured store and load the application from it.
pub fn build_app(config: &NodeConfig) -> anyhow::Result<AppHandle> {
    config.validate().context("invalid node configuration")?;
    let store = container::open_store(&config.storage)
        .with_context(|| format!("failed to open {} store", config.storage.backend))?;
    let app = Application::new(store, config.lifecycle()).context("failed to load application")?;
    info!(
        backend = %config.storage.backend,
        height = app.state().height,
        "Application ready"
    );
    Ok(AppHandle::new(app))
}
