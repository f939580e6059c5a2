//! # Linkis Node Runtime
//!
//! Hosts the compute-marketplace application.
//!
//! ## Startup Sequence
//!
//! 1. Load configuration from `LK_*` environment variables
//! 2. Initialise logging
//! 3. Open the configured store and resume from its last commit
//! 4. Replay `LK_BLOCK_LOG`, if set
//! 5. Wait for Ctrl+C
//!
//! A fatal lifecycle error (corrupt root record, failed commit write) stops
//! the process with a non-zero exit code.

use anyhow::{Context, Result};
use node_runtime::logging::init_logging;
use node_runtime::{build_app, replay_file, NodeConfig, ReplayError};
use shared_types::RequestInfo;
use std::process::ExitCode;
use tracing::{error, info};

async fn run(config: NodeConfig) -> Result<()> {
    let app = build_app(&config)?;
    let info = app.info(&RequestInfo::default());
    info!(
        version = %info.version,
        height = info.last_block_height,
        app_hash = %hex::encode(&info.last_block_app_hash),
        "Linkis node started"
    );

    if let Some(path) = config.replay.block_log.clone() {
        let handle = app.clone();
        let summary = tokio::task::spawn_blocking(move || replay_file(&handle, &path))
            .await
            .context("replay task panicked")??;
        info!(
            blocks = summary.blocks,
            height = summary.last_height,
            app_hash = %hex::encode(&summary.app_hash),
            "Replay finished"
        );
    }

    info!("Node is running. Press Ctrl+C to stop.");
    tokio::signal::ctrl_c().await?;
    info!(height = app.with(|a| a.state().height), "Shutting down");
    Ok(())
}

#[tokio::main]
async fn main() -> ExitCode {
    let config = match NodeConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("configuration error: {e}");
            return ExitCode::FAILURE;
        }
    };
    if let Err(e) = init_logging(&config.logging) {
        eprintln!("{e}");
        return ExitCode::FAILURE;
    }

    match run(config).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            let fatal = e
                .downcast_ref::<ReplayError>()
                .map_or(false, ReplayError::is_fatal);
            error!(fatal, "Node stopped: {e:#}");
            ExitCode::FAILURE
        }
    }
}
