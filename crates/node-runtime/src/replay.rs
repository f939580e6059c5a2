//! # Block Log Replay
//!
//! Drives the application from a JSON-lines block log, one block per line:
//!
//! ```text
//! {"begin": {"hash": [...], "header": {...}, "byzantine_validators": []},
//!  "txs": ["<wire hex>", ...]}
//! ```
//!
//! Each line runs `BeginBlock`, one `DeliverTx` per entry, `EndBlock` and
//! `Commit`. Blocks at or below the last committed height are skipped, so the
//! same log can be replayed against a store that already holds a prefix of it.

use crate::container::AppHandle;
use lk_05_block_lifecycle::{Application, LifecycleError};
use serde::{Deserialize, Serialize};
use shared_types::{RequestBeginBlock, RequestEndBlock, ResponseCode};
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;
use thiserror::Error;
use tracing::{debug, info, warn};

/// One line of the block log.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BlockRecord {
    pub begin: RequestBeginBlock,
    #[serde(default)]
    pub txs: Vec<String>,
}

/// What executing one block produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlockOutcome {
    pub height: i64,
    pub app_hash: Vec<u8>,
    pub tx_codes: Vec<ResponseCode>,
    pub retain_height: i64,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReplaySummary {
    pub blocks: u64,
    pub skipped_blocks: u64,
    pub txs: u64,
    pub failed_txs: u64,
    pub last_height: i64,
    pub app_hash: Vec<u8>,
}

#[derive(Debug, Error)]
pub enum ReplayError {
    #[error("block log I/O: {0}")]
    Io(#[from] std::io::Error),

    #[error("block log line {line}: {message}")]
    Parse { line: usize, message: String },

    #[error(transparent)]
    Lifecycle(#[from] LifecycleError),
}

impl ReplayError {
    pub fn is_fatal(&self) -> bool {
        matches!(self, ReplayError::Lifecycle(e) if e.is_fatal())
    }
}

/// Run one full block under a single lock acquisition.
pub fn execute_block(app: &AppHandle, record: BlockRecord) -> Result<BlockOutcome, LifecycleError> {
    app.with(|app| run_block(app, record))
}

fn run_block(app: &mut Application, record: BlockRecord) -> Result<BlockOutcome, LifecycleError> {
    let header_height = record.begin.header.height;
    app.begin_block(record.begin)?;

    let mut tx_codes = Vec::with_capacity(record.txs.len());
    for (index, tx) in record.txs.iter().enumerate() {
        let res = app.deliver_tx(tx.as_bytes());
        if !res.code.is_ok() {
            debug!(index, code = res.code.value(), log = %res.log, "Transaction rejected");
        }
        tx_codes.push(res.code);
    }

    app.end_block(RequestEndBlock {
        height: header_height,
    })?;
    let commit = app.commit()?;

    Ok(BlockOutcome {
        height: app.state().height,
        app_hash: commit.data,
        tx_codes,
        retain_height: commit.retain_height,
    })
}

/// Replay every block in `reader`.
pub fn replay_reader<R: BufRead>(app: &AppHandle, reader: R) -> Result<ReplaySummary, ReplayError> {
    let mut summary = ReplaySummary::default();

    for (index, line) in reader.lines().enumerate() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        let record: BlockRecord =
            serde_json::from_str(&line).map_err(|e| ReplayError::Parse {
                line: index + 1,
                message: e.to_string(),
            })?;

        let header_height = record.begin.header.height;
        let committed = app.with(|app| app.state().height);
        if header_height > 0 && header_height <= committed {
            debug!(height = header_height, committed, "Block already committed; skipping");
            summary.skipped_blocks += 1;
            continue;
        }

        let txs = record.txs.len() as u64;
        let outcome = execute_block(app, record)?;
        summary.blocks += 1;
        summary.txs += txs;
        summary.failed_txs += outcome.tx_codes.iter().filter(|c| !c.is_ok()).count() as u64;
        summary.last_height = outcome.height;
        summary.app_hash = outcome.app_hash;
    }

    if summary.failed_txs > 0 {
        warn!(failed = summary.failed_txs, total = summary.txs, "Some transactions were rejected");
    }
    info!(
        blocks = summary.blocks,
        skipped = summary.skipped_blocks,
        txs = summary.txs,
        height = summary.last_height,
        "Block log replayed"
    );
    Ok(summary)
}

/// Replay the block log at `path`.
pub fn replay_file(app: &AppHandle, path: &Path) -> Result<ReplaySummary, ReplayError> {
    info!(path = %path.display(), "Replaying block log");
    let file = File::open(path)?;
    replay_reader(app, BufReader::new(file))
}
