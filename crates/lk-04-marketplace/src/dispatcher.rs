//! # Transaction Dispatch
//!
//! Routes a decoded message to its handler, plus the end-of-block job
//! timeout sweep.

use crate::domain::errors::MarketError;
use crate::handlers;
use lk_01_kv_store::KeyValueStore;
use lk_02_tx_auth::{Message, MessageType, Payload};
use lk_03_registry::{JobStatus, MinerWorkRecords, Registry};
use shared_types::Identity;
use tracing::{debug, info};

/// Block data every handler may depend on.
#[derive(Debug, Clone, Copy)]
pub struct BlockContext<'a> {
    /// Height of the block being executed.
    pub height: i64,
    /// App hash committed before this block started.
    pub app_hash: &'a [u8],
    /// Power assigned to newly registered participants.
    pub default_power: u64,
}

/// Apply one message from `sender`.
///
/// Run over a staged store: on `Err` the caller drops the staged writes.
/// `activity` is only touched once all fallible work has succeeded.
pub fn dispatch<S: KeyValueStore + ?Sized>(
    store: &mut S,
    ctx: &BlockContext<'_>,
    sender: &Identity,
    message: &Message,
    activity: &mut MinerWorkRecords,
) -> Result<MessageType, MarketError> {
    let payload = message.decode_payload()?;
    let message_type = payload.message_type();
    let mut registry = Registry::new(store);

    let outcome = match payload {
        Payload::ClientRegistration(msg) => {
            handlers::client_registration(&mut registry, ctx, sender, msg)
        }
        Payload::MinerRegistration(msg) => {
            handlers::miner_registration(&mut registry, ctx, sender, msg)
        }
        Payload::MinerStatusUpdate(msg) => handlers::miner_status_update(&mut registry, sender, msg),
        Payload::ServiceRequest(msg) => handlers::service_request(&mut registry, ctx, sender, msg),
        Payload::MinerServiceStarting(msg) => {
            handlers::miner_service_starting(&mut registry, ctx, sender, msg)
        }
        Payload::MinerServiceDone(msg) => {
            handlers::miner_service_done(&mut registry, ctx, sender, msg, activity)
        }
        Payload::ClientRating(msg) => handlers::client_rating(&mut registry, sender, msg),
        Payload::MinerRewardClaim(_) => {
            debug!(miner = %sender, "Reward claim acknowledged");
            Ok(())
        }
    };

    outcome.map(|()| message_type)
}

/// Mark every `Processing` job whose `timeout_block < height` as `TimedOut`.
/// Returns the number of jobs swept.
pub fn sweep_timeouts<S: KeyValueStore + ?Sized>(
    store: &mut S,
    height: i64,
) -> Result<usize, MarketError> {
    let mut registry = Registry::new(store);
    let mut swept = 0;

    for (miner, mut jobs) in registry.all_jobs()? {
        let mut changed = false;
        for job in jobs
            .iter_mut()
            .filter(|job| job.job_status == JobStatus::Processing && job.timeout_block < height)
        {
            job.job_status = JobStatus::TimedOut;
            changed = true;
            swept += 1;
            debug!(
                miner = %miner,
                service_id = %job.service_id,
                timeout_block = job.timeout_block,
                "Job timed out"
            );
        }
        if changed {
            registry.put_jobs(&miner, &jobs)?;
        }
    }

    if swept > 0 {
        info!(height, swept, "Swept timed-out jobs");
    }
    Ok(swept)
}
