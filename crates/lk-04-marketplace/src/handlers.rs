//! # Message Handlers
//!
//! One function per payload. Each reads and writes through the `Registry`
//! only, so running it over a `StagedStore` makes it all-or-nothing.

use crate::dispatcher::BlockContext;
use crate::domain::errors::MarketError;
use crate::domain::selection::{derive_service_id, select_miner};
use lk_01_kv_store::KeyValueStore;
use lk_02_tx_auth::{
    ClientRating, ClientRegistration, MinerRegistration, MinerServiceDone, MinerServiceStarting,
    MinerStatusUpdate, ServiceRequest,
};
use lk_03_registry::{
    ClientInfo, JobInfo, JobStatus, MinerInfo, MinerStatus, MinerWorkRecords, Registry,
    ServiceRequest as BacklogEntry,
};
use shared_types::Identity;
use tracing::{debug, info};

pub fn client_registration<S: KeyValueStore + ?Sized>(
    registry: &mut Registry<'_, S>,
    ctx: &BlockContext<'_>,
    sender: &Identity,
    msg: ClientRegistration,
) -> Result<(), MarketError> {
    let info = ClientInfo {
        name: msg.client_name,
        power: ctx.default_power,
    };
    registry.put_client(sender, &info)?;
    info!(client = %sender, name = %info.name, "Client registered");
    Ok(())
}

pub fn miner_registration<S: KeyValueStore + ?Sized>(
    registry: &mut Registry<'_, S>,
    ctx: &BlockContext<'_>,
    sender: &Identity,
    msg: MinerRegistration,
) -> Result<(), MarketError> {
    let status = MinerStatus::try_from(msg.status)?;
    let mut service_types = msg.service_types;
    service_types.sort_unstable();
    service_types.dedup();

    // re-registration replaces the advertised types
    if let Some(previous) = registry.miner(sender)? {
        for dropped in previous
            .service_types
            .iter()
            .filter(|t| !service_types.contains(*t))
        {
            registry.remove_from_service_type(*dropped, sender)?;
        }
    }
    for service_type in &service_types {
        registry.add_to_service_type(*service_type, sender)?;
    }
    registry.put_miner(
        sender,
        &MinerInfo {
            name: msg.miner_name,
            power: ctx.default_power,
            service_types: service_types.clone(),
            ip: msg.ip,
            initial_status: status,
        },
    )?;
    registry.set_miner_status(sender, status)?;
    info!(miner = %sender, ?service_types, ?status, "Miner registered");
    Ok(())
}

pub fn miner_status_update<S: KeyValueStore + ?Sized>(
    registry: &mut Registry<'_, S>,
    sender: &Identity,
    msg: MinerStatusUpdate,
) -> Result<(), MarketError> {
    let status = MinerStatus::try_from(msg.status)?;
    let mut info = registry
        .miner(sender)?
        .ok_or_else(|| MarketError::MinerNotRegistered(sender.clone()))?;

    for service_type in &msg.remove_service_types {
        info.service_types.retain(|t| t != service_type);
        registry.remove_from_service_type(*service_type, sender)?;
    }
    for service_type in &msg.add_service_types {
        if !info.service_types.contains(service_type) {
            info.service_types.push(*service_type);
        }
        registry.add_to_service_type(*service_type, sender)?;
    }
    info.service_types.sort_unstable();

    registry.put_miner(sender, &info)?;
    registry.set_miner_status(sender, status)?;
    debug!(miner = %sender, service_types = ?info.service_types, ?status, "Miner status updated");
    Ok(())
}

pub fn service_request<S: KeyValueStore + ?Sized>(
    registry: &mut Registry<'_, S>,
    ctx: &BlockContext<'_>,
    sender: &Identity,
    msg: ServiceRequest,
) -> Result<(), MarketError> {
    let service_id = derive_service_id(sender, &msg.meta, ctx.height);
    let candidates = registry.service_type_miners(msg.service_type)?;
    let miner = select_miner(&candidates, ctx.height, ctx.app_hash, &service_id)
        .cloned()
        .ok_or(MarketError::NoMinersAvailable(msg.service_type))?;

    if registry
        .jobs(&miner)?
        .iter()
        .any(|job| job.service_id == service_id)
    {
        return Err(MarketError::DuplicateServiceId(service_id));
    }
    registry.push_job(
        &miner,
        JobInfo::registered(service_id.clone(), sender.clone(), msg.service_type),
    )?;
    registry.push_backlog(BacklogEntry {
        service_id: service_id.clone(),
        miner_id: miner.clone(),
        height: ctx.height,
    })?;
    info!(
        client = %sender,
        miner = %miner,
        service_type = msg.service_type,
        %service_id,
        candidates = candidates.len(),
        "Service request assigned"
    );
    Ok(())
}

pub fn miner_service_starting<S: KeyValueStore + ?Sized>(
    registry: &mut Registry<'_, S>,
    ctx: &BlockContext<'_>,
    sender: &Identity,
    msg: MinerServiceStarting,
) -> Result<(), MarketError> {
    let mut jobs = registry.jobs(sender)?;
    let job = jobs
        .iter_mut()
        .find(|job| job.service_id == msg.service_id)
        .ok_or_else(|| MarketError::JobNotFound {
            miner: sender.clone(),
            service_id: msg.service_id.clone(),
        })?;
    if job.job_status != JobStatus::Registered {
        return Err(MarketError::InvalidJobTransition {
            service_id: msg.service_id,
            from: job.job_status,
        });
    }

    job.job_status = JobStatus::Processing;
    job.timeout_block = ctx.height.saturating_add(msg.max_timeout_block);
    let timeout_block = job.timeout_block;
    registry.put_jobs(sender, &jobs)?;
    registry.remove_backlog_entry(&msg.service_id)?;
    debug!(miner = %sender, service_id = %msg.service_id, timeout_block, "Job started");
    Ok(())
}

/// Counts completed work. A matching open job is closed as well; its absence
/// is not an error.
pub fn miner_service_done<S: KeyValueStore + ?Sized>(
    registry: &mut Registry<'_, S>,
    ctx: &BlockContext<'_>,
    sender: &Identity,
    msg: MinerServiceDone,
    activity: &mut MinerWorkRecords,
) -> Result<(), MarketError> {
    let mut jobs = registry.jobs(sender)?;
    if let Some(job) = jobs
        .iter_mut()
        .find(|job| job.service_id == msg.service_id && job.job_status.is_open())
    {
        job.job_status = JobStatus::Done;
        registry.put_jobs(sender, &jobs)?;
    }

    // last step, after every fallible write
    let count = activity.record(ctx.height, sender, msg.service_type);
    debug!(miner = %sender, service_type = msg.service_type, count, "Service completed");
    Ok(())
}

pub fn client_rating<S: KeyValueStore + ?Sized>(
    registry: &mut Registry<'_, S>,
    sender: &Identity,
    msg: ClientRating,
) -> Result<(), MarketError> {
    let rating = msg.rating.clamp(0, u8::MAX as i64) as u8;
    registry.set_rating(&msg.miner_addr, sender, rating)?;
    debug!(client = %sender, miner = %msg.miner_addr, rating, "Miner rated");
    Ok(())
}
