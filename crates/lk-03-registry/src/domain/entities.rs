//! # Marketplace Records
//!
//! ## Clusters
//!
//! - **Participants**: `ClientInfo`, `MinerInfo`, `MinerStatus`
//! - **Reputation**: `ClientRatings`
//! - **Work**: `JobInfo`, `JobStatus`, `ServiceRequest`, `MinerWorkRecords`

use super::errors::RegistryError;
use serde::{Deserialize, Serialize};
use shared_types::Identity;
use std::collections::BTreeMap;

// =============================================================================
// PARTICIPANTS
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientInfo {
    pub name: String,
    pub power: u64,
}

/// Availability reported by a miner.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
#[repr(u8)]
pub enum MinerStatus {
    Stale = 0,
    Ready = 1,
    Busy = 2,
}

impl From<MinerStatus> for u8 {
    fn from(status: MinerStatus) -> Self {
        status as u8
    }
}

impl TryFrom<u8> for MinerStatus {
    type Error = RegistryError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(MinerStatus::Stale),
            1 => Ok(MinerStatus::Ready),
            2 => Ok(MinerStatus::Busy),
            other => Err(RegistryError::InvalidMinerStatus(other)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MinerInfo {
    pub name: String,
    pub power: u64,
    /// Offered service types, ascending.
    pub service_types: Vec<u64>,
    pub ip: String,
    pub initial_status: MinerStatus,
}

/// Status of every registered miner, keyed by identity.
pub type MinerStatuses = BTreeMap<Identity, MinerStatus>;

/// Ratings a single miner received, keyed by rating client.
pub type ClientRatings = BTreeMap<Identity, u8>;

// =============================================================================
// WORK
// =============================================================================

/// Job lifecycle: `Registered → Processing → Done | TimedOut`.
///
/// Finished jobs stay listed for the block that finished them and are pruned
/// when the next block opens.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
#[repr(u8)]
pub enum JobStatus {
    Registered = 0,
    Processing = 1,
    Done = 2,
    TimedOut = 3,
}

impl JobStatus {
    /// Registered or Processing.
    pub fn is_open(self) -> bool {
        matches!(self, JobStatus::Registered | JobStatus::Processing)
    }
}

impl From<JobStatus> for u8 {
    fn from(status: JobStatus) -> Self {
        status as u8
    }
}

impl TryFrom<u8> for JobStatus {
    type Error = RegistryError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(JobStatus::Registered),
            1 => Ok(JobStatus::Processing),
            2 => Ok(JobStatus::Done),
            3 => Ok(JobStatus::TimedOut),
            other => Err(RegistryError::InvalidJobStatus(other)),
        }
    }
}

/// A unit of work assigned to a miner.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobInfo {
    pub service_id: String,
    pub client_id: Identity,
    pub service_type: u64,
    pub job_status: JobStatus,
    /// Last height at which the job may still be processing (0 until started).
    pub timeout_block: i64,
}

impl JobInfo {
    pub fn registered(service_id: String, client_id: Identity, service_type: u64) -> Self {
        Self {
            service_id,
            client_id,
            service_type,
            job_status: JobStatus::Registered,
            timeout_block: 0,
        }
    }
}

/// Backlog entry for a request that has not been picked up yet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceRequest {
    pub service_id: String,
    pub miner_id: Identity,
    pub height: i64,
}

/// Completed-work counters: height → miner → service type → count.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MinerWorkRecords(BTreeMap<i64, BTreeMap<Identity, BTreeMap<u64, u64>>>);

impl MinerWorkRecords {
    pub fn new() -> Self {
        Self::default()
    }

    /// Count one completed job. Returns the new count.
    pub fn record(&mut self, height: i64, miner: &Identity, service_type: u64) -> u64 {
        let count = self
            .0
            .entry(height)
            .or_default()
            .entry(miner.clone())
            .or_default()
            .entry(service_type)
            .or_default();
        *count += 1;
        *count
    }

    pub fn count(&self, height: i64, miner: &Identity, service_type: u64) -> u64 {
        self.0
            .get(&height)
            .and_then(|miners| miners.get(miner))
            .and_then(|types| types.get(&service_type))
            .copied()
            .unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn heights(&self) -> impl Iterator<Item = i64> + '_ {
        self.0.keys().copied()
    }
}
