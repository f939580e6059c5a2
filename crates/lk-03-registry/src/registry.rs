//! # Registry Accessors
//!
//! Typed reads and writes of marketplace records over any `KeyValueStore`.
//! During block execution the store is the transaction's `StagedStore`, so
//! everything written here is discarded if the transaction fails.

use crate::domain::backlog::retain_above;
use crate::domain::entities::{
    ClientInfo, ClientRatings, JobInfo, MinerInfo, MinerStatus, MinerStatuses, ServiceRequest,
};
use crate::domain::errors::RegistryError;
use crate::domain::keys;
use lk_01_kv_store::KeyValueStore;
use serde::de::DeserializeOwned;
use serde::Serialize;
use shared_types::Identity;
use tracing::debug;

pub struct Registry<'a, S: KeyValueStore + ?Sized> {
    store: &'a mut S,
}

impl<'a, S: KeyValueStore + ?Sized> Registry<'a, S> {
    pub fn new(store: &'a mut S) -> Self {
        Self { store }
    }

    // =========================================================================
    // CLIENTS
    // =========================================================================

    pub fn client(&self, id: &Identity) -> Result<Option<ClientInfo>, RegistryError> {
        self.load(&keys::client_registration(id))
    }

    pub fn put_client(&mut self, id: &Identity, info: &ClientInfo) -> Result<(), RegistryError> {
        self.save(&keys::client_registration(id), info)
    }

    // =========================================================================
    // MINERS
    // =========================================================================

    pub fn miner(&self, id: &Identity) -> Result<Option<MinerInfo>, RegistryError> {
        self.load(&keys::miner_registration(id))
    }

    pub fn put_miner(&mut self, id: &Identity, info: &MinerInfo) -> Result<(), RegistryError> {
        self.save(&keys::miner_registration(id), info)
    }

    /// Miners offering `service_type`, in registration order.
    pub fn service_type_miners(&self, service_type: u64) -> Result<Vec<Identity>, RegistryError> {
        Ok(self
            .load(&keys::service_type(service_type))?
            .unwrap_or_default())
    }

    /// Append `miner` to the index of `service_type` unless already present.
    pub fn add_to_service_type(
        &mut self,
        service_type: u64,
        miner: &Identity,
    ) -> Result<bool, RegistryError> {
        let mut miners = self.service_type_miners(service_type)?;
        if miners.contains(miner) {
            return Ok(false);
        }
        miners.push(miner.clone());
        self.save(&keys::service_type(service_type), &miners)?;
        Ok(true)
    }

    pub fn remove_from_service_type(
        &mut self,
        service_type: u64,
        miner: &Identity,
    ) -> Result<bool, RegistryError> {
        let mut miners = self.service_type_miners(service_type)?;
        let before = miners.len();
        miners.retain(|m| m != miner);
        if miners.len() == before {
            return Ok(false);
        }
        self.save(&keys::service_type(service_type), &miners)?;
        Ok(true)
    }

    pub fn miner_statuses(&self) -> Result<MinerStatuses, RegistryError> {
        Ok(self.load(keys::ALL_MINER_STATUS)?.unwrap_or_default())
    }

    pub fn miner_status(&self, id: &Identity) -> Result<MinerStatus, RegistryError> {
        self.miner_statuses()?
            .get(id)
            .copied()
            .ok_or_else(|| RegistryError::MinerStatusNotFound(id.clone()))
    }

    pub fn set_miner_status(
        &mut self,
        id: &Identity,
        status: MinerStatus,
    ) -> Result<(), RegistryError> {
        let mut statuses = self.miner_statuses()?;
        statuses.insert(id.clone(), status);
        self.save(keys::ALL_MINER_STATUS, &statuses)
    }

    // =========================================================================
    // RATINGS
    // =========================================================================

    pub fn ratings(&self, miner: &Identity) -> Result<ClientRatings, RegistryError> {
        Ok(self.load(&keys::miner_rating(miner))?.unwrap_or_default())
    }

    /// Record `client`'s rating of `miner`, replacing any earlier one.
    pub fn set_rating(
        &mut self,
        miner: &Identity,
        client: &Identity,
        rating: u8,
    ) -> Result<(), RegistryError> {
        let mut ratings = self.ratings(miner)?;
        ratings.insert(client.clone(), rating);
        self.save(&keys::miner_rating(miner), &ratings)
    }

    // =========================================================================
    // JOBS
    // =========================================================================

    pub fn jobs(&self, miner: &Identity) -> Result<Vec<JobInfo>, RegistryError> {
        Ok(self.load(&keys::miner_jobs(miner))?.unwrap_or_default())
    }

    pub fn put_jobs(&mut self, miner: &Identity, jobs: &[JobInfo]) -> Result<(), RegistryError> {
        self.save(&keys::miner_jobs(miner), &jobs)
    }

    pub fn push_job(&mut self, miner: &Identity, job: JobInfo) -> Result<(), RegistryError> {
        let mut jobs = self.jobs(miner)?;
        jobs.push(job);
        self.put_jobs(miner, &jobs)
    }

    /// Every miner's job list, in key order.
    pub fn all_jobs(&self) -> Result<Vec<(Identity, Vec<JobInfo>)>, RegistryError> {
        let prefix = keys::MINER_JOBS_PREFIX.as_bytes();
        self.store
            .prefix_scan(prefix)?
            .into_iter()
            .map(|(key, value)| {
                let id = String::from_utf8_lossy(&key[prefix.len()..]).into_owned();
                let jobs = decode(&key, &value)?;
                Ok((Identity::new(id), jobs))
            })
            .collect()
    }

    /// Drop `Done` and `TimedOut` jobs from every list, deleting lists left
    /// empty. Returns how many jobs were dropped.
    pub fn prune_finished_jobs(&mut self) -> Result<usize, RegistryError> {
        let mut dropped = 0;
        for (miner, mut jobs) in self.all_jobs()? {
            let before = jobs.len();
            jobs.retain(|job| job.job_status.is_open());
            if jobs.len() == before {
                continue;
            }
            dropped += before - jobs.len();
            if jobs.is_empty() {
                self.store.delete(&keys::miner_jobs(&miner))?;
            } else {
                self.put_jobs(&miner, &jobs)?;
            }
        }
        if dropped > 0 {
            debug!(dropped, "Pruned finished jobs");
        }
        Ok(dropped)
    }

    // =========================================================================
    // BACKLOG
    // =========================================================================

    pub fn backlog(&self) -> Result<Vec<ServiceRequest>, RegistryError> {
        Ok(self.load(keys::ALL_SERVICE_REQUESTS)?.unwrap_or_default())
    }

    pub fn push_backlog(&mut self, entry: ServiceRequest) -> Result<(), RegistryError> {
        let mut backlog = self.backlog()?;
        backlog.push(entry);
        self.save(keys::ALL_SERVICE_REQUESTS, &backlog)
    }

    /// Remove the entry for `service_id`, wherever it sits.
    pub fn remove_backlog_entry(&mut self, service_id: &str) -> Result<bool, RegistryError> {
        let mut backlog = self.backlog()?;
        let Some(position) = backlog.iter().position(|e| e.service_id == service_id) else {
            return Ok(false);
        };
        backlog.remove(position);
        self.save(keys::ALL_SERVICE_REQUESTS, &backlog)?;
        Ok(true)
    }

    /// Drop backlog entries at or below `cutoff`. Returns how many were dropped.
    pub fn prune_backlog(&mut self, cutoff: i64) -> Result<usize, RegistryError> {
        let mut backlog = self.backlog()?;
        let dropped = retain_above(&mut backlog, cutoff);
        if dropped > 0 {
            self.save(keys::ALL_SERVICE_REQUESTS, &backlog)?;
            debug!(cutoff, dropped, remaining = backlog.len(), "Pruned service backlog");
        }
        Ok(dropped)
    }

    // =========================================================================
    // ENCODING
    // =========================================================================

    fn load<T: DeserializeOwned>(&self, key: &[u8]) -> Result<Option<T>, RegistryError> {
        match self.store.get(key)? {
            Some(bytes) => decode(key, &bytes).map(Some),
            None => Ok(None),
        }
    }

    fn save<T: Serialize + ?Sized>(&mut self, key: &[u8], value: &T) -> Result<(), RegistryError> {
        let bytes = serde_json::to_vec(value).map_err(|e| RegistryError::Serialization {
            key: String::from_utf8_lossy(key).into_owned(),
            message: e.to_string(),
        })?;
        self.store.put(key, &bytes)?;
        Ok(())
    }
}

fn decode<T: DeserializeOwned>(key: &[u8], bytes: &[u8]) -> Result<T, RegistryError> {
    serde_json::from_slice(bytes).map_err(|e| RegistryError::Serialization {
        key: String::from_utf8_lossy(key).into_owned(),
        message: e.to_string(),
    })
}
