//! Key builders for every record the registry owns.

use shared_types::Identity;

pub const ALL_MINER_STATUS: &[u8] = b"allMinerStatus";
pub const ALL_SERVICE_REQUESTS: &[u8] = b"allServiceRequests";
pub const MINER_JOBS_PREFIX: &str = "minerjobs_";

pub fn client_registration(id: &Identity) -> Vec<u8> {
    format!("clientRegistration_{id}").into_bytes()
}

pub fn miner_registration(id: &Identity) -> Vec<u8> {
    format!("minerRegistration_{id}").into_bytes()
}

pub fn service_type(service_type: u64) -> Vec<u8> {
    format!("serviceType_{service_type}").into_bytes()
}

pub fn miner_rating(id: &Identity) -> Vec<u8> {
    format!("minerRating_{id}").into_bytes()
}

pub fn miner_jobs(id: &Identity) -> Vec<u8> {
    format!("{MINER_JOBS_PREFIX}{id}").into_bytes()
}
