//! # Domain Registry (LK-03)
//!
//! Typed records of the compute marketplace and their place in the key
//! space. Every record is an independent JSON value under its own key; maps
//! are `BTreeMap`s so the bytes written are identical on every replica.
//!
//! ## Key Namespace
//!
//! | Key | Value |
//! |-----|-------|
//! | `clientRegistration_<id>` | `ClientInfo` |
//! | `minerRegistration_<id>` | `MinerInfo` |
//! | `serviceType_<n>` | miners offering type `n`, registration order |
//! | `allMinerStatus` | `MinerStatuses` |
//! | `minerRating_<id>` | `ClientRatings` |
//! | `minerjobs_<id>` | jobs assigned to the miner |
//! | `allServiceRequests` | the backlog |

pub mod domain;
pub mod registry;

pub use domain::backlog::retain_above;
pub use domain::entities::{
    ClientInfo, ClientRatings, JobInfo, JobStatus, MinerInfo, MinerStatus, MinerStatuses,
    MinerWorkRecords, ServiceRequest,
};
pub use domain::errors::RegistryError;
pub use domain::keys;
pub use registry::Registry;
