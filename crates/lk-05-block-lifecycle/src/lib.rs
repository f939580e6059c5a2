//! # Block Lifecycle & Hashing (LK-05)
//!
//! The `Application` the consensus engine drives, one call at a time:
//!
//! ```text
//! InitChain ─► ( BeginBlock ─► DeliverTx* ─► EndBlock ─► Commit )*
//!                    CheckTx / Query / Info at any point
//! ```
//!
//! ## Write Path
//!
//! - `DeliverTx` runs its handler over a `StagedStore`; staged writes join the
//!   block `WriteSet` only if the handler succeeds.
//! - `Commit` folds the root state and the block `WriteSet` into the app hash
//!   and persists both with one atomic batch.
//! - `Query` reads the committed store only.

pub mod application;
pub mod config;
pub mod domain;

pub use application::Application;
pub use config::LifecycleConfig;
pub use domain::errors::LifecycleError;
pub use domain::hashing::{commit_hash, write_set_digest};
pub use domain::state::{AppState, STATE_KEY};
pub use domain::validators::{ValidatorIndex, VALIDATOR_PREFIX};
