//! # Marketplace State Machine (LK-04)
//!
//! Applies authenticated transactions to the registry.
//!
//! ## Flow
//!
//! ```text
//! AuthenticatedTx ─► decode payload ─► handler ─► Registry (staged store)
//!                                        │
//!                                        └─► MinerWorkRecords (ServiceDone only)
//! ```
//!
//! Handlers are pure functions of the prior state, the payload, the sender
//! and the `BlockContext`. Nothing here reads clocks or randomness; miner
//! selection is seeded from block data only.

pub mod dispatcher;
pub mod domain;
pub mod handlers;

pub use dispatcher::{dispatch, sweep_timeouts, BlockContext};
pub use domain::errors::MarketError;
pub use domain::selection::{derive_service_id, select_miner, selection_digest};
