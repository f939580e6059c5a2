//! # Shared Types Crate
//!
//! Types shared by all Linkis crates.
//!
//! ## Design Principles
//!
//! - **Single Source of Truth**: identities, validator and evidence types, and
//!   the engine-facing request/response shapes are defined once here.
//! - **Engine Agnostic**: the `abci` module mirrors the lifecycle calls of the
//!   consensus engine without depending on any engine crate.

pub mod abci;
pub mod entities;

pub use abci::*;
pub use entities::*;
