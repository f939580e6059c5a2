//! # Ports
//!
//! Interfaces the storage layer exposes to the rest of the workspace.

pub mod store;
