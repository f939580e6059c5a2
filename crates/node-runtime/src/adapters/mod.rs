//! # Adapters
//!
//! Production implementations of the ports the application depends on.

pub mod storage;
