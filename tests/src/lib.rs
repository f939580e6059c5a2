//! # Linkis Test Suite
//!
//! Unified test crate for flows that cross crate boundaries.
//!
//! ## Structure
//!
//! ```text
//! tests/src/
//! ├── fixtures.rs       # Signing actors, block drivers, query helpers
//! └── integration/      # Whole-application scenarios
//!     ├── marketplace_flow.rs
//!     ├── determinism.rs
//!     └── crash_consistency.rs
//! ```
//!
//! ## Running Tests
//!
//! ```bash
//! # All tests
//! cargo test -p lk-tests
//!
//! # Including the RocksDB scenarios
//! cargo test -p lk-tests --features rocksdb
//!
//! # Benchmarks
//! cargo bench -p lk-tests
//! ```

#![allow(dead_code)]

pub mod fixtures;
pub mod integration;
