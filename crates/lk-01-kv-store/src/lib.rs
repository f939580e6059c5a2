//! # Key-Value Store Adapter (LK-01)
//!
//! Byte-oriented persistent storage the state machine is built on.
//!
//! ## Architecture
//!
//! - **Ports** (`ports/`): the `KeyValueStore` trait every backend implements
//! - **Adapters** (`adapters/`): ordered in-memory store for tests and dev nodes
//!   (RocksDB lives in `node-runtime`, behind its `rocksdb` feature)
//! - **Domain** (`domain/`): `WriteSet` and `StagedStore`, the two write
//!   buffering layers
//!
//! ## Atomicity
//!
//! Writes of one transaction are staged in a `StagedStore`; on success they
//! are merged into the block's `WriteSet`, which is flushed with a single
//! `atomic_batch_write` at commit. A crash mid-block therefore never tears the
//! persisted state.

pub mod adapters;
pub mod domain;
pub mod ports;

pub use adapters::memory::InMemoryKVStore;
pub use domain::errors::KVStoreError;
pub use domain::staged::StagedStore;
pub use domain::write_set::WriteSet;
pub use ports::store::{BatchOperation, KeyValueStore};
