//! # Storage Adapters
//!
//! Backends for the application's `KeyValueStore` port.
//!
//! ## Usage
//!
//! The in-memory store is always available. Enable the `rocksdb` feature for
//! the persistent backend:
//!
//! ```toml
//! node-runtime = { path = "...", features = ["rocksdb"] }
//! ```

#[cfg(feature = "rocksdb")]
pub mod rocksdb_adapter;

#[cfg(feature = "rocksdb")]
pub use rocksdb_adapter::{RocksDbConfig, RocksDbStore};

pub use lk_01_kv_store::InMemoryKVStore;
