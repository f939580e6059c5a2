//! Backend selection.

use super::config::{StorageBackend, StorageConfig};
use lk_01_kv_store::{InMemoryKVStore, KVStoreError, KeyValueStore};
use tracing::{info, warn};

/// Open the store named by `config.backend`.
pub fn open_store(config: &StorageConfig) -> Result<Box<dyn KeyValueStore>, KVStoreError> {
    match config.backend {
        StorageBackend::Memory => {
            warn!("Using in-memory store; state will not survive a restart");
            Ok(Box::new(InMemoryKVStore::new()))
        }
        StorageBackend::RocksDb => open_rocksdb(config),
    }
}

#[cfg(feature = "rocksdb")]
fn open_rocksdb(config: &StorageConfig) -> Result<Box<dyn KeyValueStore>, KVStoreError> {
    use crate::adapters::storage::{RocksDbConfig, RocksDbStore};

    let path = config.data_dir.to_string_lossy().to_string();
    std::fs::create_dir_all(&config.data_dir).map_err(|e| KVStoreError::IOError {
        message: format!("Failed to create data dir {path}: {e}"),
    })?;
    let store = RocksDbStore::open(RocksDbConfig {
        path: path.clone(),
        sync_writes: config.sync_writes,
        ..RocksDbConfig::default()
    })?;
    info!(path = %path, sync_writes = config.sync_writes, "RocksDB store opened");
    Ok(Box::new(store))
}

#[cfg(not(feature = "rocksdb"))]
fn open_rocksdb(config: &StorageConfig) -> Result<Box<dyn KeyValueStore>, KVStoreError> {
    info!(path = %config.data_dir.display(), "RocksDB requested");
    Err(KVStoreError::IOError {
        message: "node-runtime was built without the `rocksdb` feature".to_string(),
    })
}
