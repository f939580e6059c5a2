//! # RocksDB Storage Adapter
//!
//! Persistent implementation of the `KeyValueStore` port.
//!
//! ## Features
//!
//! - Commit batches go through one `WriteBatch`, so a block is either fully
//!   persisted or not at all
//! - Snappy compression
//! - Bloom filters for point lookups
//! - Optional fsync on every write
//!
//! The marketplace uses a single flat key space, so everything lives in the
//! default column family.

use lk_01_kv_store::{BatchOperation, KVStoreError, KeyValueStore};
use parking_lot::RwLock;
use rocksdb::{BlockBasedOptions, Cache, DBCompressionType, Direction, IteratorMode, Options};
use rocksdb::{WriteBatch, WriteOptions, DB};
use std::path::Path;
use std::sync::Arc;

/// RocksDB tuning for a node.
#[derive(Debug, Clone)]
pub struct RocksDbConfig {
    /// Path to the database directory
    pub path: String,
    /// Block cache size in bytes (default: 128MB)
    pub block_cache_size: usize,
    /// Write buffer size in bytes (default: 32MB)
    pub write_buffer_size: usize,
    /// Maximum number of write buffers (default: 3)
    pub max_write_buffer_number: i32,
    /// fsync after each write (default: true)
    pub sync_writes: bool,
}

impl Default for RocksDbConfig {
    fn default() -> Self {
        Self {
            path: "./data/linkis".to_string(),
            block_cache_size: 128 * 1024 * 1024,
            write_buffer_size: 32 * 1024 * 1024,
            max_write_buffer_number: 3,
            sync_writes: true,
        }
    }
}

impl RocksDbConfig {
    /// Small buffers and no fsync.
    pub fn for_testing(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            block_cache_size: 8 * 1024 * 1024,
            write_buffer_size: 4 * 1024 * 1024,
            max_write_buffer_number: 2,
            sync_writes: false,
        }
    }
}

/// RocksDB-backed key-value store.
pub struct RocksDbStore {
    db: Arc<RwLock<DB>>,
    config: RocksDbConfig,
}

impl RocksDbStore {
    /// Open or create a database at `config.path`.
    pub fn open(config: RocksDbConfig) -> Result<Self, KVStoreError> {
        let mut opts = Options::default();
        opts.create_if_missing(true);
        opts.set_write_buffer_size(config.write_buffer_size);
        opts.set_max_write_buffer_number(config.max_write_buffer_number);
        opts.set_compression_type(DBCompressionType::Snappy);

        let mut block_opts = BlockBasedOptions::default();
        block_opts.set_bloom_filter(10.0, false);
        block_opts.set_block_cache(&Cache::new_lru_cache(config.block_cache_size));
        opts.set_block_based_table_factory(&block_opts);

        let db = DB::open(&opts, &config.path).map_err(|e| KVStoreError::IOError {
            message: format!("Failed to open RocksDB at {}: {}", config.path, e),
        })?;

        Ok(Self {
            db: Arc::new(RwLock::new(db)),
            config,
        })
    }

    /// Open with default tuning.
    pub fn open_default(path: impl AsRef<Path>) -> Result<Self, KVStoreError> {
        Self::open(RocksDbConfig {
            path: path.as_ref().to_string_lossy().to_string(),
            ..Default::default()
        })
    }

    pub fn config(&self) -> &RocksDbConfig {
        &self.config
    }

    fn write_options(&self) -> WriteOptions {
        let mut write_opts = WriteOptions::default();
        write_opts.set_sync(self.config.sync_writes);
        write_opts
    }
}

fn io_error(op: &str, e: rocksdb::Error) -> KVStoreError {
    KVStoreError::IOError {
        message: format!("RocksDB {op} failed: {e}"),
    }
}

impl KeyValueStore for RocksDbStore {
    fn get(&self, key: &[u8]) -> Result<Option<Vec<u8>>, KVStoreError> {
        self.db.read().get(key).map_err(|e| io_error("get", e))
    }

    fn put(&mut self, key: &[u8], value: &[u8]) -> Result<(), KVStoreError> {
        let write_opts = self.write_options();
        self.db
            .write()
            .put_opt(key, value, &write_opts)
            .map_err(|e| io_error("put", e))
    }

    fn delete(&mut self, key: &[u8]) -> Result<(), KVStoreError> {
        let write_opts = self.write_options();
        self.db
            .write()
            .delete_opt(key, &write_opts)
            .map_err(|e| io_error("delete", e))
    }

    fn atomic_batch_write(&mut self, operations: Vec<BatchOperation>) -> Result<(), KVStoreError> {
        let mut batch = WriteBatch::default();
        for op in operations {
            match op {
                BatchOperation::Put { key, value } => batch.put(&key, &value),
                BatchOperation::Delete { key } => batch.delete(&key),
            }
        }

        let write_opts = self.write_options();
        self.db
            .write()
            .write_opt(batch, &write_opts)
            .map_err(|e| io_error("batch write", e))
    }

    fn exists(&self, key: &[u8]) -> Result<bool, KVStoreError> {
        self.db
            .read()
            .get_pinned(key)
            .map(|v| v.is_some())
            .map_err(|e| io_error("exists check", e))
    }

    fn prefix_scan(&self, prefix: &[u8]) -> Result<Vec<(Vec<u8>, Vec<u8>)>, KVStoreError> {
        let db = self.db.read();
        let mut results = Vec::new();

        // keys come back in bytewise order, which keeps scans deterministic
        for item in db.iterator(IteratorMode::From(prefix, Direction::Forward)) {
            let (key, value) = item.map_err(|e| io_error("scan", e))?;
            if !key.starts_with(prefix) {
                break;
            }
            results.push((key.to_vec(), value.to_vec()));
        }

        Ok(results)
    }
}
