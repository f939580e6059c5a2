//! # Key-Value Store Port
//!
//! Abstract interface for byte-oriented key-value persistence.
//!
//! Production: `RocksDbStore` (node-runtime/src/adapters/storage/rocksdb_adapter.rs)
//! Testing: `InMemoryKVStore` (adapters/memory.rs)

use crate::domain::errors::KVStoreError;

/// Abstract interface for key-value database operations.
///
/// ## Ordering
///
/// `prefix_scan` MUST return entries in ascending key order. Replicas iterate
/// scanned records while mutating state, so an unordered scan would break
/// determinism.
pub trait KeyValueStore: Send + Sync {
    /// Get a value by key.
    fn get(&self, key: &[u8]) -> Result<Option<Vec<u8>>, KVStoreError>;

    /// Put a single key-value pair.
    fn put(&mut self, key: &[u8], value: &[u8]) -> Result<(), KVStoreError>;

    /// Delete a key. Deleting an absent key is not an error.
    fn delete(&mut self, key: &[u8]) -> Result<(), KVStoreError>;

    /// Execute an atomic batch write.
    ///
    /// Either ALL operations in the batch are applied, or NONE are.
    fn atomic_batch_write(&mut self, operations: Vec<BatchOperation>) -> Result<(), KVStoreError>;

    /// Check if a key exists.
    fn exists(&self, key: &[u8]) -> Result<bool, KVStoreError> {
        Ok(self.get(key)?.is_some())
    }

    /// All entries whose key starts with `prefix`, in ascending key order.
    fn prefix_scan(&self, prefix: &[u8]) -> Result<Vec<(Vec<u8>, Vec<u8>)>, KVStoreError>;
}

/// Batch operation for atomic writes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BatchOperation {
    /// Put a key-value pair.
    Put { key: Vec<u8>, value: Vec<u8> },
    /// Delete a key.
    Delete { key: Vec<u8> },
}

impl BatchOperation {
    /// Create a Put operation.
    pub fn put(key: impl Into<Vec<u8>>, value: impl Into<Vec<u8>>) -> Self {
        BatchOperation::Put {
            key: key.into(),
            value: value.into(),
        }
    }

    /// Create a Delete operation.
    pub fn delete(key: impl Into<Vec<u8>>) -> Self {
        BatchOperation::Delete { key: key.into() }
    }

    pub fn key(&self) -> &[u8] {
        match self {
            BatchOperation::Put { key, .. } | BatchOperation::Delete { key } => key,
        }
    }
}
