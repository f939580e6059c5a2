//! # Staged Store
//!
//! Copy-on-write view used to execute one transaction. Reads fall through
//! `staged → pending block writes → base store`; writes only touch `staged`.
//! Dropping the view discards the transaction's effects.

use crate::domain::errors::KVStoreError;
use crate::domain::write_set::WriteSet;
use crate::ports::store::{BatchOperation, KeyValueStore};

pub struct StagedStore<'a> {
    base: &'a dyn KeyValueStore,
    pending: Option<&'a WriteSet>,
    staged: WriteSet,
}

impl<'a> StagedStore<'a> {
    /// Stage directly over a store.
    pub fn new(base: &'a dyn KeyValueStore) -> Self {
        Self {
            base,
            pending: None,
            staged: WriteSet::new(),
        }
    }

    /// Stage over a store plus the not-yet-flushed writes of the current block.
    pub fn over(base: &'a dyn KeyValueStore, pending: &'a WriteSet) -> Self {
        Self {
            base,
            pending: Some(pending),
            staged: WriteSet::new(),
        }
    }

    pub fn staged(&self) -> &WriteSet {
        &self.staged
    }

    pub fn into_write_set(self) -> WriteSet {
        self.staged
    }
}

impl KeyValueStore for StagedStore<'_> {
    fn get(&self, key: &[u8]) -> Result<Option<Vec<u8>>, KVStoreError> {
        if let Some(value) = self.staged.lookup(key) {
            return Ok(value.map(<[u8]>::to_vec));
        }
        if let Some(value) = self.pending.and_then(|p| p.lookup(key)) {
            return Ok(value.map(<[u8]>::to_vec));
        }
        self.base.get(key)
    }

    fn put(&mut self, key: &[u8], value: &[u8]) -> Result<(), KVStoreError> {
        self.staged.put(key, value);
        Ok(())
    }

    fn delete(&mut self, key: &[u8]) -> Result<(), KVStoreError> {
        self.staged.delete(key);
        Ok(())
    }

    fn atomic_batch_write(&mut self, operations: Vec<BatchOperation>) -> Result<(), KVStoreError> {
        for op in operations {
            match op {
                BatchOperation::Put { key, value } => self.staged.put(&key, &value),
                BatchOperation::Delete { key } => self.staged.delete(&key),
            }
        }
        Ok(())
    }

    fn prefix_scan(&self, prefix: &[u8]) -> Result<Vec<(Vec<u8>, Vec<u8>)>, KVStoreError> {
        let mut entries = self.base.prefix_scan(prefix)?;
        if let Some(pending) = self.pending {
            entries = pending.overlay_scan(prefix, entries);
        }
        Ok(self.staged.overlay_scan(prefix, entries))
    }
}
