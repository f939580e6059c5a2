//! # Write Set
//!
//! Ordered buffer of pending mutations. A `None` value is a tombstone.

use crate::ports::store::BatchOperation;
use std::collections::BTreeMap;

/// Pending puts and deletes keyed by store key, kept in key order.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct WriteSet {
    entries: BTreeMap<Vec<u8>, Option<Vec<u8>>>,
}

impl WriteSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn put(&mut self, key: &[u8], value: &[u8]) {
        self.entries.insert(key.to_vec(), Some(value.to_vec()));
    }

    pub fn delete(&mut self, key: &[u8]) {
        self.entries.insert(key.to_vec(), None);
    }

    /// `None` if the key is untouched, `Some(None)` if deleted.
    pub fn lookup(&self, key: &[u8]) -> Option<Option<&[u8]>> {
        self.entries.get(key).map(|v| v.as_deref())
    }

    /// Fold `later` on top of `self`; later writes win.
    pub fn merge(&mut self, later: WriteSet) {
        self.entries.extend(later.entries);
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Entries in ascending key order.
    pub fn iter(&self) -> impl Iterator<Item = (&[u8], Option<&[u8]>)> {
        self.entries
            .iter()
            .map(|(k, v)| (k.as_slice(), v.as_deref()))
    }

    /// Apply this write set on top of an ordered scan of a lower layer.
    pub fn overlay_scan(
        &self,
        prefix: &[u8],
        lower: Vec<(Vec<u8>, Vec<u8>)>,
    ) -> Vec<(Vec<u8>, Vec<u8>)> {
        let mut merged: BTreeMap<Vec<u8>, Vec<u8>> = lower.into_iter().collect();
        for (key, value) in self
            .entries
            .range(prefix.to_vec()..)
            .take_while(|(k, _)| k.starts_with(prefix))
        {
            match value {
                Some(v) => {
                    merged.insert(key.clone(), v.clone());
                }
                None => {
                    merged.remove(key);
                }
            }
        }
        merged.into_iter().collect()
    }

    pub fn into_operations(self) -> Vec<BatchOperation> {
        self.entries
            .into_iter()
            .map(|(key, value)| match value {
                Some(value) => BatchOperation::Put { key, value },
                None => BatchOperation::Delete { key },
            })
            .collect()
    }
}
