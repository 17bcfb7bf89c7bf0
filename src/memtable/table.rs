//! MemTable implementation
//!
//! Copy-on-write bucket map.

use std::collections::BTreeMap;
use std::sync::Arc;

use crate::wal::Operation;
use super::Cursor;

/// Contents of one bucket
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BucketData {
    /// Per-bucket counter for `next_sequence`
    pub(crate) sequence: u64,
    pub(crate) entries: BTreeMap<Vec<u8>, Vec<u8>>,
}

impl BucketData {
    /// Get a value by key
    pub fn get(&self, key: &[u8]) -> Option<&[u8]> {
        self.entries.get(key).map(Vec::as_slice)
    }

    /// Current sequence value
    pub fn sequence(&self) -> u64 {
        self.sequence
    }

    /// Number of records in the bucket
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Records in ascending key order
    pub fn iter(&self) -> impl Iterator<Item = (&[u8], &[u8])> {
        self.entries.iter().map(|(k, v)| (k.as_slice(), v.as_slice()))
    }

    /// Unpositioned cursor over the bucket
    pub fn cursor(&self) -> Cursor<'_> {
        Cursor::new(&self.entries)
    }
}

/// Every bucket in the store, keyed by name
#[derive(Debug, Clone, Default)]
pub struct MemTable {
    buckets: BTreeMap<Vec<u8>, Arc<BucketData>>,
}

impl MemTable {
    /// Create a new empty MemTable
    pub fn new() -> Self {
        Self::default()
    }

    /// Look up a bucket by name
    pub fn bucket(&self, name: &[u8]) -> Option<&BucketData> {
        self.buckets.get(name).map(Arc::as_ref)
    }

    /// Mutable access to an existing bucket, copying it if shared
    pub fn bucket_mut(&mut self, name: &[u8]) -> Option<&mut BucketData> {
        self.buckets.get_mut(name).map(Arc::make_mut)
    }

    /// Create a bucket if it is absent; returns whether one was created
    pub fn create_bucket(&mut self, name: &[u8]) -> bool {
        if self.buckets.contains_key(name) {
            return false;
        }
        self.buckets.insert(name.to_vec(), Arc::new(BucketData::default()));
        true
    }

    /// Remove a bucket; returns whether it existed
    pub fn remove_bucket(&mut self, name: &[u8]) -> bool {
        self.buckets.remove(name).is_some()
    }

    /// Insert a fully built bucket (snapshot loading)
    pub(crate) fn insert_bucket(&mut self, name: Vec<u8>, data: BucketData) {
        self.buckets.insert(name, Arc::new(data));
    }

    /// Buckets in ascending name order
    pub fn buckets(&self) -> impl Iterator<Item = (&[u8], &BucketData)> {
        self.buckets.iter().map(|(k, v)| (k.as_slice(), v.as_ref()))
    }

    pub fn bucket_count(&self) -> usize {
        self.buckets.len()
    }

    /// Total records across all buckets
    pub fn entry_count(&self) -> usize {
        self.buckets.values().map(|b| b.len()).sum()
    }

    /// Apply one logged operation (WAL replay)
    ///
    /// Operations on a bucket that does not exist are ignored; a well-formed
    /// log always creates a bucket before touching it.
    pub fn apply(&mut self, op: &Operation) {
        match op {
            Operation::CreateBucket { bucket } => {
                self.create_bucket(bucket);
            }
            Operation::DeleteBucket { bucket } => {
                self.remove_bucket(bucket);
            }
            Operation::Put { bucket, key, value } => {
                if let Some(b) = self.bucket_mut(bucket) {
                    b.entries.insert(key.clone(), value.clone());
                }
            }
            Operation::Delete { bucket, key } => {
                if let Some(b) = self.bucket_mut(bucket) {
                    b.entries.remove(key);
                }
            }
            Operation::SetSequence { bucket, sequence } => {
                if let Some(b) = self.bucket_mut(bucket) {
                    b.sequence = *sequence;
                }
            }
        }
    }
}
