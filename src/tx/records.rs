//! Batched record operations on a single bucket

use crate::error::Result;
use super::bucket::resolve;
use super::{check_pairs, KvPair, Tx};

impl<'db> Tx<'db> {
    /// Get values for `keys`, in input order
    ///
    /// Keys that are missing or hold an empty value are left out, so the
    /// result can be shorter than `keys`. On a writable transaction the
    /// bucket is created if absent.
    pub fn get<K: AsRef<[u8]>>(&mut self, bucket: &[u8], keys: &[K]) -> Vec<KvPair> {
        self.run(|tx| {
            let Some(b) = resolve(tx, bucket)? else {
                return Ok(Vec::new());
            };
            Ok(keys
                .iter()
                .map(AsRef::as_ref)
                .filter_map(|key| match b.get(key) {
                    Some(value) if !value.is_empty() => Some((key.to_vec(), value.to_vec())),
                    _ => None,
                })
                .collect())
        })
        .unwrap_or_default()
    }

    /// Put a flat `key, value, key, value, ...` list
    ///
    /// An odd or empty list fails before anything is written. A failure
    /// partway leaves the earlier pairs in the transaction.
    pub fn put<K: AsRef<[u8]>>(&mut self, bucket: &[u8], kvs: &[K]) -> Result<()> {
        self.run(|tx| {
            check_pairs(kvs.len())?;
            let mut b = tx.create_bucket_if_absent(bucket)?;
            for pair in kvs.chunks_exact(2) {
                b.put(pair[0].as_ref(), pair[1].as_ref())?;
            }
            Ok(())
        })
    }

    /// Delete every key in `keys`; a missing bucket is a no-op
    pub fn delete<K: AsRef<[u8]>>(&mut self, bucket: &[u8], keys: &[K]) -> Result<()> {
        self.run(|tx| {
            let Some(mut b) = tx.bucket_mut(bucket)? else {
                return Ok(());
            };
            for key in keys {
                b.delete(key.as_ref())?;
            }
            Ok(())
        })
    }

    /// Visit every record in ascending key order
    ///
    /// An error from `visit` stops the walk and becomes the sticky error.
    pub fn for_each<F>(&mut self, bucket: &[u8], mut visit: F) -> Result<()>
    where
        F: FnMut(&[u8], &[u8]) -> Result<()>,
    {
        self.run(|tx| {
            let Some(b) = tx.bucket(bucket) else {
                return Ok(());
            };
            for (key, value) in b.iter() {
                visit(key, value)?;
            }
            Ok(())
        })
    }

    /// Delete a whole bucket; a missing bucket is `BucketNotFound`
    pub fn delete_bucket(&mut self, bucket: &[u8]) -> Result<()> {
        self.run(|tx| tx.delete_bucket(bucket))
    }
}
