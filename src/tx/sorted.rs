//! Sorted index
//!
//! Records stored under a primary key but iterated in caller-supplied sort
//! key order. Index `name` owns two buckets:
//!
//! - forward (`0x14 ‖ name`): `sort_key ‖ primary_key → value`
//! - reverse (`0x15 ‖ name`): `primary_key → sort_key ‖ primary_key`
//!
//! For every primary key in the reverse bucket, the forward bucket holds
//! exactly one entry, at the composite key the reverse bucket names. Sort
//! keys are exactly [`SORT_KEY_LEN`] bytes; equal sort keys order by primary
//! key.

use crate::codec::{self, SORT_KEY_LEN};
use crate::error::{KvError, Result};
use super::bucket::resolve;
use super::{check_pairs, KvPair, Tx};

impl<'db> Tx<'db> {
    /// Index every `key, value` pair of `kvs` under `sort_key`
    ///
    /// A primary key that already sits under a different sort key is moved:
    /// the stale forward entry is removed in the same call. Under the same
    /// sort key only the value is refreshed.
    pub fn sort_put<K: AsRef<[u8]>>(&mut self, name: &[u8], sort_key: &[u8], kvs: &[K]) -> Result<()> {
        self.run(|tx| {
            check_pairs(kvs.len())?;
            check_sort_key(sort_key)?;

            let forward = codec::forward_bucket(name);
            let reverse = codec::reverse_bucket(name);
            tx.create_bucket_if_absent(&forward)?;
            tx.create_bucket_if_absent(&reverse)?;

            for pair in kvs.chunks_exact(2) {
                let (key, value) = (pair[0].as_ref(), pair[1].as_ref());
                if key.is_empty() {
                    return Err(KvError::InvalidArgument("primary key required".to_string()));
                }

                let composite = codec::composite_key(sort_key, key);
                let old = tx
                    .bucket(&reverse)
                    .and_then(|b| b.get(key))
                    .map(<[u8]>::to_vec);

                if old.as_deref().and_then(codec::sort_key_of) == Some(sort_key) {
                    let mut fwd = tx.create_bucket_if_absent(&forward)?;
                    if fwd.get(&composite) != Some(value) {
                        fwd.put(&composite, value)?;
                    }
                    continue;
                }

                tx.create_bucket_if_absent(&forward)?.put(&composite, value)?;
                tx.create_bucket_if_absent(&reverse)?.put(key, &composite)?;
                if let Some(old) = old {
                    tx.create_bucket_if_absent(&forward)?.delete(&old)?;
                }
            }
            Ok(())
        })
    }

    /// Remove primary keys from the index; unknown keys are skipped
    pub fn sort_delete<K: AsRef<[u8]>>(&mut self, name: &[u8], keys: &[K]) -> Result<()> {
        self.run(|tx| {
            let forward = codec::forward_bucket(name);
            let reverse = codec::reverse_bucket(name);

            for key in keys.iter().map(AsRef::as_ref) {
                let Some(old) = tx.bucket(&reverse).and_then(|b| b.get(key)).map(<[u8]>::to_vec) else {
                    continue;
                };
                if let Some(mut fwd) = tx.bucket_mut(&forward)? {
                    fwd.delete(&old)?;
                }
                if let Some(mut rev) = tx.bucket_mut(&reverse)? {
                    rev.delete(key)?;
                }
            }
            Ok(())
        })
    }

    /// Drop both buckets of the index
    ///
    /// Stops at the first failure; the forward bucket may already be gone
    /// when the reverse one fails.
    pub fn sort_delete_bucket(&mut self, name: &[u8]) -> Result<()> {
        self.run(|tx| {
            tx.delete_bucket(&codec::forward_bucket(name))?;
            tx.delete_bucket(&codec::reverse_bucket(name))
        })
    }

    /// Up to `limit` `(primary_key, value)` pairs with a sort key greater than
    /// `sort_key`, ascending (0 = no limit)
    ///
    /// An empty `sort_key` starts at the first entry. Every entry that shares
    /// `sort_key` exactly is excluded, not just one primary key.
    pub fn sort_next(&mut self, name: &[u8], sort_key: &[u8], limit: usize) -> Vec<KvPair> {
        self.run(|tx| {
            check_scan_key(sort_key)?;
            let forward = codec::forward_bucket(name);
            let Some(b) = resolve(tx, &forward)? else {
                return Ok(Vec::new());
            };

            let mut cursor = b.cursor();
            let mut item = if sort_key.is_empty() {
                cursor.first()
            } else {
                let mut item = cursor.seek(sort_key);
                while matches!(item, Some((k, _)) if codec::sort_key_of(k) == Some(sort_key)) {
                    item = cursor.next();
                }
                item
            };

            let mut out = Vec::new();
            while let Some((k, v)) = item {
                let Some(primary) = codec::primary_key_of(k) else {
                    break;
                };
                out.push((primary.to_vec(), v.to_vec()));
                if limit > 0 && out.len() >= limit {
                    break;
                }
                item = cursor.next();
            }
            Ok(out)
        })
        .unwrap_or_default()
    }

    /// Up to `limit` `(primary_key, value)` pairs with a sort key less than
    /// `sort_key`, descending (0 = no limit)
    ///
    /// An empty `sort_key` starts at the last entry. When no entry sorts at or
    /// after `sort_key` the result is empty.
    pub fn sort_prev(&mut self, name: &[u8], sort_key: &[u8], limit: usize) -> Vec<KvPair> {
        self.run(|tx| {
            check_scan_key(sort_key)?;
            let forward = codec::forward_bucket(name);
            let Some(b) = resolve(tx, &forward)? else {
                return Ok(Vec::new());
            };

            let mut cursor = b.cursor();
            let mut item = if sort_key.is_empty() {
                cursor.last()
            } else {
                // leading bytes of any key found by the seek are ≥ sort_key
                cursor.seek(sort_key).and_then(|_| cursor.prev())
            };

            let mut out = Vec::new();
            while let Some((k, v)) = item {
                let Some(primary) = codec::primary_key_of(k) else {
                    break;
                };
                out.push((primary.to_vec(), v.to_vec()));
                if limit > 0 && out.len() >= limit {
                    break;
                }
                item = cursor.prev();
            }
            Ok(out)
        })
        .unwrap_or_default()
    }
}

fn check_sort_key(sort_key: &[u8]) -> Result<()> {
    if sort_key.len() != SORT_KEY_LEN {
        return Err(KvError::InvalidArgument(format!(
            "sort key must be {} bytes, got {}",
            SORT_KEY_LEN,
            sort_key.len()
        )));
    }
    Ok(())
}

/// Scans also accept an empty sort key
fn check_scan_key(sort_key: &[u8]) -> Result<()> {
    if sort_key.is_empty() {
        Ok(())
    } else {
        check_sort_key(sort_key)
    }
}
