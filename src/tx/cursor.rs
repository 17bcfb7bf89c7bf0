//! Bounded cursor pagination

use super::bucket::resolve;
use super::{KvPair, Tx};

impl<'db> Tx<'db> {
    /// Up to `limit` records after `start` in ascending order (0 = no limit)
    ///
    /// An empty `start` begins at the first record. Otherwise the walk begins
    /// at the first key ≥ `start`, skipping `start` itself.
    pub fn next(&mut self, bucket: &[u8], start: &[u8], limit: usize) -> Vec<KvPair> {
        self.run(|tx| {
            let Some(b) = resolve(tx, bucket)? else {
                return Ok(Vec::new());
            };
            let mut cursor = b.cursor();
            let mut item = if start.is_empty() {
                cursor.first()
            } else {
                match cursor.seek(start) {
                    Some((key, _)) if key == start => cursor.next(),
                    found => found,
                }
            };

            let mut out = Vec::new();
            while let Some((key, value)) = item {
                out.push((key.to_vec(), value.to_vec()));
                if limit > 0 && out.len() >= limit {
                    break;
                }
                item = cursor.next();
            }
            Ok(out)
        })
        .unwrap_or_default()
    }

    /// Up to `limit` records before `start` in descending order (0 = no limit)
    ///
    /// An empty `start` begins at the last record. Otherwise the walk begins
    /// at the greatest key < `start`. When no key is ≥ `start` the seek has
    /// nothing to step back from and the result is empty.
    pub fn prev(&mut self, bucket: &[u8], start: &[u8], limit: usize) -> Vec<KvPair> {
        self.run(|tx| {
            let Some(b) = resolve(tx, bucket)? else {
                return Ok(Vec::new());
            };
            let mut cursor = b.cursor();
            let mut item = if start.is_empty() {
                cursor.last()
            } else {
                cursor.seek(start).and_then(|_| cursor.prev())
            };

            let mut out = Vec::new();
            while let Some((key, value)) = item {
                out.push((key.to_vec(), value.to_vec()));
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
