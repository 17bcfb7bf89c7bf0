//! Per-bucket sequence counters

use crate::error::Result;
use super::bucket::resolve;
use super::Tx;

impl<'db> Tx<'db> {
    /// Current counter of `bucket` (0 if absent)
    ///
    /// Creates the bucket on a writable transaction.
    pub fn sequence(&mut self, bucket: &[u8]) -> u64 {
        self.run(|tx| Ok(resolve(tx, bucket)?.map_or(0, |b| b.sequence())))
            .unwrap_or(0)
    }

    /// Increment the counter of `bucket` and return it; the first call yields 1
    pub fn next_sequence(&mut self, bucket: &[u8]) -> Result<u64> {
        self.run(|tx| tx.create_bucket_if_absent(bucket)?.next_sequence())
    }
}
