//! Bucket resolution

use crate::engine::EngineTx;
use crate::error::Result;
use crate::memtable::BucketData;

/// Resolve a bucket for reading
///
/// A writable transaction creates the bucket if absent. A read-only one only
/// looks it up, and `None` means "no records", never an error.
pub(super) fn resolve<'t>(tx: &'t mut EngineTx<'_>, name: &[u8]) -> Result<Option<&'t BucketData>> {
    if tx.writable() && tx.bucket(name).is_none() {
        tx.create_bucket_if_absent(name)?;
    }
    Ok(tx.bucket(name))
}
