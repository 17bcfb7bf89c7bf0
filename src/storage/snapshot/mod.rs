//! Snapshot Module
//!
//! Immutable on-disk image of the bucket tree at one LSN.
//!
//! All integers are little-endian. The CRC covers the LSN, every bucket
//! block and the bucket count.

mod builder;
mod reader;

use std::path::PathBuf;

pub use builder::SnapshotBuilder;
pub use reader::SnapshotReader;

/// Magic bytes identifying a SortKV snapshot file
pub(crate) const MAGIC: &[u8; 4] = b"SKVS";

/// Current snapshot format version
pub(crate) const VERSION: u16 = 1;

/// Header size: Magic (4) + Version (2) + LSN (8) = 14 bytes
pub(crate) const HEADER_SIZE: usize = 14;

/// Footer size: BucketCount (8) + CRC (4) + Padding (4) = 16 bytes
pub(crate) const FOOTER_SIZE: usize = 16;

/// Summary of a written snapshot
#[derive(Debug, Clone)]
pub struct Snapshot {
    /// Path to the snapshot file
    pub path: PathBuf,
    /// Last WAL LSN folded into this snapshot
    pub lsn: u64,
    /// Number of buckets written
    pub bucket_count: u64,
    /// Number of records written across all buckets
    pub entry_count: u64,
    /// File size in bytes
    pub file_size: u64,
}
