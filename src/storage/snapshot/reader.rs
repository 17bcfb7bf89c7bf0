//! Snapshot Reader
//!
//! Loads a snapshot file back into a MemTable.

use std::fs;
use std::path::Path;

use crate::error::{KvError, Result};
use crate::memtable::{BucketData, MemTable};

use super::{FOOTER_SIZE, HEADER_SIZE, MAGIC, VERSION};

/// Reader for snapshot files
pub struct SnapshotReader;

impl SnapshotReader {
    /// Read and verify a snapshot, returning its LSN and contents
    pub fn open(path: &Path) -> Result<(u64, MemTable)> {
        let bytes = fs::read(path)?;
        if bytes.len() < HEADER_SIZE + FOOTER_SIZE {
            return Err(corrupt(path, "file shorter than header and footer"));
        }

        if &bytes[0..4] != MAGIC {
            return Err(corrupt(path, "bad magic"));
        }
        let version = u16::from_le_bytes([bytes[4], bytes[5]]);
        if version != VERSION {
            return Err(KvError::SnapshotCorruption(format!(
                "{}: unsupported version {}",
                path.display(),
                version
            )));
        }

        let footer_start = bytes.len() - FOOTER_SIZE;
        let footer = &bytes[footer_start..];
        let bucket_count = le_u64(&footer[0..8]);
        let stored_crc = le_u32(&footer[8..12]);

        // lsn ‖ bucket blocks ‖ bucket count
        let mut hasher = crc32fast::Hasher::new();
        hasher.update(&bytes[6..footer_start]);
        hasher.update(&footer[0..8]);
        if hasher.finalize() != stored_crc {
            return Err(corrupt(path, "CRC mismatch"));
        }

        let lsn = le_u64(&bytes[6..14]);
        let mut body = Slicer::new(&bytes[HEADER_SIZE..footer_start]);
        let mut table = MemTable::new();

        for _ in 0..bucket_count {
            let name_len = body.u32().ok_or_else(|| corrupt(path, "truncated bucket header"))?;
            let sequence = body.u64().ok_or_else(|| corrupt(path, "truncated bucket header"))?;
            let count = body.u64().ok_or_else(|| corrupt(path, "truncated bucket header"))?;
            let name = body
                .take(name_len as usize)
                .ok_or_else(|| corrupt(path, "truncated bucket name"))?
                .to_vec();

            let mut data = BucketData {
                sequence,
                ..BucketData::default()
            };
            for _ in 0..count {
                let key_len = body.u32().ok_or_else(|| corrupt(path, "truncated record"))?;
                let val_len = body.u32().ok_or_else(|| corrupt(path, "truncated record"))?;
                let key = body.take(key_len as usize).ok_or_else(|| corrupt(path, "truncated key"))?;
                let value = body.take(val_len as usize).ok_or_else(|| corrupt(path, "truncated value"))?;
                data.entries.insert(key.to_vec(), value.to_vec());
            }
            table.insert_bucket(name, data);
        }

        if !body.is_empty() {
            return Err(corrupt(path, "trailing bytes after last bucket"));
        }

        Ok((lsn, table))
    }
}

fn corrupt(path: &Path, reason: &str) -> KvError {
    KvError::SnapshotCorruption(format!("{}: {}", path.display(), reason))
}

fn le_u64(b: &[u8]) -> u64 {
    let mut raw = [0u8; 8];
    raw.copy_from_slice(&b[..8]);
    u64::from_le_bytes(raw)
}

fn le_u32(b: &[u8]) -> u32 {
    let mut raw = [0u8; 4];
    raw.copy_from_slice(&b[..4]);
    u32::from_le_bytes(raw)
}

/// Forward-only reader over a byte slice
struct Slicer<'a> {
    rest: &'a [u8],
}

impl<'a> Slicer<'a> {
    fn new(bytes: &'a [u8]) -> Self {
        Self { rest: bytes }
    }

    fn take(&mut self, n: usize) -> Option<&'a [u8]> {
        if self.rest.len() < n {
            return None;
        }
        let (head, tail) = self.rest.split_at(n);
        self.rest = tail;
        Some(head)
    }

    fn u32(&mut self) -> Option<u32> {
        self.take(4).map(le_u32)
    }

    fn u64(&mut self) -> Option<u64> {
        self.take(8).map(le_u64)
    }

    fn is_empty(&self) -> bool {
        self.rest.is_empty()
    }
}
