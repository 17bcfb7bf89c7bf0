//! Snapshot Builder
//!
//! Streams buckets into a new snapshot file.

use std::fs::{File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use crate::error::{KvError, Result};
use crate::memtable::BucketData;

use super::{Snapshot, MAGIC, VERSION};

/// Builder for creating a snapshot file
pub struct SnapshotBuilder {
    path: PathBuf,
    writer: BufWriter<File>,
    lsn: u64,
    bucket_count: u64,
    entry_count: u64,
    hasher: crc32fast::Hasher,
}

impl SnapshotBuilder {
    /// Create the file and write its header
    pub fn new(path: &Path, lsn: u64) -> Result<Self> {
        let file = OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(true)
            .open(path)?;

        let mut writer = BufWriter::new(file);
        writer.write_all(MAGIC)?;
        writer.write_all(&VERSION.to_le_bytes())?;
        writer.write_all(&lsn.to_le_bytes())?;

        let mut hasher = crc32fast::Hasher::new();
        hasher.update(&lsn.to_le_bytes());

        Ok(Self {
            path: path.to_path_buf(),
            writer,
            lsn,
            bucket_count: 0,
            entry_count: 0,
            hasher,
        })
    }

    /// Write one bucket block
    pub fn add_bucket(&mut self, name: &[u8], data: &BucketData) -> Result<()> {
        self.write(&len_u32(name.len())?.to_le_bytes())?;
        self.write(&data.sequence().to_le_bytes())?;
        self.write(&(data.len() as u64).to_le_bytes())?;
        self.write(name)?;

        for (key, value) in data.iter() {
            self.write(&len_u32(key.len())?.to_le_bytes())?;
            self.write(&len_u32(value.len())?.to_le_bytes())?;
            self.write(key)?;
            self.write(value)?;
        }

        self.bucket_count += 1;
        self.entry_count += data.len() as u64;
        Ok(())
    }

    /// Write the footer and sync the file
    pub fn finish(mut self) -> Result<Snapshot> {
        let count_bytes = self.bucket_count.to_le_bytes();
        self.hasher.update(&count_bytes);
        let crc = self.hasher.finalize();

        self.writer.write_all(&count_bytes)?;
        self.writer.write_all(&crc.to_le_bytes())?;
        self.writer.write_all(&[0u8; 4])?;
        self.writer.flush()?;

        let file = self.writer.into_inner().map_err(|e| {
            KvError::Storage(format!("Failed to flush snapshot: {}", e))
        })?;
        file.sync_all()?;
        let file_size = file.metadata()?.len();

        Ok(Snapshot {
            path: self.path,
            lsn: self.lsn,
            bucket_count: self.bucket_count,
            entry_count: self.entry_count,
            file_size,
        })
    }

    fn write(&mut self, bytes: &[u8]) -> Result<()> {
        self.writer.write_all(bytes)?;
        self.hasher.update(bytes);
        Ok(())
    }
}

fn len_u32(len: usize) -> Result<u32> {
    u32::try_from(len).map_err(|_| KvError::Storage(format!("field too large for snapshot: {} bytes", len)))
}
