//! Storage Manager
//!
//! Owns the snapshot files in the store directory.
//!
//! ## Responsibilities
//! - Discover existing snapshots on startup
//! - Load the newest one, refusing to open if it fails verification
//! - Write new snapshots atomically (temp file + rename)
//! - Remove snapshots a newer one supersedes

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};

use crate::error::Result;
use crate::memtable::MemTable;

use super::{Snapshot, SnapshotBuilder, SnapshotReader};

/// Manages the snapshot layer
pub struct StorageManager {
    /// Directory where snapshots are stored
    data_dir: PathBuf,

    /// LSN of the newest snapshot on disk (0 if none)
    snapshot_lsn: AtomicU64,
}

impl StorageManager {
    /// Open the directory and load the newest snapshot
    ///
    /// Returns the manager together with the loaded table; an empty table and
    /// LSN 0 when no snapshot exists. A newest snapshot that fails
    /// verification is `SnapshotCorruption` and stays on disk untouched:
    /// older snapshots cannot stand in for it.
    pub fn open(path: &Path) -> Result<(Self, MemTable)> {
        fs::create_dir_all(path)?;

        let newest = Self::discover(path)?.into_iter().max();
        let (lsn, table) = match newest {
            Some(lsn) => {
                let snapshot_path = Self::snapshot_path_with_dir(path, lsn);
                SnapshotReader::open(&snapshot_path).inspect_err(|e| {
                    tracing::error!(
                        path = %snapshot_path.display(),
                        error = %e,
                        "newest snapshot failed verification"
                    );
                })?
            }
            None => (0, MemTable::new()),
        };
        if lsn > 0 {
            tracing::info!(
                lsn,
                buckets = table.bucket_count(),
                records = table.entry_count(),
                "loaded snapshot"
            );
        }

        Ok((
            Self {
                data_dir: path.to_path_buf(),
                snapshot_lsn: AtomicU64::new(lsn),
            },
            table,
        ))
    }

    /// Write `table` as the snapshot for `lsn` and remove older snapshots
    pub fn checkpoint(&self, table: &MemTable, lsn: u64) -> Result<Snapshot> {
        let final_path = self.snapshot_path(lsn);
        let tmp_path = final_path.with_extension("snap.tmp");

        let mut builder = SnapshotBuilder::new(&tmp_path, lsn)?;
        for (name, data) in table.buckets() {
            builder.add_bucket(name, data)?;
        }
        let mut snapshot = builder.finish()?;

        fs::rename(&tmp_path, &final_path)?;
        // Make the rename itself durable
        fs::File::open(&self.data_dir)?.sync_all()?;
        snapshot.path = final_path;

        let previous = self.snapshot_lsn.swap(lsn, Ordering::SeqCst);
        for old in Self::discover(&self.data_dir)? {
            if old < lsn {
                let old_path = self.snapshot_path(old);
                if let Err(e) = fs::remove_file(&old_path) {
                    tracing::warn!(path = %old_path.display(), error = %e, "failed to remove old snapshot");
                }
            }
        }

        tracing::info!(
            lsn,
            previous,
            buckets = snapshot.bucket_count,
            records = snapshot.entry_count,
            bytes = snapshot.file_size,
            "checkpoint written"
        );
        Ok(snapshot)
    }

    /// LSN of the newest snapshot (0 if none)
    pub fn snapshot_lsn(&self) -> u64 {
        self.snapshot_lsn.load(Ordering::SeqCst)
    }

    /// Number of snapshot files currently on disk
    pub fn snapshot_count(&self) -> Result<usize> {
        Ok(Self::discover(&self.data_dir)?.len())
    }

    /// Get the data directory path
    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    // =========================================================================
    // Private Helpers
    // =========================================================================

    fn discover(dir: &Path) -> Result<Vec<u64>> {
        let mut lsns = Vec::new();
        for entry in fs::read_dir(dir)? {
            let file_path = entry?.path();
            if file_path.is_file() {
                if let Some(lsn) = Self::parse_snapshot_lsn(&file_path) {
                    lsns.push(lsn);
                }
            }
        }
        Ok(lsns)
    }

    fn snapshot_path(&self, lsn: u64) -> PathBuf {
        Self::snapshot_path_with_dir(&self.data_dir, lsn)
    }

    fn snapshot_path_with_dir(dir: &Path, lsn: u64) -> PathBuf {
        dir.join(format!("snapshot_{:020}.snap", lsn))
    }

    /// "snapshot_00000000000000000042.snap" → Some(42)
    fn parse_snapshot_lsn(path: &Path) -> Option<u64> {
        if path.extension()? != "snap" {
            return None;
        }
        let name = path.file_stem()?.to_string_lossy();
        let lsn_str = name.strip_prefix("snapshot_")?;
        lsn_str.parse().ok()
    }
}
