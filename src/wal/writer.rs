//! WAL Writer
//!
//! Handles appending entries to the WAL file.

use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::Path;

use crate::config::WalSyncStrategy;
use crate::error::Result;
use super::{Operation, WalEntry, WalRecovery};

/// Writes entries to the WAL file
pub struct WalWriter {
    file: File,
    /// LSN the next append will receive
    current_lsn: u64,
    sync_strategy: WalSyncStrategy,
    /// Entries written since the last fsync
    uncommitted: usize,
    /// Entries currently held in the file
    entry_count: usize,
}

impl WalWriter {
    /// Open or create a WAL file, continuing after its last valid LSN
    pub fn open(path: &Path, sync_strategy: WalSyncStrategy) -> Result<Self> {
        let (next_lsn, entry_count) = if path.exists() {
            let result = WalRecovery::verify(path)?;
            (result.last_lsn + 1, result.entries_recovered as usize)
        } else {
            (1, 0)
        };
        let mut writer = Self::open_with_lsn(path, sync_strategy, next_lsn)?;
        writer.entry_count = entry_count;
        Ok(writer)
    }

    /// Open or create a WAL file whose next entry gets `next_lsn`
    pub fn open_with_lsn(path: &Path, sync_strategy: WalSyncStrategy, next_lsn: u64) -> Result<Self> {
        let file = OpenOptions::new().create(true).append(true).open(path)?;
        Ok(Self {
            file,
            current_lsn: next_lsn.max(1),
            sync_strategy,
            uncommitted: 0,
            entry_count: 0,
        })
    }

    /// Append one transaction's operations, returning the assigned LSN
    ///
    /// On any failure, including a failed fsync, the frame is cut off again
    /// and the LSN is not consumed.
    pub fn append(&mut self, operations: Vec<Operation>) -> Result<u64> {
        let lsn = self.current_lsn;
        let bytes = WalEntry::new(lsn, operations).serialize()?;
        let start = self.file.metadata()?.len();
        if let Err(e) = self.file.write_all(&bytes) {
            self.discard_from(start);
            return Err(e.into());
        }

        let due = match self.sync_strategy {
            WalSyncStrategy::EveryWrite => true,
            WalSyncStrategy::EveryNEntries { count } => self.uncommitted + 1 >= count,
        };
        if due {
            if let Err(e) = self.file.sync_data() {
                self.discard_from(start);
                return Err(e.into());
            }
            self.uncommitted = 0;
        } else {
            self.uncommitted += 1;
        }

        self.current_lsn += 1;
        self.entry_count += 1;
        Ok(lsn)
    }

    /// Cut the file back to `len` after a failed append
    fn discard_from(&mut self, len: u64) {
        if let Err(e) = self.file.set_len(len) {
            tracing::warn!(len, error = %e, "failed to cut partial WAL frame");
        }
    }

    /// Force sync to disk
    pub fn sync(&mut self) -> Result<()> {
        self.file.sync_data()?;
        self.uncommitted = 0;
        Ok(())
    }

    /// Drop every entry; LSNs keep counting from where they were
    pub fn truncate(&mut self) -> Result<()> {
        self.file.set_len(0)?;
        self.file.sync_all()?;
        self.uncommitted = 0;
        self.entry_count = 0;
        Ok(())
    }

    /// Get the LSN the next append will receive
    pub fn current_lsn(&self) -> u64 {
        self.current_lsn
    }

    /// Entries appended since the last fsync
    pub fn uncommitted_count(&self) -> usize {
        self.uncommitted
    }

    /// Entries currently in the file
    pub fn entry_count(&self) -> usize {
        self.entry_count
    }
}
