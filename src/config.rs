//! Configuration for SortKV
//!
//! Centralized configuration with sensible defaults.

use std::path::PathBuf;
use std::time::Duration;

use crate::error::{KvError, Result};

/// Main configuration for a SortKV store
#[derive(Debug, Clone)]
pub struct Config {
    // -------------------------------------------------------------------------
    // Storage Configuration
    // -------------------------------------------------------------------------
    /// Root directory for all store files
    /// Internal structure:
    ///   {path}/
    ///     ├── LOCK                         (exclusive open lock)
    ///     ├── wal.log                      (write-ahead log)
    ///     └── snapshot_{lsn}.snap          (latest checkpoint)
    pub path: PathBuf,

    /// Maximum time to wait for the store lock on open
    pub open_timeout: Duration,

    // -------------------------------------------------------------------------
    // WAL Configuration
    // -------------------------------------------------------------------------
    /// Sync strategy: how often to fsync WAL
    pub wal_sync_strategy: WalSyncStrategy,

    /// Committed transactions kept in the WAL before it is folded into a snapshot
    pub checkpoint_threshold: usize,
}

/// WAL sync strategy
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WalSyncStrategy {
    /// fsync after every write (safest, slowest)
    EveryWrite,

    /// fsync after N uncommitted entries (balanced durability/performance)
    EveryNEntries { count: usize },
}

impl Default for Config {
    fn default() -> Self {
        Self {
            path: PathBuf::from("./sortkv_data"),
            open_timeout: Duration::from_secs(3),
            wal_sync_strategy: WalSyncStrategy::EveryWrite,
            checkpoint_threshold: 1024,
        }
    }
}

impl Config {
    /// Create a new config builder
    pub fn builder() -> ConfigBuilder {
        ConfigBuilder::default()
    }

    /// Reject settings the engine cannot run with
    pub fn validate(&self) -> Result<()> {
        if self.checkpoint_threshold == 0 {
            return Err(KvError::Config(
                "checkpoint_threshold must be at least 1".to_string(),
            ));
        }
        if let WalSyncStrategy::EveryNEntries { count: 0 } = self.wal_sync_strategy {
            return Err(KvError::Config(
                "EveryNEntries sync count must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

/// Builder for Config
#[derive(Default)]
pub struct ConfigBuilder {
    config: Config,
}

impl ConfigBuilder {
    /// Set the store directory
    pub fn path(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.path = path.into();
        self
    }

    /// Set how long `open` waits for the store lock
    pub fn open_timeout(mut self, timeout: Duration) -> Self {
        self.config.open_timeout = timeout;
        self
    }

    /// Set the WAL sync strategy
    pub fn wal_sync_strategy(mut self, strategy: WalSyncStrategy) -> Self {
        self.config.wal_sync_strategy = strategy;
        self
    }

    /// Set the number of WAL entries that triggers a checkpoint
    pub fn checkpoint_threshold(mut self, entries: usize) -> Self {
        self.config.checkpoint_threshold = entries;
        self
    }

    pub fn build(self) -> Config {
        self.config
    }
}
