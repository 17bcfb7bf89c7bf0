//! Engine Module
//!
//! The storage engine beneath the transaction layer.
//!
//! ## Responsibilities
//! - Hold the exclusive store lock for as long as the engine is open
//! - Coordinate WAL, MemTable and snapshots
//! - Hand out read-only snapshots and the single writable transaction
//! - Manage crash recovery on startup

use std::fs::{self, File, OpenOptions, TryLockError};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use parking_lot::{Mutex, MutexGuard, RwLock};

use crate::config::Config;
use crate::error::{KvError, Result};
use crate::memtable::{BucketData, Cursor, MemTable};
use crate::storage::StorageManager;
use crate::wal::{Operation, WalRecovery, WalWriter};

/// The main storage engine
///
/// ## Concurrency Model: Single-Writer / Multiple-Reader (SWMR)
///
/// - **Writable transactions**: serialized by `writer`
///   - `begin(true)` blocks until the previous writer commits or rolls back
///   - The writer mutates a private copy of the table and publishes it on commit
///
/// - **Read-only transactions**: never block
///   - Each holds the `Arc<MemTable>` that was committed when it began
///   - Later commits do not change what an open reader sees
pub struct Engine {
    /// Engine configuration
    config: Config,

    /// Last committed state
    committed: RwLock<Arc<MemTable>>,

    /// Held by the open writable transaction
    writer: Mutex<()>,

    /// Write-ahead log for durability
    wal: Mutex<WalWriter>,

    /// Snapshot files
    storage: StorageManager,

    /// OS lock on `LOCK`, released when the file is dropped
    _lock: File,
}

impl Engine {
    // =========================================================================
    // Internal Path Constants
    // =========================================================================
    const WAL_FILENAME: &'static str = "wal.log";
    const LOCK_FILENAME: &'static str = "LOCK";
    const LOCK_RETRY_INTERVAL: Duration = Duration::from_millis(20);

    /// Open or create an engine with the given config
    ///
    /// On startup:
    /// 1. Create the store directory
    /// 2. Take the store lock, waiting at most `open_timeout`
    /// 3. Load the newest snapshot, failing if it does not verify
    /// 4. Replay newer WAL entries and fold them into a fresh snapshot; a WAL
    ///    that starts past the snapshot is `SnapshotCorruption`
    pub fn open(config: Config) -> Result<Self> {
        config.validate()?;
        fs::create_dir_all(&config.path)?;

        let lock = Self::acquire_lock(&config.path.join(Self::LOCK_FILENAME), config.open_timeout)?;

        let (storage, mut table) = StorageManager::open(&config.path)?;
        let snapshot_lsn = storage.snapshot_lsn();
        let wal_path = config.path.join(Self::WAL_FILENAME);

        let mut last_lsn = snapshot_lsn;
        let mut wal_entries = 0;
        let mut replayed = 0u64;
        if wal_path.exists() {
            let (entries, recovery) = WalRecovery::recover(&wal_path)?;
            wal_entries = entries.len();
            if let Some(first) = entries.first() {
                if first.lsn > snapshot_lsn + 1 {
                    return Err(KvError::SnapshotCorruption(format!(
                        "WAL starts at lsn {} but the snapshot only reaches lsn {}",
                        first.lsn, snapshot_lsn
                    )));
                }
            }
            for entry in entries {
                if entry.lsn <= snapshot_lsn {
                    continue;
                }
                for op in &entry.operations {
                    table.apply(op);
                }
                last_lsn = entry.lsn;
                replayed += 1;
            }

            if recovery.entries_recovered > 0 || recovery.entries_corrupted > 0 {
                tracing::info!(
                    recovered = recovery.entries_recovered,
                    corrupted = recovery.entries_corrupted,
                    replayed,
                    last_lsn = recovery.last_lsn,
                    "WAL recovery"
                );
            }
        }

        // Recovered data goes into a snapshot straight away so the WAL can start empty
        if replayed > 0 {
            storage.checkpoint(&table, last_lsn)?;
        }
        let mut wal = WalWriter::open_with_lsn(&wal_path, config.wal_sync_strategy, last_lsn + 1)?;
        if wal_entries > 0 {
            wal.truncate()?;
        }

        tracing::info!(
            path = %config.path.display(),
            buckets = table.bucket_count(),
            next_lsn = wal.current_lsn(),
            "engine opened"
        );

        Ok(Self {
            config,
            committed: RwLock::new(Arc::new(table)),
            writer: Mutex::new(()),
            wal: Mutex::new(wal),
            storage,
            _lock: lock,
        })
    }

    /// Open with a path (convenience method)
    ///
    /// Uses default config with the specified store directory
    pub fn open_path(path: &Path) -> Result<Self> {
        Self::open(Config::builder().path(path).build())
    }

    /// Begin a transaction
    ///
    /// A writable begin blocks while another writable transaction is open.
    pub fn begin(&self, writable: bool) -> Result<EngineTx<'_>> {
        let writer = if writable {
            Some(self.writer.lock())
        } else {
            None
        };
        let table = Arc::clone(&self.committed.read());
        tracing::trace!(writable, "transaction begin");
        Ok(EngineTx {
            engine: self,
            table,
            writer,
            log: Vec::new(),
        })
    }

    /// Fold the WAL into a snapshot now
    pub fn checkpoint(&self) -> Result<()> {
        let _writer = self.writer.lock();
        let mut wal = self.wal.lock();
        self.checkpoint_locked(&mut wal)
    }

    /// Close the engine gracefully
    ///
    /// Checkpoints any WAL entries and releases the store lock
    pub fn close(self) -> Result<()> {
        {
            let _writer = self.writer.lock();
            let mut wal = self.wal.lock();
            if wal.entry_count() > 0 {
                self.checkpoint_locked(&mut wal)?;
            }
            wal.sync()?;
        }
        tracing::info!(path = %self.config.path.display(), "engine closed");
        Ok(())
    }

    // =========================================================================
    // Accessors (for testing and debugging)
    // =========================================================================

    /// Get the store directory path
    pub fn path(&self) -> &Path {
        &self.config.path
    }

    /// Get the configuration
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Entries in the WAL not yet folded into a snapshot
    pub fn wal_entry_count(&self) -> usize {
        self.wal.lock().entry_count()
    }

    /// LSN covered by the newest snapshot
    pub fn snapshot_lsn(&self) -> u64 {
        self.storage.snapshot_lsn()
    }

    /// Path of the WAL file
    pub fn wal_path(&self) -> PathBuf {
        self.config.path.join(Self::WAL_FILENAME)
    }

    // =========================================================================
    // Private Helpers
    // =========================================================================

    fn acquire_lock(path: &Path, timeout: Duration) -> Result<File> {
        let file = OpenOptions::new()
            .create(true)
            .read(true)
            .write(true)
            .truncate(false)
            .open(path)?;

        let deadline = Instant::now() + timeout;
        loop {
            match file.try_lock() {
                Ok(()) => return Ok(file),
                Err(TryLockError::WouldBlock) => {
                    if Instant::now() >= deadline {
                        tracing::warn!(path = %path.display(), "store is locked by another handle");
                        return Err(KvError::Timeout(timeout.as_millis() as u64));
                    }
                    thread::sleep(Self::LOCK_RETRY_INTERVAL);
                }
                Err(TryLockError::Error(e)) => return Err(e.into()),
            }
        }
    }

    /// Caller holds the writer lock
    fn checkpoint_locked(&self, wal: &mut WalWriter) -> Result<()> {
        let table = Arc::clone(&self.committed.read());
        let lsn = wal.current_lsn() - 1;
        if lsn > self.storage.snapshot_lsn() {
            self.storage.checkpoint(&table, lsn)?;
        }
        wal.truncate()
    }

    /// Make a writer's changes durable and visible (writer lock held)
    fn publish(&self, table: Arc<MemTable>, log: Vec<Operation>) -> Result<()> {
        let mut wal = self.wal.lock();
        let ops = log.len();
        let lsn = wal.append(log)?;
        *self.committed.write() = table;
        tracing::debug!(lsn, ops, "transaction committed");

        if wal.entry_count() >= self.config.checkpoint_threshold {
            // The commit is already durable in the WAL; a failed checkpoint only delays truncation
            if let Err(e) = self.checkpoint_locked(&mut wal) {
                tracing::warn!(error = %e, "checkpoint after commit failed");
            }
        }
        Ok(())
    }
}

/// A transaction on the engine
///
/// Dropping it without `commit` discards every change.
pub struct EngineTx<'e> {
    engine: &'e Engine,
    table: Arc<MemTable>,
    /// `Some` for the writable transaction
    writer: Option<MutexGuard<'e, ()>>,
    /// Changes made so far, in order
    log: Vec<Operation>,
}

impl<'e> EngineTx<'e> {
    /// Whether this transaction may write
    pub fn writable(&self) -> bool {
        self.writer.is_some()
    }

    /// Look up a bucket
    pub fn bucket(&self, name: &[u8]) -> Option<&BucketData> {
        self.table.bucket(name)
    }

    /// Mutable handle to an existing bucket
    ///
    /// `Ok(None)` when the bucket is absent, `NotWritable` on a read-only
    /// transaction whose bucket exists.
    pub fn bucket_mut(&mut self, name: &[u8]) -> Result<Option<BucketMut<'_>>> {
        if self.table.bucket(name).is_none() {
            return Ok(None);
        }
        self.ensure_writable()?;
        let table = Arc::make_mut(&mut self.table);
        Ok(table.bucket_mut(name).map(|data| BucketMut {
            name: name.to_vec(),
            data,
            log: &mut self.log,
        }))
    }

    /// Create the bucket if absent and return it
    pub fn create_bucket_if_absent(&mut self, name: &[u8]) -> Result<BucketMut<'_>> {
        self.ensure_writable()?;
        if name.is_empty() {
            return Err(KvError::InvalidArgument("bucket name required".to_string()));
        }

        let table = Arc::make_mut(&mut self.table);
        if table.create_bucket(name) {
            self.log.push(Operation::CreateBucket {
                bucket: name.to_vec(),
            });
        }
        let data = table
            .bucket_mut(name)
            .ok_or_else(|| KvError::Storage("bucket vanished after creation".to_string()))?;
        Ok(BucketMut {
            name: name.to_vec(),
            data,
            log: &mut self.log,
        })
    }

    /// Delete a bucket and all of its records
    pub fn delete_bucket(&mut self, name: &[u8]) -> Result<()> {
        self.ensure_writable()?;
        if !Arc::make_mut(&mut self.table).remove_bucket(name) {
            return Err(KvError::BucketNotFound(String::from_utf8_lossy(name).into_owned()));
        }
        self.log.push(Operation::DeleteBucket {
            bucket: name.to_vec(),
        });
        Ok(())
    }

    /// Commit the transaction
    ///
    /// Read-only transactions cannot be committed (`NotWritable`).
    pub fn commit(self) -> Result<()> {
        self.ensure_writable()?;
        if self.log.is_empty() {
            tracing::trace!("empty transaction committed");
            return Ok(());
        }
        let EngineTx {
            engine,
            table,
            writer,
            log,
        } = self;
        let result = engine.publish(table, log);
        drop(writer);
        result
    }

    /// Discard the transaction
    pub fn rollback(self) -> Result<()> {
        tracing::trace!(
            writable = self.writable(),
            discarded = self.log.len(),
            "transaction rolled back"
        );
        Ok(())
    }

    /// Whether this transaction still shares the committed table
    #[cfg(test)]
    pub(crate) fn shares_committed(&self) -> bool {
        Arc::ptr_eq(&self.table, &self.engine.committed.read())
    }

    fn ensure_writable(&self) -> Result<()> {
        if self.writable() {
            Ok(())
        } else {
            Err(KvError::NotWritable)
        }
    }
}

/// A mutable view of a bucket inside a writable transaction
pub struct BucketMut<'t> {
    name: Vec<u8>,
    data: &'t mut BucketData,
    log: &'t mut Vec<Operation>,
}

impl BucketMut<'_> {
    /// Returns the bucket name
    pub fn name(&self) -> &[u8] {
        &self.name
    }

    /// Get a value by key
    pub fn get(&self, key: &[u8]) -> Option<&[u8]> {
        self.data.get(key)
    }

    /// Insert or overwrite a record
    pub fn put(&mut self, key: &[u8], value: &[u8]) -> Result<()> {
        if key.is_empty() {
            return Err(KvError::InvalidArgument("key required".to_string()));
        }
        self.data.entries.insert(key.to_vec(), value.to_vec());
        self.log.push(Operation::Put {
            bucket: self.name.clone(),
            key: key.to_vec(),
            value: value.to_vec(),
        });
        Ok(())
    }

    /// Remove a record; a missing key is not an error
    pub fn delete(&mut self, key: &[u8]) -> Result<()> {
        if self.data.entries.remove(key).is_some() {
            self.log.push(Operation::Delete {
                bucket: self.name.clone(),
                key: key.to_vec(),
            });
        }
        Ok(())
    }

    /// Current sequence value
    pub fn sequence(&self) -> u64 {
        self.data.sequence
    }

    /// Increment the sequence and return the new value
    pub fn next_sequence(&mut self) -> Result<u64> {
        let next = self
            .data
            .sequence
            .checked_add(1)
            .ok_or_else(|| KvError::Storage("sequence overflow".to_string()))?;
        self.set_sequence(next);
        Ok(next)
    }

    /// Overwrite the sequence
    pub fn set_sequence(&mut self, sequence: u64) {
        self.data.sequence = sequence;
        self.log.push(Operation::SetSequence {
            bucket: self.name.clone(),
            sequence,
        });
    }

    /// Cursor over the bucket's current contents
    pub fn cursor(&self) -> Cursor<'_> {
        self.data.cursor()
    }
}
