//! Transactions
//!
//! [`Tx`] wraps one engine transaction together with a sticky error. Every
//! operation goes through [`Tx::run`]: once any operation fails, later ones
//! return their empty result without touching storage, and `commit` hands the
//! failure back instead of persisting anything.
//!
//! ## Operation Groups
//! - `records`: batched get/put/delete, `for_each`, `delete_bucket`
//! - `cursor`: bounded forward/backward pagination
//! - `sequence`: per-bucket counters
//! - `sorted`: the sorted index (forward + reverse bucket pair)

mod bucket;
mod cursor;
mod records;
mod sequence;
mod sorted;

use crate::engine::EngineTx;
use crate::error::{ErrorSignal, KvError, Result};

/// An owned (key, value) pair returned by reads
pub type KvPair = (Vec<u8>, Vec<u8>);

/// A transaction with a sticky error
pub struct Tx<'db> {
    /// `None` when the engine failed to begin
    inner: Option<EngineTx<'db>>,
    err: Option<KvError>,
}

impl<'db> Tx<'db> {
    pub(crate) fn new(inner: EngineTx<'db>) -> Self {
        Self {
            inner: Some(inner),
            err: None,
        }
    }

    pub(crate) fn failed(err: KvError) -> Self {
        Self {
            inner: None,
            err: Some(err),
        }
    }

    /// Whether this transaction may write (false if it never began)
    pub fn writable(&self) -> bool {
        self.inner.as_ref().is_some_and(EngineTx::writable)
    }

    /// Current sticky error
    pub fn error(&self) -> Option<&KvError> {
        self.err.as_ref()
    }

    /// Feed candidate errors to the sticky slot
    ///
    /// Candidates are scanned in order: `None` is skipped, `Clear` empties the
    /// slot and stops, `Fail` replaces the sticky error and stops. Returns the
    /// sticky error afterwards.
    pub fn signal<I>(&mut self, signals: I) -> Option<&KvError>
    where
        I: IntoIterator<Item = Option<ErrorSignal>>,
    {
        match signals.into_iter().flatten().next() {
            Some(ErrorSignal::Clear) => self.err = None,
            Some(ErrorSignal::Fail(err)) => self.err = Some(err),
            None => {}
        }
        self.err.as_ref()
    }

    /// Record `err` as the sticky error
    pub fn fail(&mut self, err: KvError) -> &KvError {
        self.err.insert(err)
    }

    /// Clear the sticky error
    pub fn clear_error(&mut self) {
        self.err = None;
    }

    /// Commit the transaction
    ///
    /// Fails with the sticky error, without touching storage, if one is set.
    pub fn commit(self) -> Result<()> {
        if let Some(err) = self.err {
            tracing::debug!(error = %err, "commit refused: transaction already failed");
            return Err(err);
        }
        match self.inner {
            Some(inner) => inner.commit(),
            None => Err(KvError::TxUninitialized),
        }
    }

    /// Roll the transaction back
    pub fn rollback(self) -> Result<()> {
        match self.inner {
            Some(inner) => inner.rollback(),
            None => Err(KvError::TxUninitialized),
        }
    }

    /// Run `op` against the engine transaction through the sticky error
    fn run<T>(&mut self, op: impl FnOnce(&mut EngineTx<'db>) -> Result<T>) -> Result<T> {
        if let Some(err) = &self.err {
            return Err(err.clone());
        }
        let result = match self.inner.as_mut() {
            Some(inner) => op(inner),
            None => Err(KvError::TxUninitialized),
        };
        if let Err(err) = &result {
            self.err = Some(err.clone());
        }
        result
    }
}

/// Batches are flat `key, value, key, value, ...` lists
fn check_pairs(len: usize) -> Result<()> {
    if len == 0 || len % 2 != 0 {
        return Err(KvError::InvalidArgument(format!(
            "key/value list must have a non-zero even length, got {}",
            len
        )));
    }
    Ok(())
}
