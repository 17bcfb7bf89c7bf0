//! Error types for SortKV
//!
//! Provides a unified error type for all operations.

use std::sync::Arc;

use thiserror::Error;

/// Result type alias using KvError
pub type Result<T> = std::result::Result<T, KvError>;

/// Unified error type for SortKV operations
///
/// Cloneable: a transaction keeps its own copy of the sticky failure
#[derive(Debug, Clone, Error)]
pub enum KvError {
    // -------------------------------------------------------------------------
    // Lookup Errors
    // -------------------------------------------------------------------------
    #[error("record not found")]
    RecordNotFound,

    #[error("bucket not found: {0}")]
    BucketNotFound(String),

    // -------------------------------------------------------------------------
    // Caller Errors
    // -------------------------------------------------------------------------
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    #[error("transaction not writable")]
    NotWritable,

    #[error("transaction not initialized")]
    TxUninitialized,

    // -------------------------------------------------------------------------
    // I/O Errors
    // -------------------------------------------------------------------------
    #[error("IO error: {0}")]
    Io(Arc<std::io::Error>),

    #[error("timed out after {0} ms waiting for store lock")]
    Timeout(u64),

    // -------------------------------------------------------------------------
    // Durability Errors
    // -------------------------------------------------------------------------
    #[error("WAL corruption detected: {0}")]
    WalCorruption(String),

    #[error("snapshot corruption detected: {0}")]
    SnapshotCorruption(String),

    #[error("Serialization error: {0}")]
    Serialization(String),

    // -------------------------------------------------------------------------
    // Storage Errors
    // -------------------------------------------------------------------------
    #[error("Storage error: {0}")]
    Storage(String),

    // -------------------------------------------------------------------------
    // Configuration Errors
    // -------------------------------------------------------------------------
    #[error("Configuration error: {0}")]
    Config(String),
}

impl From<std::io::Error> for KvError {
    fn from(err: std::io::Error) -> Self {
        KvError::Io(Arc::new(err))
    }
}

impl From<bincode::Error> for KvError {
    fn from(err: bincode::Error) -> Self {
        KvError::Serialization(err.to_string())
    }
}

/// A candidate passed to [`Tx::signal`](crate::Tx::signal)
#[derive(Debug, Clone)]
pub enum ErrorSignal {
    /// Clears the sticky error
    Clear,

    /// Records a failure as the sticky error
    Fail(KvError),
}

impl From<KvError> for ErrorSignal {
    fn from(err: KvError) -> Self {
        ErrorSignal::Fail(err)
    }
}
