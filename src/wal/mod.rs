//! Write-Ahead Log (WAL) Module
//!
//! Provides durability for committed writable transactions.
//!
//! ## Responsibilities
//! - Append one entry per committed transaction before it becomes visible
//! - CRC32 checksums for corruption detection
//! - Log Sequence Numbers (LSN) for ordering against snapshots
//! - Crash recovery and replay
//!
//! ## Frame Layout
//! ```text
//! ┌──────────┬──────────┬──────────┬──────────────────────────┐
//! │ LSN (8)  │ CRC (4)  │ Len (4)  │ bincode(ops, timestamp)  │  × entries
//! └──────────┴──────────┴──────────┴──────────────────────────┘
//! ```
//!
//! Data is the bincode encoding of the transaction's operation list. The CRC
//! covers the LSN bytes and the data, so an entry is applied whole or not at all.

mod entry;
mod writer;
mod reader;
mod recovery;

pub use entry::{WalEntry, Operation, HEADER_SIZE};
pub use writer::WalWriter;
pub use reader::WalReader;
pub use recovery::{WalRecovery, RecoveryResult};
