//! Storage Module
//!
//! Checkpoint snapshots of the whole bucket tree.
//!
//! ## Responsibilities
//! - Persist every bucket once the WAL grows past its threshold
//! - Load the newest intact snapshot on open
//! - Remove superseded snapshots
//!
//! ## File Format (V1)
//! ```text
//! ┌────────────────────────────────────────┐
//! │ Header                                 │
//! │ ┌──────────┬──────────┬──────────────┐ │
//! │ │Magic (4) │Version(2)│   LSN (8)    │ │
//! │ └──────────┴──────────┴──────────────┘ │
//! ├────────────────────────────────────────┤
//! │ Bucket Block (repeated)                │
//! │ ┌────────┬────────┬────────┬───────┐  │
//! │ │NameLen │Sequence│ Count  │ Name  │  │
//! │ └────────┴────────┴────────┴───────┘  │
//! │   [KeyLen][ValLen][Key][Value] × Count │
//! ├────────────────────────────────────────┤
//! │ Footer                                 │
//! │ ┌──────────────┬──────────┬─────────┐ │
//! │ │BucketCount(8)│ CRC32 (4)│ Pad (4) │ │
//! │ └──────────────┴──────────┴─────────┘ │
//! └────────────────────────────────────────┘
//! ```

mod snapshot;
mod manager;

pub use snapshot::{Snapshot, SnapshotBuilder, SnapshotReader};
pub use manager::StorageManager;
