//! MemTable Module
//!
//! In-memory image of every bucket in the store.
//!
//! ## Responsibilities
//! - Hold the committed state readers snapshot from
//! - Give a writable transaction a private copy it can mutate
//! - Replay WAL operations during recovery
//! - Ordered iteration for cursors and snapshot creation
//!
//! ## Data Structure Choice
//! BTreeMap of bucket name → `Arc<BucketData>`:
//! - Ordered keys (required for cursors and snapshots)
//! - Cloning the table clones only the `Arc`s, a bucket is copied the first
//!   time a writer touches it (`Arc::make_mut`)

mod table;
mod cursor;

pub use table::{BucketData, MemTable};
pub use cursor::Cursor;
