//! # SortKV
//!
//! A transaction-scoped access layer over an ordered, durable key-value store:
//! - Named buckets with batched get/put/delete
//! - Forward/backward bounded cursor pagination
//! - Per-bucket sequence counters
//! - A sorted index: records addressed by primary key, iterated by sort key
//! - Sticky-error transactions: the first failure short-circuits the rest
//!
//! ## Architecture Overview
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                        Db / Tx                               │
//! │   records · cursor · sequence · sorted   (sticky error)      │
//! └─────────────────────┬───────────────────────────────────────┘
//!                       │
//! ┌─────────────────────▼───────────────────────────────────────┐
//! │                       Engine                                 │
//! │            (Single Writer / Multi Reader)                    │
//! └─────────────────────┬───────────────────────────────────────┘
//!                       │
//!          ┌────────────┴────────────┐
//!          │                         │
//!          ▼                         ▼
//!   ┌─────────────┐          ┌─────────────┐
//!   │     WAL     │          │  MemTable   │
//!   │  (Append)   │          │ (CoW Arcs)  │
//!   └─────────────┘          └──────┬──────┘
//!                                   │
//!                                   ▼
//!                           ┌─────────────┐
//!                           │  Snapshot   │
//!                           │ (checkpoint)│
//!                           └─────────────┘
//! ```
//!
//! ## Example
//!
//! ```no_run
//! use sortkv::{codec, Db};
//!
//! # fn main() -> sortkv::Result<()> {
//! let db = Db::open_path("./timeline")?;
//!
//! let mut tx = db.begin(true);
//! tx.sort_put(b"feed", &codec::u64_to_bytes(1_700_000_000), &["post-1", "hello"])?;
//! tx.commit()?;
//!
//! let mut tx = db.begin(false);
//! for (post, body) in tx.sort_prev(b"feed", b"", 20) {
//!     println!("{} {}", String::from_utf8_lossy(&post), String::from_utf8_lossy(&body));
//! }
//! tx.rollback()?;
//! # Ok(())
//! # }
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod config;
pub mod codec;

pub mod wal;
pub mod memtable;
pub mod storage;
pub mod engine;

pub mod db;
pub mod tx;

// =============================================================================
// Public API Re-exports
// =============================================================================

pub use error::{ErrorSignal, KvError, Result};
pub use config::{Config, WalSyncStrategy};
pub use db::Db;
pub use engine::Engine;
pub use tx::{KvPair, Tx};

// =============================================================================
// Version Info
// =============================================================================

/// Current version of SortKV
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
