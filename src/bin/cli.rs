//! SortKV CLI
//!
//! Command-line interface for inspecting and editing a SortKV store.

use std::process::ExitCode;

use clap::{Parser, Subcommand};
use sortkv::{codec, Config, Db, KvPair};
use tracing_subscriber::{fmt, EnvFilter};

/// SortKV CLI
#[derive(Parser, Debug)]
#[command(name = "sortkv-cli")]
#[command(about = "CLI for the SortKV bucket store")]
#[command(version)]
struct Args {
    /// Store directory
    #[arg(short, long, default_value = "./sortkv_data")]
    path: String,

    /// Seconds to wait for the store lock
    #[arg(long, default_value = "3")]
    timeout: u64,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Get values by key
    Get {
        bucket: String,
        #[arg(required = true)]
        keys: Vec<String>,
    },

    /// Set a key-value pair
    Put {
        bucket: String,
        key: String,
        value: String,
    },

    /// Delete keys
    Del {
        bucket: String,
        #[arg(required = true)]
        keys: Vec<String>,
    },

    /// List records after (or before, with --reverse) a key
    Scan {
        bucket: String,
        /// Exclusive start key (empty = from the edge)
        #[arg(long, default_value = "")]
        from: String,
        /// Maximum records (0 = all)
        #[arg(long, default_value = "0")]
        limit: usize,
        #[arg(long)]
        reverse: bool,
    },

    /// Increment and print a bucket's sequence
    Seq { bucket: String },

    /// Index a record under a numeric sort key
    SortPut {
        index: String,
        sort_key: u64,
        key: String,
        value: String,
    },

    /// Remove records from a sorted index
    SortDel {
        index: String,
        #[arg(required = true)]
        keys: Vec<String>,
    },

    /// List a sorted index after (or before, with --reverse) a sort key
    SortScan {
        index: String,
        /// Exclusive sort key bound
        #[arg(long)]
        from: Option<u64>,
        /// Maximum records (0 = all)
        #[arg(long, default_value = "0")]
        limit: usize,
        #[arg(long)]
        reverse: bool,
    },
}

fn main() -> ExitCode {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    fmt().with_env_filter(filter).with_target(true).init();

    let args = Args::parse();
    match run(args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {}", e);
            ExitCode::FAILURE
        }
    }
}

fn run(args: Args) -> sortkv::Result<()> {
    let config = Config::builder()
        .path(&args.path)
        .open_timeout(std::time::Duration::from_secs(args.timeout))
        .build();
    let db = Db::open(config)?;

    match args.command {
        Commands::Get { bucket, keys } => {
            let mut tx = db.begin(false);
            print_pairs(&tx.get(bucket.as_bytes(), &keys));
            finish_read(tx)?;
        }
        Commands::Put { bucket, key, value } => {
            let mut tx = db.begin(true);
            tx.put(bucket.as_bytes(), &[key, value])?;
            tx.commit()?;
        }
        Commands::Del { bucket, keys } => {
            let mut tx = db.begin(true);
            tx.delete(bucket.as_bytes(), &keys)?;
            tx.commit()?;
        }
        Commands::Scan {
            bucket,
            from,
            limit,
            reverse,
        } => {
            let mut tx = db.begin(false);
            let pairs = if reverse {
                tx.prev(bucket.as_bytes(), from.as_bytes(), limit)
            } else {
                tx.next(bucket.as_bytes(), from.as_bytes(), limit)
            };
            print_pairs(&pairs);
            finish_read(tx)?;
        }
        Commands::Seq { bucket } => {
            let mut tx = db.begin(true);
            let seq = tx.next_sequence(bucket.as_bytes())?;
            tx.commit()?;
            println!("{}", seq);
        }
        Commands::SortPut {
            index,
            sort_key,
            key,
            value,
        } => {
            let mut tx = db.begin(true);
            tx.sort_put(index.as_bytes(), &codec::u64_to_bytes(sort_key), &[key, value])?;
            tx.commit()?;
        }
        Commands::SortDel { index, keys } => {
            let mut tx = db.begin(true);
            tx.sort_delete(index.as_bytes(), &keys)?;
            tx.commit()?;
        }
        Commands::SortScan {
            index,
            from,
            limit,
            reverse,
        } => {
            let bound = from.map(codec::u64_to_bytes).unwrap_or_default();
            let mut tx = db.begin(false);
            let pairs = if reverse {
                tx.sort_prev(index.as_bytes(), &bound, limit)
            } else {
                tx.sort_next(index.as_bytes(), &bound, limit)
            };
            print_pairs(&pairs);
            finish_read(tx)?;
        }
    }

    db.close()
}

/// Surface a sticky read error, then release the snapshot
fn finish_read(tx: sortkv::Tx<'_>) -> sortkv::Result<()> {
    if let Some(err) = tx.error() {
        return Err(err.clone());
    }
    tx.rollback()
}

fn print_pairs(pairs: &[KvPair]) {
    for (key, value) in pairs {
        println!(
            "{}\t{}",
            String::from_utf8_lossy(key),
            String::from_utf8_lossy(value)
        );
    }
}
