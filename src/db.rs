//! Database handle
//!
//! Opens a store and hands out transactions.

use std::path::Path;

use crate::config::Config;
use crate::engine::Engine;
use crate::error::Result;
use crate::tx::Tx;

/// An open store
pub struct Db {
    engine: Engine,
}

impl Db {
    /// Open or create the store described by `config`
    pub fn open(config: Config) -> Result<Self> {
        Ok(Self::new(Engine::open(config)?))
    }

    /// Open or create a store at `path` with default settings
    pub fn open_path(path: impl AsRef<Path>) -> Result<Self> {
        Ok(Self::new(Engine::open_path(path.as_ref())?))
    }

    /// Wrap an engine that is already open
    pub fn new(engine: Engine) -> Self {
        Self { engine }
    }

    /// Begin a read-only or writable transaction
    ///
    /// Never fails directly: if the engine cannot begin, the returned
    /// transaction carries that failure as its sticky error.
    pub fn begin(&self, writable: bool) -> Tx<'_> {
        match self.engine.begin(writable) {
            Ok(inner) => Tx::new(inner),
            Err(e) => {
                tracing::warn!(writable, error = %e, "failed to begin transaction");
                Tx::failed(e)
            }
        }
    }

    /// The underlying engine
    pub fn engine(&self) -> &Engine {
        &self.engine
    }

    /// Close the store, checkpointing pending WAL entries
    pub fn close(self) -> Result<()> {
        self.engine.close()
    }
}
