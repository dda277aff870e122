//! `StorageEngine`: opens the connection pool, runs migrations, and exposes
//! the read/write entry points the write pipeline and query layer build on.

use std::path::Path;

use rusqlite::{Connection, Transaction};

use ledger_core::errors::LedgerResult;

use crate::pool::ConnectionPool;
use crate::to_storage_err;

pub struct StorageEngine {
    pool: ConnectionPool,
}

impl StorageEngine {
    pub fn open(path: &Path, read_pool_size: usize) -> LedgerResult<Self> {
        let pool = ConnectionPool::open(path, read_pool_size)?;
        let engine = Self { pool };
        engine.initialize()?;
        Ok(engine)
    }

    pub fn open_in_memory() -> LedgerResult<Self> {
        let pool = ConnectionPool::open_in_memory()?;
        let engine = Self { pool };
        engine.initialize()?;
        Ok(engine)
    }

    fn initialize(&self) -> LedgerResult<()> {
        tracing::info!("initializing storage engine");
        self.pool.writer.with_conn(|conn| crate::migrations::run_migrations(conn))
    }

    /// Runs `f` inside a single writer transaction, committing on success and
    /// rolling back (via drop) on error or cancellation. Every pipeline
    /// operation that touches more than one bookkeeping table goes through
    /// this so a failure midway leaves the store exactly as it was (spec.md
    /// S6, cancellation before commit).
    pub fn with_write_tx<F, T>(&self, f: F) -> LedgerResult<T>
    where
        F: FnOnce(&Transaction<'_>) -> LedgerResult<T>,
    {
        self.pool.writer.with_conn(|conn| {
            tracing::debug!("beginning write transaction");
            let tx = conn.transaction().map_err(|e| to_storage_err(e.to_string()))?;
            let result = f(&tx);
            let result = match result {
                Ok(value) => value,
                Err(err) => {
                    tracing::warn!(error = %err, "write transaction failed, rolling back");
                    return Err(err);
                }
            };
            tx.commit().map_err(|e| to_storage_err(e.to_string()))?;
            tracing::debug!("write transaction committed");
            Ok(result)
        })
    }

    /// Runs `f` against a read-only connection when a file-backed pool has
    /// one available, otherwise against the writer (in-memory mode).
    pub fn with_read<F, T>(&self, f: F) -> LedgerResult<T>
    where
        F: FnOnce(&Connection) -> LedgerResult<T>,
    {
        match &self.pool.readers {
            Some(readers) => readers.with_conn(f),
            None => self.pool.writer.with_conn(|conn| f(conn)),
        }
    }
}
