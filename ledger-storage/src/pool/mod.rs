//! Connection pool: a single writer plus a small reader pool.

pub mod pragmas;
pub mod read_pool;
pub mod write_connection;

use std::path::{Path, PathBuf};

use ledger_core::errors::LedgerResult;

pub use read_pool::ReadPool;
pub use write_connection::WriteConnection;

pub struct ConnectionPool {
    pub writer: WriteConnection,
    pub readers: Option<ReadPool>,
    pub db_path: Option<PathBuf>,
}

impl ConnectionPool {
    pub fn open(path: &Path, read_pool_size: usize) -> LedgerResult<Self> {
        let writer = WriteConnection::open(path)?;
        let readers = ReadPool::open(path, read_pool_size)?;
        Ok(Self { writer, readers: Some(readers), db_path: Some(path.to_path_buf()) })
    }

    /// In-memory pools route every read through the writer: in-memory
    /// reader connections would each be an isolated, empty database.
    pub fn open_in_memory() -> LedgerResult<Self> {
        let writer = WriteConnection::open_in_memory()?;
        Ok(Self { writer, readers: None, db_path: None })
    }
}
