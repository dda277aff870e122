//! The single writer connection. SQLite allows only one writer at a time;
//! serialising through a mutex here means the pipeline itself never needs
//! to hold a cross-operation lock (spec.md §5).

use std::path::Path;
use std::sync::Mutex;

use rusqlite::Connection;

use ledger_core::errors::LedgerResult;

use super::pragmas::apply_write_pragmas;
use crate::to_storage_err;

pub struct WriteConnection {
    conn: Mutex<Connection>,
}

impl WriteConnection {
    pub fn open(path: &Path) -> LedgerResult<Self> {
        let conn = Connection::open(path).map_err(|e| to_storage_err(e.to_string()))?;
        apply_write_pragmas(&conn)?;
        Ok(Self { conn: Mutex::new(conn) })
    }

    pub fn open_in_memory() -> LedgerResult<Self> {
        let conn = Connection::open_in_memory().map_err(|e| to_storage_err(e.to_string()))?;
        apply_write_pragmas(&conn)?;
        Ok(Self { conn: Mutex::new(conn) })
    }

    /// Run a closure against the writer connection, holding the lock for
    /// its duration. Callers open their own `rusqlite` transaction inside
    /// `f` when the operation needs atomicity across bookkeeping tables.
    pub fn with_conn<F, T>(&self, f: F) -> LedgerResult<T>
    where
        F: FnOnce(&mut Connection) -> LedgerResult<T>,
    {
        let mut guard = self
            .conn
            .lock()
            .map_err(|e| to_storage_err(format!("writer lock poisoned: {e}")))?;
        f(&mut guard)
    }
}
