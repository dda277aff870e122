//! PRAGMA configuration applied to every SQLite connection.

use rusqlite::Connection;

use ledger_core::errors::LedgerResult;

use crate::to_storage_err;

/// Pragmas for the single writer connection.
pub fn apply_write_pragmas(conn: &Connection) -> LedgerResult<()> {
    conn.execute_batch(
        "
        PRAGMA journal_mode = WAL;
        PRAGMA synchronous = NORMAL;
        PRAGMA busy_timeout = 5000;
        PRAGMA foreign_keys = ON;
        ",
    )
    .map_err(|e| to_storage_err(e.to_string()))?;
    Ok(())
}

/// Pragmas for read-pool connections: read-only workloads don't need WAL
/// checkpointing tuned, but they do need the same busy timeout.
pub fn apply_read_pragmas(conn: &Connection) -> LedgerResult<()> {
    conn.execute_batch(
        "
        PRAGMA busy_timeout = 5000;
        PRAGMA foreign_keys = ON;
        ",
    )
    .map_err(|e| to_storage_err(e.to_string()))?;
    Ok(())
}
