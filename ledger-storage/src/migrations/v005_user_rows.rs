//! v005: the generic user-row table backing `Repository<T>`.
//!
//! This is deliberately not a `sys*` table: it stands in for the
//! transactional key-value-of-rows store that spec.md treats as an
//! external collaborator. Kept minimal — one JSON blob per (table, id) —
//! since typed user-table persistence is out of this crate's scope.

use rusqlite::Connection;

use ledger_core::errors::LedgerResult;

use crate::to_storage_err;

pub fn migrate(conn: &Connection) -> LedgerResult<()> {
    tracing::debug!("v005: creating user_rows");
    conn.execute_batch(
        "
        CREATE TABLE IF NOT EXISTS user_rows (
            tableName TEXT NOT NULL,
            entityId  TEXT NOT NULL,
            data      TEXT NOT NULL,
            PRIMARY KEY (tableName, entityId)
        );
        ",
    )
    .map_err(|e| to_storage_err(e.to_string()))?;
    Ok(())
}
