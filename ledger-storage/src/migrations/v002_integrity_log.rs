//! v002: sysIntegrityLog.

use rusqlite::Connection;

use ledger_core::errors::LedgerResult;

use crate::to_storage_err;

pub fn migrate(conn: &Connection) -> LedgerResult<()> {
    tracing::debug!("v002: creating sysIntegrityLog");
    conn.execute_batch(
        "
        CREATE TABLE IF NOT EXISTS sysIntegrityLog (
            id           TEXT PRIMARY KEY,
            tableName    TEXT NOT NULL,
            entityId     TEXT NOT NULL,
            propertyName TEXT NOT NULL,
            hash         TEXT NOT NULL,
            previousHash TEXT NOT NULL,
            timestamp    TEXT NOT NULL
        );

        CREATE INDEX IF NOT EXISTS idx_integrity_log_triple
            ON sysIntegrityLog(tableName, entityId, propertyName);
        ",
    )
    .map_err(|e| to_storage_err(e.to_string()))?;
    Ok(())
}
