//! v001: sysChangeLog.

use rusqlite::Connection;

use ledger_core::errors::LedgerResult;

use crate::to_storage_err;

pub fn migrate(conn: &Connection) -> LedgerResult<()> {
    tracing::debug!("v001: creating sysChangeLog");
    conn.execute_batch(
        "
        CREATE TABLE IF NOT EXISTS sysChangeLog (
            id           TEXT PRIMARY KEY,
            tableName    TEXT NOT NULL,
            entityId     TEXT NOT NULL,
            propertyName TEXT NOT NULL,
            changedBy    TEXT NOT NULL,
            changedAt    TEXT NOT NULL,
            oldValue     TEXT,
            newValue     TEXT,
            changeType   TEXT NOT NULL
        );

        CREATE INDEX IF NOT EXISTS idx_change_log_triple
            ON sysChangeLog(tableName, entityId, propertyName);
        ",
    )
    .map_err(|e| to_storage_err(e.to_string()))?;
    Ok(())
}
