//! v004: sysEmbedding.

use rusqlite::Connection;

use ledger_core::errors::LedgerResult;

use crate::to_storage_err;

pub fn migrate(conn: &Connection) -> LedgerResult<()> {
    tracing::debug!("v004: creating sysEmbedding");
    conn.execute_batch(
        "
        CREATE TABLE IF NOT EXISTS sysEmbedding (
            id        TEXT PRIMARY KEY,
            tableName TEXT NOT NULL,
            entityId  TEXT NOT NULL,
            vector    BLOB NOT NULL
        );

        CREATE UNIQUE INDEX IF NOT EXISTS idx_embedding_entity
            ON sysEmbedding(tableName, entityId);
        ",
    )
    .map_err(|e| to_storage_err(e.to_string()))?;
    Ok(())
}
