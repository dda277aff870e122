//! v003: sysTimeseriesBase, sysTimeseriesDelta.

use rusqlite::Connection;

use ledger_core::errors::LedgerResult;

use crate::to_storage_err;

pub fn migrate(conn: &Connection) -> LedgerResult<()> {
    tracing::debug!("v003: creating sysTimeseriesBase, sysTimeseriesDelta");
    conn.execute_batch(
        "
        CREATE TABLE IF NOT EXISTS sysTimeseriesBase (
            id           TEXT PRIMARY KEY,
            tableName    TEXT NOT NULL,
            entityId     TEXT NOT NULL,
            propertyName TEXT NOT NULL,
            value        TEXT NOT NULL,
            startTime    TEXT NOT NULL
        );

        CREATE INDEX IF NOT EXISTS idx_timeseries_base_triple
            ON sysTimeseriesBase(tableName, entityId, propertyName);

        CREATE TABLE IF NOT EXISTS sysTimeseriesDelta (
            id               TEXT PRIMARY KEY,
            baseId           TEXT NOT NULL REFERENCES sysTimeseriesBase(id),
            compressedDeltas BLOB NOT NULL,
            lastTimestamp    INTEGER NOT NULL,
            version          INTEGER NOT NULL
        );

        CREATE INDEX IF NOT EXISTS idx_timeseries_delta_base
            ON sysTimeseriesDelta(baseId);
        ",
    )
    .map_err(|e| to_storage_err(e.to_string()))?;
    Ok(())
}
