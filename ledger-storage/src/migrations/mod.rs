//! Numbered migrations, run in order at engine startup, guarded by
//! `PRAGMA user_version` so re-opening an existing database is a no-op.

pub mod v001_change_log;
pub mod v002_integrity_log;
pub mod v003_timeseries;
pub mod v004_embedding;
pub mod v005_user_rows;

use rusqlite::Connection;

use ledger_core::errors::LedgerResult;

use crate::to_storage_err;

const CURRENT_VERSION: i64 = 5;

pub fn run_migrations(conn: &Connection) -> LedgerResult<()> {
    let version: i64 = conn
        .query_row("PRAGMA user_version", [], |row| row.get(0))
        .map_err(|e| to_storage_err(e.to_string()))?;

    if version >= CURRENT_VERSION {
        tracing::debug!(version, "schema up to date, skipping migrations");
        return Ok(());
    }

    tracing::info!(from = version, to = CURRENT_VERSION, "running migrations");

    if version < 1 {
        v001_change_log::migrate(conn)?;
    }
    if version < 2 {
        v002_integrity_log::migrate(conn)?;
    }
    if version < 3 {
        v003_timeseries::migrate(conn)?;
    }
    if version < 4 {
        v004_embedding::migrate(conn)?;
    }
    if version < 5 {
        v005_user_rows::migrate(conn)?;
    }

    conn.pragma_update(None, "user_version", CURRENT_VERSION)
        .map_err(|e| to_storage_err(e.to_string()))?;
    tracing::info!(version = CURRENT_VERSION, "migrations complete");
    Ok(())
}
