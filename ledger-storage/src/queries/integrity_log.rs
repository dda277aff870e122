use rusqlite::{params, Connection};

use ledger_core::IntegrityLogRecord;
use ledger_core::errors::LedgerResult;

use crate::to_storage_err;

pub fn insert(conn: &Connection, record: &IntegrityLogRecord) -> LedgerResult<()> {
    conn.execute(
        "INSERT INTO sysIntegrityLog
            (id, tableName, entityId, propertyName, hash, previousHash, timestamp)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
        params![
            record.id,
            record.table_name,
            record.entity_id,
            record.property_name,
            record.hash,
            record.previous_hash,
            record.timestamp,
        ],
    )
    .map_err(|e| to_storage_err(e.to_string()))?;
    Ok(())
}

/// The chain's current tip for a (table, entity, property): the hash of the
/// most recently written record, or `None` when no record exists yet.
pub fn latest_hash(
    conn: &Connection,
    table_name: &str,
    entity_id: &str,
    property_name: &str,
) -> LedgerResult<Option<String>> {
    conn.query_row(
        "SELECT hash FROM sysIntegrityLog
         WHERE tableName = ?1 AND entityId = ?2 AND propertyName = ?3
         ORDER BY timestamp DESC LIMIT 1",
        params![table_name, entity_id, property_name],
        |row| row.get(0),
    )
    .optional_result()
}

pub fn chain_for(
    conn: &Connection,
    table_name: &str,
    entity_id: &str,
    property_name: &str,
) -> LedgerResult<Vec<IntegrityLogRecord>> {
    let mut stmt = conn
        .prepare(
            "SELECT id, tableName, entityId, propertyName, hash, previousHash, timestamp
             FROM sysIntegrityLog
             WHERE tableName = ?1 AND entityId = ?2 AND propertyName = ?3
             ORDER BY timestamp ASC",
        )
        .map_err(|e| to_storage_err(e.to_string()))?;

    let rows = stmt
        .query_map(params![table_name, entity_id, property_name], row_to_record)
        .map_err(|e| to_storage_err(e.to_string()))?;

    rows.collect::<Result<Vec<_>, _>>().map_err(|e| to_storage_err(e.to_string()))
}

fn row_to_record(row: &rusqlite::Row<'_>) -> rusqlite::Result<IntegrityLogRecord> {
    Ok(IntegrityLogRecord {
        id: row.get(0)?,
        table_name: row.get(1)?,
        entity_id: row.get(2)?,
        property_name: row.get(3)?,
        hash: row.get(4)?,
        previous_hash: row.get(5)?,
        timestamp: row.get(6)?,
    })
}

/// Small extension trait turning `rusqlite`'s `QueryReturnedNoRows` into a
/// plain `Option` instead of a `LedgerError`.
trait OptionalResult<T> {
    fn optional_result(self) -> LedgerResult<Option<T>>;
}

impl<T> OptionalResult<T> for rusqlite::Result<T> {
    fn optional_result(self) -> LedgerResult<Option<T>> {
        match self {
            Ok(v) => Ok(Some(v)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(to_storage_err(e.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::StorageEngine;
    use chrono::Utc;

    fn record(id: &str, hash: &str, previous_hash: &str) -> IntegrityLogRecord {
        IntegrityLogRecord {
            id: id.to_string(),
            table_name: "sensors".to_string(),
            entity_id: "s1".to_string(),
            property_name: "temperature".to_string(),
            hash: hash.to_string(),
            previous_hash: previous_hash.to_string(),
            timestamp: Utc::now(),
        }
    }

    #[test]
    fn latest_hash_is_none_before_any_write() {
        let engine = StorageEngine::open_in_memory().unwrap();
        let found = engine
            .with_read(|conn| latest_hash(conn, "sensors", "s1", "temperature"))
            .unwrap();
        assert!(found.is_none());
    }

    #[test]
    fn latest_hash_tracks_the_chain_tip() {
        let engine = StorageEngine::open_in_memory().unwrap();
        engine
            .with_write_tx(|tx| {
                insert(tx, &record("r1", "h1", ""))?;
                insert(tx, &record("r2", "h2", "h1"))
            })
            .unwrap();

        let tip = engine
            .with_read(|conn| latest_hash(conn, "sensors", "s1", "temperature"))
            .unwrap();
        assert_eq!(tip, Some("h2".to_string()));
    }

    #[test]
    fn chain_for_returns_records_in_timestamp_order() {
        let engine = StorageEngine::open_in_memory().unwrap();
        engine
            .with_write_tx(|tx| {
                insert(tx, &record("r1", "h1", ""))?;
                insert(tx, &record("r2", "h2", "h1"))
            })
            .unwrap();

        let chain = engine
            .with_read(|conn| chain_for(conn, "sensors", "s1", "temperature"))
            .unwrap();
        assert_eq!(chain.len(), 2);
        assert_eq!(chain[0].hash, "h1");
        assert_eq!(chain[1].previous_hash, "h1");
    }
}
