use rusqlite::{params, Connection};

use ledger_core::errors::LedgerResult;
use ledger_core::{TimeseriesBase, TimeseriesDelta};

use crate::to_storage_err;

pub fn insert_base(conn: &Connection, base: &TimeseriesBase) -> LedgerResult<()> {
    conn.execute(
        "INSERT INTO sysTimeseriesBase (id, tableName, entityId, propertyName, value, startTime)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
        params![
            base.id,
            base.table_name,
            base.entity_id,
            base.property_name,
            base.value,
            base.start_time,
        ],
    )
    .map_err(|e| to_storage_err(e.to_string()))?;
    Ok(())
}

pub fn insert_delta(conn: &Connection, delta: &TimeseriesDelta) -> LedgerResult<()> {
    conn.execute(
        "INSERT INTO sysTimeseriesDelta (id, baseId, compressedDeltas, lastTimestamp, version)
         VALUES (?1, ?2, ?3, ?4, ?5)",
        params![delta.id, delta.base_id, delta.compressed_deltas, delta.last_timestamp, delta.version],
    )
    .map_err(|e| to_storage_err(e.to_string()))?;
    Ok(())
}

/// Overwrites the delta chain in place: the append path mutates one
/// `sysTimeseriesDelta` row per base rather than ever inserting a second one.
pub fn replace_delta(conn: &Connection, delta: &TimeseriesDelta) -> LedgerResult<()> {
    conn.execute(
        "UPDATE sysTimeseriesDelta
         SET compressedDeltas = ?1, lastTimestamp = ?2, version = ?3
         WHERE id = ?4",
        params![delta.compressed_deltas, delta.last_timestamp, delta.version, delta.id],
    )
    .map_err(|e| to_storage_err(e.to_string()))?;
    Ok(())
}

/// The currently open base (and its delta chain) for a (table, entity,
/// property): the one with the latest `startTime`. Appends extend this pair;
/// a changed value starts a new one.
pub fn latest_base_and_delta(
    conn: &Connection,
    table_name: &str,
    entity_id: &str,
    property_name: &str,
) -> LedgerResult<Option<(TimeseriesBase, TimeseriesDelta)>> {
    let result = conn.query_row(
        "SELECT b.id, b.tableName, b.entityId, b.propertyName, b.value, b.startTime,
                d.id, d.baseId, d.compressedDeltas, d.lastTimestamp, d.version
         FROM sysTimeseriesBase b
         JOIN sysTimeseriesDelta d ON d.baseId = b.id
         WHERE b.tableName = ?1 AND b.entityId = ?2 AND b.propertyName = ?3
         ORDER BY b.startTime DESC LIMIT 1",
        params![table_name, entity_id, property_name],
        row_to_pair,
    );
    match result {
        Ok(pair) => Ok(Some(pair)),
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
        Err(e) => Err(to_storage_err(e.to_string())),
    }
}

/// Every (base, delta) pair for a (table, entity, property), oldest first —
/// the full history needed to flatten and interpolate a range query.
pub fn all_bases_and_deltas(
    conn: &Connection,
    table_name: &str,
    entity_id: &str,
    property_name: &str,
) -> LedgerResult<Vec<(TimeseriesBase, TimeseriesDelta)>> {
    let mut stmt = conn
        .prepare(
            "SELECT b.id, b.tableName, b.entityId, b.propertyName, b.value, b.startTime,
                    d.id, d.baseId, d.compressedDeltas, d.lastTimestamp, d.version
             FROM sysTimeseriesBase b
             JOIN sysTimeseriesDelta d ON d.baseId = b.id
             WHERE b.tableName = ?1 AND b.entityId = ?2 AND b.propertyName = ?3
             ORDER BY b.startTime ASC",
        )
        .map_err(|e| to_storage_err(e.to_string()))?;

    let rows = stmt
        .query_map(params![table_name, entity_id, property_name], row_to_pair)
        .map_err(|e| to_storage_err(e.to_string()))?;

    rows.collect::<Result<Vec<_>, _>>().map_err(|e| to_storage_err(e.to_string()))
}

fn row_to_pair(row: &rusqlite::Row<'_>) -> rusqlite::Result<(TimeseriesBase, TimeseriesDelta)> {
    let base = TimeseriesBase {
        id: row.get(0)?,
        table_name: row.get(1)?,
        entity_id: row.get(2)?,
        property_name: row.get(3)?,
        value: row.get(4)?,
        start_time: row.get(5)?,
    };
    let delta = TimeseriesDelta {
        id: row.get(6)?,
        base_id: row.get(7)?,
        compressed_deltas: row.get(8)?,
        last_timestamp: row.get(9)?,
        version: row.get(10)?,
    };
    Ok((base, delta))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::StorageEngine;
    use chrono::{Duration, Utc};

    fn base(id: &str, value: &str, start_time: chrono::DateTime<Utc>) -> TimeseriesBase {
        TimeseriesBase {
            id: id.to_string(),
            table_name: "sensors".to_string(),
            entity_id: "s1".to_string(),
            property_name: "temperature".to_string(),
            value: value.to_string(),
            start_time,
        }
    }

    fn delta(id: &str, base_id: &str) -> TimeseriesDelta {
        TimeseriesDelta {
            id: id.to_string(),
            base_id: base_id.to_string(),
            compressed_deltas: ledger_codec::encode(&[0]),
            last_timestamp: 0,
            version: 1,
        }
    }

    #[test]
    fn latest_base_and_delta_is_none_before_any_write() {
        let engine = StorageEngine::open_in_memory().unwrap();
        let found = engine
            .with_read(|conn| latest_base_and_delta(conn, "sensors", "s1", "temperature"))
            .unwrap();
        assert!(found.is_none());
    }

    #[test]
    fn latest_base_and_delta_picks_the_newest_base() {
        let engine = StorageEngine::open_in_memory().unwrap();
        let t0 = Utc::now();
        let t1 = t0 + Duration::seconds(10);

        engine
            .with_write_tx(|tx| {
                insert_base(tx, &base("b1", "70", t0))?;
                insert_delta(tx, &delta("d1", "b1"))?;
                insert_base(tx, &base("b2", "75", t1))?;
                insert_delta(tx, &delta("d2", "b2"))
            })
            .unwrap();

        let (found_base, found_delta) = engine
            .with_read(|conn| latest_base_and_delta(conn, "sensors", "s1", "temperature"))
            .unwrap()
            .unwrap();
        assert_eq!(found_base.id, "b2");
        assert_eq!(found_delta.base_id, "b2");
    }

    #[test]
    fn all_bases_and_deltas_returns_full_history_oldest_first() {
        let engine = StorageEngine::open_in_memory().unwrap();
        let t0 = Utc::now();
        let t1 = t0 + Duration::seconds(10);

        engine
            .with_write_tx(|tx| {
                insert_base(tx, &base("b2", "75", t1))?;
                insert_delta(tx, &delta("d2", "b2"))?;
                insert_base(tx, &base("b1", "70", t0))?;
                insert_delta(tx, &delta("d1", "b1"))
            })
            .unwrap();

        let history = engine
            .with_read(|conn| all_bases_and_deltas(conn, "sensors", "s1", "temperature"))
            .unwrap();
        assert_eq!(history.len(), 2);
        assert_eq!(history[0].0.id, "b1");
        assert_eq!(history[1].0.id, "b2");
    }

    #[test]
    fn replace_delta_overwrites_the_chain_in_place() {
        let engine = StorageEngine::open_in_memory().unwrap();
        let t0 = Utc::now();
        engine
            .with_write_tx(|tx| {
                insert_base(tx, &base("b1", "70", t0))?;
                insert_delta(tx, &delta("d1", "b1"))
            })
            .unwrap();

        let mut updated = delta("d1", "b1");
        updated.compressed_deltas = ledger_codec::encode(&[0, 1000]);
        updated.last_timestamp = 1000;
        updated.version = 2;
        engine.with_write_tx(|tx| replace_delta(tx, &updated)).unwrap();

        let (_, found_delta) = engine
            .with_read(|conn| latest_base_and_delta(conn, "sensors", "s1", "temperature"))
            .unwrap()
            .unwrap();
        assert_eq!(found_delta.version, 2);
        assert_eq!(found_delta.last_timestamp, 1000);
    }
}
