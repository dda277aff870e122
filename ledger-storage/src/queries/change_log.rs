use rusqlite::{params, Connection};

use ledger_core::{ChangeLogRecord, ChangeOp};
use ledger_core::errors::LedgerResult;

use crate::to_storage_err;

pub fn insert(conn: &Connection, record: &ChangeLogRecord) -> LedgerResult<()> {
    conn.execute(
        "INSERT INTO sysChangeLog
            (id, tableName, entityId, propertyName, changedBy, changedAt, oldValue, newValue, changeType)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
        params![
            record.id,
            record.table_name,
            record.entity_id,
            record.property_name,
            record.changed_by,
            record.changed_at,
            record.old_value,
            record.new_value,
            record.op.as_str(),
        ],
    )
    .map_err(|e| to_storage_err(e.to_string()))?;
    Ok(())
}

pub fn for_entity(
    conn: &Connection,
    table_name: &str,
    entity_id: &str,
) -> LedgerResult<Vec<ChangeLogRecord>> {
    let mut stmt = conn
        .prepare(
            "SELECT id, tableName, entityId, propertyName, changedBy, changedAt, oldValue, newValue, changeType
             FROM sysChangeLog
             WHERE tableName = ?1 AND entityId = ?2
             ORDER BY changedAt ASC",
        )
        .map_err(|e| to_storage_err(e.to_string()))?;

    let rows = stmt
        .query_map(params![table_name, entity_id], row_to_record)
        .map_err(|e| to_storage_err(e.to_string()))?;

    rows.collect::<Result<Vec<_>, _>>().map_err(|e| to_storage_err(e.to_string()))
}

fn row_to_record(row: &rusqlite::Row<'_>) -> rusqlite::Result<ChangeLogRecord> {
    let op_str: String = row.get(8)?;
    let op = match op_str.as_str() {
        "insert" => ChangeOp::Insert,
        "update" => ChangeOp::Update,
        _ => ChangeOp::Delete,
    };
    Ok(ChangeLogRecord {
        id: row.get(0)?,
        table_name: row.get(1)?,
        entity_id: row.get(2)?,
        property_name: row.get(3)?,
        changed_by: row.get(4)?,
        changed_at: row.get(5)?,
        old_value: row.get(6)?,
        new_value: row.get(7)?,
        op,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::StorageEngine;
    use chrono::Utc;

    fn record(id: &str, property_name: &str) -> ChangeLogRecord {
        ChangeLogRecord {
            id: id.to_string(),
            table_name: "sensors".to_string(),
            entity_id: "s1".to_string(),
            property_name: property_name.to_string(),
            changed_by: "system".to_string(),
            changed_at: Utc::now(),
            old_value: Some("1".to_string()),
            new_value: Some("2".to_string()),
            op: ChangeOp::Update,
        }
    }

    #[test]
    fn for_entity_returns_only_matching_rows() {
        let engine = StorageEngine::open_in_memory().unwrap();
        engine
            .with_write_tx(|tx| {
                insert(tx, &record("r1", "temperature"))?;
                insert(tx, &record("r2", "humidity"))?;
                let mut other = record("r3", "temperature");
                other.entity_id = "s2".to_string();
                insert(tx, &other)
            })
            .unwrap();

        let rows = engine.with_read(|conn| for_entity(conn, "sensors", "s1")).unwrap();
        assert_eq!(rows.len(), 2);
        assert!(rows.iter().all(|r| r.entity_id == "s1"));
    }
}
