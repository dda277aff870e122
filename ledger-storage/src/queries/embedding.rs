use rusqlite::{params, Connection};

use ledger_core::model::{bytes_to_vector, vector_to_bytes};
use ledger_core::EmbeddingRecord;
use ledger_core::errors::LedgerResult;

use crate::to_storage_err;

/// Insert or replace the embedding for (table, entity): an entity has at
/// most one stored vector, refreshed whenever its embeddable rendering
/// changes.
pub fn upsert(conn: &Connection, record: &EmbeddingRecord) -> LedgerResult<()> {
    conn.execute(
        "INSERT INTO sysEmbedding (id, tableName, entityId, vector)
         VALUES (?1, ?2, ?3, ?4)
         ON CONFLICT(tableName, entityId) DO UPDATE SET vector = excluded.vector",
        params![
            record.id,
            record.table_name,
            record.entity_id,
            vector_to_bytes(&record.vector),
        ],
    )
    .map_err(|e| to_storage_err(e.to_string()))?;
    Ok(())
}

pub fn delete(conn: &Connection, table_name: &str, entity_id: &str) -> LedgerResult<()> {
    conn.execute(
        "DELETE FROM sysEmbedding WHERE tableName = ?1 AND entityId = ?2",
        params![table_name, entity_id],
    )
    .map_err(|e| to_storage_err(e.to_string()))?;
    Ok(())
}

pub fn get(
    conn: &Connection,
    table_name: &str,
    entity_id: &str,
) -> LedgerResult<Option<EmbeddingRecord>> {
    let result = conn.query_row(
        "SELECT id, tableName, entityId, vector FROM sysEmbedding
         WHERE tableName = ?1 AND entityId = ?2",
        params![table_name, entity_id],
        row_to_record,
    );
    match result {
        Ok(record) => Ok(Some(record)),
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
        Err(e) => Err(to_storage_err(e.to_string())),
    }
}

/// Every stored embedding for one table, used to rebuild a single
/// namespace of the vector index on startup without scanning unrelated
/// tables.
pub fn for_table(conn: &Connection, table_name: &str) -> LedgerResult<Vec<EmbeddingRecord>> {
    let mut stmt = conn
        .prepare("SELECT id, tableName, entityId, vector FROM sysEmbedding WHERE tableName = ?1")
        .map_err(|e| to_storage_err(e.to_string()))?;

    let rows = stmt
        .query_map(params![table_name], row_to_record)
        .map_err(|e| to_storage_err(e.to_string()))?;

    rows.collect::<Result<Vec<_>, _>>().map_err(|e| to_storage_err(e.to_string()))
}

fn row_to_record(row: &rusqlite::Row<'_>) -> rusqlite::Result<EmbeddingRecord> {
    let bytes: Vec<u8> = row.get(3)?;
    Ok(EmbeddingRecord {
        id: row.get(0)?,
        table_name: row.get(1)?,
        entity_id: row.get(2)?,
        vector: bytes_to_vector(&bytes),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::StorageEngine;

    fn record(id: &str, entity_id: &str, vector: Vec<f32>) -> EmbeddingRecord {
        EmbeddingRecord {
            id: id.to_string(),
            table_name: "documents".to_string(),
            entity_id: entity_id.to_string(),
            vector,
        }
    }

    #[test]
    fn upsert_then_get_round_trips() {
        let engine = StorageEngine::open_in_memory().unwrap();
        let rec = record("e1", "d1", vec![0.1, 0.2, 0.3]);
        engine.with_write_tx(|tx| upsert(tx, &rec)).unwrap();

        let found = engine.with_read(|conn| get(conn, "documents", "d1")).unwrap().unwrap();
        assert_eq!(found.vector, rec.vector);
    }

    #[test]
    fn upsert_replaces_existing_vector() {
        let engine = StorageEngine::open_in_memory().unwrap();
        engine
            .with_write_tx(|tx| upsert(tx, &record("e1", "d1", vec![1.0, 0.0])))
            .unwrap();
        engine
            .with_write_tx(|tx| upsert(tx, &record("e2", "d1", vec![0.0, 1.0])))
            .unwrap();

        let found = engine.with_read(|conn| get(conn, "documents", "d1")).unwrap().unwrap();
        assert_eq!(found.vector, vec![0.0, 1.0]);
    }

    #[test]
    fn delete_removes_the_vector() {
        let engine = StorageEngine::open_in_memory().unwrap();
        engine
            .with_write_tx(|tx| upsert(tx, &record("e1", "d1", vec![1.0])))
            .unwrap();
        engine.with_write_tx(|tx| delete(tx, "documents", "d1")).unwrap();

        let found = engine.with_read(|conn| get(conn, "documents", "d1")).unwrap();
        assert!(found.is_none());
    }

    #[test]
    fn for_table_filters_by_table_name() {
        let engine = StorageEngine::open_in_memory().unwrap();
        engine
            .with_write_tx(|tx| {
                upsert(tx, &record("e1", "d1", vec![1.0]))?;
                let mut other = record("e2", "d2", vec![2.0]);
                other.table_name = "sensors".to_string();
                upsert(tx, &other)
            })
            .unwrap();

        let docs = engine.with_read(|conn| for_table(conn, "documents")).unwrap();
        assert_eq!(docs.len(), 1);
        assert_eq!(docs[0].entity_id, "d1");
    }
}
