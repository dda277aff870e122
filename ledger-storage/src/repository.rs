//! A thin, generic repository backing the `user_rows` table: one JSON blob
//! per (table, id). Stands in for the caller's own relational store, which
//! spec.md treats as an external collaborator the write pipeline wraps
//! rather than replaces.

use std::marker::PhantomData;

use rusqlite::{params, Connection};
use serde::de::DeserializeOwned;
use serde::Serialize;

use ledger_core::errors::{LedgerResult, StorageError};

use crate::to_storage_err;

pub struct Repository<T> {
    table_name: &'static str,
    _marker: PhantomData<T>,
}

impl<T> Repository<T>
where
    T: Serialize + DeserializeOwned,
{
    pub fn new(table_name: &'static str) -> Self {
        Self { table_name, _marker: PhantomData }
    }

    pub fn get(&self, conn: &Connection, entity_id: &str) -> LedgerResult<Option<T>> {
        let result = conn.query_row(
            "SELECT data FROM user_rows WHERE tableName = ?1 AND entityId = ?2",
            params![self.table_name, entity_id],
            |row| row.get::<_, String>(0),
        );
        let json = match result {
            Ok(json) => json,
            Err(rusqlite::Error::QueryReturnedNoRows) => return Ok(None),
            Err(e) => return Err(to_storage_err(e.to_string())),
        };
        serde_json::from_str(&json)
            .map(Some)
            .map_err(|e| to_storage_err(format!("corrupt row for {}: {e}", self.table_name)))
    }

    pub fn require(&self, conn: &Connection, entity_id: &str) -> LedgerResult<T> {
        self.get(conn, entity_id)?.ok_or_else(|| {
            ledger_core::errors::LedgerError::Storage(StorageError::NotFound {
                table_name: self.table_name.to_string(),
                entity_id: entity_id.to_string(),
            })
        })
    }

    pub fn put(&self, conn: &Connection, entity_id: &str, value: &T) -> LedgerResult<()> {
        let json = serde_json::to_string(value)
            .map_err(|e| to_storage_err(format!("failed to serialize row: {e}")))?;
        conn.execute(
            "INSERT INTO user_rows (tableName, entityId, data) VALUES (?1, ?2, ?3)
             ON CONFLICT(tableName, entityId) DO UPDATE SET data = excluded.data",
            params![self.table_name, entity_id, json],
        )
        .map_err(|e| to_storage_err(e.to_string()))?;
        Ok(())
    }

    pub fn delete(&self, conn: &Connection, entity_id: &str) -> LedgerResult<()> {
        conn.execute(
            "DELETE FROM user_rows WHERE tableName = ?1 AND entityId = ?2",
            params![self.table_name, entity_id],
        )
        .map_err(|e| to_storage_err(e.to_string()))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::StorageEngine;

    #[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
    struct Sensor {
        id: String,
        temperature: i64,
    }

    #[test]
    fn missing_row_is_none() {
        let engine = StorageEngine::open_in_memory().unwrap();
        let repo: Repository<Sensor> = Repository::new("sensors");
        let found = engine.with_read(|conn| repo.get(conn, "missing")).unwrap();
        assert!(found.is_none());
    }

    #[test]
    fn put_then_get_round_trips() {
        let engine = StorageEngine::open_in_memory().unwrap();
        let repo: Repository<Sensor> = Repository::new("sensors");
        let sensor = Sensor { id: "s1".to_string(), temperature: 42 };

        engine.with_write_tx(|tx| repo.put(tx, "s1", &sensor)).unwrap();
        let found = engine.with_read(|conn| repo.get(conn, "s1")).unwrap();
        assert_eq!(found, Some(sensor));
    }

    #[test]
    fn put_twice_overwrites() {
        let engine = StorageEngine::open_in_memory().unwrap();
        let repo: Repository<Sensor> = Repository::new("sensors");

        engine
            .with_write_tx(|tx| repo.put(tx, "s1", &Sensor { id: "s1".to_string(), temperature: 1 }))
            .unwrap();
        engine
            .with_write_tx(|tx| repo.put(tx, "s1", &Sensor { id: "s1".to_string(), temperature: 2 }))
            .unwrap();

        let found = engine.with_read(|conn| repo.get(conn, "s1")).unwrap().unwrap();
        assert_eq!(found.temperature, 2);
    }

    #[test]
    fn require_missing_row_errors() {
        let engine = StorageEngine::open_in_memory().unwrap();
        let repo: Repository<Sensor> = Repository::new("sensors");
        let result = engine.with_read(|conn| repo.require(conn, "missing"));
        assert!(result.is_err());
    }

    #[test]
    fn delete_removes_row() {
        let engine = StorageEngine::open_in_memory().unwrap();
        let repo: Repository<Sensor> = Repository::new("sensors");
        engine
            .with_write_tx(|tx| repo.put(tx, "s1", &Sensor { id: "s1".to_string(), temperature: 1 }))
            .unwrap();
        engine.with_write_tx(|tx| repo.delete(tx, "s1")).unwrap();
        let found = engine.with_read(|conn| repo.get(conn, "s1")).unwrap();
        assert!(found.is_none());
    }
}
