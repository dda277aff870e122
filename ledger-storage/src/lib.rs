//! # ledger-storage
//!
//! SQLite persistence for the bookkeeping schema (`sysChangeLog`,
//! `sysIntegrityLog`, `sysTimeseriesBase`/`sysTimeseriesDelta`,
//! `sysEmbedding`) plus a thin JSON-blob repository standing in for the
//! user's own relational store.

pub mod engine;
pub mod migrations;
pub mod pool;
pub mod queries;
pub mod repository;

pub use engine::StorageEngine;
pub use repository::Repository;

use ledger_core::errors::{LedgerError, StorageError};

/// Wraps any `rusqlite`/io failure message as a `LedgerError::Storage`.
pub(crate) fn to_storage_err(message: String) -> LedgerError {
    LedgerError::Storage(StorageError::Sqlite { message })
}
