/// Relational-store errors, surfaced verbatim with context from the underlying provider.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("sqlite error: {message}")]
    Sqlite { message: String },

    #[error("migration failed at version {version}: {reason}")]
    MigrationFailed { version: u32, reason: String },

    #[error("no row for table {table_name}, id {entity_id}")]
    NotFound { table_name: String, entity_id: String },
}
