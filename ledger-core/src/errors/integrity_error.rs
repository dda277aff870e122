/// Integrity hash-chain verification errors.
#[derive(Debug, thiserror::Error)]
#[error(
    "integrity chain broken for {table_name}/{entity_id}/{property_name}: expected hash {expected}, found {actual}"
)]
pub struct IntegrityError {
    pub table_name: String,
    pub entity_id: String,
    pub property_name: String,
    pub expected: String,
    pub actual: String,
}
