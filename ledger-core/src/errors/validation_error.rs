/// Write-pipeline validation errors.
#[derive(Debug, thiserror::Error)]
pub enum ValidationError {
    #[error("entity is missing its key field")]
    MissingKey,

    #[error("field {field} is required but null")]
    NullRequiredField { field: String },

    #[error("unknown property {name} on table {table_name}")]
    UnknownProperty { table_name: String, name: String },
}
