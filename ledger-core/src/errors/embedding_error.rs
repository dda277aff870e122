/// Embedding provider errors.
#[derive(Debug, thiserror::Error)]
pub enum EmbeddingError {
    #[error("failed to load embedding model from {path}: {reason}")]
    ModelLoadFailed { path: String, reason: String },

    #[error("embedding inference failed: {reason}")]
    InferenceFailed { reason: String },

    #[error("cannot embed empty text")]
    EmptyInput,
}
