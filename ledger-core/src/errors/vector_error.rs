/// In-memory vector index errors.
#[derive(Debug, thiserror::Error)]
pub enum VectorIndexError {
    #[error("vector dimension mismatch: expected {expected}, got {actual}")]
    DimMismatch { expected: usize, actual: usize },
}
