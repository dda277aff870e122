//! Per-subsystem error enums plus the aggregating `LedgerError`.

pub mod codec_error;
pub mod embedding_error;
pub mod integrity_error;
pub mod storage_error;
pub mod validation_error;
pub mod vector_error;

pub use codec_error::CodecError;
pub use embedding_error::EmbeddingError;
pub use integrity_error::IntegrityError;
pub use storage_error::StorageError;
pub use validation_error::ValidationError;
pub use vector_error::VectorIndexError;

/// Top-level error type returned by every public ledger operation.
#[derive(Debug, thiserror::Error)]
pub enum LedgerError {
    #[error(transparent)]
    Codec(#[from] CodecError),

    #[error(transparent)]
    Embedding(#[from] EmbeddingError),

    #[error(transparent)]
    VectorIndex(#[from] VectorIndexError),

    #[error(transparent)]
    Integrity(#[from] IntegrityError),

    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Storage(#[from] StorageError),

    #[error("operation cancelled before commit")]
    Cancelled,
}

pub type LedgerResult<T> = Result<T, LedgerError>;
