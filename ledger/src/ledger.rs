//! `Ledger`: the process-wide singleton wiring the storage engine, the
//! embedding engine and the vector index together (spec.md §5's "resource
//! scoping" — the model and the index are process-wide with explicit
//! initialise/dispose; database connections are scoped per operation).

use std::path::Path;
use std::sync::Arc;

use ledger_core::config::LedgerConfig;
use ledger_core::errors::LedgerResult;
use ledger_embeddings::EmbeddingEngine;
use ledger_storage::StorageEngine;
use ledger_vector::VectorIndex;

pub struct Ledger {
    pub(crate) storage: Arc<StorageEngine>,
    pub(crate) embeddings: Arc<EmbeddingEngine>,
    pub(crate) vector_index: Arc<VectorIndex>,
    pub(crate) config: LedgerConfig,
}

impl Ledger {
    pub fn open(path: &Path, config: LedgerConfig) -> LedgerResult<Arc<Self>> {
        let storage = Arc::new(StorageEngine::open(path, 4)?);
        Ok(Arc::new(Self::build(storage, config)))
    }

    pub fn open_in_memory(config: LedgerConfig) -> LedgerResult<Arc<Self>> {
        let storage = Arc::new(StorageEngine::open_in_memory()?);
        Ok(Arc::new(Self::build(storage, config)))
    }

    fn build(storage: Arc<StorageEngine>, config: LedgerConfig) -> Self {
        let embeddings = Arc::new(EmbeddingEngine::new(config.embedding.clone()));
        let vector_index = Arc::new(VectorIndex::new(config.vector_index.dimensions));
        Self { storage, embeddings, vector_index, config }
    }

    pub fn storage(&self) -> &Arc<StorageEngine> {
        &self.storage
    }

    pub fn embeddings(&self) -> &Arc<EmbeddingEngine> {
        &self.embeddings
    }

    pub fn vector_index(&self) -> &Arc<VectorIndex> {
        &self.vector_index
    }

    pub fn config(&self) -> &LedgerConfig {
        &self.config
    }
}
