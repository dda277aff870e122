pub mod embedding_config;
pub mod pipeline_config;
pub mod vector_index_config;

pub use embedding_config::EmbeddingConfig;
pub use pipeline_config::PipelineConfig;
pub use vector_index_config::VectorIndexConfig;

use serde::{Deserialize, Serialize};

/// Top-level configuration aggregating every subsystem's config.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct LedgerConfig {
    pub embedding: EmbeddingConfig,
    pub vector_index: VectorIndexConfig,
    pub pipeline: PipelineConfig,
}
