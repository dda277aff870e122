use serde::{Deserialize, Serialize};

/// In-memory vector index configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct VectorIndexConfig {
    /// Fixed dimension enforced on every partition.
    pub dimensions: usize,
}

impl Default for VectorIndexConfig {
    fn default() -> Self {
        Self { dimensions: 384 }
    }
}
