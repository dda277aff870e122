use serde::{Deserialize, Serialize};

/// Embedding subsystem configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EmbeddingConfig {
    /// Provider selector: "onnx" or "deterministic".
    pub provider: String,
    /// Path to the ONNX model file, when `provider == "onnx"`.
    pub model_path: Option<String>,
    /// Output dimensionality. The spec's default provider is 384-dim.
    pub dimensions: usize,
    /// Max entries retained in the L1 in-memory cache.
    pub l1_cache_size: u64,
    /// Pooling-denominator clamp floor, guards against division by ~0.
    pub pooling_epsilon: f32,
}

impl Default for EmbeddingConfig {
    fn default() -> Self {
        Self {
            provider: "deterministic".to_string(),
            model_path: None,
            dimensions: 384,
            l1_cache_size: 10_000,
            pooling_epsilon: 1e-9,
        }
    }
}
