pub mod deterministic;
#[cfg(feature = "onnx")]
pub mod onnx_provider;

pub use deterministic::DeterministicProvider;
#[cfg(feature = "onnx")]
pub use onnx_provider::OnnxProvider;

use ledger_core::config::EmbeddingConfig;
use ledger_core::traits::IEmbeddingProvider;

/// Resolve the configured primary provider. Falls back to the
/// deterministic provider when `onnx` isn't compiled in, or when the
/// configured model fails to load.
pub fn create_primary(config: &EmbeddingConfig) -> Box<dyn IEmbeddingProvider> {
    #[cfg(feature = "onnx")]
    if config.provider == "onnx" {
        if let Some(path) = &config.model_path {
            match OnnxProvider::load(path, config.dimensions, config.pooling_epsilon) {
                Ok(provider) => return Box::new(provider),
                Err(e) => {
                    tracing::warn!(error = %e, "falling back to deterministic provider");
                }
            }
        }
    }

    Box::new(DeterministicProvider::new(config.dimensions))
}
