//! `EmbeddingEngine` — the crate's entry point. Wraps provider selection
//! and the L1 cache into a single `IEmbeddingProvider`.

use ledger_core::config::EmbeddingConfig;
use ledger_core::errors::LedgerResult;
use ledger_core::traits::IEmbeddingProvider;
use tracing::{debug, info};

use crate::cache::L1Cache;
use crate::providers;

pub struct EmbeddingEngine {
    provider: Box<dyn IEmbeddingProvider>,
    cache: L1Cache,
    dimensions: usize,
}

impl EmbeddingEngine {
    pub fn new(config: EmbeddingConfig) -> Self {
        let provider = providers::create_primary(&config);
        info!(provider = provider.name(), dims = config.dimensions, "EmbeddingEngine initialized");
        Self {
            dimensions: provider.dimensions(),
            cache: L1Cache::new(config.l1_cache_size),
            provider,
        }
    }

    pub fn embed(&self, text: &str) -> LedgerResult<Vec<f32>> {
        if let Some(cached) = self.cache.get(text) {
            debug!(provider = self.provider.name(), "embedding cache hit");
            return Ok(cached);
        }
        let vector = self.provider.embed(text)?;
        self.cache.insert(text.to_string(), vector.clone());
        Ok(vector)
    }

    pub fn embed_batch(&self, texts: &[String]) -> LedgerResult<Vec<Vec<f32>>> {
        texts.iter().map(|t| self.embed(t)).collect()
    }

    pub fn active_provider(&self) -> &str {
        self.provider.name()
    }

    pub fn dimensions(&self) -> usize {
        self.dimensions
    }
}
