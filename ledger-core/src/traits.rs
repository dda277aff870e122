use crate::errors::LedgerResult;

/// A provider that maps text to a fixed-dimension, unit-normalised vector.
/// Pure function of its input; no external I/O beyond model load at
/// construction; safe to call from multiple threads concurrently.
pub trait IEmbeddingProvider: Send + Sync {
    fn embed(&self, text: &str) -> LedgerResult<Vec<f32>>;

    fn embed_batch(&self, texts: &[String]) -> LedgerResult<Vec<Vec<f32>>> {
        texts.iter().map(|t| self.embed(t)).collect()
    }

    fn dimensions(&self) -> usize;

    fn name(&self) -> &str;

    fn is_available(&self) -> bool;
}
