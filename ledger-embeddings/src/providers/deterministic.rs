//! Deterministic hash-bucketed provider — the always-available fallback
//! when no ONNX model is configured or loadable. No external I/O, so it
//! also doubles as the default provider in tests.

use std::collections::HashMap;

use ledger_core::errors::{EmbeddingError, LedgerResult};
use ledger_core::traits::IEmbeddingProvider;

pub struct DeterministicProvider {
    dimensions: usize,
}

impl DeterministicProvider {
    pub fn new(dimensions: usize) -> Self {
        Self { dimensions }
    }

    fn hash_term(term: &str, dims: usize) -> usize {
        let mut h: u64 = 0xcbf29ce484222325;
        for b in term.as_bytes() {
            h ^= *b as u64;
            h = h.wrapping_mul(0x100000001b3);
        }
        (h as usize) % dims
    }

    fn tokenize(text: &str) -> Vec<String> {
        text.split(|c: char| !c.is_alphanumeric() && c != '_')
            .filter(|s| s.len() >= 2)
            .map(|s| s.to_lowercase())
            .collect()
    }

    fn vectorize(&self, text: &str) -> Vec<f32> {
        let tokens = Self::tokenize(text);
        let mut vec = vec![0.0f32; self.dimensions];
        if tokens.is_empty() {
            return vec;
        }

        let mut tf: HashMap<String, f32> = HashMap::new();
        for tok in &tokens {
            *tf.entry(tok.clone()).or_default() += 1.0;
        }
        let total = tokens.len() as f32;

        for (term, count) in &tf {
            let freq = count / total;
            let idf = 1.0 + (term.len() as f32).ln();
            let bucket = Self::hash_term(term, self.dimensions);
            vec[bucket] += freq * idf;
        }

        let norm: f32 = vec.iter().map(|x| x * x).sum::<f32>().sqrt();
        if norm > f32::EPSILON {
            for v in &mut vec {
                *v /= norm;
            }
        }
        vec
    }
}

impl IEmbeddingProvider for DeterministicProvider {
    fn embed(&self, text: &str) -> LedgerResult<Vec<f32>> {
        if text.is_empty() {
            return Err(EmbeddingError::EmptyInput.into());
        }
        Ok(self.vectorize(text))
    }

    fn embed_batch(&self, texts: &[String]) -> LedgerResult<Vec<Vec<f32>>> {
        texts.iter().map(|t| self.embed(t)).collect()
    }

    fn dimensions(&self) -> usize {
        self.dimensions
    }

    fn name(&self) -> &str {
        "deterministic-hash"
    }

    fn is_available(&self) -> bool {
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn produces_correct_dimensions() {
        let p = DeterministicProvider::new(384);
        let v = p.embed("temperature reading 70").unwrap();
        assert_eq!(v.len(), 384);
    }

    #[test]
    fn output_is_unit_normalized() {
        let p = DeterministicProvider::new(128);
        let v = p.embed("rust systems programming").unwrap();
        let norm: f32 = v.iter().map(|x| x * x).sum::<f32>().sqrt();
        assert!((norm - 1.0).abs() < 1e-5);
    }

    #[test]
    fn deterministic_across_calls() {
        let p = DeterministicProvider::new(128);
        assert_eq!(p.embed("same text").unwrap(), p.embed("same text").unwrap());
    }

    #[test]
    fn empty_text_is_rejected() {
        let p = DeterministicProvider::new(128);
        assert!(p.embed("").is_err());
    }

    #[test]
    fn similar_texts_are_closer_than_dissimilar() {
        let p = DeterministicProvider::new(256);
        let a = p.embed("temperature is 70 degrees").unwrap();
        let b = p.embed("temperature is 72 degrees").unwrap();
        let c = p.embed("cooking pasta recipes").unwrap();
        let cos_ab: f32 = a.iter().zip(&b).map(|(x, y)| x * y).sum();
        let cos_ac: f32 = a.iter().zip(&c).map(|(x, y)| x * y).sum();
        assert!(cos_ab > cos_ac);
    }
}
