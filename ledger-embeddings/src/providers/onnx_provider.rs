//! ONNX Runtime embedding provider (C2 default).
//!
//! Loads a sentence-transformer ONNX model (all-MiniLM-L6-v2, 384-dim) via
//! the `ort` crate, WordPiece-stand-in tokenises up to 512 tokens, runs
//! inference, and attention-masked mean-pools the token embeddings before
//! L2-normalising.

use std::path::Path;
use std::sync::Mutex;

use ledger_core::errors::{EmbeddingError, LedgerResult};
use ledger_core::traits::IEmbeddingProvider;
use ort::session::Session;
use ort::value::Tensor;
use tracing::debug;

const MAX_TOKENS: usize = 512;

/// ONNX-based embedding provider using the `ort` crate.
pub struct OnnxProvider {
    /// `Session::run` requires `&mut self`; the trait requires `&self`, so
    /// the session is wrapped in a mutex.
    session: Mutex<Session>,
    dimensions: usize,
    model_name: String,
    pooling_epsilon: f32,
}

// Safety: `Session` is `Send`; the mutex provides the `Sync` the trait needs.
unsafe impl Sync for OnnxProvider {}

impl OnnxProvider {
    pub fn load(model_path: &str, dimensions: usize, pooling_epsilon: f32) -> LedgerResult<Self> {
        let path = Path::new(model_path);
        if !path.exists() {
            return Err(EmbeddingError::ModelLoadFailed {
                path: model_path.to_string(),
                reason: "model file not found".to_string(),
            }
            .into());
        }

        let session = Session::builder()
            .map_err(|e| EmbeddingError::ModelLoadFailed {
                path: model_path.to_string(),
                reason: e.to_string(),
            })?
            .with_intra_threads(2)
            .map_err(|e| EmbeddingError::ModelLoadFailed {
                path: model_path.to_string(),
                reason: e.to_string(),
            })?
            .commit_from_file(model_path)
            .map_err(|e| EmbeddingError::ModelLoadFailed {
                path: model_path.to_string(),
                reason: e.to_string(),
            })?;

        let model_name = path
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or("onnx-model")
            .to_string();

        debug!(model = %model_name, dims = dimensions, "ONNX embedding model loaded");

        Ok(Self {
            session: Mutex::new(session),
            dimensions,
            model_name,
            pooling_epsilon,
        })
    }

    fn infer(&self, text: &str) -> LedgerResult<Vec<f32>> {
        if text.is_empty() {
            return Err(EmbeddingError::EmptyInput.into());
        }

        let token_ids = Self::tokenize(text);
        let seq_len = token_ids.len();
        let attention_mask: Vec<i64> = vec![1i64; seq_len];
        let input_ids: Vec<i64> = token_ids.iter().map(|&id| id as i64).collect();

        let ids_tensor = Tensor::from_array((vec![1i64, seq_len as i64], input_ids))
            .map_err(|e| EmbeddingError::InferenceFailed { reason: format!("tensor creation error: {e}") })?;
        let mask_tensor = Tensor::from_array((vec![1i64, seq_len as i64], attention_mask.clone()))
            .map_err(|e| EmbeddingError::InferenceFailed { reason: format!("tensor creation error: {e}") })?;

        let mut session = self
            .session
            .lock()
            .map_err(|e| EmbeddingError::InferenceFailed { reason: format!("session lock poisoned: {e}") })?;

        let outputs = session
            .run(ort::inputs![ids_tensor, mask_tensor])
            .map_err(|e| EmbeddingError::InferenceFailed { reason: e.to_string() })?;

        let (_name, output) = outputs
            .iter()
            .next()
            .ok_or_else(|| EmbeddingError::InferenceFailed { reason: "no output tensor".to_string() })?;

        let (shape, data) = output
            .try_extract_tensor::<f32>()
            .map_err(|e| EmbeddingError::InferenceFailed { reason: format!("tensor extraction failed: {e}") })?;

        let pooled = match shape.len() {
            3 => {
                let seq = shape[1] as usize;
                let dims = shape[2] as usize;
                mean_pool(data, seq, dims, &attention_mask, self.pooling_epsilon)
            }
            2 => data[..shape[1] as usize].to_vec(),
            _ => {
                return Err(EmbeddingError::InferenceFailed {
                    reason: format!("unexpected output shape: {shape:?}"),
                }
                .into())
            }
        };

        Ok(l2_normalize(pooled, self.dimensions))
    }

    /// WordPiece stand-in: hashes words into the vocab range. A real
    /// deployment swaps this for the model's own tokenizer.json.
    fn tokenize(text: &str) -> Vec<u32> {
        let mut ids = vec![101u32]; // [CLS]
        for word in text.split(|c: char| !c.is_alphanumeric() && c != '_') {
            if word.is_empty() {
                continue;
            }
            if ids.len() >= MAX_TOKENS - 1 {
                break;
            }
            let mut h: u32 = 0x811c9dc5;
            for b in word.to_lowercase().as_bytes() {
                h ^= *b as u32;
                h = h.wrapping_mul(0x01000193);
            }
            ids.push(1 + (h % 29999));
        }
        ids.push(102); // [SEP]
        ids
    }
}

/// Attention-masked mean pooling over the sequence dimension, clamping the
/// denominator at `epsilon` to guard against an all-zero mask.
fn mean_pool(data: &[f32], seq: usize, dims: usize, mask: &[i64], epsilon: f32) -> Vec<f32> {
    let mut pooled = vec![0.0f32; dims];
    let mut weight = 0.0f32;
    for s in 0..seq {
        let m = mask.get(s).copied().unwrap_or(1) as f32;
        weight += m;
        for d in 0..dims {
            pooled[d] += data[s * dims + d] * m;
        }
    }
    let denom = weight.max(epsilon);
    for v in &mut pooled {
        *v /= denom;
    }
    pooled
}

fn l2_normalize(mut vec: Vec<f32>, dimensions: usize) -> Vec<f32> {
    vec.resize(dimensions, 0.0);
    let norm: f32 = vec.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm > f32::EPSILON {
        for v in &mut vec {
            *v /= norm;
        }
    }
    vec
}

impl IEmbeddingProvider for OnnxProvider {
    fn embed(&self, text: &str) -> LedgerResult<Vec<f32>> {
        self.infer(text)
    }

    fn embed_batch(&self, texts: &[String]) -> LedgerResult<Vec<Vec<f32>>> {
        texts.iter().map(|t| self.infer(t)).collect()
    }

    fn dimensions(&self) -> usize {
        self.dimensions
    }

    fn name(&self) -> &str {
        &self.model_name
    }

    fn is_available(&self) -> bool {
        true
    }
}
