//! # ledger-embeddings
//!
//! Embedding provider (C2): maps a non-empty text string to a fixed-length
//! unit-normalised vector. Default provider is an ONNX sentence transformer
//! (feature `onnx`), with an always-available deterministic fallback.

pub mod cache;
pub mod engine;
pub mod providers;

pub use engine::EmbeddingEngine;
