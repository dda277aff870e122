use serde::{Deserialize, Serialize};

/// One row in `sysEmbedding`: the stored embedding for a single entity,
/// one per entity-with-embeddable with a non-empty rendering.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmbeddingRecord {
    pub id: String,
    pub table_name: String,
    pub entity_id: String,
    pub vector: Vec<f32>,
}

/// Little-endian float32 wire encoding used for `sysEmbedding.vector`, with
/// no framing — length is implied by the table's configured dimension.
pub fn vector_to_bytes(vector: &[f32]) -> Vec<u8> {
    let mut out = Vec::with_capacity(vector.len() * 4);
    for v in vector {
        out.extend_from_slice(&v.to_le_bytes());
    }
    out
}

pub fn bytes_to_vector(bytes: &[u8]) -> Vec<f32> {
    bytes
        .chunks_exact(4)
        .map(|c| f32::from_le_bytes([c[0], c[1], c[2], c[3]]))
        .collect()
}
