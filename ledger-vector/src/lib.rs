//! In-memory vector index (C3).
//!
//! Partitioned by namespace (the user table name). Brute-force scan per
//! partition — the same strategy the relational layer falls back to when
//! no vector extension is loaded, generalised here into a standalone,
//! namespaced, in-memory index with its own add/update/remove/search
//! contract. Never persisted; the write pipeline rebuilds it at startup
//! from `sysEmbedding`.

use std::collections::HashMap;
use std::sync::Mutex;

use ledger_core::errors::VectorIndexError;

struct Entry {
    internal_id: u64,
    embedding_id: String,
    vector: Vec<f32>,
}

#[derive(Default)]
struct Partition {
    next_internal_id: u64,
    entries: Vec<Entry>,
    by_embedding_id: HashMap<String, u64>,
}

/// The process-wide, namespace-partitioned nearest-neighbour index.
pub struct VectorIndex {
    dimensions: usize,
    partitions: Mutex<HashMap<String, Partition>>,
}

impl VectorIndex {
    pub fn new(dimensions: usize) -> Self {
        Self {
            dimensions,
            partitions: Mutex::new(HashMap::new()),
        }
    }

    fn check_dim(&self, vector: &[f32]) -> Result<(), VectorIndexError> {
        if vector.len() != self.dimensions {
            return Err(VectorIndexError::DimMismatch {
                expected: self.dimensions,
                actual: vector.len(),
            });
        }
        Ok(())
    }

    /// Assign the next internal id in `namespace` and index `vector` under
    /// `embedding_id`.
    pub fn add(
        &self,
        namespace: &str,
        embedding_id: &str,
        vector: &[f32],
    ) -> Result<(), VectorIndexError> {
        self.check_dim(vector)?;
        let mut partitions = self.partitions.lock().expect("vector index mutex poisoned");
        let partition = partitions.entry(namespace.to_string()).or_default();
        let internal_id = partition.next_internal_id;
        partition.next_internal_id += 1;
        partition.entries.push(Entry {
            internal_id,
            embedding_id: embedding_id.to_string(),
            vector: vector.to_vec(),
        });
        partition.by_embedding_id.insert(embedding_id.to_string(), internal_id);
        Ok(())
    }

    /// Update replaces: remove any prior internal id mapped to
    /// `embedding_id`, then add the new vector under a fresh internal id.
    pub fn update(
        &self,
        namespace: &str,
        embedding_id: &str,
        vector: &[f32],
    ) -> Result<(), VectorIndexError> {
        self.remove(namespace, embedding_id);
        self.add(namespace, embedding_id, vector)
    }

    /// Unmap and delete from the partition; no-op if absent.
    pub fn remove(&self, namespace: &str, embedding_id: &str) {
        let mut partitions = self.partitions.lock().expect("vector index mutex poisoned");
        if let Some(partition) = partitions.get_mut(namespace) {
            if let Some(internal_id) = partition.by_embedding_id.remove(embedding_id) {
                partition.entries.retain(|e| e.internal_id != internal_id);
            }
        }
    }

    /// Up to `k` embedding ids in `namespace`, ordered by ascending L2
    /// distance to `query`. Empty when the namespace has never received
    /// `add`, or on dimension mismatch.
    pub fn search(&self, namespace: &str, query: &[f32], k: usize) -> Vec<(String, f32)> {
        if query.len() != self.dimensions || k == 0 {
            return Vec::new();
        }
        let partitions = self.partitions.lock().expect("vector index mutex poisoned");
        let Some(partition) = partitions.get(namespace) else {
            return Vec::new();
        };

        let mut scored: Vec<(String, f32)> = partition
            .entries
            .iter()
            .map(|e| (e.embedding_id.clone(), l2_distance(query, &e.vector)))
            .collect();
        scored.sort_by(|a, b| a.1.partial_cmp(&b.1).unwrap_or(std::cmp::Ordering::Equal));
        scored.truncate(k);
        scored
    }

    pub fn dimensions(&self) -> usize {
        self.dimensions
    }
}

fn l2_distance(a: &[f32], b: &[f32]) -> f32 {
    a.iter()
        .zip(b.iter())
        .map(|(x, y)| (x - y) * (x - y))
        .sum::<f32>()
        .sqrt()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn search_on_untouched_namespace_is_empty() {
        let index = VectorIndex::new(3);
        assert!(index.search("ns", &[1.0, 0.0, 0.0], 5).is_empty());
    }

    #[test]
    fn add_and_search_orders_by_distance() {
        let index = VectorIndex::new(2);
        index.add("sensors", "a", &[0.0, 0.0]).unwrap();
        index.add("sensors", "b", &[10.0, 0.0]).unwrap();
        index.add("sensors", "c", &[1.0, 0.0]).unwrap();

        let results = index.search("sensors", &[0.0, 0.0], 2);
        assert_eq!(results.len(), 2);
        assert_eq!(results[0].0, "a");
        assert_eq!(results[1].0, "c");
    }

    #[test]
    fn dim_mismatch_rejected() {
        let index = VectorIndex::new(3);
        let err = index.add("ns", "a", &[1.0, 2.0]).unwrap_err();
        assert!(matches!(
            err,
            VectorIndexError::DimMismatch { expected: 3, actual: 2 }
        ));
    }

    #[test]
    fn update_replaces_prior_entry() {
        let index = VectorIndex::new(2);
        index.add("ns", "a", &[0.0, 0.0]).unwrap();
        index.update("ns", "a", &[5.0, 5.0]).unwrap();

        let results = index.search("ns", &[5.0, 5.0], 5);
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].0, "a");
    }

    #[test]
    fn remove_is_noop_if_absent() {
        let index = VectorIndex::new(2);
        index.remove("ns", "nonexistent");
        assert!(index.search("ns", &[0.0, 0.0], 5).is_empty());
    }

    #[test]
    fn remove_deletes_entry() {
        let index = VectorIndex::new(2);
        index.add("ns", "a", &[1.0, 1.0]).unwrap();
        index.remove("ns", "a");
        assert!(index.search("ns", &[1.0, 1.0], 5).is_empty());
    }

    #[test]
    fn namespaces_are_isolated() {
        let index = VectorIndex::new(2);
        index.add("ns1", "a", &[1.0, 1.0]).unwrap();
        assert!(index.search("ns2", &[1.0, 1.0], 5).is_empty());
    }
}
