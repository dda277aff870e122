//! L1 in-memory embedding cache, keyed by the query/rendering text.

use moka::sync::Cache;

pub struct L1Cache {
    cache: Cache<String, Vec<f32>>,
}

impl L1Cache {
    pub fn new(max_entries: u64) -> Self {
        Self { cache: Cache::builder().max_capacity(max_entries).build() }
    }

    pub fn get(&self, key: &str) -> Option<Vec<f32>> {
        self.cache.get(key)
    }

    pub fn insert(&self, key: String, vector: Vec<f32>) {
        self.cache.insert(key, vector);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn insert_then_get_hits() {
        let cache = L1Cache::new(10);
        cache.insert("k".to_string(), vec![1.0, 2.0]);
        assert_eq!(cache.get("k"), Some(vec![1.0, 2.0]));
    }

    #[test]
    fn miss_returns_none() {
        let cache = L1Cache::new(10);
        assert_eq!(cache.get("missing"), None);
    }
}
