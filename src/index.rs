//! In-memory vector index with named collections.
//!
//! One collection per document, holding `(chunk id, text, vector)` entries.
//! Queries are brute-force cosine similarity over the collection, ranked
//! nearest-first. Entries are never individually deleted or updated;
//! re-indexing a document recreates its whole collection.
//!
//! Thread safety via `std::sync::RwLock`; no operation holds a lock across
//! an await point.

use std::collections::HashMap;
use std::sync::RwLock;

use anyhow::Result;

/// One indexed chunk.
#[derive(Debug, Clone)]
struct IndexEntry {
    chunk_id: String,
    text: String,
    vector: Vec<f32>,
}

/// A ranked query hit.
#[derive(Debug, Clone)]
pub struct QueryHit {
    pub chunk_id: String,
    pub text: String,
    pub score: f32,
}

/// Named-collection vector store.
pub struct VectorStore {
    collections: RwLock<HashMap<String, Vec<IndexEntry>>>,
}

impl VectorStore {
    pub fn new() -> Self {
        Self {
            collections: RwLock::new(HashMap::new()),
        }
    }

    /// Create an empty collection, replacing any existing one of the same
    /// name. Deleting a collection that does not exist is not an error.
    pub fn recreate_collection(&self, name: &str) {
        let mut collections = self.collections.write().unwrap();
        collections.insert(name.to_string(), Vec::new());
    }

    /// Drop a collection if present.
    pub fn delete_collection(&self, name: &str) {
        let mut collections = self.collections.write().unwrap();
        collections.remove(name);
    }

    /// Append an entry to a collection.
    pub fn add(&self, name: &str, chunk_id: &str, text: &str, vector: Vec<f32>) -> Result<()> {
        let mut collections = self.collections.write().unwrap();
        let entries = collections
            .get_mut(name)
            .ok_or_else(|| anyhow::anyhow!("collection not found: {}", name))?;
        entries.push(IndexEntry {
            chunk_id: chunk_id.to_string(),
            text: text.to_string(),
            vector,
        });
        Ok(())
    }

    /// Return the `k` entries nearest to `query_vec`, best match first.
    /// Fewer than `k` when the collection is smaller.
    pub fn query(&self, name: &str, query_vec: &[f32], k: usize) -> Result<Vec<QueryHit>> {
        let collections = self.collections.read().unwrap();
        let entries = collections
            .get(name)
            .ok_or_else(|| anyhow::anyhow!("collection not found: {}", name))?;

        let mut hits: Vec<QueryHit> = entries
            .iter()
            .map(|e| QueryHit {
                chunk_id: e.chunk_id.clone(),
                text: e.text.clone(),
                score: cosine_similarity(query_vec, &e.vector),
            })
            .collect();
        hits.sort_by(|a, b| {
            b.score
                .partial_cmp(&a.score)
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        hits.truncate(k);
        Ok(hits)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.collections.read().unwrap().contains_key(name)
    }

    pub fn len(&self, name: &str) -> usize {
        self.collections
            .read()
            .unwrap()
            .get(name)
            .map(|e| e.len())
            .unwrap_or(0)
    }
}

impl Default for VectorStore {
    fn default() -> Self {
        Self::new()
    }
}

/// Cosine similarity in `[-1, 1]`; `0.0` for empty or mismatched lengths.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() || a.is_empty() {
        return 0.0;
    }

    let mut dot = 0.0f32;
    let mut norm_a = 0.0f32;
    let mut norm_b = 0.0f32;
    for (x, y) in a.iter().zip(b.iter()) {
        dot += x * y;
        norm_a += x * x;
        norm_b += y * y;
    }

    let denom = norm_a.sqrt() * norm_b.sqrt();
    if denom < f32::EPSILON {
        return 0.0;
    }
    dot / denom
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store_with(entries: &[(&str, Vec<f32>)]) -> VectorStore {
        let store = VectorStore::new();
        store.recreate_collection("doc");
        for (id, v) in entries {
            store.add("doc", id, &format!("text {}", id), v.clone()).unwrap();
        }
        store
    }

    #[test]
    fn query_ranks_nearest_first() {
        let store = store_with(&[
            ("0", vec![1.0, 0.0]),
            ("1", vec![0.0, 1.0]),
            ("2", vec![0.9, 0.1]),
        ]);
        let hits = store.query("doc", &[1.0, 0.0], 3).unwrap();
        assert_eq!(hits[0].chunk_id, "0");
        assert_eq!(hits[1].chunk_id, "2");
        assert_eq!(hits[2].chunk_id, "1");
    }

    #[test]
    fn query_returns_at_most_k() {
        let store = store_with(&[
            ("0", vec![1.0, 0.0]),
            ("1", vec![0.0, 1.0]),
            ("2", vec![0.5, 0.5]),
        ]);
        assert_eq!(store.query("doc", &[1.0, 0.0], 2).unwrap().len(), 2);
        // Fewer entries than k.
        assert_eq!(store.query("doc", &[1.0, 0.0], 10).unwrap().len(), 3);
    }

    #[test]
    fn recreate_replaces_previous_entries() {
        let store = store_with(&[("0", vec![1.0, 0.0]), ("1", vec![0.0, 1.0])]);
        store.recreate_collection("doc");
        assert_eq!(store.len("doc"), 0);
        store.add("doc", "0", "fresh", vec![0.0, 1.0]).unwrap();
        let hits = store.query("doc", &[0.0, 1.0], 5).unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].text, "fresh");
    }

    #[test]
    fn query_unknown_collection_is_error() {
        let store = VectorStore::new();
        assert!(store.query("missing", &[1.0], 5).is_err());
    }

    #[test]
    fn add_to_unknown_collection_is_error() {
        let store = VectorStore::new();
        assert!(store.add("missing", "0", "t", vec![1.0]).is_err());
    }

    #[test]
    fn delete_missing_collection_is_noop() {
        let store = VectorStore::new();
        store.delete_collection("missing");
        assert!(!store.contains("missing"));
    }

    #[test]
    fn cosine_identical_and_orthogonal() {
        let v = vec![1.0, 2.0, 3.0];
        assert!((cosine_similarity(&v, &v) - 1.0).abs() < 1e-6);
        assert!(cosine_similarity(&[1.0, 0.0], &[0.0, 1.0]).abs() < 1e-6);
        assert_eq!(cosine_similarity(&[], &[]), 0.0);
        assert_eq!(cosine_similarity(&[1.0, 2.0], &[1.0]), 0.0);
    }
}
