use dashmap::DashMap;
use extract::Annotation;
use sha2::{Digest, Sha256};
use std::sync::Arc;

/// Raw annotations keyed by (account, min confidence, text). The account
/// scope keeps one token's results from answering another token's request.
pub struct Cache {
    annotations: Arc<DashMap<String, Vec<Annotation>>>,
    max_entries: usize,
}

impl Cache {
    pub fn new(max_entries: usize) -> Self {
        Self {
            annotations: Arc::new(DashMap::new()),
            max_entries,
        }
    }

    pub fn set_annotations(&self, scope: &str, text: &str, min_confidence: f64, annotations: Vec<Annotation>) {
        if self.max_entries == 0 {
            return;
        }
        if self.annotations.len() >= self.max_entries {
            // Simple eviction: clear 25% when full
            let to_remove: Vec<_> = self.annotations.iter()
                .take((self.max_entries / 4).max(1))
                .map(|r| r.key().clone())
                .collect();
            for key in to_remove {
                self.annotations.remove(&key);
            }
        }
        let key = self.hash_request(scope, text, min_confidence);
        self.annotations.insert(key, annotations);
    }

    pub fn get_annotations(&self, scope: &str, text: &str, min_confidence: f64) -> Option<Vec<Annotation>> {
        let key = self.hash_request(scope, text, min_confidence);
        self.annotations.get(&key).map(|r| r.value().clone())
    }

    fn hash_request(&self, scope: &str, text: &str, min_confidence: f64) -> String {
        let mut hasher = Sha256::new();
        hasher.update((scope.len() as u64).to_le_bytes());
        hasher.update(scope.as_bytes());
        hasher.update(min_confidence.to_bits().to_le_bytes());
        hasher.update(text.as_bytes());
        hex::encode(hasher.finalize())
    }

    pub fn stats(&self) -> CacheStats {
        CacheStats {
            annotations_cached: self.annotations.len(),
            max_entries: self.max_entries,
        }
    }
}

#[derive(Debug, serde::Serialize)]
pub struct CacheStats {
    pub annotations_cached: usize,
    pub max_entries: usize,
}
