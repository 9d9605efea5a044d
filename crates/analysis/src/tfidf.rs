use std::collections::{BTreeMap, BTreeSet};
use std::sync::LazyLock;

use regex::Regex;

use crate::stopwords;

// Tokens of two or more word characters.
static TOKEN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b\w\w+\b").expect("token pattern is valid"));

/// Per-document term weights over a vocabulary shared by the whole corpus.
#[derive(Debug, Clone, PartialEq)]
pub struct TermWeights {
    /// Sorted vocabulary; column order of every row in `rows`.
    pub vocabulary: Vec<String>,
    pub rows: Vec<Vec<f64>>,
}

/// TF-IDF with raw counts, smoothed IDF `ln((1 + n) / (1 + df)) + 1`
/// and L2-normalized rows.
#[derive(Debug, Clone, Copy, Default)]
pub struct TfidfVectorizer;

impl TfidfVectorizer {
    pub fn new() -> Self {
        Self
    }

    /// Lowercased tokens with stopwords removed.
    pub fn tokenize(&self, text: &str) -> Vec<String> {
        let lowered = text.to_lowercase();
        TOKEN
            .find_iter(&lowered)
            .map(|m| m.as_str())
            .filter(|t| !stopwords::is_stopword(t))
            .map(str::to_string)
            .collect()
    }

    pub fn term_counts(&self, text: &str) -> BTreeMap<String, usize> {
        let mut counts = BTreeMap::new();
        for token in self.tokenize(text) {
            *counts.entry(token).or_insert(0) += 1;
        }
        counts
    }

    pub fn fit_transform(&self, docs: &[&str]) -> TermWeights {
        let counts: Vec<BTreeMap<String, usize>> = docs.iter().map(|d| self.term_counts(d)).collect();

        let vocabulary: Vec<String> = counts
            .iter()
            .flat_map(|c| c.keys().cloned())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect();

        let n = docs.len() as f64;
        let idf: Vec<f64> = vocabulary
            .iter()
            .map(|term| {
                let df = counts.iter().filter(|c| c.contains_key(term)).count() as f64;
                ((1.0 + n) / (1.0 + df)).ln() + 1.0
            })
            .collect();

        let rows = counts
            .iter()
            .map(|doc_counts| {
                let mut row: Vec<f64> = vocabulary
                    .iter()
                    .zip(&idf)
                    .map(|(term, idf)| doc_counts.get(term).copied().unwrap_or(0) as f64 * idf)
                    .collect();

                let norm = row.iter().map(|w| w * w).sum::<f64>().sqrt();
                if norm > 0.0 {
                    row.iter_mut().for_each(|w| *w /= norm);
                }
                row
            })
            .collect();

        TermWeights { vocabulary, rows }
    }
}
