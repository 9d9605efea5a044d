use serde::Serialize;

use crate::tfidf::TfidfVectorizer;

pub const DEFAULT_TOP_N: usize = 10;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct KeywordGap {
    pub term: String,
    pub gap_score: f64,
}

/// Terms the competitor weights higher than the user, largest gap first.
///
/// Empty when either document has no terms or the two share no vocabulary.
pub fn keyword_gaps(user_text: &str, competitor_text: &str, top_n: usize) -> Vec<KeywordGap> {
    let vectorizer = TfidfVectorizer::new();

    let user_terms = vectorizer.term_counts(user_text);
    let competitor_terms = vectorizer.term_counts(competitor_text);
    if user_terms.is_empty() || competitor_terms.is_empty() {
        return Vec::new();
    }
    if !user_terms.keys().any(|t| competitor_terms.contains_key(t)) {
        return Vec::new();
    }

    let weights = vectorizer.fit_transform(&[user_text, competitor_text]);
    let (user, competitor) = (&weights.rows[0], &weights.rows[1]);

    let mut gaps: Vec<KeywordGap> = weights
        .vocabulary
        .iter()
        .enumerate()
        .filter_map(|(i, term)| {
            let gap_score = competitor[i] - user[i];
            (gap_score > 0.0).then(|| KeywordGap {
                term: term.clone(),
                gap_score,
            })
        })
        .collect();

    // Stable: equal gaps keep vocabulary order.
    gaps.sort_by(|a, b| b.gap_score.total_cmp(&a.gap_score));
    gaps.truncate(top_n);
    gaps
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_gap_term() {
        let gaps = keyword_gaps("rust programming", "rust programming tutorial", DEFAULT_TOP_N);
        assert_eq!(gaps.len(), 1);
        assert_eq!(gaps[0].term, "tutorial");
        assert!((gaps[0].gap_score - 0.7048).abs() < 1e-3);
    }

    #[test]
    fn test_identical_documents_have_no_gaps() {
        let text = "Entity based SEO helps search engines understand topical authority.";
        assert!(keyword_gaps(text, text, DEFAULT_TOP_N).is_empty());
    }

    #[test]
    fn test_empty_document_has_no_gaps() {
        assert!(keyword_gaps("", "keyword research tools", DEFAULT_TOP_N).is_empty());
        assert!(keyword_gaps("keyword research tools", "", DEFAULT_TOP_N).is_empty());
        assert!(keyword_gaps("the and of", "keyword research", DEFAULT_TOP_N).is_empty());
    }

    #[test]
    fn test_disjoint_vocabulary_has_no_gaps() {
        assert!(keyword_gaps("alpha beta", "gamma delta", DEFAULT_TOP_N).is_empty());
    }

    #[test]
    fn test_gaps_are_positive_sorted_and_truncated() {
        let user = "seo content marketing";
        let competitor = "seo content marketing backlinks schema markup entities knowledge graph \
                          crawl budget sitemap canonical hreflang backlinks schema";

        let gaps = keyword_gaps(user, competitor, 5);
        assert_eq!(gaps.len(), 5);
        assert!(gaps.iter().all(|g| g.gap_score > 0.0));
        assert!(gaps.windows(2).all(|w| w[0].gap_score >= w[1].gap_score));
        // Repeated competitor terms rank first, alphabetical among equals.
        assert_eq!(gaps[0].term, "backlinks");
        assert_eq!(gaps[1].term, "schema");
    }

    #[test]
    fn test_ties_keep_vocabulary_order() {
        let gaps = keyword_gaps("shared", "shared zeta alpha mid", DEFAULT_TOP_N);
        let terms: Vec<&str> = gaps.iter().map(|g| g.term.as_str()).collect();
        assert_eq!(terms, vec!["alpha", "mid", "zeta"]);
    }
}
