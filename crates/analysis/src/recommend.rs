use extract::Entity;

use crate::keywords::KeywordGap;
use crate::reconcile::EntityPartitions;

/// Entities or terms listed per recommendation.
pub const MAX_LISTED: usize = 5;

pub const WELL_ALIGNED: &str = "No major improvements detected. Your content is well-aligned!";

/// Advisory recommendations, in a fixed order:
/// missing entities, unique entities, tone, keyword gaps.
pub fn synthesize(partitions: &EntityPartitions, gaps: &[KeywordGap], sentiment_score: f64) -> Vec<String> {
    let mut recommendations = Vec::new();

    if !partitions.missing.is_empty() {
        recommendations.push(format!(
            "Consider including missing entities like {} to align with competitor coverage.",
            cite(&partitions.missing)
        ));
    }

    if !partitions.unique.is_empty() {
        recommendations.push(format!(
            "Highlight unique entities such as {} as differentiators.",
            cite(&partitions.unique)
        ));
    }

    if sentiment_score < 0.0 {
        recommendations.push(
            "Your content has a negative sentiment; consider making the tone more positive or balanced."
                .to_string(),
        );
    }

    if !gaps.is_empty() {
        let terms: Vec<String> = gaps.iter()
            .take(MAX_LISTED)
            .map(|g| format!("`{}`", g.term))
            .collect();
        recommendations.push(format!(
            "Add keywords like {} to improve topical relevance.",
            terms.join(", ")
        ));
    }

    if recommendations.is_empty() {
        recommendations.push(WELL_ALIGNED.to_string());
    }

    recommendations
}

fn cite(entities: &[Entity]) -> String {
    entities.iter()
        .take(MAX_LISTED)
        .map(Entity::citation)
        .collect::<Vec<_>>()
        .join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reconcile::ComparisonResult;
    use extract::{Annotation, EntitySet};

    fn partitions(user: &[&str], competitor: &[&str]) -> EntityPartitions {
        let user = EntitySet::from_annotations(user.iter().map(|l| Annotation::new(*l)));
        let competitor = EntitySet::from_annotations(competitor.iter().map(|l| Annotation::new(*l)));
        ComparisonResult::compare(&user, &competitor).resolve(&user, &competitor)
    }

    fn gap(term: &str, gap_score: f64) -> KeywordGap {
        KeywordGap { term: term.to_string(), gap_score }
    }

    #[test]
    fn test_well_aligned_when_nothing_triggers() {
        let recs = synthesize(&partitions(&["SEO"], &["seo"]), &[], 0.0);
        assert_eq!(recs, vec![WELL_ALIGNED.to_string()]);
    }

    #[test]
    fn test_all_recommendations_in_order() {
        let recs = synthesize(
            &partitions(&["Python", "SEO"], &["SEO", "NLP"]),
            &[gap("backlinks", 0.4)],
            -0.2,
        );

        assert_eq!(recs.len(), 4);
        assert!(recs[0].starts_with("Consider including missing entities like `NLP`"));
        assert!(recs[1].starts_with("Highlight unique entities such as `Python`"));
        assert!(recs[2].contains("negative sentiment"));
        assert!(recs[3].contains("`backlinks`"));
    }

    #[test]
    fn test_lists_are_capped_in_key_order() {
        let competitor = ["G", "F", "E", "D", "C", "B", "A"];
        let recs = synthesize(&partitions(&[], &competitor), &[], 0.5);

        assert_eq!(recs.len(), 1);
        assert!(recs[0].contains("`A`, `B`, `C`, `D`, `E` to align"));
        assert!(!recs[0].contains("`F`"));
    }

    #[test]
    fn test_citation_links_uri() {
        let user = EntitySet::new();
        let competitor = EntitySet::from_annotations(vec![
            Annotation::new("Knowledge Graph").with_uri("http://en.wikipedia.org/wiki/Knowledge_graph"),
        ]);
        let parts = ComparisonResult::compare(&user, &competitor).resolve(&user, &competitor);

        let recs = synthesize(&parts, &[], 0.0);
        assert!(recs[0].contains("[Knowledge Graph](http://en.wikipedia.org/wiki/Knowledge_graph)"));
    }

    #[test]
    fn test_keyword_terms_are_capped() {
        let gaps: Vec<KeywordGap> = (0..8).map(|i| gap(&format!("term{}", i), 1.0 - i as f64 * 0.1)).collect();
        let recs = synthesize(&EntityPartitions::default(), &gaps, 0.0);

        assert_eq!(recs.len(), 1);
        assert!(recs[0].contains("`term4`"));
        assert!(!recs[0].contains("`term5`"));
    }

    #[test]
    fn test_positive_sentiment_alone_is_well_aligned() {
        let recs = synthesize(&EntityPartitions::default(), &[], 0.9);
        assert_eq!(recs, vec![WELL_ALIGNED.to_string()]);
    }
}
