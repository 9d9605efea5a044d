use std::sync::Arc;
use std::time::Duration;

use extract::{EntitySet, ExtractionOutcome, Extractor, Sentiment, SentimentScorer, TypeGroup};
use serde::Serialize;
use tracing::{info, warn};

use crate::keywords::{DEFAULT_TOP_N, KeywordGap, keyword_gaps};
use crate::reconcile::{ComparisonResult, EntityPartitions};
use crate::recommend;

#[derive(Debug, Clone)]
pub struct ReportOptions {
    pub top_keywords: usize,
    pub sentiment_timeout: Duration,
}

impl Default for ReportOptions {
    fn default() -> Self {
        Self {
            top_keywords: DEFAULT_TOP_N,
            sentiment_timeout: Duration::from_secs(30),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct SeoReport {
    pub entities: EntitySet,
    pub entity_types: Vec<TypeGroup>,
    pub sentiment: Sentiment,
    pub competitor: Option<CompetitorAnalysis>,
    pub warnings: Vec<String>,
}

#[derive(Debug, Serialize)]
pub struct CompetitorAnalysis {
    pub entities: EntitySet,
    pub comparison: ComparisonResult,
    pub partitions: EntityPartitions,
    pub keyword_gaps: Vec<KeywordGap>,
    pub recommendations: Vec<String>,
}

/// Runs the analysis for one pair of documents.
#[derive(Clone)]
pub struct ReportBuilder {
    extractor: Extractor,
    sentiment: Arc<dyn SentimentScorer>,
    options: ReportOptions,
}

impl ReportBuilder {
    pub fn new(extractor: Extractor, sentiment: Arc<dyn SentimentScorer>, options: ReportOptions) -> Self {
        Self {
            extractor,
            sentiment,
            options,
        }
    }

    pub async fn build(&self, user_text: &str, competitor_text: Option<&str>) -> SeoReport {
        let competitor_text = competitor_text.filter(|t| !t.trim().is_empty());

        let competitor_extraction = async {
            match competitor_text {
                Some(text) => Some(self.extractor.extract(text).await),
                None => None,
            }
        };

        let (user, competitor, sentiment) = tokio::join!(
            self.extractor.extract(user_text),
            competitor_extraction,
            self.score_sentiment(user_text),
        );

        let mut warnings = Vec::new();
        let ExtractionOutcome { entities, warning } = user;
        warnings.extend(warning);

        let (sentiment, sentiment_warning) = sentiment;
        warnings.extend(sentiment_warning);

        let competitor = match (competitor, competitor_text) {
            (Some(outcome), Some(text)) => {
                warnings.extend(outcome.warning.map(|w| format!("Competitor: {}", w)));
                Some(self.analyze_competitor(&entities, outcome.entities, user_text, text, sentiment.score))
            }
            _ => None,
        };

        info!(
            entities = entities.len(),
            competitor = competitor.is_some(),
            warnings = warnings.len(),
            "Report built"
        );

        SeoReport {
            entity_types: entities.group_by_type(),
            entities,
            sentiment,
            competitor,
            warnings,
        }
    }

    fn analyze_competitor(
        &self,
        user_entities: &EntitySet,
        competitor_entities: EntitySet,
        user_text: &str,
        competitor_text: &str,
        sentiment_score: f64,
    ) -> CompetitorAnalysis {
        let comparison = ComparisonResult::compare(user_entities, &competitor_entities);
        let partitions = comparison.resolve(user_entities, &competitor_entities);
        let keyword_gaps = keyword_gaps(user_text, competitor_text, self.options.top_keywords);
        let recommendations = recommend::synthesize(&partitions, &keyword_gaps, sentiment_score);

        CompetitorAnalysis {
            entities: competitor_entities,
            comparison,
            partitions,
            keyword_gaps,
            recommendations,
        }
    }

    // Failures fall back to a neutral score.
    async fn score_sentiment(&self, text: &str) -> (Sentiment, Option<String>) {
        if text.trim().is_empty() {
            return (Sentiment::neutral(), None);
        }

        match tokio::time::timeout(self.options.sentiment_timeout, self.sentiment.polarity(text)).await {
            Ok(Ok(score)) => (Sentiment::new(score), None),
            Ok(Err(e)) => {
                warn!(error = %e, "Sentiment analysis failed");
                (Sentiment::neutral(), Some(format!("Sentiment analysis error: {:#}", e)))
            }
            Err(_) => {
                warn!("Sentiment analysis timed out");
                (Sentiment::neutral(), Some("Sentiment analysis timed out".to_string()))
            }
        }
    }
}
