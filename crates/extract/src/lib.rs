pub mod client;
pub mod entity_set;
pub mod normalizer;
pub mod request;
pub mod schema;
pub mod sentiment;

pub use client::{ApiError, DandelionClient, EntityExtractor, SentimentScorer};
pub use entity_set::EntitySet;
pub use schema::{Annotation, Entity, TypeGroup};
pub use sentiment::{Polarity, Sentiment};

use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, warn};

pub const DEFAULT_MIN_CONFIDENCE: f64 = 0.6;
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Entities extracted from one document, plus a warning when the
/// extraction service could not be used.
#[derive(Debug, Clone, Default)]
pub struct ExtractionOutcome {
    pub entities: EntitySet,
    pub warning: Option<String>,
}

impl ExtractionOutcome {
    fn failed(warning: String) -> Self {
        Self {
            entities: EntitySet::new(),
            warning: Some(warning),
        }
    }
}

/// Calls the extraction service and deduplicates its annotations.
/// Service errors and timeouts never escape: they become an empty set
/// with a warning.
#[derive(Clone)]
pub struct Extractor {
    service: Arc<dyn EntityExtractor>,
    min_confidence: f64,
    timeout: Duration,
}

impl Extractor {
    pub fn new(service: Arc<dyn EntityExtractor>, min_confidence: f64, timeout: Duration) -> Self {
        Self {
            service,
            min_confidence,
            timeout,
        }
    }

    pub fn with_defaults(service: Arc<dyn EntityExtractor>) -> Self {
        Self::new(service, DEFAULT_MIN_CONFIDENCE, DEFAULT_TIMEOUT)
    }

    pub async fn extract(&self, text: &str) -> ExtractionOutcome {
        if text.trim().is_empty() {
            return ExtractionOutcome::default();
        }

        let call = self.service.annotate(text, self.min_confidence);
        match tokio::time::timeout(self.timeout, call).await {
            Ok(Ok(annotations)) => {
                let raw = annotations.len();
                let entities = EntitySet::from_annotations(annotations);
                debug!(raw, deduplicated = entities.len(), "Entities extracted");
                ExtractionOutcome {
                    entities,
                    warning: None,
                }
            }
            Ok(Err(e)) => {
                warn!(error = %e, "Entity extraction failed");
                ExtractionOutcome::failed(format!("Entity extraction error: {:#}", e))
            }
            Err(_) => {
                warn!(timeout_ms = self.timeout.as_millis(), "Entity extraction timed out");
                ExtractionOutcome::failed(format!(
                    "Entity extraction timed out after {} ms",
                    self.timeout.as_millis()
                ))
            }
        }
    }
}
