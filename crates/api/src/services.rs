use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;
use extract::client::is_transient;
use extract::{Annotation, DandelionClient, EntityExtractor, SentimentScorer};
use tracing::debug;

use crate::cache::Cache;
use crate::metrics::{Metrics, TimedOperation};
use crate::retry::RetryPolicy;

/// External services used to build one report.
#[derive(Clone)]
pub struct Collaborators {
    pub extractor: Arc<dyn EntityExtractor>,
    pub sentiment: Arc<dyn SentimentScorer>,
    /// Identifies the account behind the collaborators; cached annotations
    /// are only shared within one scope.
    pub cache_scope: String,
}

/// Hands out collaborators for a request. `None` means no API token is
/// available for the caller.
pub trait CollaboratorFactory: Send + Sync {
    fn collaborators(&self, token: Option<&str>) -> Option<Collaborators>;
    fn has_default_token(&self) -> bool;
}

pub struct DandelionFactory {
    template: DandelionClient,
    default_token: Option<String>,
}

impl DandelionFactory {
    pub fn new(base_url: String, default_token: Option<String>) -> Self {
        Self {
            template: DandelionClient::new(base_url, String::new()),
            default_token,
        }
    }
}

impl CollaboratorFactory for DandelionFactory {
    fn collaborators(&self, token: Option<&str>) -> Option<Collaborators> {
        let token = token
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .map(str::to_string)
            .or_else(|| self.default_token.clone())?;

        let client = Arc::new(self.template.with_token(token.clone()));
        Some(Collaborators {
            extractor: client.clone(),
            sentiment: client,
            cache_scope: token,
        })
    }

    fn has_default_token(&self) -> bool {
        self.default_token.is_some()
    }
}

/// Wraps an extraction service with the annotation cache, retries and metrics.
pub struct ResilientExtractor {
    inner: Arc<dyn EntityExtractor>,
    cache: Option<Arc<Cache>>,
    cache_scope: String,
    retry: RetryPolicy,
    metrics: Arc<Metrics>,
}

impl ResilientExtractor {
    pub fn new(
        inner: Arc<dyn EntityExtractor>,
        cache: Option<Arc<Cache>>,
        cache_scope: String,
        retry: RetryPolicy,
        metrics: Arc<Metrics>,
    ) -> Self {
        Self {
            inner,
            cache,
            cache_scope,
            retry,
            metrics,
        }
    }
}

#[async_trait]
impl EntityExtractor for ResilientExtractor {
    async fn annotate(&self, text: &str, min_confidence: f64) -> Result<Vec<Annotation>> {
        if let Some(cached) = self.cache.as_ref().and_then(|c| c.get_annotations(&self.cache_scope, text, min_confidence)) {
            debug!(annotations = cached.len(), "Annotation cache hit");
            self.metrics.record_cache_hit();
            return Ok(cached);
        }

        let timer = TimedOperation::start();
        let result = self.retry
            .retry("entity_extraction", || self.inner.annotate(text, min_confidence), is_transient)
            .await;
        self.metrics.record_extract(timer.elapsed(), result.as_ref().ok().map(Vec::len));

        let annotations = result?;
        if let Some(cache) = &self.cache {
            cache.set_annotations(&self.cache_scope, text, min_confidence, annotations.clone());
        }
        Ok(annotations)
    }
}
