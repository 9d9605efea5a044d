use std::fmt;

use anyhow::{Context, Result};
use async_trait::async_trait;
pub use reqwest::StatusCode;
use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::request::{
    NEX_INCLUDE, NEX_PATH, NexRequest, NexResponse, SENTIMENT_PATH, SentimentRequest,
    SentimentResponse,
};
use crate::schema::Annotation;

pub const DEFAULT_BASE_URL: &str = "https://api.dandelion.eu";

/// Named-entity extraction service.
#[async_trait]
pub trait EntityExtractor: Send + Sync {
    async fn annotate(&self, text: &str, min_confidence: f64) -> Result<Vec<Annotation>>;
}

/// Sentiment service returning a polarity in [-1, 1].
#[async_trait]
pub trait SentimentScorer: Send + Sync {
    async fn polarity(&self, text: &str) -> Result<f64>;
}

/// Non-success response from the Dandelion API.
#[derive(Debug, Clone)]
pub struct ApiError {
    pub status: StatusCode,
    pub body: String,
}

impl ApiError {
    /// Server-side failures and rate limiting; auth and quota errors are final.
    pub fn is_transient(&self) -> bool {
        self.status.is_server_error() || self.status == StatusCode::TOO_MANY_REQUESTS
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Dandelion request failed: {} {}", self.status, self.body)
    }
}

impl std::error::Error for ApiError {}

/// Whether a failed call is worth repeating. Errors that are not
/// `ApiError`s come from the transport and are retried.
pub fn is_transient(error: &anyhow::Error) -> bool {
    error.downcast_ref::<ApiError>().is_none_or(ApiError::is_transient)
}

#[derive(Clone)]
pub struct DandelionClient {
    base_url: String,
    token: String,
    client: reqwest::Client,
}

impl DandelionClient {
    pub fn new(base_url: String, token: String) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            token,
            client: reqwest::Client::new(),
        }
    }

    /// Same endpoint and connection pool, different API token.
    pub fn with_token(&self, token: String) -> Self {
        Self {
            base_url: self.base_url.clone(),
            token,
            client: self.client.clone(),
        }
    }

    async fn post_form<F, T>(&self, path: &str, form: &F) -> Result<T>
    where
        F: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let url = format!("{}{}", self.base_url, path);

        let response = self.client
            .post(&url)
            .form(form)
            .send()
            .await
            .context("Failed to send request to Dandelion")?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ApiError {
                status,
                body: body.trim().to_string(),
            }
            .into());
        }

        response
            .json()
            .await
            .context("Failed to parse Dandelion response")
    }
}

#[async_trait]
impl EntityExtractor for DandelionClient {
    async fn annotate(&self, text: &str, min_confidence: f64) -> Result<Vec<Annotation>> {
        let request = NexRequest {
            text,
            min_confidence,
            include: NEX_INCLUDE,
            token: &self.token,
        };

        let response: NexResponse = self.post_form(NEX_PATH, &request).await?;
        Ok(response.annotations)
    }
}

#[async_trait]
impl SentimentScorer for DandelionClient {
    async fn polarity(&self, text: &str) -> Result<f64> {
        let request = SentimentRequest {
            text,
            token: &self.token,
        };

        let response: SentimentResponse = self.post_form(SENTIMENT_PATH, &request).await?;
        Ok(response.sentiment.score.clamp(-1.0, 1.0))
    }
}
