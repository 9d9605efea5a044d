use serde::{Deserialize, Serialize};

use crate::schema::Annotation;

pub const NEX_PATH: &str = "/datatxt/nex/v1";
pub const SENTIMENT_PATH: &str = "/datatxt/sent/v1";

/// Annotation fields requested from the NEX endpoint on top of label/uri/confidence.
pub const NEX_INCLUDE: &str = "types";

#[derive(Debug, Serialize)]
pub struct NexRequest<'a> {
    pub text: &'a str,
    pub min_confidence: f64,
    pub include: &'a str,
    pub token: &'a str,
}

#[derive(Debug, Serialize)]
pub struct SentimentRequest<'a> {
    pub text: &'a str,
    pub token: &'a str,
}

#[derive(Debug, Deserialize)]
pub struct NexResponse {
    #[serde(default)]
    pub annotations: Vec<Annotation>,
}

#[derive(Debug, Deserialize)]
pub struct SentimentResponse {
    pub sentiment: SentimentBody,
}

#[derive(Debug, Deserialize)]
pub struct SentimentBody {
    pub score: f64,
}
