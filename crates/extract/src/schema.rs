use serde::{Deserialize, Deserializer, Serialize};

use crate::normalizer;

/// Raw annotation as returned by the extraction service.
/// Every field may be missing from the wire response.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Annotation {
    #[serde(default)]
    pub label: Option<String>,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub types: Vec<String>,
    #[serde(default)]
    pub uri: Option<String>,
    #[serde(default)]
    pub confidence: Option<f64>,
}

impl Annotation {
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            label: Some(label.into()),
            ..Self::default()
        }
    }

    pub fn with_types<I, S>(mut self, types: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.types = types.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_uri(mut self, uri: impl Into<String>) -> Self {
        self.uri = Some(uri.into());
        self
    }

    pub fn with_confidence(mut self, confidence: f64) -> Self {
        self.confidence = Some(confidence);
        self
    }
}

fn null_as_empty<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<Vec<String>>::deserialize(deserializer)?.unwrap_or_default())
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Entity {
    pub label: String,
    #[serde(rename = "key")]
    pub canonical_key: String,
    #[serde(rename = "type")]
    pub entity_type: String,
    pub uri: Option<String>,
    pub confidence: Option<f64>,
}

impl Entity {
    /// Build an entity from a raw annotation. Returns `None` when the
    /// annotation carries no usable label.
    pub fn from_annotation(annotation: Annotation) -> Option<Self> {
        let label = annotation.label?;
        let canonical_key = normalizer::canonical_key(&label)?;

        Some(Self {
            label,
            canonical_key,
            entity_type: normalizer::classify_type(&annotation.types),
            uri: annotation.uri.filter(|uri| !uri.trim().is_empty()),
            confidence: annotation.confidence,
        })
    }

    /// Markdown citation: a link when the entity has a URI, inline code otherwise.
    pub fn citation(&self) -> String {
        match &self.uri {
            Some(uri) => format!("[{}]({})", self.label, uri),
            None => format!("`{}`", self.label),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TypeGroup {
    #[serde(rename = "type")]
    pub entity_type: String,
    pub labels: Vec<String>,
}
