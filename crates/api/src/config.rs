use std::str::FromStr;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub mode: OperationMode,
    pub server: ServerConfig,
    pub extraction: ExtractionConfig,
    pub retry: RetryConfig,
    pub cache: CacheConfig,
    pub report: ReportConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "lowercase")]
pub enum OperationMode {
    Fast,      // Cache aggressively, short timeouts, looser confidence
    Accurate,  // Always fresh, long timeouts, stricter confidence
    Balanced,  // Default
}

impl FromStr for OperationMode {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "fast" => Ok(OperationMode::Fast),
            "accurate" => Ok(OperationMode::Accurate),
            "balanced" => Ok(OperationMode::Balanced),
            other => anyhow::bail!("Unknown operation mode: {}", other),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub bind_addr: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExtractionConfig {
    pub base_url: String,
    #[serde(skip_serializing)]
    pub token: Option<String>,
    pub min_confidence: f64,
    pub request_timeout_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetryConfig {
    pub max_retries: usize,
    pub initial_backoff_ms: u64,
    pub max_backoff_ms: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheConfig {
    pub enabled: bool,
    pub max_entries: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportConfig {
    pub top_keywords: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    pub json: bool,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            mode: OperationMode::Balanced,
            server: ServerConfig {
                bind_addr: "0.0.0.0:3000".to_string(),
            },
            extraction: ExtractionConfig {
                base_url: extract::client::DEFAULT_BASE_URL.to_string(),
                token: None,
                min_confidence: extract::DEFAULT_MIN_CONFIDENCE,
                request_timeout_secs: 30,
            },
            retry: RetryConfig {
                max_retries: 2,
                initial_backoff_ms: 500,
                max_backoff_ms: 5000,
            },
            cache: CacheConfig {
                enabled: true,
                max_entries: 10000,
            },
            report: ReportConfig {
                top_keywords: analysis::keywords::DEFAULT_TOP_N,
            },
            logging: LoggingConfig { json: false },
        }
    }
}

impl AppConfig {
    pub fn fast_mode() -> Self {
        let mut config = Self::default();
        config.mode = OperationMode::Fast;
        config.extraction.min_confidence = 0.5;
        config.extraction.request_timeout_secs = 10;
        config.retry = RetryConfig {
            max_retries: 1,
            initial_backoff_ms: 250,
            max_backoff_ms: 1000,
        };
        config.cache = CacheConfig {
            enabled: true,
            max_entries: 50000,
        };
        config
    }

    pub fn accurate_mode() -> Self {
        let mut config = Self::default();
        config.mode = OperationMode::Accurate;
        config.extraction.min_confidence = 0.7;
        config.extraction.request_timeout_secs = 60;
        config.retry = RetryConfig {
            max_retries: 4,
            initial_backoff_ms: 1000,
            max_backoff_ms: 10000,
        };
        config.cache = CacheConfig {
            enabled: false,
            max_entries: 0,
        };
        config
    }

    pub fn for_mode(mode: OperationMode) -> Self {
        match mode {
            OperationMode::Fast => Self::fast_mode(),
            OperationMode::Accurate => Self::accurate_mode(),
            OperationMode::Balanced => Self::default(),
        }
    }

    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Start from the `SEO_MODE` preset and apply overrides.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mode = match lookup("SEO_MODE") {
            Some(mode) => mode.parse()?,
            None => OperationMode::Balanced,
        };
        let mut config = Self::for_mode(mode);

        if let Some(addr) = lookup("SEO_BIND_ADDR") {
            config.server.bind_addr = addr;
        }
        if let Some(token) = lookup("DANDELION_TOKEN").filter(|t| !t.trim().is_empty()) {
            config.extraction.token = Some(token);
        }
        if let Some(url) = lookup("DANDELION_BASE_URL") {
            config.extraction.base_url = url;
        }
        if let Some(value) = lookup("SEO_MIN_CONFIDENCE") {
            let min_confidence: f64 = value
                .parse()
                .context(format!("Invalid SEO_MIN_CONFIDENCE: {}", value))?;
            if !(0.0..=1.0).contains(&min_confidence) {
                anyhow::bail!("SEO_MIN_CONFIDENCE must be within [0, 1], got {}", min_confidence);
            }
            config.extraction.min_confidence = min_confidence;
        }
        if let Some(value) = lookup("SEO_REQUEST_TIMEOUT_SECS") {
            config.extraction.request_timeout_secs = value
                .parse()
                .context(format!("Invalid SEO_REQUEST_TIMEOUT_SECS: {}", value))?;
        }
        if let Some(value) = lookup("SEO_LOG_JSON") {
            config.logging.json = matches!(value.trim().to_lowercase().as_str(), "1" | "true" | "yes");
        }

        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config_from(vars: &[(&str, &str)]) -> Result<AppConfig> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        AppConfig::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn test_defaults() {
        let config = config_from(&[]).unwrap();
        assert_eq!(config.mode, OperationMode::Balanced);
        assert_eq!(config.extraction.min_confidence, 0.6);
        assert_eq!(config.report.top_keywords, 10);
        assert!(config.extraction.token.is_none());
        assert!(config.cache.enabled);
    }

    #[test]
    fn test_mode_preset_and_overrides() {
        let config = config_from(&[
            ("SEO_MODE", "Accurate"),
            ("DANDELION_TOKEN", "secret"),
            ("SEO_MIN_CONFIDENCE", "0.8"),
            ("SEO_LOG_JSON", "true"),
        ])
        .unwrap();

        assert_eq!(config.mode, OperationMode::Accurate);
        assert!(!config.cache.enabled);
        assert_eq!(config.extraction.token.as_deref(), Some("secret"));
        assert_eq!(config.extraction.min_confidence, 0.8);
        assert!(config.logging.json);
    }

    #[test]
    fn test_invalid_values_are_errors() {
        assert!(config_from(&[("SEO_MODE", "turbo")]).is_err());
        assert!(config_from(&[("SEO_MIN_CONFIDENCE", "high")]).is_err());
        assert!(config_from(&[("SEO_MIN_CONFIDENCE", "1.5")]).is_err());
        assert!(config_from(&[("SEO_REQUEST_TIMEOUT_SECS", "-1")]).is_err());
    }

    #[test]
    fn test_token_is_not_serialized() {
        let mut config = AppConfig::default();
        config.extraction.token = Some("secret".to_string());
        let json = serde_json::to_string(&config).unwrap();
        assert!(!json.contains("secret"));
    }
}
