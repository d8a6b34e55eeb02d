//! Configuration for the AI request backend

use std::time::Duration;

use crate::{Result, SketchSolveError};

/// Environment variable holding the API key
pub const API_KEY_ENV: &str = "GEMINI_API_KEY";

/// Default multimodal model identifier
pub const DEFAULT_MODEL: &str = "gemini-2.0-flash";

/// Default generateContent endpoint root
pub const DEFAULT_ENDPOINT: &str = "https://generativelanguage.googleapis.com/v1beta/models";

/// Configuration for the AI request pipeline
#[derive(Clone, Debug)]
pub struct AiConfig {
    /// API key for the hosted service
    pub api_key: String,

    /// Model identifier appended to the endpoint
    pub model: String,

    /// Endpoint root (no trailing slash)
    pub endpoint: String,

    /// Per-request timeout
    pub timeout: Duration,
}

impl AiConfig {
    /// Create a config with an explicit API key
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            model: DEFAULT_MODEL.to_string(),
            endpoint: DEFAULT_ENDPOINT.to_string(),
            timeout: Duration::from_secs(60),
        }
    }

    /// Create a config from the `GEMINI_API_KEY` environment variable
    pub fn from_env() -> Result<Self> {
        let api_key = std::env::var(API_KEY_ENV)
            .map_err(|_| SketchSolveError::ConfigError(format!("{API_KEY_ENV} is not set")))?;
        if api_key.trim().is_empty() {
            return Err(SketchSolveError::ConfigError(format!(
                "{API_KEY_ENV} is empty"
            )));
        }
        Ok(Self::new(api_key))
    }

    /// Set the model identifier
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// Set the endpoint root
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }

    /// Set the per-request timeout
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Full generateContent URL for this model
    pub fn request_url(&self) -> String {
        format!(
            "{}/{}:generateContent?key={}",
            self.endpoint, self.model, self.api_key
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = AiConfig::new("test-key");
        assert_eq!(config.model, DEFAULT_MODEL);
        assert_eq!(config.endpoint, DEFAULT_ENDPOINT);
        assert_eq!(config.timeout, Duration::from_secs(60));
    }

    #[test]
    fn test_builder_pattern() {
        let config = AiConfig::new("test-key")
            .with_model("gemini-2.5-pro")
            .with_endpoint("https://example.invalid/models")
            .with_timeout(Duration::from_secs(10));

        assert_eq!(config.model, "gemini-2.5-pro");
        assert_eq!(
            config.request_url(),
            "https://example.invalid/models/gemini-2.5-pro:generateContent?key=test-key"
        );
        assert_eq!(config.timeout, Duration::from_secs(10));
    }
}
