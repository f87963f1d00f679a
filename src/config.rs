//! Runtime configuration for external collaborators
//!
//! Credentials are read once, validated, and passed down explicitly:
//! - `OPENAI_API_KEY` (required) for the summarization and rewriting services
//! - `OPENAI_BASE_URL` (optional) for any OpenAI-compatible endpoint
//! - `GITHUB_TOKEN` (optional) for higher GitHub API rate limits

use crate::error::ConfigError;
use std::time::Duration;

/// Environment variable holding the LLM API key
pub const OPENAI_API_KEY: &str = "OPENAI_API_KEY";

/// Environment variable overriding the LLM endpoint
pub const OPENAI_BASE_URL: &str = "OPENAI_BASE_URL";

/// Environment variable holding the GitHub token
pub const GITHUB_TOKEN: &str = "GITHUB_TOKEN";

/// Default chat model
pub const DEFAULT_MODEL: &str = "gpt-4o";

/// Default OpenAI-compatible endpoint
pub const DEFAULT_BASE_URL: &str = "https://api.openai.com";

/// Timeout for LLM requests
const LLM_TIMEOUT: Duration = Duration::from_secs(120);

/// Timeout for registry and source-hosting requests
pub const HTTP_TIMEOUT: Duration = Duration::from_secs(10);

/// Settings for the OpenAI-compatible chat completions service
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LlmConfig {
    /// API key sent as a bearer token
    pub api_key: String,
    /// Model identifier
    pub model: String,
    /// Base URL without the `/v1/chat/completions` suffix
    pub base_url: String,
    /// Per-request timeout
    pub timeout: Duration,
}

impl LlmConfig {
    /// Create a config with default model, endpoint and timeout
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            model: DEFAULT_MODEL.to_string(),
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout: LLM_TIMEOUT,
        }
    }

    /// Override the model
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// Override the endpoint
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }
}

/// Validated configuration for one run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// LLM service settings
    pub llm: LlmConfig,
    /// Optional GitHub token
    pub github_token: Option<String>,
}

impl Config {
    /// Load configuration from the process environment
    pub fn from_env(model: Option<&str>) -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok(), model)
    }

    /// Load configuration through a lookup function
    ///
    /// Empty values are treated as absent.
    pub fn from_lookup<F>(lookup: F, model: Option<&str>) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let api_key = get(OPENAI_API_KEY).ok_or_else(|| {
            ConfigError::missing_credential(
                OPENAI_API_KEY,
                "required for changelog classification and code patches",
            )
        })?;

        let mut llm = LlmConfig::new(api_key);
        if let Some(base_url) = get(OPENAI_BASE_URL) {
            llm = llm.with_base_url(base_url);
        }
        if let Some(model) = model {
            llm = llm.with_model(model);
        }

        Ok(Self {
            llm,
            github_token: get(GITHUB_TOKEN),
        })
    }
}
