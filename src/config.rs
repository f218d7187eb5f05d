//! Client configuration, resolved and validated once at startup.

use crate::error::{Result, StudioError};
use crate::retry::RetryPolicy;
use std::fmt;
use std::time::Duration;

/// Environment variables consulted for the API key, in order.
pub const API_KEY_ENV_VARS: [&str; 2] = ["API_KEY", "GOOGLE_API_KEY"];

/// Default REST endpoint.
pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

/// Default model for image edits.
pub const DEFAULT_EDIT_MODEL: &str = "gemini-2.5-flash-image";

/// Default model for prompt suggestions.
pub const DEFAULT_SUGGESTION_MODEL: &str = "gemini-3-flash-preview";

/// Validated client configuration.
#[derive(Clone)]
pub struct StudioConfig {
    pub(crate) api_key: String,
    pub(crate) base_url: String,
    pub(crate) edit_model: String,
    pub(crate) suggestion_model: String,
    pub(crate) retry_policy: RetryPolicy,
    pub(crate) request_timeout: Option<Duration>,
}

impl StudioConfig {
    /// Creates a new `StudioConfigBuilder`.
    pub fn builder() -> StudioConfigBuilder {
        StudioConfigBuilder::new()
    }

    /// Builds a configuration from the environment alone.
    pub fn from_env() -> Result<Self> {
        Self::builder().build()
    }

    /// Base URL of the REST API.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Model used by the edit flow.
    pub fn edit_model(&self) -> &str {
        &self.edit_model
    }

    /// Model used by the suggestion flow.
    pub fn suggestion_model(&self) -> &str {
        &self.suggestion_model
    }

    /// Retry policy for suggestion requests.
    pub fn retry_policy(&self) -> &RetryPolicy {
        &self.retry_policy
    }

    /// Per-request timeout, if any.
    pub fn request_timeout(&self) -> Option<Duration> {
        self.request_timeout
    }
}

// Keep the key out of logs.
impl fmt::Debug for StudioConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StudioConfig")
            .field("api_key", &"<redacted>")
            .field("base_url", &self.base_url)
            .field("edit_model", &self.edit_model)
            .field("suggestion_model", &self.suggestion_model)
            .field("retry_policy", &self.retry_policy)
            .field("request_timeout", &self.request_timeout)
            .finish()
    }
}

/// Builder for `StudioConfig`.
#[derive(Debug, Clone, Default)]
pub struct StudioConfigBuilder {
    api_key: Option<String>,
    base_url: Option<String>,
    edit_model: Option<String>,
    suggestion_model: Option<String>,
    retry_policy: RetryPolicy,
    request_timeout: Option<Duration>,
}

impl StudioConfigBuilder {
    /// Creates a new builder with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the API key. Falls back to `API_KEY`, then `GOOGLE_API_KEY`.
    pub fn api_key(mut self, key: impl Into<String>) -> Self {
        self.api_key = Some(key.into());
        self
    }

    /// Overrides the REST endpoint.
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = Some(url.into());
        self
    }

    /// Sets the model used for edits.
    pub fn edit_model(mut self, model: impl Into<String>) -> Self {
        self.edit_model = Some(model.into());
        self
    }

    /// Sets the model used for suggestions.
    pub fn suggestion_model(mut self, model: impl Into<String>) -> Self {
        self.suggestion_model = Some(model.into());
        self
    }

    /// Sets the retry policy for suggestion requests.
    pub fn retry_policy(mut self, policy: RetryPolicy) -> Self {
        self.retry_policy = policy;
        self
    }

    /// Sets a timeout applied to every HTTP request.
    pub fn request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = Some(timeout);
        self
    }

    /// Resolves the API key and validates the configuration.
    pub fn build(self) -> Result<StudioConfig> {
        let api_key = self
            .api_key
            .or_else(|| {
                API_KEY_ENV_VARS
                    .iter()
                    .find_map(|var| std::env::var(var).ok().filter(|v| !v.trim().is_empty()))
            })
            .ok_or_else(|| {
                StudioError::Config(format!(
                    "no API key provided; set {} in the environment",
                    API_KEY_ENV_VARS.join(" or ")
                ))
            })?;
        validate_api_key(&api_key)?;

        let base_url = self
            .base_url
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string())
            .trim_end_matches('/')
            .to_string();
        if !(base_url.starts_with("https://") || base_url.starts_with("http://")) {
            return Err(StudioError::Config(format!(
                "base URL must be http(s): {base_url}"
            )));
        }

        let edit_model = non_empty_model(self.edit_model, DEFAULT_EDIT_MODEL, "edit")?;
        let suggestion_model =
            non_empty_model(self.suggestion_model, DEFAULT_SUGGESTION_MODEL, "suggestion")?;

        Ok(StudioConfig {
            api_key,
            base_url,
            edit_model,
            suggestion_model,
            retry_policy: self.retry_policy,
            request_timeout: self.request_timeout,
        })
    }
}

fn validate_api_key(key: &str) -> Result<()> {
    if key.trim().is_empty() {
        return Err(StudioError::Config("API key is empty".into()));
    }
    if key.chars().any(|c| c.is_whitespace() || c.is_control()) {
        return Err(StudioError::Config(
            "API key contains whitespace; check for a stray newline or quote".into(),
        ));
    }
    Ok(())
}

fn non_empty_model(model: Option<String>, default: &str, role: &str) -> Result<String> {
    match model {
        Some(m) if m.trim().is_empty() => {
            Err(StudioError::Config(format!("{role} model name is empty")))
        }
        Some(m) => Ok(m),
        None => Ok(default.to_string()),
    }
}
