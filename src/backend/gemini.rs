//! Gemini REST backend.

use crate::backend::types::{GenerateContentRequest, GenerateContentResponse};
use crate::backend::ModelBackend;
use crate::config::StudioConfig;
use crate::error::{sanitize_error_message, Result, StudioError};
use async_trait::async_trait;
use std::time::Instant;

/// `ModelBackend` talking to the Gemini `generateContent` endpoint over HTTPS.
pub struct GeminiBackend {
    client: reqwest::Client,
    api_key: String,
    base_url: String,
}

impl GeminiBackend {
    /// Creates a backend from a validated configuration.
    pub fn new(config: &StudioConfig) -> Result<Self> {
        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = config.request_timeout {
            builder = builder.timeout(timeout);
        }

        Ok(Self {
            client: builder.build()?,
            api_key: config.api_key.clone(),
            base_url: config.base_url.clone(),
        })
    }

    fn model_url(&self, model: &str) -> String {
        format!("{}/models/{}", self.base_url, model)
    }

    fn parse_error(&self, status: u16, text: &str) -> StudioError {
        StudioError::Api {
            status,
            message: sanitize_error_message(text),
        }
    }
}

/// Parses a success body. A malformed body is a terminal `Json` error.
fn decode_response(text: &str) -> Result<GenerateContentResponse> {
    serde_json::from_str(text).map_err(|e| {
        tracing::warn!(error = %e, "undecodable generateContent response");
        StudioError::Json(e)
    })
}

#[async_trait]
impl ModelBackend for GeminiBackend {
    async fn generate_content(
        &self,
        model: &str,
        request: &GenerateContentRequest,
    ) -> Result<GenerateContentResponse> {
        let start = Instant::now();
        let url = format!("{}:generateContent", self.model_url(model));

        let response = self
            .client
            .post(&url)
            .header("x-goog-api-key", &self.api_key)
            .header("Content-Type", "application/json")
            .json(request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(self.parse_error(status.as_u16(), &text));
        }

        let body = decode_response(&response.text().await?)?;

        tracing::debug!(
            model,
            candidates = body.candidates.len(),
            duration_ms = start.elapsed().as_millis() as u64,
            "generateContent complete"
        );

        Ok(body)
    }

    async fn health_check(&self, model: &str) -> Result<()> {
        let response = self
            .client
            .get(self.model_url(model))
            .header("x-goog-api-key", &self.api_key)
            .send()
            .await?;

        match response.status().as_u16() {
            401 | 403 => Err(StudioError::Auth("Invalid API key".into())),
            404 => Err(StudioError::ModelUnavailable(format!(
                "model {model} not found; verify the model name"
            ))),
            s if !(200..300).contains(&s) => Err(StudioError::Api {
                status: s,
                message: "Health check failed".into(),
            }),
            _ => Ok(()),
        }
    }
}
