//! Suggestion and edit flows.

use crate::backend::{
    GeminiBackend, GenerateContentRequest, GenerateContentResponse, ModelBackend,
};
use crate::config::StudioConfig;
use crate::error::{Result, StudioError};
use crate::image::{EditedImage, ImageInput};
use crate::retry::{with_retry, RetryPolicy};
use crate::suggestion::{self, PromptSuggestion, SUGGESTION_INSTRUCTION};
use std::sync::Arc;

/// Finish reasons meaning the output was withheld by a safety filter.
const BLOCKED_FINISH_REASONS: [&str; 7] = [
    "SAFETY",
    "IMAGE_SAFETY",
    "IMAGE_PROHIBITED_CONTENT",
    "IMAGE_RECITATION",
    "RECITATION",
    "PROHIBITED_CONTENT",
    "BLOCKLIST",
];

/// Runs prompt suggestions and image edits against a model backend.
///
/// Every call builds its own request and owns its own response; a `Studio`
/// can be shared freely between tasks.
#[derive(Clone)]
pub struct Studio {
    backend: Arc<dyn ModelBackend>,
    edit_model: String,
    suggestion_model: String,
    retry_policy: RetryPolicy,
}

impl Studio {
    /// Creates a studio talking to Gemini with the given configuration.
    pub fn new(config: StudioConfig) -> Result<Self> {
        let backend = GeminiBackend::new(&config)?;
        Ok(Self::with_backend(config, Arc::new(backend)))
    }

    /// Creates a studio from the environment (`API_KEY` / `GOOGLE_API_KEY`).
    pub fn from_env() -> Result<Self> {
        Self::new(StudioConfig::from_env()?)
    }

    /// Creates a studio using a custom backend.
    pub fn with_backend(config: StudioConfig, backend: Arc<dyn ModelBackend>) -> Self {
        Self {
            backend,
            edit_model: config.edit_model,
            suggestion_model: config.suggestion_model,
            retry_policy: config.retry_policy,
        }
    }

    /// Asks the model for editing ideas. Never fails.
    ///
    /// Any failure, whether a remote error after retries or an unusable
    /// response, yields an empty list so the user can still type a prompt.
    pub async fn suggest_prompts(&self, image: &ImageInput) -> Vec<PromptSuggestion> {
        match self.try_suggest_prompts(image).await {
            Ok(suggestions) => suggestions,
            Err(e) => {
                tracing::error!(error = %e, "prompt suggestions failed");
                Vec::new()
            }
        }
    }

    /// Like [`Studio::suggest_prompts`], but reports remote failures.
    ///
    /// Unparseable output is still an empty `Ok`.
    pub async fn try_suggest_prompts(&self, image: &ImageInput) -> Result<Vec<PromptSuggestion>> {
        image.validate()?;

        let request = GenerateContentRequest::multimodal(image, SUGGESTION_INSTRUCTION)
            .with_generation_config(suggestion::generation_config());

        let backend = &self.backend;
        let model = self.suggestion_model.as_str();
        let request = &request;

        let suggestions = with_retry(&self.retry_policy, || async move {
            let response = backend.generate_content(model, request).await?;
            let suggestions = match response.text() {
                Some(text) => suggestion::parse_suggestions(&text),
                None => Vec::new(),
            };
            Ok::<_, StudioError>(suggestions)
        })
        .await?;

        tracing::debug!(count = suggestions.len(), "received prompt suggestions");
        Ok(suggestions)
    }

    /// Edits `image` according to `prompt`. A single attempt, no retries.
    ///
    /// Returns the first image the model produced, or a classified error with
    /// a readable message.
    pub async fn edit_image(&self, image: &ImageInput, prompt: &str) -> Result<EditedImage> {
        image.validate()?;
        if prompt.trim().is_empty() {
            return Err(StudioError::InvalidRequest("prompt is empty".into()));
        }

        let request = GenerateContentRequest::multimodal(image, prompt);

        let response = self
            .backend
            .generate_content(&self.edit_model, &request)
            .await
            .map_err(|e| {
                tracing::error!(error = %e, "image edit request failed");
                e.classify()
            })?;

        extract_image(response)
    }

    /// Checks that both configured models are reachable.
    pub async fn health_check(&self) -> Result<()> {
        self.backend.health_check(&self.edit_model).await?;
        self.backend.health_check(&self.suggestion_model).await
    }

    /// Model used by the edit flow.
    pub fn edit_model(&self) -> &str {
        &self.edit_model
    }

    /// Model used by the suggestion flow.
    pub fn suggestion_model(&self) -> &str {
        &self.suggestion_model
    }
}

fn extract_image(response: GenerateContentResponse) -> Result<EditedImage> {
    if let Some(msg) = response.block_message() {
        return Err(StudioError::ContentBlocked(msg));
    }

    let candidate = response
        .candidates
        .into_iter()
        .next()
        .ok_or(StudioError::EmptyResponse)?;

    if let Some(reason) = candidate.finish_reason.as_deref() {
        if BLOCKED_FINISH_REASONS.contains(&reason) {
            return Err(StudioError::ContentBlocked(format!(
                "the edit was blocked by the safety filter ({reason}); try a different prompt"
            )));
        }
    }

    let parts = candidate
        .content
        .map(|c| c.parts)
        .filter(|parts| !parts.is_empty())
        .ok_or(StudioError::EmptyResponse)?;

    let mut texts = Vec::new();
    let mut image = None;
    for part in parts {
        if let Some(text) = part.text {
            texts.push(text);
        }
        if image.is_none() {
            image = part.inline_data;
        }
    }
    let model_text = (!texts.is_empty()).then(|| texts.join("\n"));

    match image {
        Some(inline) => {
            if let Some(text) = &model_text {
                tracing::debug!(text = %text, "model returned text alongside the image");
            }
            Ok(EditedImage::new(inline.data, inline.mime_type, model_text))
        }
        None => {
            tracing::warn!(text = ?model_text, "model returned no image");
            Err(StudioError::NoImage { model_text })
        }
    }
}
