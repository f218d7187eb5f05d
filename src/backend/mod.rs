//! The remote model seam.

mod gemini;
mod types;

pub use gemini::GeminiBackend;
pub use types::{
    Candidate, Content, GenerateContentRequest, GenerateContentResponse, GenerationConfig,
    InlineData, PromptFeedback, RequestPart, ResponseContent, ResponsePart,
};

use crate::error::Result;
use async_trait::async_trait;

/// Something that can run one multimodal generation request.
#[async_trait]
pub trait ModelBackend: Send + Sync {
    /// Sends `request` to `model` and returns the raw response.
    async fn generate_content(
        &self,
        model: &str,
        request: &GenerateContentRequest,
    ) -> Result<GenerateContentResponse>;

    /// Checks that `model` is reachable with the configured credentials.
    async fn health_check(&self, model: &str) -> Result<()>;
}
