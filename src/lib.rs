#![warn(missing_docs)]
//! flashedit - AI image editing with prompt suggestions.
//!
//! Upload an image, get creative editing ideas for it, and ask a multimodal
//! model to perform an edit. Two independent, stateless flows share one
//! configured client:
//!
//! - **Suggestions**: the image plus a fixed instruction, answered as JSON
//!   constrained by a declared schema. Transient failures are retried with
//!   backoff; any failure degrades to an empty list.
//! - **Edits**: the image plus a free-text prompt, answered with an image.
//!   One attempt; failures come back as classified, readable errors.
//!
//! # Quick Start
//!
//! ```no_run
//! use flashedit::{ImageInput, Studio};
//!
//! #[tokio::main]
//! async fn main() -> flashedit::Result<()> {
//!     let studio = Studio::from_env()?;
//!     let image = ImageInput::from_path("photo.jpg")?;
//!
//!     for s in studio.suggest_prompts(&image).await {
//!         println!("{} [{}]: {}", s.title, s.category, s.prompt);
//!     }
//!
//!     let edited = studio.edit_image(&image, "make it snowy").await?;
//!     edited.save(flashedit::EditedImage::default_download_name())?;
//!     Ok(())
//! }
//! ```
//!
//! # Configuration
//!
//! The API key is read once, when the configuration is built: from
//! [`StudioConfigBuilder::api_key`], else `API_KEY`, else `GOOGLE_API_KEY`.

pub mod backend;
mod config;
mod error;
pub mod image;
pub mod retry;
mod studio;
pub mod suggestion;

pub use backend::{GeminiBackend, ModelBackend};
pub use config::{
    StudioConfig, StudioConfigBuilder, API_KEY_ENV_VARS, DEFAULT_BASE_URL, DEFAULT_EDIT_MODEL,
    DEFAULT_SUGGESTION_MODEL,
};
pub use error::{Result, StudioError};
pub use image::{clean_base64, EditedImage, ImageFormat, ImageInput};
pub use retry::{with_retry, RetryPolicy};
pub use studio::Studio;
pub use suggestion::PromptSuggestion;

/// Prelude for convenient imports.
pub mod prelude {
    pub use crate::error::{Result, StudioError};
    pub use crate::image::{EditedImage, ImageInput};
    pub use crate::studio::Studio;
    pub use crate::suggestion::PromptSuggestion;
    pub use crate::{RetryPolicy, StudioConfig};
}
