//! Image payloads going into and coming out of the model.

use crate::error::{Result, StudioError};
use base64::Engine;
use std::path::Path;
use std::time::{SystemTime, UNIX_EPOCH};

/// Prefix of every edit result data URL.
pub const PNG_DATA_URL_PREFIX: &str = "data:image/png;base64,";

/// Strips a `data:<mime>;base64,` prefix, if present.
///
/// Anything up to and including the first comma is dropped; input without a
/// comma is returned unchanged, so the function is idempotent on stripped data.
pub fn clean_base64(data: &str) -> &str {
    match data.split_once(',') {
        Some((_, payload)) => payload,
        None => data,
    }
}

/// Supported source image formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageFormat {
    /// PNG format (lossless).
    Png,
    /// JPEG format (lossy).
    Jpeg,
    /// WebP format.
    WebP,
    /// GIF format.
    Gif,
}

impl ImageFormat {
    /// Returns the MIME type for this format.
    pub fn mime_type(&self) -> &'static str {
        match self {
            Self::Png => "image/png",
            Self::Jpeg => "image/jpeg",
            Self::WebP => "image/webp",
            Self::Gif => "image/gif",
        }
    }

    /// Attempts to detect format from file extension.
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_lowercase().as_str() {
            "png" => Some(Self::Png),
            "jpg" | "jpeg" => Some(Self::Jpeg),
            "webp" => Some(Self::WebP),
            "gif" => Some(Self::Gif),
            _ => None,
        }
    }

    /// Detects image format from magic bytes.
    pub fn from_magic_bytes(data: &[u8]) -> Option<Self> {
        if data.starts_with(&[0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A]) {
            return Some(Self::Png);
        }
        if data.starts_with(&[0xFF, 0xD8, 0xFF]) {
            return Some(Self::Jpeg);
        }
        if data.starts_with(b"GIF87a") || data.starts_with(b"GIF89a") {
            return Some(Self::Gif);
        }
        // WebP: RIFF....WEBP
        if data.len() >= 12 && data.starts_with(b"RIFF") && &data[8..12] == b"WEBP" {
            return Some(Self::WebP);
        }
        None
    }
}

/// An image to analyse or edit, as base64 text plus its MIME type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageInput {
    base64_data: String,
    mime_type: String,
}

impl ImageInput {
    /// Creates an input from base64 data, with or without a data-URL prefix.
    pub fn new(base64_data: impl Into<String>, mime_type: impl Into<String>) -> Self {
        Self {
            base64_data: base64_data.into(),
            mime_type: mime_type.into(),
        }
    }

    /// Creates an input by encoding raw image bytes.
    pub fn from_bytes(bytes: &[u8], mime_type: impl Into<String>) -> Self {
        Self::new(
            base64::engine::general_purpose::STANDARD.encode(bytes),
            mime_type,
        )
    }

    /// Parses a `data:<mime>;base64,<payload>` URL.
    pub fn from_data_url(url: &str) -> Result<Self> {
        let (header, payload) = url
            .strip_prefix("data:")
            .and_then(|rest| rest.split_once(','))
            .ok_or_else(|| StudioError::InvalidRequest("not a data URL".into()))?;

        let mime_type = header.strip_suffix(";base64").ok_or_else(|| {
            StudioError::InvalidRequest("data URL is not base64-encoded".into())
        })?;

        if mime_type.is_empty() {
            return Err(StudioError::InvalidRequest(
                "data URL has no MIME type".into(),
            ));
        }

        Ok(Self::new(payload, mime_type))
    }

    /// Reads an image file, detecting its type from content or extension.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let bytes = std::fs::read(path)?;

        let format = ImageFormat::from_magic_bytes(&bytes)
            .or_else(|| {
                path.extension()
                    .and_then(|e| e.to_str())
                    .and_then(ImageFormat::from_extension)
            })
            .ok_or_else(|| {
                StudioError::InvalidRequest(format!(
                    "{} is not a PNG, JPEG, WebP or GIF image",
                    path.display()
                ))
            })?;

        Ok(Self::from_bytes(&bytes, format.mime_type()))
    }

    /// The base64 payload without any data-URL prefix.
    pub fn payload(&self) -> &str {
        clean_base64(&self.base64_data)
    }

    /// The MIME type of the image.
    pub fn mime_type(&self) -> &str {
        &self.mime_type
    }

    /// Returns an error if there is nothing to send.
    pub(crate) fn validate(&self) -> Result<()> {
        if self.payload().trim().is_empty() {
            return Err(StudioError::InvalidRequest("image data is empty".into()));
        }
        if self.mime_type.trim().is_empty() {
            return Err(StudioError::InvalidRequest("image MIME type is empty".into()));
        }
        Ok(())
    }
}

/// An edited image returned by the model.
#[derive(Debug, Clone, PartialEq, Eq)]
#[must_use = "edited image should be saved or displayed"]
pub struct EditedImage {
    base64_data: String,
    mime_type: String,
    model_text: Option<String>,
}

impl EditedImage {
    pub(crate) fn new(
        base64_data: impl Into<String>,
        mime_type: impl Into<String>,
        model_text: Option<String>,
    ) -> Self {
        Self {
            base64_data: base64_data.into(),
            mime_type: mime_type.into(),
            model_text,
        }
    }

    /// The base64 payload exactly as the model returned it.
    pub fn base64(&self) -> &str {
        &self.base64_data
    }

    /// MIME type the model reported for the image part.
    pub fn reported_mime_type(&self) -> &str {
        &self.mime_type
    }

    /// Text the model returned alongside the image, if any.
    pub fn model_text(&self) -> Option<&str> {
        self.model_text.as_deref()
    }

    /// The image as a PNG data URL.
    pub fn data_url(&self) -> String {
        format!("{PNG_DATA_URL_PREFIX}{}", self.base64_data)
    }

    /// Decodes the payload into raw image bytes.
    pub fn decode(&self) -> Result<Vec<u8>> {
        base64::engine::general_purpose::STANDARD
            .decode(self.base64_data.trim())
            .map_err(|e| StudioError::Decode(e.to_string()))
    }

    /// Saves the decoded image to the specified path.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        std::fs::write(path, self.decode()?)?;
        Ok(())
    }

    /// File name offered for download, stamped with `millis` since the epoch.
    pub fn download_file_name(millis: u128) -> String {
        format!("flash-edit-{millis}.png")
    }

    /// File name offered for download, stamped with the current time.
    pub fn default_download_name() -> String {
        let millis = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_millis())
            .unwrap_or_default();
        Self::download_file_name(millis)
    }
}
