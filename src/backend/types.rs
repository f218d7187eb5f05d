//! Wire types for the `generateContent` call.

use crate::image::ImageInput;
use serde::{Deserialize, Serialize};

/// A single multimodal generation request.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateContentRequest {
    /// Conversation turns; this crate always sends exactly one.
    pub contents: Vec<Content>,
    /// Output constraints, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub generation_config: Option<GenerationConfig>,
}

impl GenerateContentRequest {
    /// Builds a one-turn request: the image first, then the text.
    pub fn multimodal(image: &ImageInput, text: impl Into<String>) -> Self {
        Self {
            contents: vec![Content {
                parts: vec![
                    RequestPart::InlineData {
                        inline_data: InlineData {
                            mime_type: image.mime_type().to_string(),
                            data: image.payload().to_string(),
                        },
                    },
                    RequestPart::Text { text: text.into() },
                ],
            }],
            generation_config: None,
        }
    }

    /// Attaches output constraints.
    pub fn with_generation_config(mut self, config: GenerationConfig) -> Self {
        self.generation_config = Some(config);
        self
    }
}

/// One turn of request content.
#[derive(Debug, Clone, Serialize)]
pub struct Content {
    /// Ordered parts of the turn.
    pub parts: Vec<RequestPart>,
}

/// A part in a request - text or inline image data.
#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum RequestPart {
    /// Plain text.
    Text {
        /// The text.
        text: String,
    },
    /// Base64 image bytes.
    InlineData {
        /// The image payload.
        #[serde(rename = "inlineData")]
        inline_data: InlineData,
    },
}

/// Base64-encoded bytes with their MIME type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InlineData {
    /// MIME type of the payload.
    #[serde(default)]
    pub mime_type: String,
    /// Base64 payload, without a data-URL prefix.
    pub data: String,
}

/// Output constraints for a request.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationConfig {
    /// MIME type the text output must have (e.g. `application/json`).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub response_mime_type: Option<String>,
    /// Schema the JSON output must satisfy.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub response_schema: Option<serde_json::Value>,
}

/// Response to a `generateContent` call.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateContentResponse {
    /// Generated candidates, usually one.
    #[serde(default)]
    pub candidates: Vec<Candidate>,
    /// Set when the prompt itself was rejected.
    #[serde(default)]
    pub prompt_feedback: Option<PromptFeedback>,
}

impl GenerateContentResponse {
    /// Concatenated text of the first candidate, if it has any.
    pub fn text(&self) -> Option<String> {
        let parts = &self.candidates.first()?.content.as_ref()?.parts;
        let text: String = parts.iter().filter_map(|p| p.text.as_deref()).collect();
        (!text.is_empty()).then_some(text)
    }

    /// Block reason message, if the prompt was blocked.
    pub fn block_message(&self) -> Option<String> {
        let feedback = self.prompt_feedback.as_ref()?;
        let reason = feedback.block_reason.as_ref()?;
        Some(
            feedback
                .block_reason_message
                .clone()
                .unwrap_or_else(|| format!("Prompt blocked: {reason}")),
        )
    }
}

/// A generated candidate.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Candidate {
    /// Candidate content.
    #[serde(default)]
    pub content: Option<ResponseContent>,
    /// Why generation stopped (`STOP`, `SAFETY`, ...).
    #[serde(default)]
    pub finish_reason: Option<String>,
}

/// Content of a candidate.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ResponseContent {
    /// Ordered response parts.
    #[serde(default)]
    pub parts: Vec<ResponsePart>,
}

/// A response part: text, inline data, or both absent.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResponsePart {
    /// Text output.
    #[serde(default)]
    pub text: Option<String>,
    /// Image output.
    #[serde(default)]
    pub inline_data: Option<InlineData>,
}

/// Prompt-level feedback.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PromptFeedback {
    /// Why the prompt was blocked.
    #[serde(default)]
    pub block_reason: Option<String>,
    /// Human-readable explanation.
    #[serde(default)]
    pub block_reason_message: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_multimodal_request_serialization() {
        let image = ImageInput::new("data:image/jpeg;base64,/9j/4AAQ", "image/jpeg");
        let request = GenerateContentRequest::multimodal(&image, "make it snowy");
        let json = serde_json::to_value(&request).unwrap();

        let parts = &json["contents"][0]["parts"];
        assert_eq!(parts[0]["inlineData"]["mimeType"], "image/jpeg");
        assert_eq!(parts[0]["inlineData"]["data"], "/9j/4AAQ");
        assert_eq!(parts[1]["text"], "make it snowy");
        assert!(json.get("generationConfig").is_none());
    }

    #[test]
    fn test_generation_config_uses_camel_case() {
        let image = ImageInput::new("AAAA", "image/png");
        let request = GenerateContentRequest::multimodal(&image, "describe").with_generation_config(
            GenerationConfig {
                response_mime_type: Some("application/json".into()),
                ..Default::default()
            },
        );
        let json = serde_json::to_value(&request).unwrap();

        assert_eq!(json["generationConfig"]["responseMimeType"], "application/json");
        assert!(json["generationConfig"].get("responseSchema").is_none());
        assert!(json.get("generation_config").is_none());
    }

    #[test]
    fn test_response_deserialization() {
        let json = r#"{
            "candidates": [{
                "content": {
                    "parts": [
                        {"text": "Here you go"},
                        {"inlineData": {"mimeType": "image/png", "data": "iVBORw0KGgo="}}
                    ]
                },
                "finishReason": "STOP"
            }]
        }"#;
        let resp: GenerateContentResponse = serde_json::from_str(json).unwrap();
        assert_eq!(resp.candidates[0].finish_reason.as_deref(), Some("STOP"));
        assert_eq!(resp.text().as_deref(), Some("Here you go"));

        let parts = &resp.candidates[0].content.as_ref().unwrap().parts;
        let inline = parts[1].inline_data.as_ref().unwrap();
        assert_eq!(inline.mime_type, "image/png");
        assert_eq!(inline.data, "iVBORw0KGgo=");
    }

    #[test]
    fn test_response_text_joins_parts() {
        let json = r#"{"candidates": [{"content": {"parts": [{"text": "[{\"a\":"}, {"text": "1}]"}]}}]}"#;
        let resp: GenerateContentResponse = serde_json::from_str(json).unwrap();
        assert_eq!(resp.text().as_deref(), Some(r#"[{"a":1}]"#));
    }

    #[test]
    fn test_empty_response() {
        let resp: GenerateContentResponse = serde_json::from_str("{}").unwrap();
        assert!(resp.candidates.is_empty());
        assert!(resp.text().is_none());
        assert!(resp.block_message().is_none());
    }

    #[test]
    fn test_block_message() {
        let json = r#"{
            "candidates": [],
            "promptFeedback": {"blockReason": "SAFETY"}
        }"#;
        let resp: GenerateContentResponse = serde_json::from_str(json).unwrap();
        assert_eq!(resp.block_message().as_deref(), Some("Prompt blocked: SAFETY"));
    }
}
