//! Prompt suggestions and their structured-output contract.

use crate::backend::GenerationConfig;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

/// Instruction sent alongside the image when asking for suggestions.
pub const SUGGESTION_INSTRUCTION: &str = "Examine this image. Suggest 5 highly creative and specific editing prompts. Focus on artistic styles, atmospheric lighting, or adding imaginative elements. Return ONLY a JSON array of objects with 'title', 'prompt', and 'category'.";

/// Fields every suggestion must carry, with the hint given to the model.
const SUGGESTION_FIELDS: [(&str, &str); 3] = [
    ("title", "A punchy name for the edit"),
    ("prompt", "The descriptive edit prompt"),
    ("category", "Style (e.g., Cyberpunk, Retro, Surreal)"),
];

/// An editing idea proposed by the model.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PromptSuggestion {
    /// Short name for the edit.
    pub title: String,
    /// The edit prompt itself.
    pub prompt: String,
    /// Free-form style label.
    pub category: String,
}

/// JSON schema the suggestion response must satisfy.
pub fn response_schema() -> Value {
    let properties: serde_json::Map<String, Value> = SUGGESTION_FIELDS
        .iter()
        .map(|(name, description)| {
            (
                name.to_string(),
                json!({ "type": "STRING", "description": description }),
            )
        })
        .collect();
    let required: Vec<&str> = SUGGESTION_FIELDS.iter().map(|(name, _)| *name).collect();

    json!({
        "type": "ARRAY",
        "items": {
            "type": "OBJECT",
            "properties": properties,
            "required": required,
        }
    })
}

/// Generation config forcing JSON output that matches [`response_schema`].
pub fn generation_config() -> GenerationConfig {
    GenerationConfig {
        response_mime_type: Some("application/json".into()),
        response_schema: Some(response_schema()),
    }
}

/// Parses model output into suggestions, checking each entry against the contract.
///
/// Malformed JSON, or JSON that is not an array, yields an empty list. Entries
/// missing a string field, or with a blank prompt, are dropped; the rest keep
/// their order.
pub fn parse_suggestions(text: &str) -> Vec<PromptSuggestion> {
    let body = strip_code_fence(text);

    let entries = match serde_json::from_str::<Value>(body) {
        Ok(Value::Array(entries)) => entries,
        Ok(other) => {
            tracing::warn!(kind = json_kind(&other), "suggestion response is not a JSON array");
            return Vec::new();
        }
        Err(e) => {
            tracing::warn!(error = %e, "failed to parse suggestion JSON");
            return Vec::new();
        }
    };

    let total = entries.len();
    let suggestions: Vec<PromptSuggestion> = entries
        .into_iter()
        .filter_map(|entry| serde_json::from_value::<PromptSuggestion>(entry).ok())
        .filter(|s| !s.prompt.trim().is_empty())
        .collect();

    if suggestions.len() < total {
        tracing::warn!(
            dropped = total - suggestions.len(),
            total,
            "dropped suggestions that do not match the schema"
        );
    }

    suggestions
}

fn strip_code_fence(text: &str) -> &str {
    let trimmed = text.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    // Drop the info string (e.g. "json") on the opening line.
    let rest = rest.split_once('\n').map_or("", |(_, body)| body);
    rest.trim_end().strip_suffix("```").unwrap_or(rest).trim()
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
