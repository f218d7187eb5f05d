//! Error types for suggestion and edit requests.

/// Substrings marking an infrastructure-level failure worth retrying.
const TRANSIENT_MARKERS: [&str; 3] = ["500", "xhr", "Rpc failed"];

/// Maximum length of an upstream error message kept in an error value.
const MAX_ERROR_MESSAGE_LEN: usize = 300;

/// Errors that can occur while talking to the image model.
#[derive(Debug, thiserror::Error)]
pub enum StudioError {
    /// API key missing or malformed at construction time.
    #[error("configuration error: {0}")]
    Config(String),

    /// The remote service rejected the credentials.
    #[error("invalid API key: {0}")]
    Auth(String),

    /// Quota or rate limit exhausted.
    #[error("quota exceeded: {0}")]
    QuotaExceeded(String),

    /// The model, or the requested capability, is not available for this key.
    #[error("model unavailable: {0}")]
    ModelUnavailable(String),

    /// Generic edit failure, already reduced to a readable message.
    #[error("image edit failed: {0}")]
    EditFailed(String),

    /// Content was blocked by safety filters.
    #[error("content blocked: {0}")]
    ContentBlocked(String),

    /// The call succeeded but the API returned no candidates or no content.
    #[error("the API returned an empty response; try again or rephrase your prompt")]
    EmptyResponse,

    /// The model answered but produced no image.
    #[error("the model did not produce an image; try clarifying your prompt")]
    NoImage {
        /// Text the model returned instead of an image, if any.
        model_text: Option<String>,
    },

    /// Invalid request parameters.
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    /// API returned an error response.
    #[error("API error: {status} - {message}")]
    Api {
        /// HTTP status code.
        status: u16,
        /// Sanitized upstream message.
        message: String,
    },

    /// Network or HTTP error.
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    /// Failed to decode base64 data.
    #[error("failed to decode: {0}")]
    Decode(String),

    /// I/O error (e.g., reading the source image or saving the result).
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl StudioError {
    /// Returns true if this error is likely transient and worth retrying.
    ///
    /// Transport failures (other than undecodable bodies), HTTP 5xx responses
    /// and any error whose message carries one of the infrastructure markers
    /// are transient. Everything else is terminal.
    pub fn is_transient(&self) -> bool {
        match self {
            // A body that fails to decode will fail the same way again.
            Self::Network(e) => !e.is_decode(),
            Self::Json(_) | Self::Decode(_) => false,
            Self::Api { status, .. } if (500..600).contains(status) => true,
            _ => {
                let message = self.to_string();
                TRANSIENT_MARKERS.iter().any(|m| message.contains(m))
            }
        }
    }

    fn auth_rejected() -> Self {
        Self::Auth("the API key was rejected; set API_KEY to a valid key and restart".into())
    }

    /// Maps a raw remote failure onto the user-facing categories.
    ///
    /// Errors that already carry a user-facing category pass through
    /// unchanged. `Api` and `Network` errors never survive this call.
    pub fn classify(self) -> Self {
        let (status, message) = match self {
            Self::Api { status, message } => (Some(status), message),
            Self::Network(e) => {
                return Self::EditFailed(format!(
                    "could not reach the image service ({}); check your connection and try again",
                    sanitize_error_message(&e.to_string())
                ));
            }
            other => return other,
        };

        let lower = message.to_lowercase();

        // Key problems first: they can arrive as 400 as well as 401/403.
        if lower.contains("api key not valid")
            || lower.contains("api_key_invalid")
            || lower.contains("api key expired")
            || lower.contains("unauthenticated")
        {
            return Self::auth_rejected();
        }

        if status == Some(429)
            || lower.contains("quota")
            || lower.contains("resource_exhausted")
            || lower.contains("rate limit")
        {
            return Self::QuotaExceeded(
                "the usage quota for this API key is exhausted; wait a moment or check your plan"
                    .into(),
            );
        }

        // A 403 for a disabled feature or API is not a credential problem.
        if status == Some(404)
            || lower.contains("not found")
            || lower.contains("not supported")
            || lower.contains("not enabled")
            || lower.contains("not available")
            || lower.contains("disabled")
        {
            return Self::ModelUnavailable(
                "the image model or image output is not available for this API key".into(),
            );
        }

        if matches!(status, Some(401 | 403)) || lower.contains("permission_denied") {
            return Self::auth_rejected();
        }

        if lower.contains("safety") || lower.contains("blocked") || lower.contains("prohibited") {
            return Self::ContentBlocked(message);
        }

        match status {
            Some(status) => Self::EditFailed(format!("the service answered {status}: {message}")),
            None => Self::EditFailed(message),
        }
    }
}

/// Reduces an upstream error body to a short, single-line message.
///
/// Google APIs wrap errors as `{"error": {"status": "...", "message": "..."}}`;
/// when that shape is present the result is `STATUS: message`.
pub(crate) fn sanitize_error_message(body: &str) -> String {
    #[derive(serde::Deserialize)]
    struct Envelope {
        error: Detail,
    }

    #[derive(serde::Deserialize)]
    struct Detail {
        #[serde(default)]
        status: Option<String>,
        #[serde(default)]
        message: Option<String>,
    }

    let text = match serde_json::from_str::<Envelope>(body) {
        Ok(Envelope { error }) => match (error.status, error.message) {
            (Some(status), Some(message)) => format!("{status}: {message}"),
            (None, Some(message)) => message,
            (Some(status), None) => status,
            (None, None) => body.to_string(),
        },
        Err(_) => body.to_string(),
    };

    let single_line = text.split_whitespace().collect::<Vec<_>>().join(" ");
    if single_line.chars().count() > MAX_ERROR_MESSAGE_LEN {
        let truncated: String = single_line.chars().take(MAX_ERROR_MESSAGE_LEN).collect();
        format!("{truncated}...")
    } else {
        single_line
    }
}

/// Result type alias for studio operations.
pub type Result<T> = std::result::Result<T, StudioError>;
