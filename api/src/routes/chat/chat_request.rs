use serde::Deserialize;

use crate::error_handler::{AppError, AppResult};

/// Longest message forwarded upstream, in characters.
pub const MAX_MESSAGE_CHARS: usize = 4000;

#[derive(Debug, Deserialize)]
pub struct ChatRequest {
    #[serde(default)]
    pub message: Option<String>,
}

impl ChatRequest {
    /// Parses the raw body whatever its content type, and returns the
    /// message ready to send upstream.
    pub fn parse_message(body: &[u8]) -> AppResult<String> {
        let req: ChatRequest = serde_json::from_slice(body)
            .map_err(|e| AppError::BadRequest(format!("invalid JSON body: {e}")))?;

        req.message
            .as_deref()
            .and_then(normalize_message)
            .ok_or_else(|| AppError::BadRequest("message must be a non-empty string".into()))
    }
}

/// Truncates to [`MAX_MESSAGE_CHARS`] then trims; `None` if nothing is left.
pub fn normalize_message(raw: &str) -> Option<String> {
    let truncated: String = raw.chars().take(MAX_MESSAGE_CHARS).collect();
    let trimmed = truncated.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}
