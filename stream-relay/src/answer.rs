//! Answer extraction for non-streamed responses.

use serde_json::Value;

use crate::{
    relay::FinalAnswer,
    sources::{SourcePolicy, extract_sources},
};

/// Answer text of a complete response object.
///
/// Prefers a top-level `output_text` string; otherwise concatenates the
/// `output_text` parts of every `message` item in `output`.
pub fn extract_answer_text(response: &Value) -> String {
    if let Some(text) = response.get("output_text").and_then(Value::as_str) {
        return text.to_string();
    }

    let Some(output) = response.get("output").and_then(Value::as_array) else {
        return String::new();
    };

    output
        .iter()
        .filter(|item| item.get("type").and_then(Value::as_str).is_none_or(|t| t == "message"))
        .filter_map(|item| item.get("content").and_then(Value::as_array))
        .flatten()
        .filter(|part| part.get("type").and_then(Value::as_str) == Some("output_text"))
        .filter_map(|part| part.get("text").and_then(Value::as_str))
        .collect()
}

/// Full answer for the non-streaming endpoint.
///
/// No stream metadata exists on this path, so sources come from the
/// answer's `Sources:` line (nothing under [`SourcePolicy::MetadataOnly`]).
pub fn answer_from_response(response: &Value, policy: SourcePolicy) -> FinalAnswer {
    let text = extract_answer_text(response);
    let sources = extract_sources(policy, &text, &[]);
    FinalAnswer { text, sources }
}
