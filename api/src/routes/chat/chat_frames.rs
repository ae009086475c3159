use axum::response::sse::Event;
use serde_json::json;
use stream_relay::RelayEvent;

/// Terminal marker sent after a clean final frame.
pub const DONE_MARKER: &str = "[DONE]";

/// Maps one relay event to the SSE frames the browser client reads.
///
/// - text: `{"output_text": ...}`
/// - finished: `{"done": true, "final", "sources"}` then `[DONE]`
/// - interrupted: an `error` event with the partial answer and no `[DONE]`
pub fn to_sse_events(event: RelayEvent) -> Vec<Event> {
    match event {
        RelayEvent::Text(text) => {
            vec![Event::default().data(json!({ "output_text": text }).to_string())]
        }
        RelayEvent::Finished(answer) => vec![
            Event::default().data(
                json!({
                    "done": true,
                    "final": answer.text,
                    "sources": answer.sources,
                })
                .to_string(),
            ),
            Event::default().data(DONE_MARKER),
        ],
        RelayEvent::Interrupted { answer, reason } => vec![
            Event::default().event("error").data(
                json!({
                    "done": false,
                    "interrupted": true,
                    "error": reason,
                    "final": answer.text,
                    "sources": answer.sources,
                })
                .to_string(),
            ),
        ],
    }
}
