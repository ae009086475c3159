use std::sync::Arc;

use axum::{Json, body::Bytes, extract::State, http::HeaderMap};
use stream_relay::answer_from_response;
use tracing::debug;

use crate::{
    core::app_state::AppState,
    error_handler::AppResult,
    middleware_layer::request_id::request_id_of,
    routes::chat::{chat_answer_response::ChatAnswerResponse, chat_request::ChatRequest},
};

/// `POST /api/chat/answer`: one JSON answer, no streaming.
pub async fn chat_answer_route(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    body: Bytes,
) -> AppResult<Json<ChatAnswerResponse>> {
    let request_id = request_id_of(&headers);

    let message = ChatRequest::parse_message(&body)?;
    state.responses.ensure_ready()?;

    let response = state.responses.create_response(&message).await?;
    let answer = answer_from_response(&response, state.config.relay.policy);

    debug!(
        request_id = %request_id,
        answer_chars = answer.text.len(),
        sources = answer.sources.len(),
        "chat_answer_route: success"
    );

    Ok(Json(ChatAnswerResponse {
        answer: answer.text,
        sources: answer.sources,
    }))
}
