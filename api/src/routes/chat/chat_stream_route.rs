use std::{convert::Infallible, sync::Arc};

use axum::{
    body::Bytes,
    extract::State,
    http::HeaderMap,
    response::{
        IntoResponse, Response,
        sse::{KeepAlive, Sse},
    },
};
use futures::{StreamExt, stream};
use stream_relay::RelayEvent;
use tokio::sync::mpsc;
use tokio_stream::wrappers::ReceiverStream;
use tracing::{debug, info};

use crate::{
    core::app_state::AppState,
    error_handler::AppResult,
    middleware_layer::request_id::request_id_of,
    routes::chat::{chat_frames::to_sse_events, chat_request::ChatRequest},
};

/// Relay events buffered between the relay task and the response body.
const RELAY_CHANNEL_CAPACITY: usize = 64;

/// `POST /api/chat`: streams the answer as SSE.
///
/// Validation, configuration and upstream status errors are reported as
/// plain HTTP errors before any SSE byte is sent.
pub async fn chat_stream_route(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    body: Bytes,
) -> AppResult<Response> {
    let request_id = request_id_of(&headers).to_string();

    let message = ChatRequest::parse_message(&body)?;
    state.responses.ensure_ready()?;

    debug!(
        request_id = %request_id,
        message_chars = message.chars().count(),
        "chat_stream_route: start"
    );

    let upstream = state.responses.stream_response(&message).await?;

    let relay = state.relay();
    let (tx, rx) = mpsc::channel::<RelayEvent>(RELAY_CHANNEL_CAPACITY);

    tokio::spawn(async move {
        let outcome = relay.run(upstream, &tx).await;
        info!(request_id = %request_id, ?outcome, "chat_stream_route: relay finished");
    });

    let events = ReceiverStream::new(rx)
        .flat_map(|event| stream::iter(to_sse_events(event)))
        .map(Ok::<_, Infallible>);

    Ok(Sse::new(events)
        .keep_alive(KeepAlive::default())
        .into_response())
}
