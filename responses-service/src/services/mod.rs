use std::time::Instant;

use reqwest::{Response, header};
use tracing::error;

use crate::error_handler::{ResponsesError, Result, make_snippet};

pub mod responses_client;
pub mod vector_store_client;

/// Turns a non-2xx response into [`ResponsesError::HttpStatus`], keeping the
/// whole upstream body and its content type for pass-through.
pub(crate) async fn ensure_success(resp: Response, url: &str, started: Instant) -> Result<Response> {
    if resp.status().is_success() {
        return Ok(resp);
    }

    let status = resp.status();
    let content_type = resp
        .headers()
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);
    let body = resp.text().await.unwrap_or_default();

    error!(
        %status,
        %url,
        snippet = %make_snippet(&body),
        latency_ms = started.elapsed().as_millis(),
        "upstream returned non-success status"
    );

    Err(ResponsesError::HttpStatus {
        status,
        url: url.to_string(),
        body,
        content_type,
    })
}
