//! OpenAI Responses API client with the `file_search` tool attached.
//!
//! Endpoints are derived from `ResponsesConfig::endpoint`:
//! - POST {endpoint}/v1/responses      : answer, streamed (SSE) or in one JSON body
//! - GET  {endpoint}/v1/files/{id}     : file metadata, used to resolve source names
//!
//! Credentials are checked per call, so a server without `OPENAI_API_KEY` or
//! `VECTOR_STORE_ID` still starts and reports the missing variable per request.

use std::time::{Duration, Instant};

use bytes::Bytes;
use futures::{StreamExt, stream::BoxStream};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, error, info};

use crate::{
    config::responses_config::ResponsesConfig,
    error_handler::{ResponsesError, Result},
    services::ensure_success,
};

/// Upper bound for establishing the upstream connection.
const CONNECT_TIMEOUT_SECS: u64 = 10;

/// Raw upstream body of a streamed response.
pub type UpstreamByteStream = BoxStream<'static, reqwest::Result<Bytes>>;

/// Thin client for the Responses and Files endpoints.
///
/// Cheap to share behind an `Arc`; the inner `reqwest::Client` pools connections.
#[derive(Debug)]
pub struct ResponsesClient {
    client: reqwest::Client,
    cfg: ResponsesConfig,
    url_responses: String,
    url_files: String,
}

impl ResponsesClient {
    /// Creates a client from a validated config.
    ///
    /// # Errors
    /// - [`ResponsesError::Config`] if the config is invalid
    /// - [`ResponsesError::HttpTransport`] if the HTTP client cannot be built
    pub fn new(cfg: ResponsesConfig) -> Result<Self> {
        cfg.validate()?;

        // No client-wide deadline: it would also cut long SSE bodies. Streams
        // get an idle read timeout, one-shot calls a per-request deadline.
        let client = reqwest::Client::builder()
            .connect_timeout(Duration::from_secs(CONNECT_TIMEOUT_SECS.min(cfg.timeout_secs)))
            .read_timeout(Duration::from_secs(cfg.timeout_secs))
            .build()?;

        let url_responses = format!("{}/v1/responses", cfg.endpoint);
        let url_files = format!("{}/v1/files", cfg.endpoint);

        info!(
            model = %cfg.model,
            endpoint = %cfg.endpoint,
            timeout_secs = cfg.timeout_secs,
            has_api_key = cfg.api_key.is_some(),
            has_vector_store = cfg.vector_store_id.is_some(),
            "ResponsesClient initialized"
        );

        Ok(Self {
            client,
            cfg,
            url_responses,
            url_files,
        })
    }

    pub fn config(&self) -> &ResponsesConfig {
        &self.cfg
    }

    fn request_deadline(&self) -> Duration {
        Duration::from_secs(self.cfg.timeout_secs)
    }

    /// Fails with [`ResponsesError::Config`] when a required credential is missing.
    pub fn ensure_ready(&self) -> Result<()> {
        self.cfg.api_key()?;
        self.cfg.vector_store_id()?;
        Ok(())
    }

    /// Starts a **streamed** response and returns the raw SSE byte stream.
    ///
    /// The request asks for `file_search_call.results` so the stream carries
    /// file metadata for source extraction.
    ///
    /// # Errors
    /// - [`ResponsesError::Config`] when credentials are missing
    /// - [`ResponsesError::HttpStatus`] for non-2xx responses (body kept verbatim)
    /// - [`ResponsesError::HttpTransport`] for client/network failures
    pub async fn stream_response(&self, input: &str) -> Result<UpstreamByteStream> {
        let started = Instant::now();
        let body = ResponseRequest::from_cfg(&self.cfg, input, true)?;

        debug!(
            model = %self.cfg.model,
            input_chars = input.chars().count(),
            "POST {} (stream)", self.url_responses
        );

        let resp = self
            .client
            .post(&self.url_responses)
            .bearer_auth(self.cfg.api_key()?)
            .header(reqwest::header::ACCEPT, "text/event-stream")
            .json(&body)
            .send()
            .await?;
        let resp = ensure_success(resp, &self.url_responses, started).await?;

        info!(
            model = %self.cfg.model,
            latency_ms = started.elapsed().as_millis(),
            "response stream opened"
        );

        Ok(resp.bytes_stream().boxed())
    }

    /// Performs a **non-streaming** response request and returns the JSON body.
    ///
    /// # Errors
    /// Same as [`ResponsesClient::stream_response`], plus
    /// [`ResponsesError::Decode`] if the body is not JSON.
    pub async fn create_response(&self, input: &str) -> Result<Value> {
        let started = Instant::now();
        let body = ResponseRequest::from_cfg(&self.cfg, input, false)?;

        debug!(
            model = %self.cfg.model,
            input_chars = input.chars().count(),
            "POST {}", self.url_responses
        );

        let resp = self
            .client
            .post(&self.url_responses)
            .bearer_auth(self.cfg.api_key()?)
            .timeout(self.request_deadline())
            .json(&body)
            .send()
            .await?;
        let resp = ensure_success(resp, &self.url_responses, started).await?;

        let out: Value = match resp.json().await {
            Ok(v) => v,
            Err(e) => {
                error!(
                    error = %e,
                    model = %self.cfg.model,
                    latency_ms = started.elapsed().as_millis(),
                    "failed to decode /v1/responses body"
                );
                return Err(ResponsesError::Decode(format!(
                    "serde error: {e}; expected a response object"
                )));
            }
        };

        info!(
            model = %self.cfg.model,
            latency_ms = started.elapsed().as_millis(),
            "response completed"
        );

        Ok(out)
    }

    /// Fetches file metadata (`GET /v1/files/{id}`).
    ///
    /// # Errors
    /// - [`ResponsesError::InvalidFileId`] if `file_id` is not URL-path safe
    /// - [`ResponsesError::HttpStatus`] / [`ResponsesError::HttpTransport`] / [`ResponsesError::Decode`]
    pub async fn retrieve_file(&self, file_id: &str) -> Result<FileObject> {
        if !is_path_safe_id(file_id) {
            return Err(ResponsesError::InvalidFileId(file_id.to_string()));
        }

        let started = Instant::now();
        let url = format!("{}/{}", self.url_files, file_id);
        debug!("GET {url}");

        let resp = self
            .client
            .get(&url)
            .bearer_auth(self.cfg.api_key()?)
            .timeout(self.request_deadline())
            .send()
            .await?;
        let resp = ensure_success(resp, &url, started).await?;

        resp.json::<FileObject>()
            .await
            .map_err(|e| ResponsesError::Decode(format!("serde error: {e}; expected a file object")))
    }
}

/// Ids go straight into a URL path; only the characters OpenAI ids use are allowed.
fn is_path_safe_id(id: &str) -> bool {
    !id.is_empty()
        && id
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
}

/* ===========================================================================
HTTP payloads
======================================================================== */

/// Metadata returned by `GET /v1/files/{id}`.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub struct FileObject {
    pub id: String,
    #[serde(default)]
    pub filename: String,
    #[serde(default)]
    pub bytes: Option<u64>,
    #[serde(default)]
    pub purpose: Option<String>,
}

/// Request body for `POST /v1/responses`.
#[derive(Debug, Serialize)]
struct ResponseRequest<'a> {
    model: &'a str,
    instructions: &'a str,
    input: &'a str,
    tools: Vec<FileSearchTool<'a>>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    include: Vec<&'static str>,
    stream: bool,
}

impl<'a> ResponseRequest<'a> {
    fn from_cfg(cfg: &'a ResponsesConfig, input: &'a str, stream: bool) -> Result<Self> {
        let vector_store_id = cfg.vector_store_id()?;
        Ok(Self {
            model: &cfg.model,
            instructions: &cfg.instructions,
            input,
            tools: vec![FileSearchTool {
                kind: "file_search",
                vector_store_ids: vec![vector_store_id],
                max_num_results: cfg.max_num_results,
            }],
            include: if stream {
                vec!["file_search_call.results"]
            } else {
                Vec::new()
            },
            stream,
        })
    }
}

#[derive(Debug, Serialize)]
struct FileSearchTool<'a> {
    #[serde(rename = "type")]
    kind: &'static str,
    vector_store_ids: Vec<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_num_results: Option<u32>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::{
        Mock, MockServer, ResponseTemplate,
        matchers::{body_partial_json, header, method, path},
    };

    fn cfg_for(server: &MockServer) -> ResponsesConfig {
        let mut cfg = ResponsesConfig::with_endpoint(server.uri(), Some("sk-test".into()));
        cfg.vector_store_id = Some("vs_123".into());
        cfg
    }

    #[test]
    fn request_body_carries_file_search_tool() {
        let mut cfg = ResponsesConfig::with_endpoint("http://localhost:1", Some("k".into()));
        cfg.vector_store_id = Some("vs_1".into());
        cfg.max_num_results = Some(4);

        let body = serde_json::to_value(ResponseRequest::from_cfg(&cfg, "hi", true).unwrap()).unwrap();
        assert_eq!(body["tools"][0]["type"], "file_search");
        assert_eq!(body["tools"][0]["vector_store_ids"][0], "vs_1");
        assert_eq!(body["tools"][0]["max_num_results"], 4);
        assert_eq!(body["include"][0], "file_search_call.results");
        assert_eq!(body["stream"], true);

        let body = serde_json::to_value(ResponseRequest::from_cfg(&cfg, "hi", false).unwrap()).unwrap();
        assert!(body.get("include").is_none());
    }

    #[test]
    fn path_safe_ids() {
        assert!(is_path_safe_id("file-AbC_12"));
        assert!(!is_path_safe_id(""));
        assert!(!is_path_safe_id("../etc"));
        assert!(!is_path_safe_id("a b"));
    }

    #[tokio::test]
    async fn create_response_returns_json() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/responses"))
            .and(header("authorization", "Bearer sk-test"))
            .and(body_partial_json(json!({"input": "hello", "stream": false})))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"output_text": "hi"})))
            .mount(&server)
            .await;

        let client = ResponsesClient::new(cfg_for(&server)).unwrap();
        let out = client.create_response("hello").await.unwrap();
        assert_eq!(out["output_text"], "hi");
    }

    #[tokio::test]
    async fn non_success_keeps_upstream_body() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/responses"))
            .respond_with(
                ResponseTemplate::new(429)
                    .set_body_raw(r#"{"error":{"message":"slow down"}}"#, "application/json"),
            )
            .mount(&server)
            .await;

        let client = ResponsesClient::new(cfg_for(&server)).unwrap();
        match client.stream_response("hello").await {
            Err(ResponsesError::HttpStatus {
                status,
                body,
                content_type,
                ..
            }) => {
                assert_eq!(status.as_u16(), 429);
                assert_eq!(body, r#"{"error":{"message":"slow down"}}"#);
                assert_eq!(content_type.as_deref(), Some("application/json"));
            }
            Err(other) => panic!("unexpected error: {other}"),
            Ok(_) => panic!("expected an error"),
        }
    }

    #[tokio::test]
    async fn missing_vector_store_fails_before_network() {
        let server = MockServer::start().await;
        let mut cfg = cfg_for(&server);
        cfg.vector_store_id = None;
        let client = ResponsesClient::new(cfg).unwrap();

        assert!(matches!(
            client.create_response("hello").await,
            Err(ResponsesError::Config(_))
        ));
        assert!(server.received_requests().await.unwrap_or_default().is_empty());
    }

    #[tokio::test]
    async fn retrieve_file_decodes_metadata() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v1/files/file-1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "id": "file-1", "object": "file", "filename": "handbook.pdf", "bytes": 10
            })))
            .mount(&server)
            .await;

        let client = ResponsesClient::new(cfg_for(&server)).unwrap();
        let file = client.retrieve_file("file-1").await.unwrap();
        assert_eq!(file.filename, "handbook.pdf");
        assert_eq!(file.bytes, Some(10));
    }

    #[tokio::test]
    async fn one_shot_calls_honour_the_request_deadline() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/responses"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({"output_text": "late"}))
                    .set_delay(Duration::from_secs(3)),
            )
            .mount(&server)
            .await;

        let mut cfg = cfg_for(&server);
        cfg.timeout_secs = 1;
        let client = ResponsesClient::new(cfg).unwrap();

        let err = client.create_response("hello").await.unwrap_err();
        assert!(matches!(err, ResponsesError::HttpTransport(ref e) if e.is_timeout()), "{err:?}");
    }

    /// Serves one request with a chunked SSE body whose chunks are spaced
    /// `gap` apart.
    async fn serve_slow_sse(chunks: Vec<String>, gap: Duration) -> String {
        use tokio::io::{AsyncReadExt, AsyncWriteExt};

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        tokio::spawn(async move {
            let (mut sock, _) = listener.accept().await.unwrap();

            let mut req = Vec::new();
            let mut buf = [0u8; 4096];
            loop {
                let n = sock.read(&mut buf).await.unwrap();
                assert!(n > 0, "client closed before sending the request");
                req.extend_from_slice(&buf[..n]);
                let text = String::from_utf8_lossy(&req);
                if let Some(end) = text.find("\r\n\r\n") {
                    let len = text[..end]
                        .lines()
                        .find_map(|l| {
                            let (k, v) = l.split_once(':')?;
                            k.eq_ignore_ascii_case("content-length").then(|| v.trim().parse::<usize>().ok())?
                        })
                        .unwrap_or(0);
                    if req.len() >= end + 4 + len {
                        break;
                    }
                }
            }

            sock.write_all(
                b"HTTP/1.1 200 OK\r\ncontent-type: text/event-stream\r\ntransfer-encoding: chunked\r\n\r\n",
            )
            .await
            .unwrap();
            for chunk in chunks {
                tokio::time::sleep(gap).await;
                let frame = format!("{:x}\r\n{chunk}\r\n", chunk.len());
                sock.write_all(frame.as_bytes()).await.unwrap();
                sock.flush().await.unwrap();
            }
            sock.write_all(b"0\r\n\r\n").await.unwrap();
        });

        format!("http://{addr}")
    }

    #[tokio::test]
    async fn streams_may_outlive_the_timeout_while_chunks_keep_coming() {
        let chunks: Vec<String> = (0..5)
            .map(|i| {
                format!(
                    "event: response.output_text.delta\ndata: {{\"type\":\"response.output_text.delta\",\"delta\":\"part{i} \"}}\n\n"
                )
            })
            .collect();
        let base = serve_slow_sse(chunks, Duration::from_millis(400)).await;

        let mut cfg = ResponsesConfig::with_endpoint(base, Some("sk-test".into()));
        cfg.vector_store_id = Some("vs_123".into());
        cfg.timeout_secs = 1;
        let client = ResponsesClient::new(cfg).unwrap();

        let started = Instant::now();
        let mut stream = client.stream_response("hello").await.unwrap();
        let mut body = Vec::new();
        while let Some(chunk) = stream.next().await {
            body.extend_from_slice(&chunk.expect("chunk arrives within the idle timeout"));
        }

        assert!(started.elapsed() > Duration::from_secs(1));
        let body = String::from_utf8(body).unwrap();
        assert!(body.contains("part0 "));
        assert!(body.contains("part4 "));
    }
}
