use axum::{
    Json,
    http::{HeaderValue, StatusCode, header},
    response::{IntoResponse, Response},
};
use responses_service::{ConfigError, ResponsesError};
use serde::Serialize;
use thiserror::Error;
use tracing::error;

/// Public application error type.
#[derive(Debug, Error)]
pub enum AppError {
    // --- Boot / config ---
    #[error("missing required environment variable: {0}")]
    MissingEnv(&'static str),

    #[error(transparent)]
    Config(#[from] ConfigError),

    // --- IO / network / server ---
    #[error("failed to bind listener")]
    Bind(#[source] std::io::Error),

    #[error("server error")]
    Server(#[source] std::io::Error),

    // --- Request / upstream ---
    #[error("bad request: {0}")]
    BadRequest(String),

    #[error("upstream request failed: {0}")]
    BadGateway(String),

    /// Non-success answer from the upstream API, relayed as is.
    #[error("upstream returned HTTP {status}")]
    UpstreamStatus {
        status: StatusCode,
        body: String,
        content_type: Option<String>,
    },
}

impl AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            // 4xx
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,

            // passed through
            AppError::UpstreamStatus { status, .. } => *status,

            // 5xx
            AppError::MissingEnv(_) | AppError::Config(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::Bind(_) | AppError::Server(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::BadGateway(_) => StatusCode::BAD_GATEWAY,
        }
    }

    fn error_code(&self) -> &'static str {
        match self {
            AppError::MissingEnv(_) => "MISSING_ENV",
            AppError::Config(_) => "CONFIG_ERROR",
            AppError::Bind(_) => "BIND_ERROR",
            AppError::Server(_) => "SERVER_ERROR",
            AppError::BadRequest(_) => "BAD_REQUEST",
            AppError::BadGateway(_) => "UPSTREAM_ERROR",
            AppError::UpstreamStatus { .. } => "UPSTREAM_STATUS",
        }
    }
}

#[derive(Serialize)]
struct ErrorBody<'a> {
    error: &'a str,
    message: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();

        if let AppError::UpstreamStatus {
            body, content_type, ..
        } = self
        {
            let content_type = content_type
                .and_then(|ct| HeaderValue::from_str(&ct).ok())
                .unwrap_or_else(|| {
                    if serde_json::from_str::<serde_json::Value>(&body).is_ok() {
                        HeaderValue::from_static("application/json")
                    } else {
                        HeaderValue::from_static("text/plain; charset=utf-8")
                    }
                });
            return (status, [(header::CONTENT_TYPE, content_type)], body).into_response();
        }

        if status.is_server_error() {
            error!(%status, error = %self, "request failed");
        }

        let body = ErrorBody {
            error: self.error_code(),
            message: self.to_string(),
        };
        (status, Json(body)).into_response()
    }
}

/// Handy result alias used across handlers.
pub type AppResult<T> = Result<T, AppError>;

/// Maps upstream client errors to HTTP semantics: missing credentials are a
/// server misconfiguration, upstream statuses pass through, everything else
/// is a bad gateway.
impl From<ResponsesError> for AppError {
    fn from(err: ResponsesError) -> Self {
        match err {
            ResponsesError::Config(ConfigError::MissingVar(name)) => AppError::MissingEnv(name),
            ResponsesError::Config(other) => AppError::Config(other),
            ResponsesError::HttpStatus {
                status,
                body,
                content_type,
                ..
            } => AppError::UpstreamStatus {
                status,
                body,
                content_type,
            },
            other => AppError::BadGateway(other.to_string()),
        }
    }
}
