use std::sync::Arc;

mod core;
mod error_handler;
mod middleware_layer;
mod routes;

use axum::{
    Router, middleware,
    routing::{get, post},
};
use tokio::signal;
use tracing::{error, info};

pub use crate::core::{
    app_config::{AllowedOrigins, AppConfig},
    app_state::AppState,
    file_names::UpstreamFileNames,
};
pub use crate::error_handler::{AppError, AppResult};
pub use crate::middleware_layer::request_id::REQUEST_ID_HEADER;

use crate::{
    middleware_layer::{cors::cors_layer, request_id::request_id},
    routes::{
        chat::{chat_answer_route::chat_answer_route, chat_stream_route::chat_stream_route},
        landing_route::landing_route,
    },
};

pub async fn start() -> AppResult<()> {
    let state = Arc::new(AppState::from_env()?);
    let host_url = state.config.bind_address.clone();

    if state.responses.ensure_ready().is_err() {
        // Requests will fail with 500 until this is fixed.
        error!("OPENAI_API_KEY or VECTOR_STORE_ID is not set");
    }

    let app = build_router(state);

    let listener = tokio::net::TcpListener::bind(&host_url)
        .await
        .map_err(AppError::Bind)?;
    info!(address = %host_url, "listening");

    // Start server with graceful shutdown on Ctrl+C
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(AppError::Server)?;

    Ok(())
}

/// All routes with CORS and request ids applied.
///
/// `OPTIONS` never reaches a handler: the CORS layer answers every preflight.
pub fn build_router(state: Arc<AppState>) -> Router {
    let cors = cors_layer(&state.config.allowed_origins);

    Router::new()
        .route("/", get(landing_route))
        .route("/api/chat", post(chat_stream_route))
        .route("/api/chat/answer", post(chat_answer_route))
        .layer(middleware::from_fn(request_id))
        .layer(cors)
        .with_state(state)
}

/// Returns a future that resolves when Ctrl+C is pressed
async fn shutdown_signal() {
    if let Err(err) = signal::ctrl_c().await {
        error!(error = %err, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    info!("shutdown signal received");
}
