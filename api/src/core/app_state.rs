use std::sync::Arc;

use responses_service::{ResponsesClient, ResponsesConfig};
use stream_relay::StreamRelay;

use crate::{
    core::{app_config::AppConfig, file_names::UpstreamFileNames},
    error_handler::AppResult,
};

/// Shared state for all HTTP handlers.
#[derive(Clone)]
pub struct AppState {
    pub config: AppConfig,
    /// Upstream client; one connection pool for chat and file lookups.
    pub responses: Arc<ResponsesClient>,
}

impl AppState {
    /// Load shared state from environment variables.
    ///
    /// Missing credentials are not an error here; they are reported per request.
    pub fn from_env() -> AppResult<Self> {
        Self::new(AppConfig::from_env()?, ResponsesConfig::from_env()?)
    }

    pub fn new(config: AppConfig, responses: ResponsesConfig) -> AppResult<Self> {
        Ok(Self {
            config,
            responses: Arc::new(ResponsesClient::new(responses)?),
        })
    }

    /// A relay for one request, with filename lookups when enabled.
    pub fn relay(&self) -> StreamRelay<UpstreamFileNames> {
        let resolver = self
            .config
            .resolve_file_names
            .then(|| UpstreamFileNames(Arc::clone(&self.responses)));
        StreamRelay::new(self.config.relay, resolver)
    }
}
