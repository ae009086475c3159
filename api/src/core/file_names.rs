use std::sync::Arc;

use responses_service::ResponsesClient;
use stream_relay::{FileNameResolver, RelayError};

/// Resolves source file ids through the upstream Files endpoint.
#[derive(Clone)]
pub struct UpstreamFileNames(pub Arc<ResponsesClient>);

impl FileNameResolver for UpstreamFileNames {
    async fn resolve(&self, file_id: &str) -> Result<String, RelayError> {
        self.0
            .retrieve_file(file_id)
            .await
            .map(|file| file.filename)
            .map_err(|err| RelayError::Lookup {
                file_id: file_id.to_string(),
                reason: err.to_string(),
            })
    }
}
