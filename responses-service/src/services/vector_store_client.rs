//! Files + Vector Store endpoints used to build the document collection.
//!
//! - POST {endpoint}/v1/files                                  : multipart upload (`purpose=assistants`)
//! - POST {endpoint}/v1/vector_stores                          : create a store
//! - POST {endpoint}/v1/vector_stores/{id}/file_batches        : attach uploaded files
//! - GET  {endpoint}/v1/vector_stores/{id}/file_batches/{bid}  : batch status

use std::{path::Path, time::Duration, time::Instant};

use reqwest::multipart::{Form, Part};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::{debug, info};

use crate::{
    config::responses_config::ResponsesConfig,
    error_handler::{ResponsesError, Result},
    services::{ensure_success, responses_client::FileObject},
};

/// A created vector store.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct VectorStore {
    pub id: String,
    #[serde(default)]
    pub name: Option<String>,
}

/// Status of a file batch attached to a vector store.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct FileBatch {
    pub id: String,
    pub status: String,
    #[serde(default)]
    pub file_counts: FileCounts,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct FileCounts {
    #[serde(default)]
    pub in_progress: u64,
    #[serde(default)]
    pub completed: u64,
    #[serde(default)]
    pub failed: u64,
    #[serde(default)]
    pub cancelled: u64,
    #[serde(default)]
    pub total: u64,
}

impl FileBatch {
    /// `true` once the batch left `in_progress` (completed, failed or cancelled).
    pub fn is_settled(&self) -> bool {
        self.status != "in_progress"
    }
}

/// Client for uploading documents and assembling a vector store.
#[derive(Debug)]
pub struct VectorStoreClient {
    client: reqwest::Client,
    cfg: ResponsesConfig,
}

impl VectorStoreClient {
    /// # Errors
    /// - [`ResponsesError::Config`] if the config is invalid or has no API key
    pub fn new(cfg: ResponsesConfig) -> Result<Self> {
        cfg.validate()?;
        cfg.api_key()?;

        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(cfg.timeout_secs))
            .build()?;

        Ok(Self { client, cfg })
    }

    /// Uploads one local file with `purpose=assistants`.
    pub async fn upload_file(&self, path: &Path) -> Result<FileObject> {
        let started = Instant::now();
        let url = format!("{}/v1/files", self.cfg.endpoint);

        let filename = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .ok_or_else(|| {
                ResponsesError::Io(std::io::Error::new(
                    std::io::ErrorKind::InvalidInput,
                    format!("not a file path: {}", path.display()),
                ))
            })?;
        let bytes = tokio::fs::read(path).await?;
        let size = bytes.len();

        let form = Form::new()
            .text("purpose", "assistants")
            .part("file", Part::bytes(bytes).file_name(filename.clone()));

        debug!(%filename, size, "POST {url}");

        let resp = self
            .client
            .post(&url)
            .bearer_auth(self.cfg.api_key()?)
            .multipart(form)
            .send()
            .await?;
        let resp = ensure_success(resp, &url, started).await?;
        let file: FileObject = decode(resp, "file object").await?;

        info!(
            %filename,
            file_id = %file.id,
            latency_ms = started.elapsed().as_millis(),
            "file uploaded"
        );
        Ok(file)
    }

    /// Creates an empty vector store named `name`.
    pub async fn create_vector_store(&self, name: &str) -> Result<VectorStore> {
        let started = Instant::now();
        let url = format!("{}/v1/vector_stores", self.cfg.endpoint);

        let resp = self
            .client
            .post(&url)
            .bearer_auth(self.cfg.api_key()?)
            .json(&json!({ "name": name }))
            .send()
            .await?;
        let resp = ensure_success(resp, &url, started).await?;
        let store: VectorStore = decode(resp, "vector store").await?;

        info!(vector_store_id = %store.id, %name, "vector store created");
        Ok(store)
    }

    /// Attaches already uploaded files to `store_id` as one batch.
    pub async fn create_file_batch(&self, store_id: &str, file_ids: &[String]) -> Result<FileBatch> {
        let started = Instant::now();
        let url = format!("{}/v1/vector_stores/{store_id}/file_batches", self.cfg.endpoint);

        let resp = self
            .client
            .post(&url)
            .bearer_auth(self.cfg.api_key()?)
            .json(&json!({ "file_ids": file_ids }))
            .send()
            .await?;
        let resp = ensure_success(resp, &url, started).await?;
        let batch: FileBatch = decode(resp, "file batch").await?;

        info!(
            vector_store_id = %store_id,
            batch_id = %batch.id,
            files = file_ids.len(),
            status = %batch.status,
            "file batch created"
        );
        Ok(batch)
    }

    /// Reads the current status of a file batch.
    pub async fn get_file_batch(&self, store_id: &str, batch_id: &str) -> Result<FileBatch> {
        let started = Instant::now();
        let url = format!(
            "{}/v1/vector_stores/{store_id}/file_batches/{batch_id}",
            self.cfg.endpoint
        );

        let resp = self
            .client
            .get(&url)
            .bearer_auth(self.cfg.api_key()?)
            .send()
            .await?;
        let resp = ensure_success(resp, &url, started).await?;
        decode(resp, "file batch").await
    }
}

async fn decode<T: serde::de::DeserializeOwned>(resp: reqwest::Response, what: &str) -> Result<T> {
    resp.json::<T>()
        .await
        .map_err(|e| ResponsesError::Decode(format!("serde error: {e}; expected a {what}")))
}
