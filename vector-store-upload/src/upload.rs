//! Upload pipeline: files, then store, then one batch, then polling.

use std::{
    path::PathBuf,
    time::{Duration, Instant},
};

use anyhow::{Context, Result, bail};
use responses_service::{FileBatch, VectorStoreClient};
use tracing::{info, warn};

#[derive(Debug, Clone)]
pub struct UploadPlan {
    pub files: Vec<PathBuf>,
    /// Attach to this store instead of creating one.
    pub vector_store_id: Option<String>,
    pub store_name: String,
    pub poll_interval: Duration,
    /// Give up waiting for the batch after this long.
    pub max_wait: Duration,
}

#[derive(Debug)]
pub struct UploadReport {
    pub vector_store_id: String,
    pub uploaded: usize,
    pub failed_uploads: usize,
    pub batch: FileBatch,
}

pub async fn run_upload(client: &VectorStoreClient, plan: &UploadPlan) -> Result<UploadReport> {
    let mut file_ids = Vec::with_capacity(plan.files.len());
    let mut failed_uploads = 0usize;

    for path in &plan.files {
        match client.upload_file(path).await {
            Ok(file) => file_ids.push(file.id),
            Err(err) => {
                failed_uploads += 1;
                warn!(path = %path.display(), error = %err, "upload failed; skipping");
            }
        }
    }

    if file_ids.is_empty() {
        bail!(
            "no file was uploaded ({} attempted, {} failed)",
            plan.files.len(),
            failed_uploads
        );
    }

    let vector_store_id = match &plan.vector_store_id {
        Some(id) => id.clone(),
        None => {
            client
                .create_vector_store(&plan.store_name)
                .await
                .context("creating vector store")?
                .id
        }
    };

    let mut batch = client
        .create_file_batch(&vector_store_id, &file_ids)
        .await
        .context("creating file batch")?;

    let started = Instant::now();
    while !batch.is_settled() {
        if started.elapsed() >= plan.max_wait {
            bail!(
                "file batch {} still {} after {}s",
                batch.id,
                batch.status,
                plan.max_wait.as_secs()
            );
        }
        info!(
            batch_id = %batch.id,
            completed = batch.file_counts.completed,
            total = batch.file_counts.total,
            "waiting for file batch"
        );
        tokio::time::sleep(plan.poll_interval).await;
        batch = client
            .get_file_batch(&vector_store_id, &batch.id)
            .await
            .context("polling file batch")?;
    }

    Ok(UploadReport {
        vector_store_id,
        uploaded: file_ids.len(),
        failed_uploads,
        batch,
    })
}
