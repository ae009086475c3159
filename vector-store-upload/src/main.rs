//! `vector-store-upload`: loads a directory of documents into a vector
//! store and prints the `VECTOR_STORE_ID` line for the chat backend's `.env`.

mod scan;
mod upload;

use std::{path::PathBuf, time::Duration};

use anyhow::Result;
use clap::Parser;
use responses_service::{ResponsesConfig, VectorStoreClient, telemetry};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::{
    scan::{DEFAULT_EXTENSIONS, collect_documents},
    upload::{UploadPlan, run_upload},
};

/// Upload documents into an OpenAI vector store for `file_search`.
#[derive(Parser, Debug)]
#[command(name = "vector-store-upload", version, about)]
struct Args {
    /// Directory to scan recursively
    #[arg(long)]
    dir: PathBuf,

    /// Name of the vector store to create
    #[arg(long, default_value = "docs-chat")]
    name: String,

    /// Add files to an existing store instead of creating one
    #[arg(long, env = "VECTOR_STORE_ID")]
    vector_store_id: Option<String>,

    /// File extensions to upload, comma separated [default: pdf,md,txt,docx,html,json]
    #[arg(long, value_delimiter = ',')]
    ext: Vec<String>,

    /// Seconds between batch status checks
    #[arg(long, default_value_t = 2)]
    poll_interval_secs: u64,

    /// Give up waiting for the batch after this many seconds
    #[arg(long, default_value_t = 900)]
    max_wait_secs: u64,

    /// List the files that would be uploaded and exit
    #[arg(long)]
    dry_run: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Optional; OPENAI_API_KEY may come from the process environment.
    let _ = dotenvy::dotenv();

    tracing_subscriber::registry()
        .with(telemetry::env_filter("info"))
        .with(telemetry::layer())
        .init();

    let args = Args::parse();
    let mut extensions: Vec<String> = args
        .ext
        .iter()
        .map(|e| e.trim().trim_start_matches('.').to_string())
        .filter(|e| !e.is_empty())
        .collect();
    if extensions.is_empty() {
        extensions = DEFAULT_EXTENSIONS.iter().map(|e| e.to_string()).collect();
    }

    let files = collect_documents(&args.dir, &extensions)?;

    if args.dry_run {
        for file in &files {
            println!("{}", file.display());
        }
        info!(documents = files.len(), "dry run; nothing uploaded");
        return Ok(());
    }

    let client = VectorStoreClient::new(ResponsesConfig::from_env()?)?;
    let plan = UploadPlan {
        files,
        vector_store_id: args.vector_store_id,
        store_name: args.name,
        poll_interval: Duration::from_secs(args.poll_interval_secs.max(1)),
        max_wait: Duration::from_secs(args.max_wait_secs),
    };

    let report = run_upload(&client, &plan).await?;
    info!(
        vector_store_id = %report.vector_store_id,
        uploaded = report.uploaded,
        failed_uploads = report.failed_uploads,
        batch_status = %report.batch.status,
        indexed = report.batch.file_counts.completed,
        "upload finished"
    );

    println!("VECTOR_STORE_ID={}", report.vector_store_id);
    Ok(())
}
