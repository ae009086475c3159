//! Upstream client for the OpenAI Responses API configured with the
//! `file_search` tool, plus the Files and Vector Store endpoints used for
//! source-name lookups and document uploads.
//!
//! - [`config`]: env-driven [`ResponsesConfig`] and the default instructions.
//! - [`services`]: [`ResponsesClient`] (chat) and [`VectorStoreClient`] (uploads).
//! - [`error_handler`]: [`ResponsesError`] taxonomy and env helpers.
//! - [`telemetry`]: formatting layer shared by every binary in the workspace.

pub mod config;
pub mod error_handler;
pub mod services;
pub mod telemetry;

pub use config::responses_config::ResponsesConfig;
pub use error_handler::{ConfigError, ResponsesError, Result};
pub use services::responses_client::{FileObject, ResponsesClient, UpstreamByteStream};
pub use services::vector_store_client::{FileBatch, VectorStore, VectorStoreClient};
