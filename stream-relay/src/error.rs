//! Typed error for the stream-relay crate.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum RelayError {
    /// A file-name lookup failed; the relay falls back to hint or id.
    #[error("file lookup failed for {file_id}: {reason}")]
    Lookup { file_id: String, reason: String },

    /// Unknown value for a source reconciliation policy.
    #[error("unknown source policy {0:?} (expected prefer-metadata, metadata-only, text-only or merge)")]
    UnknownPolicy(String),
}
