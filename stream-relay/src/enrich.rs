//! Post-stream name resolution for sources known only by file id.

use std::future::Future;

use futures::future::join_all;
use tracing::{debug, warn};

use crate::{error::RelayError, sources::SourceRecord};

/// Resolves a file id to a human-readable filename.
///
/// Implemented by the HTTP layer on top of the upstream Files endpoint.
pub trait FileNameResolver: Send + Sync {
    fn resolve(&self, file_id: &str) -> impl Future<Output = Result<String, RelayError>> + Send;
}

/// Resolver for relays configured without lookups.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoResolver;

impl FileNameResolver for NoResolver {
    async fn resolve(&self, file_id: &str) -> Result<String, RelayError> {
        Err(RelayError::Lookup {
            file_id: file_id.to_string(),
            reason: "lookups disabled".into(),
        })
    }
}

/// Returns one display name per recorded source, in record order.
///
/// Entries with a file id but no confident name are looked up concurrently;
/// every lookup finishes before this returns. A failed or empty lookup falls
/// back to the hint, then to the raw id, so no name is ever empty.
pub async fn enrich_sources<R: FileNameResolver>(
    record: &SourceRecord,
    resolver: Option<&R>,
) -> Vec<String> {
    let lookups = record.entries().iter().map(|entry| async move {
        if let Some(name) = entry.confident_name() {
            return name.to_string();
        }
        let (Some(file_id), Some(resolver)) = (entry.file_id.as_deref(), resolver) else {
            return entry.fallback_name().to_string();
        };

        match resolver.resolve(file_id).await {
            Ok(name) if !name.trim().is_empty() => {
                debug!(%file_id, name = %name.trim(), "source name resolved");
                name.trim().to_string()
            }
            Ok(_) => {
                warn!(%file_id, "file lookup returned an empty name; using fallback");
                entry.fallback_name().to_string()
            }
            Err(err) => {
                warn!(%file_id, error = %err, "file lookup failed; using fallback");
                entry.fallback_name().to_string()
            }
        }
    });

    join_all(lookups).await
}
