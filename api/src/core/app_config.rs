use axum::http::HeaderValue;
use responses_service::{
    ConfigError,
    error_handler::{env_flag, env_opt},
};
use stream_relay::{RelayOptions, SourcePolicy};

use crate::error_handler::AppResult;

pub const DEFAULT_API_ADDRESS: &str = "127.0.0.1:8080";

/// Which browser origins may call the API.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum AllowedOrigins {
    #[default]
    Any,
    List(Vec<HeaderValue>),
}

impl AllowedOrigins {
    /// Parses a comma-separated list; empty, or any `*` entry, means any origin.
    pub fn parse(raw: &str) -> AppResult<Self> {
        let raw = raw.trim();
        if raw.is_empty() {
            return Ok(Self::Any);
        }

        let entries: Vec<&str> = raw.split(',').map(str::trim).filter(|o| !o.is_empty()).collect();
        if entries.contains(&"*") {
            return Ok(Self::Any);
        }
        if entries.is_empty() {
            return Err(ConfigError::InvalidFormat {
                var: "ALLOWED_ORIGINS",
                reason: "no origin listed; use * to allow any origin",
            }
            .into());
        }

        let origins = entries
            .into_iter()
            .map(|o| {
                HeaderValue::from_str(o).map_err(|_| ConfigError::InvalidFormat {
                    var: "ALLOWED_ORIGINS",
                    reason: "origins must be valid header values",
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self::List(origins))
    }
}

/// HTTP-side settings; upstream settings live in `ResponsesConfig`.
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Listen address, e.g. "127.0.0.1:8080".
    pub bind_address: String,
    pub allowed_origins: AllowedOrigins,
    /// Source policy and name prettifying for the relay.
    pub relay: RelayOptions,
    /// Look up filenames for sources known only by file id.
    pub resolve_file_names: bool,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            bind_address: DEFAULT_API_ADDRESS.to_string(),
            allowed_origins: AllowedOrigins::Any,
            relay: RelayOptions::default(),
            resolve_file_names: true,
        }
    }
}

impl AppConfig {
    pub fn from_env() -> AppResult<Self> {
        let bind_address = env_opt("API_ADDRESS").unwrap_or_else(|| DEFAULT_API_ADDRESS.into());

        let allowed_origins = AllowedOrigins::parse(&env_opt("ALLOWED_ORIGINS").unwrap_or_default())?;

        let policy = match env_opt("SOURCE_POLICY") {
            Some(raw) => raw.parse::<SourcePolicy>().map_err(|_| ConfigError::InvalidFormat {
                var: "SOURCE_POLICY",
                reason: "expected prefer-metadata, metadata-only, text-only or merge",
            })?,
            None => SourcePolicy::default(),
        };

        Ok(Self {
            bind_address,
            allowed_origins,
            relay: RelayOptions {
                policy,
                pretty_names: env_flag("PRETTY_SOURCE_NAMES", false)?,
            },
            resolve_file_names: env_flag("RESOLVE_FILE_NAMES", true)?,
        })
    }
}
