//! Upstream configuration loaded from environment variables.
//!
//! # Environment variables
//!
//! - `OPENAI_API_KEY`          = credential (checked per request, see [`ResponsesConfig::api_key`])
//! - `VECTOR_STORE_ID`         = document collection used by the `file_search` tool
//! - `OPENAI_MODEL`            = model override (default [`DEFAULT_MODEL`])
//! - `SYSTEM_PROMPT`           = instructions override (default [`DEFAULT_INSTRUCTIONS`])
//! - `OPENAI_BASE_URL`         = API base (default [`DEFAULT_BASE_URL`])
//! - `OPENAI_TIMEOUT_SECS`     = idle read timeout for streams and deadline for one-shot calls, in seconds (default 120)
//! - `FILE_SEARCH_MAX_RESULTS` = optional `max_num_results` for the tool

use crate::{
    config::default_instructions::DEFAULT_INSTRUCTIONS,
    error_handler::{
        ConfigError, Result, env_opt, env_opt_u32, env_opt_u64, validate_http_endpoint,
    },
};

pub const DEFAULT_MODEL: &str = "gpt-4.1-mini";
pub const DEFAULT_BASE_URL: &str = "https://api.openai.com";
pub const DEFAULT_TIMEOUT_SECS: u64 = 120;

/// Configuration for calls to the Responses API.
///
/// Credentials are optional here on purpose: the server boots without them
/// and every request reports the missing variable instead.
#[derive(Debug, Clone)]
pub struct ResponsesConfig {
    /// API base, without trailing slash (e.g. `https://api.openai.com`).
    pub endpoint: String,

    /// Bearer credential.
    pub api_key: Option<String>,

    /// Vector store searched by the `file_search` tool.
    pub vector_store_id: Option<String>,

    /// Model identifier.
    pub model: String,

    /// Instruction prompt sent as `instructions`.
    pub instructions: String,

    /// Optional `max_num_results` for the `file_search` tool.
    pub max_num_results: Option<u32>,

    /// Idle read timeout for streamed bodies; whole-request deadline for
    /// non-streaming calls. Seconds.
    pub timeout_secs: u64,
}

impl ResponsesConfig {
    /// Builds the config strictly from environment variables.
    ///
    /// # Errors
    /// - [`ConfigError::InvalidFormat`] if `OPENAI_BASE_URL` has no http(s) scheme
    /// - [`ConfigError::InvalidNumber`] for unparsable numeric variables
    pub fn from_env() -> Result<Self> {
        let endpoint = env_opt("OPENAI_BASE_URL").unwrap_or_else(|| DEFAULT_BASE_URL.to_string());
        validate_http_endpoint("OPENAI_BASE_URL", &endpoint)?;

        let cfg = Self {
            endpoint: endpoint.trim_end_matches('/').to_string(),
            api_key: env_opt("OPENAI_API_KEY"),
            vector_store_id: env_opt("VECTOR_STORE_ID"),
            model: env_opt("OPENAI_MODEL").unwrap_or_else(|| DEFAULT_MODEL.to_string()),
            instructions: env_opt("SYSTEM_PROMPT")
                .unwrap_or_else(|| DEFAULT_INSTRUCTIONS.to_string()),
            max_num_results: env_opt_u32("FILE_SEARCH_MAX_RESULTS")?,
            timeout_secs: env_opt_u64("OPENAI_TIMEOUT_SECS")?.unwrap_or(DEFAULT_TIMEOUT_SECS),
        };
        cfg.validate()?;
        Ok(cfg)
    }

    /// Config pointing at `endpoint` with defaults for everything else.
    /// Handy for tests and for the upload tool.
    pub fn with_endpoint(endpoint: impl Into<String>, api_key: Option<String>) -> Self {
        let endpoint: String = endpoint.into();
        Self {
            endpoint: endpoint.trim_end_matches('/').to_string(),
            api_key,
            vector_store_id: None,
            model: DEFAULT_MODEL.to_string(),
            instructions: DEFAULT_INSTRUCTIONS.to_string(),
            max_num_results: None,
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }

    /// Checks invariants that do not depend on credentials.
    pub fn validate(&self) -> Result<()> {
        validate_http_endpoint("OPENAI_BASE_URL", &self.endpoint)?;
        if self.model.trim().is_empty() {
            return Err(ConfigError::EmptyModel.into());
        }
        if self.max_num_results == Some(0) {
            return Err(ConfigError::InvalidNumber {
                var: "FILE_SEARCH_MAX_RESULTS",
                reason: "expected a value >= 1",
            }
            .into());
        }
        Ok(())
    }

    /// Returns the credential or [`ConfigError::MissingVar`].
    pub fn api_key(&self) -> Result<&str> {
        self.api_key
            .as_deref()
            .ok_or_else(|| ConfigError::MissingVar("OPENAI_API_KEY").into())
    }

    /// Returns the vector store id or [`ConfigError::MissingVar`].
    pub fn vector_store_id(&self) -> Result<&str> {
        self.vector_store_id
            .as_deref()
            .ok_or_else(|| ConfigError::MissingVar("VECTOR_STORE_ID").into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error_handler::ResponsesError;

    #[test]
    fn missing_credentials_are_reported_by_name() {
        let cfg = ResponsesConfig::with_endpoint("http://localhost:1", None);
        match cfg.api_key() {
            Err(ResponsesError::Config(ConfigError::MissingVar(name))) => {
                assert_eq!(name, "OPENAI_API_KEY")
            }
            other => panic!("unexpected: {other:?}"),
        }
        match cfg.vector_store_id() {
            Err(ResponsesError::Config(ConfigError::MissingVar(name))) => {
                assert_eq!(name, "VECTOR_STORE_ID")
            }
            other => panic!("unexpected: {other:?}"),
        }
    }

    #[test]
    fn endpoint_trailing_slash_is_trimmed() {
        let cfg = ResponsesConfig::with_endpoint("http://localhost:9/", Some("k".into()));
        assert_eq!(cfg.endpoint, "http://localhost:9");
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn zero_max_results_is_rejected() {
        let mut cfg = ResponsesConfig::with_endpoint("http://localhost:9", None);
        cfg.max_num_results = Some(0);
        assert!(cfg.validate().is_err());
    }
}
