//! Client construction from configuration

use thiserror::Error;

use medley_config::{ApiKeyError, LlmSettings};

use crate::client::{HttpLlmClient, HttpLlmClientConfig, RetryPolicy};

/// Errors that can occur when building an LLM client.
#[derive(Debug, Error)]
pub enum LlmBuildError {
    #[error("environment variable '{0}' not found")]
    EnvNotFound(String),
    #[error("invalid client config: {0}")]
    InvalidConfig(String),
}

impl From<ApiKeyError> for LlmBuildError {
    fn from(err: ApiKeyError) -> Self {
        match err {
            ApiKeyError::EnvNotFound(name) => LlmBuildError::EnvNotFound(name),
        }
    }
}

/// Build the HTTP client from settings, resolving the API key from the
/// configured environment variable.
pub fn build_http_client(settings: &LlmSettings) -> Result<HttpLlmClient, LlmBuildError> {
    let api_key = settings.resolve_api_key()?;
    let config = HttpLlmClientConfig {
        endpoint: settings.endpoint.clone(),
        api_key,
        timeout_secs: settings.timeout_secs,
        retry: RetryPolicy::with_max_attempts(settings.max_attempts),
        ..HttpLlmClientConfig::default()
    };
    HttpLlmClient::new(config).map_err(|e| LlmBuildError::InvalidConfig(e.to_string()))
}
