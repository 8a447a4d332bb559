//! # Medley Config
//!
//! Unified single-file configuration for the medley service. A single
//! `medley.yaml` configures the LLM backend, classifier thresholds, the
//! extraction sidecar, task budgets, and server binding. Every field has a
//! default, so an empty file is a valid config.

use std::env;
use std::fs;
use std::net::SocketAddr;
use std::path::Path;

use serde::Deserialize;
use thiserror::Error;

/// Configuration loading errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("YAML parse error: {0}")]
    Parse(#[from] serde_yaml::Error),
    #[error("Invalid config: {0}")]
    Invalid(String),
}

/// API key resolution errors.
#[derive(Debug, Error)]
pub enum ApiKeyError {
    #[error("environment variable '{0}' not found")]
    EnvNotFound(String),
}

/// Top-level configuration schema for medley.
#[derive(Debug, Clone, Deserialize)]
pub struct MedleyConfig {
    /// Config schema version.
    #[serde(default = "default_version")]
    pub version: u32,
    #[serde(default)]
    pub llm: LlmSettings,
    #[serde(default)]
    pub classifier: ClassifierSettings,
    #[serde(default)]
    pub extraction: ExtractionSettings,
    #[serde(default)]
    pub tasks: TaskSettings,
    #[serde(default)]
    pub server: ServerSettings,
}

fn default_version() -> u32 {
    1
}

impl Default for MedleyConfig {
    fn default() -> Self {
        Self {
            version: default_version(),
            llm: LlmSettings::default(),
            classifier: ClassifierSettings::default(),
            extraction: ExtractionSettings::default(),
            tasks: TaskSettings::default(),
            server: ServerSettings::default(),
        }
    }
}

/// LLM backend connection settings (OpenAI-compatible chat endpoint).
#[derive(Debug, Clone, Deserialize)]
pub struct LlmSettings {
    #[serde(default = "default_llm_endpoint")]
    pub endpoint: String,
    /// Name of the environment variable holding the API key. Set to null
    /// for keyless local endpoints.
    #[serde(default = "default_api_key_env")]
    pub api_key_env: Option<String>,
    #[serde(default = "default_llm_model")]
    pub model: String,
    #[serde(default = "default_llm_timeout_secs")]
    pub timeout_secs: u64,
    /// Total attempts per call, counting the first one.
    #[serde(default = "default_llm_max_attempts")]
    pub max_attempts: u32,
}

impl Default for LlmSettings {
    fn default() -> Self {
        Self {
            endpoint: default_llm_endpoint(),
            api_key_env: default_api_key_env(),
            model: default_llm_model(),
            timeout_secs: default_llm_timeout_secs(),
            max_attempts: default_llm_max_attempts(),
        }
    }
}

impl LlmSettings {
    /// Resolve the API key from the configured environment variable.
    ///
    /// `Ok(None)` means the endpoint is keyless by configuration; a named
    /// but unset variable is an error so misconfiguration fails at boot.
    pub fn resolve_api_key(&self) -> Result<Option<String>, ApiKeyError> {
        match &self.api_key_env {
            Some(name) => env::var(name)
                .map(Some)
                .map_err(|_| ApiKeyError::EnvNotFound(name.clone())),
            None => Ok(None),
        }
    }
}

fn default_llm_endpoint() -> String {
    "https://api.openai.com/v1/chat/completions".to_string()
}

fn default_api_key_env() -> Option<String> {
    Some("MEDLEY_LLM_API_KEY".to_string())
}

fn default_llm_model() -> String {
    "gpt-4o-mini".to_string()
}

fn default_llm_timeout_secs() -> u64 {
    60
}

fn default_llm_max_attempts() -> u32 {
    2
}

/// Intent classifier tuning.
#[derive(Debug, Clone, Deserialize)]
pub struct ClassifierSettings {
    /// Decisions below this confidence are returned as clarification
    /// questions instead of being dispatched.
    #[serde(default = "default_confidence_threshold")]
    pub confidence_threshold: f32,
    /// Re-asks after a malformed classification before falling back.
    #[serde(default = "default_classifier_retries")]
    pub max_retries: u32,
    /// Content chars shown to the classifier prompt.
    #[serde(default = "default_classifier_content_chars")]
    pub max_content_chars: usize,
}

impl Default for ClassifierSettings {
    fn default() -> Self {
        Self {
            confidence_threshold: default_confidence_threshold(),
            max_retries: default_classifier_retries(),
            max_content_chars: default_classifier_content_chars(),
        }
    }
}

fn default_confidence_threshold() -> f32 {
    0.5
}

fn default_classifier_retries() -> u32 {
    1
}

fn default_classifier_content_chars() -> usize {
    800
}

/// Extraction sidecar settings.
#[derive(Debug, Clone, Deserialize)]
pub struct ExtractionSettings {
    #[serde(default = "default_extraction_url")]
    pub service_url: String,
    #[serde(default = "default_extraction_timeout_secs")]
    pub timeout_secs: u64,
    /// Extracted or pasted content shorter than this is rejected.
    #[serde(default = "default_min_content_chars")]
    pub min_content_chars: usize,
}

impl Default for ExtractionSettings {
    fn default() -> Self {
        Self {
            service_url: default_extraction_url(),
            timeout_secs: default_extraction_timeout_secs(),
            min_content_chars: default_min_content_chars(),
        }
    }
}

fn default_extraction_url() -> String {
    "http://127.0.0.1:8090".to_string()
}

fn default_extraction_timeout_secs() -> u64 {
    30
}

fn default_min_content_chars() -> usize {
    5
}

/// Per-task input budgets, in characters.
#[derive(Debug, Clone, Deserialize)]
pub struct TaskSettings {
    #[serde(default = "default_summary_input_chars")]
    pub summary_input_chars: usize,
    #[serde(default = "default_qa_context_chars")]
    pub qa_context_chars: usize,
    #[serde(default = "default_sentiment_input_chars")]
    pub sentiment_input_chars: usize,
}

impl Default for TaskSettings {
    fn default() -> Self {
        Self {
            summary_input_chars: default_summary_input_chars(),
            qa_context_chars: default_qa_context_chars(),
            sentiment_input_chars: default_sentiment_input_chars(),
        }
    }
}

fn default_summary_input_chars() -> usize {
    4_000
}

fn default_qa_context_chars() -> usize {
    2_000
}

fn default_sentiment_input_chars() -> usize {
    500
}

/// HTTP server settings.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerSettings {
    #[serde(default = "default_listen")]
    pub listen: String,
    #[serde(default = "default_max_upload_bytes")]
    pub max_upload_bytes: usize,
    /// Sessions kept for clarification round-trips; oldest are evicted.
    #[serde(default = "default_session_capacity")]
    pub session_capacity: usize,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            listen: default_listen(),
            max_upload_bytes: default_max_upload_bytes(),
            session_capacity: default_session_capacity(),
        }
    }
}

fn default_listen() -> String {
    "127.0.0.1:8080".to_string()
}

fn default_max_upload_bytes() -> usize {
    10 * 1024 * 1024
}

fn default_session_capacity() -> usize {
    1_024
}

/// Load the full medley configuration from a YAML file.
pub fn load_config(path: &Path) -> Result<MedleyConfig, ConfigError> {
    let content = fs::read_to_string(path)?;
    let config: MedleyConfig = serde_yaml::from_str(&content)?;
    validate_config(&config)?;
    Ok(config)
}

fn validate_config(config: &MedleyConfig) -> Result<(), ConfigError> {
    if config.version == 0 {
        return Err(ConfigError::Invalid(
            "version must be greater than 0".to_string(),
        ));
    }

    if config.llm.endpoint.trim().is_empty() {
        return Err(ConfigError::Invalid(
            "llm.endpoint must not be empty".to_string(),
        ));
    }

    if config.llm.model.trim().is_empty() {
        return Err(ConfigError::Invalid(
            "llm.model must not be empty".to_string(),
        ));
    }

    if config.llm.timeout_secs == 0 {
        return Err(ConfigError::Invalid(
            "llm.timeout_secs must be > 0".to_string(),
        ));
    }

    if config.llm.max_attempts == 0 {
        return Err(ConfigError::Invalid(
            "llm.max_attempts must be > 0".to_string(),
        ));
    }

    if !(0.0..=1.0).contains(&config.classifier.confidence_threshold) {
        return Err(ConfigError::Invalid(
            "classifier.confidence_threshold must be within 0.0..=1.0".to_string(),
        ));
    }

    if config.classifier.max_content_chars == 0 {
        return Err(ConfigError::Invalid(
            "classifier.max_content_chars must be > 0".to_string(),
        ));
    }

    if config.extraction.service_url.trim().is_empty() {
        return Err(ConfigError::Invalid(
            "extraction.service_url must not be empty".to_string(),
        ));
    }

    if config.extraction.min_content_chars == 0 {
        return Err(ConfigError::Invalid(
            "extraction.min_content_chars must be > 0".to_string(),
        ));
    }

    if config.tasks.summary_input_chars == 0
        || config.tasks.qa_context_chars == 0
        || config.tasks.sentiment_input_chars == 0
    {
        return Err(ConfigError::Invalid(
            "tasks.*_chars budgets must be > 0".to_string(),
        ));
    }

    if config.server.listen.parse::<SocketAddr>().is_err() {
        return Err(ConfigError::Invalid(
            "server.listen must be a socket address like 127.0.0.1:8080".to_string(),
        ));
    }

    if config.server.session_capacity == 0 {
        return Err(ConfigError::Invalid(
            "server.session_capacity must be > 0".to_string(),
        ));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_yaml_yields_defaults() {
        let config: MedleyConfig = serde_yaml::from_str("{}").unwrap();
        assert_eq!(config.version, 1);
        assert_eq!(config.classifier.confidence_threshold, 0.5);
        assert_eq!(config.classifier.max_retries, 1);
        assert_eq!(config.classifier.max_content_chars, 800);
        assert_eq!(config.llm.model, "gpt-4o-mini");
        assert_eq!(config.llm.timeout_secs, 60);
        assert_eq!(config.extraction.min_content_chars, 5);
        assert_eq!(config.tasks.summary_input_chars, 4_000);
        assert_eq!(config.server.listen, "127.0.0.1:8080");
        assert!(validate_config(&config).is_ok());
    }

    #[test]
    fn partial_yaml_keeps_other_defaults() {
        let yaml = r#"
llm:
  model: llama3
  api_key_env: null
classifier:
  confidence_threshold: 0.7
"#;
        let config: MedleyConfig = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(config.llm.model, "llama3");
        assert_eq!(config.llm.api_key_env, None);
        assert_eq!(config.classifier.confidence_threshold, 0.7);
        assert_eq!(config.classifier.max_retries, 1);
        assert_eq!(config.tasks.qa_context_chars, 2_000);
    }

    #[test]
    fn out_of_range_threshold_is_rejected() {
        let yaml = "classifier:\n  confidence_threshold: 1.5\n";
        let config: MedleyConfig = serde_yaml::from_str(yaml).unwrap();
        let err = validate_config(&config).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
        assert!(err.to_string().contains("confidence_threshold"));
    }

    #[test]
    fn bad_listen_address_is_rejected() {
        let yaml = "server:\n  listen: not-an-address\n";
        let config: MedleyConfig = serde_yaml::from_str(yaml).unwrap();
        let err = validate_config(&config).unwrap_err();
        assert!(err.to_string().contains("server.listen"));
    }

    #[test]
    fn api_key_resolution_reads_environment() {
        let settings = LlmSettings {
            api_key_env: Some("MEDLEY_CONFIG_TEST_KEY".to_string()),
            ..LlmSettings::default()
        };
        env::set_var("MEDLEY_CONFIG_TEST_KEY", "sk-test");
        assert_eq!(
            settings.resolve_api_key().unwrap(),
            Some("sk-test".to_string())
        );
        env::remove_var("MEDLEY_CONFIG_TEST_KEY");
        assert!(matches!(
            settings.resolve_api_key(),
            Err(ApiKeyError::EnvNotFound(_))
        ));

        let keyless = LlmSettings {
            api_key_env: None,
            ..LlmSettings::default()
        };
        assert_eq!(keyless.resolve_api_key().unwrap(), None);
    }
}
