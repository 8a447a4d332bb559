//! # Medley LLM
//!
//! LLM plumbing for medley:
//! - `LlmClient` trait plus an OpenAI-compatible HTTP implementation with
//!   timeout and bounded retry
//! - the LLM-backed `IntentClassifier`
//! - construction from `medley-config` settings
//! - mock clients for tests

mod classifier;
mod client;
mod factory;

pub use classifier::{ClassifierConfig, LlmIntentClassifier};
pub use client::{
    extract_json, truncate_for_log, HttpLlmClient, HttpLlmClientConfig, LlmClient, LlmError,
    LlmRequest, MockLlmClient, RetryPolicy, SequenceLlmClient,
};
pub use factory::{build_http_client, LlmBuildError};
