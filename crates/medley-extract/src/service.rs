//! Extraction sidecar client
//!
//! The sidecar exposes two endpoints: `POST /extract/file` (multipart) for
//! uploads and `POST /extract/youtube` (JSON) for transcripts. Both return
//! `{"text": "...", "detail": "..."}`.

use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;
use thiserror::Error;
use tracing::{debug, info};

use medley_core::types::{ErrorInfo, ErrorKind, ExtractionMetadata, SourceKind};

use crate::youtube::YoutubeLink;

/// Extraction failures.
#[derive(Debug, Error)]
pub enum ExtractError {
    #[error("unsupported file type '{extension}' for '{filename}'")]
    UnsupportedType { filename: String, extension: String },
    #[error("http error: {0}")]
    Http(String),
    #[error("extraction service error: {0}")]
    Service(String),
    #[error("content too short: {chars} chars (minimum {min})")]
    TooShort { chars: usize, min: usize },
}

impl ExtractError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            ExtractError::UnsupportedType { .. } => ErrorKind::UnsupportedInput,
            ExtractError::Http(_) | ExtractError::Service(_) => ErrorKind::Extraction,
            ExtractError::TooShort { .. } => ErrorKind::InsufficientContent,
        }
    }
}

impl From<&ExtractError> for ErrorInfo {
    fn from(err: &ExtractError) -> Self {
        ErrorInfo::new(err.kind(), err.to_string())
    }
}

/// Reject content below the configured character floor.
pub fn ensure_min_content(text: &str, min: usize) -> Result<(), ExtractError> {
    let chars = text.trim().chars().count();
    if chars < min {
        return Err(ExtractError::TooShort { chars, min });
    }
    Ok(())
}

/// Extracted text plus provenance.
#[derive(Debug, Clone)]
pub struct Extraction {
    pub text: String,
    pub metadata: ExtractionMetadata,
}

/// Turns uploads and links into text.
#[async_trait]
pub trait Extractor: Send + Sync {
    /// Extract text from an uploaded file of a known kind.
    async fn extract_file(
        &self,
        filename: &str,
        bytes: Vec<u8>,
        kind: SourceKind,
    ) -> Result<Extraction, ExtractError>;

    /// Fetch the transcript for a YouTube link.
    async fn extract_youtube(&self, link: &YoutubeLink) -> Result<Extraction, ExtractError>;
}

#[derive(Debug, Deserialize)]
struct ExtractResponse {
    text: String,
    #[serde(default)]
    detail: Option<String>,
}

/// HTTP client for the extraction sidecar.
pub struct RemoteExtractor {
    client: reqwest::Client,
    base_url: String,
    min_content_chars: usize,
}

impl RemoteExtractor {
    pub fn new(
        base_url: impl Into<String>,
        timeout: Duration,
        min_content_chars: usize,
    ) -> Result<Self, ExtractError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ExtractError::Http(e.to_string()))?;
        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            min_content_chars,
        })
    }

    async fn parse_response(
        &self,
        response: reqwest::Response,
    ) -> Result<ExtractResponse, ExtractError> {
        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(ExtractError::Service(format!("HTTP {}: {}", status, text)));
        }
        response
            .json::<ExtractResponse>()
            .await
            .map_err(|e| ExtractError::Service(format!("invalid sidecar response: {}", e)))
    }
}

#[async_trait]
impl Extractor for RemoteExtractor {
    async fn extract_file(
        &self,
        filename: &str,
        bytes: Vec<u8>,
        kind: SourceKind,
    ) -> Result<Extraction, ExtractError> {
        debug!(filename, kind = %kind, bytes = bytes.len(), "sending file to extraction service");
        let part = reqwest::multipart::Part::bytes(bytes).file_name(filename.to_string());
        let form = reqwest::multipart::Form::new()
            .part("file", part)
            .text("kind", kind.as_str());
        let response = self
            .client
            .post(format!("{}/extract/file", self.base_url))
            .multipart(form)
            .send()
            .await
            .map_err(|e| ExtractError::Http(e.to_string()))?;
        let parsed = self.parse_response(response).await?;
        ensure_min_content(&parsed.text, self.min_content_chars)?;

        let character_count = parsed.text.chars().count();
        info!(filename, kind = %kind, character_count, "extraction completed");
        let mut metadata =
            ExtractionMetadata::new(kind, character_count).with_filename(filename);
        if let Some(detail) = parsed.detail {
            metadata = metadata.with_detail(detail);
        }
        Ok(Extraction {
            text: parsed.text,
            metadata,
        })
    }

    async fn extract_youtube(&self, link: &YoutubeLink) -> Result<Extraction, ExtractError> {
        debug!(video_id = %link.video_id, "requesting transcript from extraction service");
        let response = self
            .client
            .post(format!("{}/extract/youtube", self.base_url))
            .json(&serde_json::json!({ "url": link.url }))
            .send()
            .await
            .map_err(|e| ExtractError::Http(e.to_string()))?;
        let parsed = self.parse_response(response).await?;
        ensure_min_content(&parsed.text, self.min_content_chars)?;

        let character_count = parsed.text.chars().count();
        info!(video_id = %link.video_id, character_count, "transcript fetched");
        let metadata = ExtractionMetadata::new(SourceKind::Youtube, character_count)
            .with_detail(link.url.clone());
        Ok(Extraction {
            text: parsed.text,
            metadata,
        })
    }
}

/// Mock extractor returning a fixed text, for tests.
pub struct MockExtractor {
    pub text: String,
}

impl MockExtractor {
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }
}

#[async_trait]
impl Extractor for MockExtractor {
    async fn extract_file(
        &self,
        filename: &str,
        _bytes: Vec<u8>,
        kind: SourceKind,
    ) -> Result<Extraction, ExtractError> {
        Ok(Extraction {
            text: self.text.clone(),
            metadata: ExtractionMetadata::new(kind, self.text.chars().count())
                .with_filename(filename),
        })
    }

    async fn extract_youtube(&self, link: &YoutubeLink) -> Result<Extraction, ExtractError> {
        Ok(Extraction {
            text: self.text.clone(),
            metadata: ExtractionMetadata::new(SourceKind::Youtube, self.text.chars().count())
                .with_detail(link.url.clone()),
        })
    }
}

/// Mock extractor that always fails with a service error, for tests.
pub struct FailingExtractor {
    pub message: String,
}

impl FailingExtractor {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

#[async_trait]
impl Extractor for FailingExtractor {
    async fn extract_file(
        &self,
        _filename: &str,
        _bytes: Vec<u8>,
        _kind: SourceKind,
    ) -> Result<Extraction, ExtractError> {
        Err(ExtractError::Service(self.message.clone()))
    }

    async fn extract_youtube(&self, _link: &YoutubeLink) -> Result<Extraction, ExtractError> {
        Err(ExtractError::Service(self.message.clone()))
    }
}
