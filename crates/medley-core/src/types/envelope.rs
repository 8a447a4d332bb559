//! Response envelope and error taxonomy
//!
//! Every request, including failed ones, is answered with the same envelope
//! shape. Domain failures ride in the `error` field; transport-level errors
//! are the only thing surfaced as HTTP failures by the server.

use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{IntentDecision, SourceKind, TaskResult};

/// Failure categories surfaced to callers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// Classifier output could not be parsed into a decision
    ClassificationParse,
    /// Content could not be recovered from the input
    Extraction,
    /// A collaborator (LLM, extractor, local model) failed or timed out
    UpstreamUnavailable,
    /// No executor registered for the decided intent
    Routing,
    /// Input type the service does not accept
    UnsupportedInput,
    /// Content too small to act on
    InsufficientContent,
}

impl ErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::ClassificationParse => "classification_parse",
            ErrorKind::Extraction => "extraction",
            ErrorKind::UpstreamUnavailable => "upstream_unavailable",
            ErrorKind::Routing => "routing",
            ErrorKind::UnsupportedInput => "unsupported_input",
            ErrorKind::InsufficientContent => "insufficient_content",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Caller-facing error detail.
///
/// Messages are written by this service; upstream payloads are summarized,
/// never forwarded verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorInfo {
    pub kind: ErrorKind,
    pub message: String,
}

impl ErrorInfo {
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

impl fmt::Display for ErrorInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.kind, self.message)
    }
}

/// Provenance of extracted content, attached when a file or URL was ingested.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtractionMetadata {
    pub source_kind: SourceKind,
    pub filename: Option<String>,
    /// Extractor-specific note (page count, video URL, detected language)
    pub detail: Option<String>,
    pub character_count: usize,
}

impl ExtractionMetadata {
    pub fn new(source_kind: SourceKind, character_count: usize) -> Self {
        Self {
            source_kind,
            filename: None,
            detail: None,
            character_count,
        }
    }

    pub fn with_filename(mut self, filename: impl Into<String>) -> Self {
        self.filename = Some(filename.into());
        self
    }

    pub fn with_detail(mut self, detail: impl Into<String>) -> Self {
        self.detail = Some(detail.into());
        self
    }
}

/// Uniform response for every request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResponseEnvelope {
    pub request_id: Uuid,
    /// Echo of the content the decision was made over, truncated for display
    pub extracted_content: Option<String>,
    pub extraction_metadata: Option<ExtractionMetadata>,
    pub intent: IntentDecision,
    pub result: Option<TaskResult>,
    /// Human-readable processing trail
    pub logs: Vec<String>,
    pub error: Option<ErrorInfo>,
}

impl ResponseEnvelope {
    pub fn is_success(&self) -> bool {
        self.result.is_some() && self.error.is_none()
    }

    pub fn needs_clarification(&self) -> bool {
        self.intent.needs_clarification
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Intent;

    #[test]
    fn error_kind_serializes_snake_case() {
        let json = serde_json::to_string(&ErrorKind::UpstreamUnavailable).unwrap();
        assert_eq!(json, "\"upstream_unavailable\"");
    }

    #[test]
    fn envelope_round_trips() {
        let envelope = ResponseEnvelope {
            request_id: Uuid::new_v4(),
            extracted_content: Some("some text".to_string()),
            extraction_metadata: Some(
                ExtractionMetadata::new(SourceKind::Pdf, 9)
                    .with_filename("report.pdf")
                    .with_detail("3 pages"),
            ),
            intent: IntentDecision::resolve(Intent::Summarization, 0.9, None, "clear", 0.5),
            result: Some(TaskResult::Summary {
                one_line: "short".to_string(),
                bullets: vec!["a".to_string(), "b".to_string(), "c".to_string()],
                detailed: "longer".to_string(),
            }),
            logs: vec!["analyzing intent".to_string()],
            error: None,
        };
        let json = serde_json::to_string(&envelope).unwrap();
        let back: ResponseEnvelope = serde_json::from_str(&json).unwrap();
        assert!(back.is_success());
        assert_eq!(back.intent.intent, Intent::Summarization);
        assert_eq!(
            back.extraction_metadata.unwrap().filename.as_deref(),
            Some("report.pdf")
        );
    }
}
