//! Inbound request envelope
//!
//! The ingest layer normalizes every request (raw text, file upload, URL)
//! into an `InputEnvelope` before classification.

use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Where the content of a request came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceKind {
    /// No source could be established (e.g. a rejected upload)
    None,
    /// Image upload routed through OCR
    Image,
    /// PDF document upload
    Pdf,
    /// Audio upload routed through transcription
    Audio,
    /// YouTube link found in the request text
    Youtube,
    /// Plain text typed or pasted by the caller
    RawText,
}

impl SourceKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            SourceKind::None => "none",
            SourceKind::Image => "image",
            SourceKind::Pdf => "pdf",
            SourceKind::Audio => "audio",
            SourceKind::Youtube => "youtube",
            SourceKind::RawText => "raw_text",
        }
    }
}

impl fmt::Display for SourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Normalized inbound request.
///
/// `query` carries whatever the caller typed and may be empty for bare file
/// uploads. `extracted_content` is the text recovered from the input; for
/// plain-text requests it mirrors `query` so executors have one place to
/// look for material to work on.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InputEnvelope {
    /// Correlation id carried through logs and the response
    pub request_id: Uuid,
    pub query: String,
    pub extracted_content: Option<String>,
    pub source_kind: SourceKind,
}

impl InputEnvelope {
    /// Envelope for a plain-text request. The text doubles as content.
    pub fn text(query: impl Into<String>) -> Self {
        let query = query.into();
        Self {
            request_id: Uuid::new_v4(),
            extracted_content: Some(query.clone()),
            query,
            source_kind: SourceKind::RawText,
        }
    }

    /// Envelope for a request whose content was recovered by an extractor.
    pub fn extracted(
        query: impl Into<String>,
        content: impl Into<String>,
        source_kind: SourceKind,
    ) -> Self {
        Self {
            request_id: Uuid::new_v4(),
            query: query.into(),
            extracted_content: Some(content.into()),
            source_kind,
        }
    }

    /// Envelope with no usable content, kept so failures can still be
    /// answered with a fully populated response.
    pub fn empty(query: impl Into<String>, source_kind: SourceKind) -> Self {
        Self {
            request_id: Uuid::new_v4(),
            query: query.into(),
            extracted_content: None,
            source_kind,
        }
    }

    /// Extracted content, with blank strings treated as absent.
    pub fn content(&self) -> Option<&str> {
        self.extracted_content
            .as_deref()
            .filter(|c| !c.trim().is_empty())
    }
}
