//! Multipart intake and input triage
//!
//! Turns a raw `/process` submission into an [`InputEnvelope`] ready for the
//! pipeline: uploads go through extension triage and the extraction service,
//! free text is scanned for a YouTube link, and anything else is taken as-is.
//! Failures here are domain failures; the handler folds them into a normal
//! response envelope rather than an error status.

use axum::extract::Multipart;
use thiserror::Error;
use tracing::{info, warn};

use medley_core::types::{ErrorInfo, ExtractionMetadata, InputEnvelope, SourceKind};
use medley_extract::{
    ensure_min_content, find_youtube_link, source_kind_for_filename, Extractor,
};

pub const DEFAULT_SESSION_ID: &str = "default";

/// Transport-level intake failures, the only ones that map to a 4xx.
#[derive(Debug, Error)]
pub enum IngestError {
    #[error("unreadable multipart request: {0}")]
    Multipart(String),
    #[error("no input provided (text or file required)")]
    NoInput,
}

#[derive(Debug)]
pub struct UploadedFile {
    pub filename: String,
    pub bytes: Vec<u8>,
}

#[derive(Debug)]
pub struct RawSubmission {
    pub text: String,
    pub file: Option<UploadedFile>,
    pub session_id: String,
}

/// Collect the known multipart fields, ignoring anything unexpected.
pub async fn read_submission(mut multipart: Multipart) -> Result<RawSubmission, IngestError> {
    let mut text = String::new();
    let mut file: Option<UploadedFile> = None;
    let mut session_id = DEFAULT_SESSION_ID.to_string();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| IngestError::Multipart(e.to_string()))?
    {
        let name = field.name().unwrap_or("").to_string();
        match name.as_str() {
            "text" => {
                text = field
                    .text()
                    .await
                    .map_err(|e| IngestError::Multipart(e.to_string()))?;
            }
            "file" => {
                let filename = field.file_name().map(|f| f.to_string());
                let bytes = field
                    .bytes()
                    .await
                    .map_err(|e| IngestError::Multipart(e.to_string()))?
                    .to_vec();
                if let Some(filename) = filename.filter(|f| !f.is_empty()) {
                    if !bytes.is_empty() {
                        file = Some(UploadedFile { filename, bytes });
                    }
                }
            }
            "session_id" => {
                let value = field
                    .text()
                    .await
                    .map_err(|e| IngestError::Multipart(e.to_string()))?;
                if !value.trim().is_empty() {
                    session_id = value.trim().to_string();
                }
            }
            _ => {}
        }
    }

    if text.trim().is_empty() && file.is_none() {
        return Err(IngestError::NoInput);
    }
    Ok(RawSubmission {
        text,
        file,
        session_id,
    })
}

/// Input ready for classification.
pub struct PreparedInput {
    pub input: InputEnvelope,
    pub metadata: Option<ExtractionMetadata>,
}

/// A pre-classification failure, with enough input left to build a
/// response envelope around it.
pub struct PrepareFailure {
    pub input: InputEnvelope,
    pub error: ErrorInfo,
}

/// Triage the submission and run extraction where needed.
///
/// A transcript miss on typed input is non-fatal: the text itself still
/// carries the request and classification proceeds on it.
pub async fn prepare_input(
    extractor: &dyn Extractor,
    submission: RawSubmission,
    min_content_chars: usize,
) -> Result<PreparedInput, PrepareFailure> {
    let query = submission.text;

    if let Some(file) = submission.file {
        let kind = match source_kind_for_filename(&file.filename) {
            Ok(kind) => kind,
            Err(err) => {
                warn!(filename = %file.filename, "rejected upload: {}", err);
                return Err(PrepareFailure {
                    input: InputEnvelope::empty(query, SourceKind::None),
                    error: ErrorInfo::from(&err),
                });
            }
        };
        info!(
            filename = %file.filename,
            kind = %kind,
            bytes = file.bytes.len(),
            "extracting uploaded file"
        );
        return match extractor.extract_file(&file.filename, file.bytes, kind).await {
            Ok(extraction) => Ok(PreparedInput {
                metadata: Some(extraction.metadata),
                input: InputEnvelope::extracted(query, extraction.text, kind),
            }),
            Err(err) => Err(PrepareFailure {
                input: InputEnvelope::empty(query, kind),
                error: ErrorInfo::from(&err),
            }),
        };
    }

    if let Some(link) = find_youtube_link(&query) {
        info!(video_id = %link.video_id, "fetching youtube transcript");
        match extractor.extract_youtube(&link).await {
            Ok(extraction) => {
                return Ok(PreparedInput {
                    metadata: Some(extraction.metadata),
                    input: InputEnvelope::extracted(query, extraction.text, SourceKind::Youtube),
                });
            }
            Err(err) => {
                warn!(
                    video_id = %link.video_id,
                    "transcript unavailable, falling back to the raw text: {}",
                    err
                );
            }
        }
    }

    if let Err(err) = ensure_min_content(&query, min_content_chars) {
        return Err(PrepareFailure {
            input: InputEnvelope::empty(query, SourceKind::RawText),
            error: ErrorInfo::from(&err),
        });
    }
    let metadata = ExtractionMetadata::new(SourceKind::RawText, query.trim().chars().count());
    Ok(PreparedInput {
        input: InputEnvelope::text(query),
        metadata: Some(metadata),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use medley_core::types::ErrorKind;
    use medley_extract::{FailingExtractor, MockExtractor};

    fn submission(text: &str, file: Option<UploadedFile>) -> RawSubmission {
        RawSubmission {
            text: text.to_string(),
            file,
            session_id: DEFAULT_SESSION_ID.to_string(),
        }
    }

    fn upload(filename: &str) -> Option<UploadedFile> {
        Some(UploadedFile {
            filename: filename.to_string(),
            bytes: vec![1, 2, 3],
        })
    }

    #[tokio::test]
    async fn plain_text_is_mirrored_into_content() {
        let extractor = MockExtractor::new("unused");
        let prepared = prepare_input(&extractor, submission("summarize my notes", None), 5)
            .await
            .ok()
            .unwrap();
        assert_eq!(prepared.input.query, "summarize my notes");
        assert_eq!(
            prepared.input.extracted_content.as_deref(),
            Some("summarize my notes")
        );
        assert_eq!(prepared.input.source_kind, SourceKind::RawText);
        let metadata = prepared.metadata.unwrap();
        assert_eq!(metadata.source_kind, SourceKind::RawText);
    }

    #[tokio::test]
    async fn short_text_fails_the_content_floor() {
        let extractor = MockExtractor::new("unused");
        let failure = prepare_input(&extractor, submission("hi", None), 5)
            .await
            .err()
            .unwrap();
        assert_eq!(failure.error.kind, ErrorKind::InsufficientContent);
        assert_eq!(failure.input.query, "hi");
    }

    #[tokio::test]
    async fn upload_goes_through_the_extractor() {
        let extractor = MockExtractor::new("scanned page text here");
        let prepared = prepare_input(&extractor, submission("", upload("scan.pdf")), 5)
            .await
            .ok()
            .unwrap();
        assert_eq!(prepared.input.source_kind, SourceKind::Pdf);
        assert_eq!(
            prepared.input.extracted_content.as_deref(),
            Some("scanned page text here")
        );
        let metadata = prepared.metadata.unwrap();
        assert_eq!(metadata.filename.as_deref(), Some("scan.pdf"));
    }

    #[tokio::test]
    async fn unsupported_extension_is_rejected_before_extraction() {
        let extractor = FailingExtractor::new("must not be called");
        let failure = prepare_input(&extractor, submission("", upload("malware.exe")), 5)
            .await
            .err()
            .unwrap();
        assert_eq!(failure.error.kind, ErrorKind::UnsupportedInput);
        assert!(failure.error.message.contains("exe"));
        assert_eq!(failure.input.source_kind, SourceKind::None);
    }

    #[tokio::test]
    async fn extraction_failure_is_reported_as_such() {
        let extractor = FailingExtractor::new("ocr backend down");
        let failure = prepare_input(&extractor, submission("", upload("photo.png")), 5)
            .await
            .err()
            .unwrap();
        assert_eq!(failure.error.kind, ErrorKind::Extraction);
        assert!(failure.error.message.contains("ocr backend down"));
    }

    #[tokio::test]
    async fn youtube_link_fetches_a_transcript() {
        let extractor = MockExtractor::new("hello and welcome to the channel");
        let text = "summarize https://youtu.be/dQw4w9WgXcQ please";
        let prepared = prepare_input(&extractor, submission(text, None), 5)
            .await
            .ok()
            .unwrap();
        assert_eq!(prepared.input.source_kind, SourceKind::Youtube);
        assert_eq!(
            prepared.input.extracted_content.as_deref(),
            Some("hello and welcome to the channel")
        );
    }

    #[tokio::test]
    async fn transcript_miss_falls_back_to_the_raw_text() {
        let extractor = FailingExtractor::new("no captions");
        let text = "summarize https://youtu.be/dQw4w9WgXcQ please";
        let prepared = prepare_input(&extractor, submission(text, None), 5)
            .await
            .ok()
            .unwrap();
        assert_eq!(prepared.input.source_kind, SourceKind::RawText);
        assert_eq!(prepared.input.extracted_content.as_deref(), Some(text));
    }
}
