//! # Medley Extract
//!
//! Input triage and content extraction for medley:
//! - filename-based source triage
//! - YouTube link detection in request text
//! - `Extractor` trait plus the HTTP sidecar client
//!
//! Extraction itself (OCR, PDF parsing, transcription) runs in a separate
//! service; this crate only decides what kind of input it has and talks to
//! that service.

mod service;
mod source;
mod youtube;

pub use service::{
    ensure_min_content, ExtractError, Extraction, Extractor, FailingExtractor, MockExtractor,
    RemoteExtractor,
};
pub use source::source_kind_for_filename;
pub use youtube::{contains_youtube_link, find_youtube_link, YoutubeLink};
