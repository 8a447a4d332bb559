//! Filename-based source triage

use medley_core::types::SourceKind;

use crate::service::ExtractError;

const IMAGE_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "bmp", "gif"];
const AUDIO_EXTENSIONS: &[&str] = &["mp3", "wav", "m4a", "ogg", "flac"];

/// Map an uploaded filename to the source kind its bytes will be treated
/// as. Unrecognized extensions are rejected up front, before any bytes are
/// shipped to the extraction service.
pub fn source_kind_for_filename(filename: &str) -> Result<SourceKind, ExtractError> {
    let extension = filename
        .rsplit_once('.')
        .map(|(_, ext)| ext.to_ascii_lowercase())
        .unwrap_or_default();
    match extension.as_str() {
        ext if IMAGE_EXTENSIONS.contains(&ext) => Ok(SourceKind::Image),
        "pdf" => Ok(SourceKind::Pdf),
        ext if AUDIO_EXTENSIONS.contains(&ext) => Ok(SourceKind::Audio),
        _ => Err(ExtractError::UnsupportedType {
            filename: filename.to_string(),
            extension,
        }),
    }
}
