//! Passthrough executors for extraction-only intents
//!
//! Text extraction and transcript fetching already happened at ingest; by
//! the time these run, the work is done. They repackage the extracted
//! content as the task result so the envelope carries it in the right shape.

use async_trait::async_trait;

use medley_core::route::{ExecutionError, TaskExecutor};
use medley_core::types::{Intent, TaskResult};

/// Wraps already-extracted content for the two extraction intents.
pub struct PassthroughExtraction {
    mode: Intent,
}

impl PassthroughExtraction {
    pub fn text_extraction() -> Self {
        Self {
            mode: Intent::TextExtraction,
        }
    }

    pub fn youtube_transcript() -> Self {
        Self {
            mode: Intent::YoutubeTranscript,
        }
    }
}

#[async_trait]
impl TaskExecutor for PassthroughExtraction {
    fn name(&self) -> &str {
        match self.mode {
            Intent::YoutubeTranscript => "youtube_transcript",
            _ => "text_extraction",
        }
    }

    fn intent(&self) -> Intent {
        self.mode
    }

    async fn execute(
        &self,
        content: Option<&str>,
        _query: &str,
    ) -> Result<TaskResult, ExecutionError> {
        let content = content.filter(|c| !c.trim().is_empty()).ok_or_else(|| {
            ExecutionError::InsufficientContent(
                "no content was extracted from the input".to_string(),
            )
        })?;

        match self.mode {
            Intent::TextExtraction => Ok(TaskResult::ExtractedText {
                text: content.to_string(),
                character_count: content.chars().count(),
                word_count: content.split_whitespace().count(),
            }),
            Intent::YoutubeTranscript => Ok(TaskResult::Transcript {
                transcript: content.to_string(),
            }),
            other => Err(ExecutionError::Routing(other)),
        }
    }
}
