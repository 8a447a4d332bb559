//! Task execution results
//!
//! Every executor produces one variant of a single tagged union, so callers
//! switch on `type` instead of probing for shape-specific fields.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::Intent;

/// Sentiment polarity labels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SentimentLabel {
    #[serde(rename = "POSITIVE")]
    Positive,
    #[serde(rename = "NEGATIVE")]
    Negative,
}

impl SentimentLabel {
    pub fn as_str(&self) -> &'static str {
        match self {
            SentimentLabel::Positive => "POSITIVE",
            SentimentLabel::Negative => "NEGATIVE",
        }
    }
}

impl fmt::Display for SentimentLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Output of one dispatched task.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum TaskResult {
    /// Three-format summary of the content
    Summary {
        one_line: String,
        bullets: Vec<String>,
        detailed: String,
    },
    /// Polarity verdict over the content
    Sentiment {
        label: SentimentLabel,
        confidence: f32,
        justification: String,
    },
    /// Plain-language code analysis
    CodeExplanation {
        explanation: String,
        language: String,
        issues: Vec<String>,
        time_complexity: String,
        space_complexity: String,
    },
    /// Conversational answer, optionally grounded in content
    Answer { answer: String, used_context: bool },
    /// The extracted text itself, with counts
    ExtractedText {
        text: String,
        character_count: usize,
        word_count: usize,
    },
    /// Fetched video transcript
    Transcript { transcript: String },
}

impl TaskResult {
    /// Tag used in logs; matches the serialized `type` field.
    pub fn kind(&self) -> &'static str {
        match self {
            TaskResult::Summary { .. } => "summary",
            TaskResult::Sentiment { .. } => "sentiment",
            TaskResult::CodeExplanation { .. } => "code_explanation",
            TaskResult::Answer { .. } => "answer",
            TaskResult::ExtractedText { .. } => "extracted_text",
            TaskResult::Transcript { .. } => "transcript",
        }
    }

    /// Intent that produces this variant. A dispatched intent and the
    /// variant the executor returns must agree.
    pub fn intent(&self) -> Intent {
        match self {
            TaskResult::Summary { .. } => Intent::Summarization,
            TaskResult::Sentiment { .. } => Intent::SentimentAnalysis,
            TaskResult::CodeExplanation { .. } => Intent::CodeExplanation,
            TaskResult::Answer { .. } => Intent::Qa,
            TaskResult::ExtractedText { .. } => Intent::TextExtraction,
            TaskResult::Transcript { .. } => Intent::YoutubeTranscript,
        }
    }
}
