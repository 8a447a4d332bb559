//! Response envelope assembly

use tracing::debug;

use crate::route::ExecutionError;
use crate::types::{
    ErrorInfo, ExtractionMetadata, InputEnvelope, IntentDecision, ResponseEnvelope, TaskResult,
};

/// Display budget for the content echoed back in the envelope.
const MAX_DISPLAY_CONTENT_CHARS: usize = 1_000;

/// Question attached to envelopes that failed before classification.
pub const RESUBMIT_QUESTION: &str =
    "I couldn't read that input. Could you re-send it or paste the text directly?";

/// Caller-visible processing trail, mirrored to tracing at debug level.
#[derive(Debug, Clone, Default)]
pub struct TraceLog {
    entries: Vec<String>,
}

impl TraceLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, entry: impl Into<String>) {
        let entry = entry.into();
        debug!(step = %entry, "pipeline step");
        self.entries.push(entry);
    }

    pub fn entries(&self) -> &[String] {
        &self.entries
    }

    pub fn into_entries(self) -> Vec<String> {
        self.entries
    }
}

/// Truncate to a character budget, appending a marker with the real size.
pub fn truncate_for_log(input: &str, max_chars: usize) -> String {
    let char_count = input.chars().count();
    if char_count <= max_chars {
        return input.to_string();
    }
    let mut preview: String = input.chars().take(max_chars).collect();
    preview.push_str(&format!("... [truncated, total_chars={}]", char_count));
    preview
}

fn display_content(input: &InputEnvelope) -> Option<String> {
    input.extracted_content.as_deref().map(|content| {
        if content.chars().count() <= MAX_DISPLAY_CONTENT_CHARS {
            return content.to_string();
        }
        let mut preview: String = content.chars().take(MAX_DISPLAY_CONTENT_CHARS).collect();
        preview.push_str("...");
        preview
    })
}

/// Assemble the final envelope for a classified request.
///
/// `outcome` is `None` when the gate stopped the request for clarification;
/// callers must not pass an outcome together with a decision that needs
/// clarification.
pub fn assemble(
    input: &InputEnvelope,
    metadata: Option<ExtractionMetadata>,
    decision: IntentDecision,
    outcome: Option<Result<TaskResult, ExecutionError>>,
    logs: TraceLog,
) -> ResponseEnvelope {
    let (result, error) = match outcome {
        Some(Ok(result)) => (Some(result), None),
        Some(Err(err)) => (None, Some(ErrorInfo::from(&err))),
        None => (None, None),
    };
    ResponseEnvelope {
        request_id: input.request_id,
        extracted_content: display_content(input),
        extraction_metadata: metadata,
        intent: decision,
        result,
        logs: logs.into_entries(),
        error,
    }
}

/// Assemble an envelope for a request that failed before classification,
/// e.g. extraction or triage failures. The decision is an unresolved one so
/// the envelope stays fully populated.
pub fn assemble_failure(
    input: &InputEnvelope,
    metadata: Option<ExtractionMetadata>,
    error: ErrorInfo,
    mut logs: TraceLog,
) -> ResponseEnvelope {
    logs.record(format!("request failed: {}", error.message));
    ResponseEnvelope {
        request_id: input.request_id,
        extracted_content: display_content(input),
        extraction_metadata: metadata,
        intent: IntentDecision::unresolved(
            RESUBMIT_QUESTION,
            "input could not be prepared for classification",
        ),
        result: None,
        logs: logs.into_entries(),
        error: Some(error),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{ErrorKind, Intent, SourceKind};

    fn decision() -> IntentDecision {
        IntentDecision::resolve(Intent::Summarization, 0.9, None, "clear", 0.5)
    }

    #[test]
    fn echoed_content_is_truncated_to_display_budget() {
        let long = "x".repeat(MAX_DISPLAY_CONTENT_CHARS + 500);
        let input = InputEnvelope::text(long);
        let envelope = assemble(&input, None, decision(), None, TraceLog::new());
        let echoed = envelope.extracted_content.unwrap();
        assert!(echoed.ends_with("..."));
        assert_eq!(echoed.chars().count(), MAX_DISPLAY_CONTENT_CHARS + 3);

        let input = InputEnvelope::text("short");
        let envelope = assemble(&input, None, decision(), None, TraceLog::new());
        assert_eq!(envelope.extracted_content.as_deref(), Some("short"));
    }

    #[test]
    fn executor_failure_becomes_envelope_error() {
        let input = InputEnvelope::text("some content here");
        let outcome = Err(ExecutionError::UpstreamUnavailable(
            "llm call failed".to_string(),
        ));
        let envelope = assemble(&input, None, decision(), Some(outcome), TraceLog::new());
        assert!(envelope.result.is_none());
        let error = envelope.error.unwrap();
        assert_eq!(error.kind, ErrorKind::UpstreamUnavailable);
        assert!(error.message.contains("llm call failed"));
    }

    #[test]
    fn failure_envelope_keeps_the_clarification_contract() {
        let input = InputEnvelope::empty("", SourceKind::Image);
        let error = ErrorInfo::new(ErrorKind::Extraction, "ocr service unreachable");
        let envelope = assemble_failure(&input, None, error, TraceLog::new());
        assert_eq!(envelope.intent.intent, Intent::Unknown);
        assert!(envelope.intent.needs_clarification);
        assert!(envelope.intent.clarification_question.is_some());
        assert!(envelope.result.is_none());
        assert_eq!(envelope.error.unwrap().kind, ErrorKind::Extraction);
        assert!(envelope.logs.iter().any(|l| l.contains("request failed")));
    }

    #[test]
    fn trace_log_preserves_order() {
        let mut logs = TraceLog::new();
        logs.record("first");
        logs.record("second");
        let input = InputEnvelope::text("content");
        let envelope = assemble(&input, None, decision(), None, logs);
        assert_eq!(envelope.logs, vec!["first", "second"]);
    }

    #[test]
    fn truncate_for_log_appends_marker() {
        let text = "abcdef";
        assert_eq!(truncate_for_log(text, 10), "abcdef");
        let truncated = truncate_for_log(text, 3);
        assert!(truncated.starts_with("abc"));
        assert!(truncated.contains("total_chars=6"));
    }
}
