//! Intent taxonomy and classification decision
//!
//! `Intent` is a closed enum: routing is keyed on it, so a new capability
//! is added by extending the enum and the compiler points at every match
//! that needs updating. Labels the classifier emits outside the known set
//! deserialize to `Unknown` instead of failing.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Question used when the classifier cannot say what the caller wants.
pub const FALLBACK_QUESTION: &str = "Could you clarify what you would like me to do with this \
     input? For example: summarize it, analyze its sentiment, explain the code, or answer a \
     question about it.";

/// Closed set of capabilities the service can dispatch to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Intent {
    /// Condense content into one line, bullets, and a detailed summary
    Summarization,
    /// Classify emotional polarity of the content
    SentimentAnalysis,
    /// Explain what a piece of code does and flag issues
    CodeExplanation,
    /// Answer a question, optionally grounded in the content
    Qa,
    /// Return the extracted text itself
    TextExtraction,
    /// Return the fetched video transcript
    YoutubeTranscript,
    /// Could not be determined; never dispatched
    #[serde(other)]
    Unknown,
}

impl Intent {
    /// Every intent the router may carry an executor for.
    pub const DISPATCHABLE: [Intent; 6] = [
        Intent::Summarization,
        Intent::SentimentAnalysis,
        Intent::CodeExplanation,
        Intent::Qa,
        Intent::TextExtraction,
        Intent::YoutubeTranscript,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Intent::Summarization => "summarization",
            Intent::SentimentAnalysis => "sentiment_analysis",
            Intent::CodeExplanation => "code_explanation",
            Intent::Qa => "qa",
            Intent::TextExtraction => "text_extraction",
            Intent::YoutubeTranscript => "youtube_transcript",
            Intent::Unknown => "unknown",
        }
    }

    pub fn is_dispatchable(&self) -> bool {
        !matches!(self, Intent::Unknown)
    }
}

impl fmt::Display for Intent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Classification verdict.
///
/// Decisions are only built through [`IntentDecision::resolve`] and
/// [`IntentDecision::unresolved`], which keep one contract true everywhere:
/// `needs_clarification` holds exactly when the intent is `Unknown` or the
/// confidence is below the threshold, and a clarification question is
/// present exactly when `needs_clarification` is set.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IntentDecision {
    pub intent: Intent,
    pub confidence: f32,
    pub needs_clarification: bool,
    pub clarification_question: Option<String>,
    pub reasoning: String,
}

impl IntentDecision {
    /// Build a decision from classifier output, applying the confidence
    /// threshold.
    ///
    /// Confidence is clamped to `0.0..=1.0`; non-finite values count as 0.
    /// A supplied question is kept only when clarification is needed, and a
    /// missing one is replaced with [`FALLBACK_QUESTION`].
    pub fn resolve(
        intent: Intent,
        confidence: f32,
        question: Option<String>,
        reasoning: impl Into<String>,
        threshold: f32,
    ) -> Self {
        let confidence = if confidence.is_finite() {
            confidence.clamp(0.0, 1.0)
        } else {
            0.0
        };
        let needs_clarification = intent == Intent::Unknown || confidence < threshold;
        let clarification_question = if needs_clarification {
            Some(
                question
                    .filter(|q| !q.trim().is_empty())
                    .unwrap_or_else(|| FALLBACK_QUESTION.to_string()),
            )
        } else {
            None
        };
        Self {
            intent,
            confidence,
            needs_clarification,
            clarification_question,
            reasoning: reasoning.into(),
        }
    }

    /// Decision for requests that never produced a usable classification.
    pub fn unresolved(question: impl Into<String>, reasoning: impl Into<String>) -> Self {
        Self {
            intent: Intent::Unknown,
            confidence: 0.0,
            needs_clarification: true,
            clarification_question: Some(question.into()),
            reasoning: reasoning.into(),
        }
    }

    /// Check the clarification contract against a threshold.
    pub fn is_consistent_with(&self, threshold: f32) -> bool {
        let expected = self.intent == Intent::Unknown || self.confidence < threshold;
        self.needs_clarification == expected
            && self.needs_clarification == self.clarification_question.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_label_deserializes_to_unknown() {
        let intent: Intent = serde_json::from_str("\"database_query\"").unwrap();
        assert_eq!(intent, Intent::Unknown);
        let intent: Intent = serde_json::from_str("\"sentiment_analysis\"").unwrap();
        assert_eq!(intent, Intent::SentimentAnalysis);
    }

    #[test]
    fn confident_known_intent_needs_no_clarification() {
        let decision =
            IntentDecision::resolve(Intent::Summarization, 0.9, None, "clear request", 0.5);
        assert!(!decision.needs_clarification);
        assert_eq!(decision.clarification_question, None);
        assert!(decision.is_consistent_with(0.5));
    }

    #[test]
    fn low_confidence_forces_clarification_with_synthesized_question() {
        let decision = IntentDecision::resolve(Intent::Qa, 0.3, None, "", 0.5);
        assert_eq!(decision.intent, Intent::Qa);
        assert!(decision.needs_clarification);
        assert_eq!(
            decision.clarification_question.as_deref(),
            Some(FALLBACK_QUESTION)
        );
        assert!(decision.is_consistent_with(0.5));
    }

    #[test]
    fn unknown_intent_always_needs_clarification() {
        let decision = IntentDecision::resolve(
            Intent::Unknown,
            0.99,
            Some("What should I do with this?".to_string()),
            "",
            0.5,
        );
        assert!(decision.needs_clarification);
        assert_eq!(
            decision.clarification_question.as_deref(),
            Some("What should I do with this?")
        );
    }

    #[test]
    fn question_is_dropped_when_confident() {
        let decision = IntentDecision::resolve(
            Intent::Summarization,
            0.95,
            Some("Anything else?".to_string()),
            "",
            0.5,
        );
        assert_eq!(decision.clarification_question, None);
    }

    #[test]
    fn confidence_is_clamped_and_nan_counts_as_zero() {
        let decision = IntentDecision::resolve(Intent::Qa, 1.7, None, "", 0.5);
        assert_eq!(decision.confidence, 1.0);
        assert!(!decision.needs_clarification);

        let decision = IntentDecision::resolve(Intent::Qa, f32::NAN, None, "", 0.5);
        assert_eq!(decision.confidence, 0.0);
        assert!(decision.needs_clarification);

        let decision = IntentDecision::resolve(Intent::Qa, -0.4, None, "", 0.5);
        assert_eq!(decision.confidence, 0.0);
    }

    #[test]
    fn blank_question_is_replaced() {
        let decision =
            IntentDecision::resolve(Intent::Unknown, 0.0, Some("   ".to_string()), "", 0.5);
        assert_eq!(
            decision.clarification_question.as_deref(),
            Some(FALLBACK_QUESTION)
        );
    }

    #[test]
    fn unresolved_decision_is_consistent() {
        let decision = IntentDecision::unresolved("Could you rephrase?", "parse failed");
        assert_eq!(decision.intent, Intent::Unknown);
        assert_eq!(decision.confidence, 0.0);
        assert!(decision.is_consistent_with(0.5));
    }
}
