//! LLM-backed intent classification
//!
//! The model is asked for a strict-JSON verdict. Output is treated as
//! untrusted: the JSON object is cut out of whatever prose surrounds it,
//! schema-validated, and re-asked once with a stricter instruction on
//! failure. When nothing usable comes back the classifier returns an
//! unknown-intent decision instead of an error.

use async_trait::async_trait;
use serde::Deserialize;
use tracing::{debug, info, warn};

use medley_config::{ClassifierSettings, LlmSettings};
use medley_core::classify::IntentClassifier;
use medley_core::types::{InputEnvelope, Intent, IntentDecision, SourceKind, FALLBACK_QUESTION};

use crate::client::{extract_json, truncate_for_log, LlmClient, LlmRequest};

const CLASSIFIER_TEMPERATURE: f32 = 0.1;
const CLASSIFIER_MAX_TOKENS: u32 = 500;
const MAX_PROMPT_LOG_CHARS: usize = 2_000;
const MAX_OUTPUT_LOG_CHARS: usize = 2_000;

const STRICT_RETRY_INSTRUCTION: &str = "Your previous reply was not a valid JSON object. Respond \
     with ONLY one JSON object matching the required schema. No prose, no code fences.";

/// Classifier tuning knobs.
#[derive(Debug, Clone)]
pub struct ClassifierConfig {
    pub model: String,
    /// Decisions below this confidence are turned into clarifications.
    pub confidence_threshold: f32,
    /// Re-asks after malformed output before falling back to unknown.
    pub max_retries: u32,
    /// Content chars included in the prompt.
    pub max_content_chars: usize,
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self {
            model: "gpt-4o-mini".to_string(),
            confidence_threshold: 0.5,
            max_retries: 1,
            max_content_chars: 800,
        }
    }
}

impl ClassifierConfig {
    pub fn from_settings(llm: &LlmSettings, classifier: &ClassifierSettings) -> Self {
        Self {
            model: llm.model.clone(),
            confidence_threshold: classifier.confidence_threshold,
            max_retries: classifier.max_retries,
            max_content_chars: classifier.max_content_chars,
        }
    }
}

/// Classifies requests by asking the configured LLM for a strict-JSON
/// verdict.
pub struct LlmIntentClassifier<C: LlmClient> {
    client: C,
    config: ClassifierConfig,
}

/// Shape the model is asked to produce. Unknown intent labels deserialize
/// to `Intent::Unknown`; missing confidence counts as 0.0.
#[derive(Debug, Deserialize)]
struct RawClassification {
    intent: Intent,
    #[serde(default)]
    confidence: f32,
    #[serde(default)]
    needs_clarification: bool,
    #[serde(default)]
    clarification_question: Option<String>,
    #[serde(default)]
    reasoning: Option<String>,
}

impl<C: LlmClient> LlmIntentClassifier<C> {
    pub fn new(client: C, config: ClassifierConfig) -> Self {
        Self { client, config }
    }

    fn build_prompt(&self, input: &InputEnvelope) -> (String, String) {
        let mut system = String::new();
        system.push_str(
            "You are the intent classifier of a multimodal assistant. Decide which single \
             capability the user's request calls for.\n\nCapabilities:\n",
        );
        system.push_str(
            "- summarization: condense the content into a summary\n\
             - sentiment_analysis: judge the emotional polarity of the content\n\
             - code_explanation: explain what a piece of code does\n\
             - qa: answer a question, using the content when given\n\
             - text_extraction: return the text recovered from a file\n\
             - youtube_transcript: return the transcript of a video\n\
             - unknown: none of the above fits\n",
        );
        system.push_str("\nRules:\n");
        system.push_str("1) Return ONLY one valid JSON object, no prose and no code fences.\n");
        system.push_str(
            "2) Schema: {\"intent\":\"...\",\"confidence\":0.0,\"needs_clarification\":false,\
             \"clarification_question\":null,\"reasoning\":\"...\"}\n",
        );
        system.push_str("3) confidence is your own certainty, between 0.0 and 1.0.\n");
        system.push_str(
            "4) If the request is ambiguous, set intent to \"unknown\", set \
             needs_clarification to true and write one short, specific question.\n",
        );
        system.push_str(
            "5) Pick qa when the user asks a question about the content; pick \
             text_extraction when they only want the text back.\n",
        );
        system.push_str("6) Keep reasoning to one sentence.\n");

        let mut user = String::new();
        user.push_str(&format!("Request:\n{}\n", input.query.trim()));
        if let Some(content) = input.content() {
            let preview: String = content.chars().take(self.config.max_content_chars).collect();
            match input.source_kind {
                SourceKind::RawText | SourceKind::None => {
                    user.push_str(&format!("\nContent:\n{}\n", preview))
                }
                kind => user.push_str(&format!(
                    "\nContent (from {}, first {} chars):\n{}\n",
                    kind, self.config.max_content_chars, preview
                )),
            }
        }
        user.push_str("\nReturn the JSON object now.\n");

        (system, user)
    }

    fn decision_from_raw(&self, raw: RawClassification) -> IntentDecision {
        // A model that asks for clarification has declined to commit, which
        // is the same observable fact as not knowing the intent.
        let intent = if raw.needs_clarification {
            Intent::Unknown
        } else {
            raw.intent
        };
        IntentDecision::resolve(
            intent,
            raw.confidence,
            raw.clarification_question,
            raw.reasoning.unwrap_or_default(),
            self.config.confidence_threshold,
        )
    }
}

fn parse_classification(output: &str) -> Result<RawClassification, String> {
    let json = extract_json(output).ok_or("output contained no JSON object")?;
    serde_json::from_str(&json).map_err(|e| format!("invalid classification JSON: {}", e))
}

#[async_trait]
impl<C: LlmClient> IntentClassifier for LlmIntentClassifier<C> {
    async fn classify(&self, input: &InputEnvelope) -> IntentDecision {
        let (system, user) = self.build_prompt(input);
        info!(
            request_id = %input.request_id,
            model = %self.config.model,
            threshold = self.config.confidence_threshold,
            query_len = input.query.len(),
            "classification request prepared"
        );
        if tracing::enabled!(tracing::Level::DEBUG) {
            debug!(
                user_prompt = %truncate_for_log(&user, MAX_PROMPT_LOG_CHARS),
                "classifier prompt"
            );
        }

        let attempts = self.config.max_retries.saturating_add(1);
        let mut strict = false;
        for attempt in 1..=attempts {
            let mut user_prompt = user.clone();
            if strict {
                user_prompt.push('\n');
                user_prompt.push_str(STRICT_RETRY_INSTRUCTION);
            }
            let request = LlmRequest::new(system.clone(), user_prompt, self.config.model.clone())
                .with_temperature(CLASSIFIER_TEMPERATURE)
                .with_max_tokens(CLASSIFIER_MAX_TOKENS)
                .json();

            let output = match self.client.complete(request).await {
                Ok(output) => output,
                Err(err) => {
                    // Transport already retried inside the client; a malformed
                    // answer is the only thing worth re-asking for.
                    warn!(request_id = %input.request_id, attempt, error = %err, "classification call failed");
                    break;
                }
            };
            if tracing::enabled!(tracing::Level::DEBUG) {
                debug!(
                    llm_output = %truncate_for_log(&output, MAX_OUTPUT_LOG_CHARS),
                    "classifier raw output"
                );
            }

            match parse_classification(&output) {
                Ok(raw) => {
                    let decision = self.decision_from_raw(raw);
                    info!(
                        request_id = %input.request_id,
                        intent = %decision.intent,
                        confidence = decision.confidence,
                        needs_clarification = decision.needs_clarification,
                        attempt,
                        "classification parsed"
                    );
                    return decision;
                }
                Err(reason) => {
                    warn!(request_id = %input.request_id, attempt, %reason, "classification output rejected");
                    strict = true;
                }
            }
        }

        info!(request_id = %input.request_id, "classification fell back to unknown intent");
        IntentDecision::unresolved(
            FALLBACK_QUESTION,
            "classification did not produce a usable verdict",
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::{LlmError, MockLlmClient, SequenceLlmClient};

    fn classifier_with<C: LlmClient>(client: C) -> LlmIntentClassifier<C> {
        LlmIntentClassifier::new(client, ClassifierConfig::default())
    }

    fn input() -> InputEnvelope {
        InputEnvelope::text("can you summarize this article for me? it is quite long")
    }

    #[tokio::test]
    async fn well_formed_verdict_becomes_a_decision() {
        let client = MockLlmClient::new(
            r#"{"intent":"summarization","confidence":0.93,"needs_clarification":false,"clarification_question":null,"reasoning":"user asked for a summary"}"#,
        );
        let decision = classifier_with(client).classify(&input()).await;
        assert_eq!(decision.intent, Intent::Summarization);
        assert_eq!(decision.confidence, 0.93);
        assert!(!decision.needs_clarification);
        assert_eq!(decision.reasoning, "user asked for a summary");
    }

    #[tokio::test]
    async fn fenced_output_is_still_parsed() {
        let client = MockLlmClient::new(
            "Here is my analysis:\n```json\n{\"intent\":\"qa\",\"confidence\":0.8}\n```",
        );
        let decision = classifier_with(client).classify(&input()).await;
        assert_eq!(decision.intent, Intent::Qa);
        assert!(!decision.needs_clarification);
    }

    #[tokio::test]
    async fn malformed_output_is_retried_once_then_parsed() {
        let client = SequenceLlmClient::new(vec![
            Ok("I think the user wants a summary!".to_string()),
            Ok(r#"{"intent":"summarization","confidence":0.9}"#.to_string()),
        ]);
        let decision = classifier_with(client).classify(&input()).await;
        assert_eq!(decision.intent, Intent::Summarization);
        assert!(!decision.needs_clarification);
    }

    #[tokio::test]
    async fn persistent_garbage_falls_back_to_unknown() {
        let client = SequenceLlmClient::new(vec![
            Ok("not json".to_string()),
            Ok("{\"intent\": ".to_string()),
        ]);
        let decision = classifier_with(client).classify(&input()).await;
        assert_eq!(decision.intent, Intent::Unknown);
        assert!(decision.needs_clarification);
        assert_eq!(
            decision.clarification_question.as_deref(),
            Some(FALLBACK_QUESTION)
        );
        assert!(decision.is_consistent_with(0.5));
    }

    #[tokio::test]
    async fn transport_failure_falls_back_without_reask() {
        let client = SequenceLlmClient::new(vec![
            Err(LlmError::Http("connection refused".to_string())),
            Ok(r#"{"intent":"qa","confidence":0.9}"#.to_string()),
        ]);
        let decision = classifier_with(client).classify(&input()).await;
        // The second scripted response must not be consumed.
        assert_eq!(decision.intent, Intent::Unknown);
        assert!(decision.needs_clarification);
    }

    #[tokio::test]
    async fn model_requested_clarification_folds_to_unknown() {
        let client = MockLlmClient::new(
            r#"{"intent":"summarization","confidence":0.9,"needs_clarification":true,"clarification_question":"Which section should I summarize?","reasoning":"several documents attached"}"#,
        );
        let decision = classifier_with(client).classify(&input()).await;
        assert_eq!(decision.intent, Intent::Unknown);
        assert!(decision.needs_clarification);
        assert_eq!(
            decision.clarification_question.as_deref(),
            Some("Which section should I summarize?")
        );
        assert_eq!(decision.reasoning, "several documents attached");
    }

    #[tokio::test]
    async fn unknown_label_folds_to_unknown_with_question() {
        let client = MockLlmClient::new(r#"{"intent":"database_query","confidence":0.9}"#);
        let decision = classifier_with(client).classify(&input()).await;
        assert_eq!(decision.intent, Intent::Unknown);
        assert!(decision.needs_clarification);
        assert!(decision.clarification_question.is_some());
    }

    #[tokio::test]
    async fn low_confidence_is_turned_into_clarification() {
        let client = MockLlmClient::new(r#"{"intent":"qa","confidence":0.35}"#);
        let decision = classifier_with(client).classify(&input()).await;
        assert_eq!(decision.intent, Intent::Qa);
        assert!(decision.needs_clarification);
        assert!(decision.is_consistent_with(0.5));
    }

    #[tokio::test]
    async fn out_of_range_confidence_is_clamped() {
        let client = MockLlmClient::new(r#"{"intent":"qa","confidence":3.2}"#);
        let decision = classifier_with(client).classify(&input()).await;
        assert_eq!(decision.confidence, 1.0);
        assert!(!decision.needs_clarification);
    }

    #[tokio::test]
    async fn missing_confidence_counts_as_zero() {
        let client = MockLlmClient::new(r#"{"intent":"qa"}"#);
        let decision = classifier_with(client).classify(&input()).await;
        assert_eq!(decision.confidence, 0.0);
        assert!(decision.needs_clarification);
    }

    #[test]
    fn prompt_includes_query_and_bounded_content() {
        let classifier = classifier_with(MockLlmClient::new("{}"));
        let long_content = "word ".repeat(1_000);
        let input = InputEnvelope::extracted("summarize", long_content, SourceKind::Pdf);
        let (system, user) = classifier.build_prompt(&input);
        assert!(system.contains("summarization"));
        assert!(system.contains("needs_clarification"));
        assert!(user.contains("Request:\nsummarize"));
        assert!(user.contains("from pdf"));
        // 800-char budget plus framing, never the full 5000 chars.
        assert!(user.chars().count() < 1_200);
    }
}
