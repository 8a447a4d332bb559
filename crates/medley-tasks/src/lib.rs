//! # Medley Tasks
//!
//! Stock executor implementations for every dispatchable intent, plus the
//! standard router assembly:
//! - Summarizer, CodeExplainer, QaHandler (LLM-backed)
//! - SentimentAnalyzer (local lexicon model)
//! - PassthroughExtraction (text extraction / transcripts)

mod code_explainer;
mod passthrough;
mod qa;
pub mod sentiment;
mod summarizer;

pub use code_explainer::{CodeExplainer, CodeExplainerConfig};
pub use passthrough::PassthroughExtraction;
pub use qa::{QaConfig, QaHandler};
pub use sentiment::{SentimentAnalyzer, SentimentConfig};
pub use summarizer::{Summarizer, SummarizerConfig};

use std::sync::Arc;

use medley_config::{LlmSettings, TaskSettings};
use medley_core::route::TaskRouter;
use medley_llm::LlmClient;
use sentiment::model::SentimentModel;

/// Build the routing table with the full stock executor set.
pub fn standard_router(
    llm: Arc<dyn LlmClient>,
    model: Arc<dyn SentimentModel>,
    llm_settings: &LlmSettings,
    tasks: &TaskSettings,
) -> TaskRouter {
    let mut router = TaskRouter::new();
    router.register(Arc::new(Summarizer::new(
        llm.clone(),
        SummarizerConfig {
            model: llm_settings.model.clone(),
            max_input_chars: tasks.summary_input_chars,
        },
    )));
    router.register(Arc::new(SentimentAnalyzer::new(
        model,
        SentimentConfig {
            max_input_chars: tasks.sentiment_input_chars,
        },
    )));
    router.register(Arc::new(CodeExplainer::new(
        llm.clone(),
        CodeExplainerConfig {
            model: llm_settings.model.clone(),
        },
    )));
    router.register(Arc::new(QaHandler::new(
        llm,
        QaConfig {
            model: llm_settings.model.clone(),
            max_context_chars: tasks.qa_context_chars,
        },
    )));
    router.register(Arc::new(PassthroughExtraction::text_extraction()));
    router.register(Arc::new(PassthroughExtraction::youtube_transcript()));
    router
}

#[cfg(test)]
mod tests {
    use super::*;
    use medley_core::pipeline::Pipeline;
    use medley_core::types::{
        ErrorKind, InputEnvelope, Intent, SentimentLabel, SourceKind, TaskResult,
    };
    use medley_llm::{ClassifierConfig, LlmIntentClassifier, MockLlmClient};
    use sentiment::model::LexiconSentimentModel;

    #[test]
    fn standard_router_covers_every_dispatchable_intent() {
        let llm: Arc<dyn LlmClient> = Arc::new(MockLlmClient::new("{}"));
        let model: Arc<dyn SentimentModel> = Arc::new(LexiconSentimentModel::load());
        let router = standard_router(
            llm,
            model,
            &LlmSettings::default(),
            &TaskSettings::default(),
        );
        for intent in Intent::DISPATCHABLE {
            assert!(
                router.get(intent).is_some(),
                "no executor registered for {}",
                intent
            );
        }
        assert_eq!(router.len(), Intent::DISPATCHABLE.len());
    }

    /// Classifier and executors share one client; for the local tasks
    /// (sentiment, passthrough) the mock only ever answers the
    /// classification call.
    fn pipeline_with(classification: &str) -> Pipeline {
        let llm: Arc<dyn LlmClient> = Arc::new(MockLlmClient::new(classification));
        let classifier = LlmIntentClassifier::new(llm.clone(), ClassifierConfig::default());
        let model: Arc<dyn SentimentModel> = Arc::new(LexiconSentimentModel::load());
        let router = standard_router(
            llm,
            model,
            &LlmSettings::default(),
            &TaskSettings::default(),
        );
        Pipeline::new(Arc::new(classifier), Arc::new(router))
    }

    #[tokio::test]
    async fn plain_text_opinion_yields_a_positive_sentiment_verdict() {
        let pipeline = pipeline_with(
            r#"{"intent":"sentiment_analysis","confidence":0.95,
                "needs_clarification":false,"clarification_question":null,
                "reasoning":"the text expresses an opinion about a product"}"#,
        );
        let envelope = pipeline
            .handle(
                InputEnvelope::text("I love this product, it changed my life!"),
                None,
            )
            .await;

        assert!(envelope.is_success());
        assert_eq!(envelope.intent.intent, Intent::SentimentAnalysis);
        match envelope.result.expect("sentiment result") {
            TaskResult::Sentiment {
                label,
                confidence,
                justification,
            } => {
                assert_eq!(label, SentimentLabel::Positive);
                assert!(confidence > 0.5);
                assert!(!justification.is_empty());
            }
            other => panic!("expected sentiment, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn low_confidence_asks_for_clarification_instead_of_dispatching() {
        let pipeline = pipeline_with(
            r#"{"intent":"summarization","confidence":0.3,
                "needs_clarification":false,"clarification_question":null,
                "reasoning":"could be a summary or a question"}"#,
        );
        let envelope = pipeline.handle(InputEnvelope::text("this thing here"), None).await;

        assert!(envelope.result.is_none());
        assert!(envelope.error.is_none());
        assert!(envelope.needs_clarification());
        let question = envelope.intent.clarification_question.expect("question");
        assert!(!question.is_empty());
    }

    #[tokio::test]
    async fn transcript_requests_return_the_transcript_unchanged() {
        let transcript = "welcome back to the channel, today we cover borrow checking";
        let pipeline = pipeline_with(
            r#"{"intent":"youtube_transcript","confidence":0.9,
                "needs_clarification":false,"clarification_question":null,
                "reasoning":"the caller sent a video link"}"#,
        );
        let envelope = pipeline
            .handle(
                InputEnvelope::extracted("get the transcript", transcript, SourceKind::Youtube),
                None,
            )
            .await;

        assert!(envelope.is_success());
        match envelope.result.expect("transcript result") {
            TaskResult::Transcript { transcript: got } => assert_eq!(got, transcript),
            other => panic!("expected transcript, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn content_task_without_content_reports_insufficient_content() {
        let pipeline = pipeline_with(
            r#"{"intent":"sentiment_analysis","confidence":0.9,
                "needs_clarification":false,"clarification_question":null,
                "reasoning":"asks for sentiment"}"#,
        );
        let envelope = pipeline
            .handle(
                InputEnvelope::empty("analyze the sentiment of the file", SourceKind::Pdf),
                None,
            )
            .await;

        assert!(envelope.result.is_none());
        let error = envelope.error.expect("error info");
        assert_eq!(error.kind, ErrorKind::InsufficientContent);
    }

    #[tokio::test]
    async fn dispatched_intent_and_result_variant_agree() {
        let pipeline = pipeline_with(
            r#"{"intent":"text_extraction","confidence":0.9,
                "needs_clarification":false,"clarification_question":null,
                "reasoning":"caller wants the recovered text"}"#,
        );
        let envelope = pipeline
            .handle(
                InputEnvelope::extracted("extract the text", "page one", SourceKind::Pdf),
                None,
            )
            .await;

        let result = envelope.result.expect("result");
        assert_eq!(result.intent(), envelope.intent.intent);
    }

    #[tokio::test]
    async fn identical_requests_produce_identical_result_variants() {
        let classification = r#"{"intent":"sentiment_analysis","confidence":0.95,
            "needs_clarification":false,"clarification_question":null,
            "reasoning":"opinionated text"}"#;
        let text = "the service was terrible and the staff was rude";

        let mut results = Vec::new();
        for _ in 0..2 {
            let pipeline = pipeline_with(classification);
            let envelope = pipeline.handle(InputEnvelope::text(text), None).await;
            results.push(envelope.result.expect("result"));
        }
        assert_eq!(results[0], results[1]);
        assert!(matches!(
            results[0],
            TaskResult::Sentiment {
                label: SentimentLabel::Negative,
                ..
            }
        ));
    }
}
