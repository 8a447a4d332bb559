//! Sentiment analysis over a local model
//!
//! The only stock executor that never calls the LLM: polarity comes from an
//! embedded lexicon model behind the [`SentimentModel`] seam. Inference runs
//! on the blocking pool under a timeout so a pathological input cannot stall
//! the request path.

pub mod model;

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tracing::debug;

use medley_core::route::{ExecutionError, TaskExecutor};
use medley_core::types::{Intent, TaskResult};

use model::SentimentModel;

const SENTIMENT_TIMEOUT_SECS: u64 = 10;

#[derive(Debug, Clone)]
pub struct SentimentConfig {
    /// Content chars scored by the model.
    pub max_input_chars: usize,
}

impl Default for SentimentConfig {
    fn default() -> Self {
        Self {
            max_input_chars: 500,
        }
    }
}

/// Classifies extracted content as POSITIVE or NEGATIVE.
pub struct SentimentAnalyzer {
    model: Arc<dyn SentimentModel>,
    config: SentimentConfig,
}

impl SentimentAnalyzer {
    pub fn new(model: Arc<dyn SentimentModel>, config: SentimentConfig) -> Self {
        Self { model, config }
    }
}

#[async_trait]
impl TaskExecutor for SentimentAnalyzer {
    fn name(&self) -> &str {
        "sentiment_analyzer"
    }

    fn intent(&self) -> Intent {
        Intent::SentimentAnalysis
    }

    async fn execute(
        &self,
        content: Option<&str>,
        _query: &str,
    ) -> Result<TaskResult, ExecutionError> {
        let content = content.filter(|c| !c.trim().is_empty()).ok_or_else(|| {
            ExecutionError::InsufficientContent(
                "sentiment analysis requires extracted content".to_string(),
            )
        })?;
        let snippet: String = content.chars().take(self.config.max_input_chars).collect();

        let model = self.model.clone();
        let prediction = tokio::time::timeout(
            Duration::from_secs(SENTIMENT_TIMEOUT_SECS),
            tokio::task::spawn_blocking(move || model.predict(&snippet)),
        )
        .await
        .map_err(|_| {
            ExecutionError::UpstreamUnavailable(format!(
                "sentiment inference timed out after {}s",
                SENTIMENT_TIMEOUT_SECS
            ))
        })?
        .map_err(|e| {
            ExecutionError::UpstreamUnavailable(format!("sentiment inference task failed: {}", e))
        })?
        .map_err(|e| ExecutionError::UpstreamUnavailable(e.to_string()))?;

        debug!(
            model = self.model.id(),
            label = %prediction.label,
            score = prediction.score,
            "sentiment scored"
        );
        Ok(TaskResult::Sentiment {
            label: prediction.label,
            confidence: prediction.confidence,
            justification: format!(
                "model {} classified the text as {} with {:.0}% confidence",
                self.model.id(),
                prediction.label,
                prediction.confidence * 100.0
            ),
        })
    }
}
