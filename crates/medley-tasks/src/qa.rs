//! Question answering, grounded in extracted content when present

use async_trait::async_trait;

use medley_core::route::{ExecutionError, TaskExecutor};
use medley_core::types::{Intent, TaskResult};
use medley_llm::{LlmClient, LlmRequest};

const QA_TEMPERATURE: f32 = 0.7;
const QA_MAX_TOKENS: u32 = 400;
/// Used when content arrived with no question attached.
const DEFAULT_QUESTION: &str = "Can you help me understand this content?";

#[derive(Debug, Clone)]
pub struct QaConfig {
    pub model: String,
    /// Context chars sent alongside the question.
    pub max_context_chars: usize,
}

impl Default for QaConfig {
    fn default() -> Self {
        Self {
            model: "gpt-4o-mini".to_string(),
            max_context_chars: 2_000,
        }
    }
}

/// Answers the query, citing extracted content as context when available.
///
/// The only executor that answers in free prose rather than structured
/// JSON; the reply is the answer.
pub struct QaHandler<C: LlmClient> {
    client: C,
    config: QaConfig,
}

impl<C: LlmClient> QaHandler<C> {
    pub fn new(client: C, config: QaConfig) -> Self {
        Self { client, config }
    }

    fn build_prompt(&self, question: &str, context: Option<&str>) -> (String, String) {
        let system =
            "You are a helpful assistant. Answer concisely and factually.".to_string();
        let user = match context {
            Some(context) => {
                let snippet: String =
                    context.chars().take(self.config.max_context_chars).collect();
                format!(
                    "Answer the question using the context below. If the context does not \
                     contain the answer, say so.\n\nContext:\n{}\n\nQuestion: {}",
                    snippet, question
                )
            }
            None => question.to_string(),
        };
        (system, user)
    }
}

#[async_trait]
impl<C: LlmClient> TaskExecutor for QaHandler<C> {
    fn name(&self) -> &str {
        "qa_handler"
    }

    fn intent(&self) -> Intent {
        Intent::Qa
    }

    async fn execute(
        &self,
        content: Option<&str>,
        query: &str,
    ) -> Result<TaskResult, ExecutionError> {
        let context = content.filter(|c| !c.trim().is_empty());
        let question = if query.trim().is_empty() {
            if context.is_none() {
                return Err(ExecutionError::InsufficientContent(
                    "question answering requires a question or content".to_string(),
                ));
            }
            DEFAULT_QUESTION
        } else {
            query
        };

        let (system, user) = self.build_prompt(question, context);
        let request = LlmRequest::new(system, user, self.config.model.clone())
            .with_temperature(QA_TEMPERATURE)
            .with_max_tokens(QA_MAX_TOKENS);
        let answer = self.client.complete(request).await.map_err(|e| {
            ExecutionError::UpstreamUnavailable(format!("qa llm call failed: {}", e))
        })?;

        let answer = answer.trim();
        if answer.is_empty() {
            return Err(ExecutionError::UpstreamUnavailable(
                "qa output was empty".to_string(),
            ));
        }
        Ok(TaskResult::Answer {
            answer: answer.to_string(),
            used_context: context.is_some(),
        })
    }
}
