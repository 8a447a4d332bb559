//! Summary generation over extracted content

use async_trait::async_trait;
use serde::Deserialize;
use tracing::debug;

use medley_core::route::{ExecutionError, TaskExecutor};
use medley_core::types::{Intent, TaskResult};
use medley_llm::{extract_json, LlmClient, LlmRequest};

const SUMMARY_TEMPERATURE: f32 = 0.3;
const SUMMARY_MAX_TOKENS: u32 = 500;
const BULLET_COUNT: usize = 3;

#[derive(Debug, Clone)]
pub struct SummarizerConfig {
    pub model: String,
    /// Content chars sent to the model.
    pub max_input_chars: usize,
}

impl Default for SummarizerConfig {
    fn default() -> Self {
        Self {
            model: "gpt-4o-mini".to_string(),
            max_input_chars: 4_000,
        }
    }
}

/// Produces a one-line, bulleted, and detailed summary in a single call.
pub struct Summarizer<C: LlmClient> {
    client: C,
    config: SummarizerConfig,
}

#[derive(Debug, Deserialize)]
struct RawSummary {
    #[serde(default)]
    one_line: String,
    #[serde(default)]
    bullets: Vec<String>,
    #[serde(default)]
    detailed: String,
}

impl<C: LlmClient> Summarizer<C> {
    pub fn new(client: C, config: SummarizerConfig) -> Self {
        Self { client, config }
    }

    fn build_prompt(&self, content: &str) -> (String, String) {
        let system = "You are a precise summarizer. Reply with ONLY one JSON object, no prose \
             and no code fences."
            .to_string();
        let snippet: String = content.chars().take(self.config.max_input_chars).collect();
        let user = format!(
            "Summarize the content below in three formats.\n\
             Return JSON: {{\"one_line\":\"a single sentence\",\
             \"bullets\":[\"point\",\"point\",\"point\"],\
             \"detailed\":\"about five sentences\"}}\n\
             Use exactly {} bullets.\n\nContent:\n{}",
            BULLET_COUNT, snippet
        );
        (system, user)
    }
}

/// Normalize bullets to the fixed count: surplus is cut, shortfall is
/// topped up from the detailed summary's sentences.
fn normalize_bullets(bullets: Vec<String>, detailed: &str, one_line: &str) -> Vec<String> {
    let mut bullets: Vec<String> = bullets
        .into_iter()
        .map(|b| b.trim().to_string())
        .filter(|b| !b.is_empty())
        .collect();
    bullets.truncate(BULLET_COUNT);

    if bullets.len() < BULLET_COUNT {
        for sentence in detailed.split(['.', '!', '?']) {
            if bullets.len() == BULLET_COUNT {
                break;
            }
            let sentence = sentence.trim();
            if !sentence.is_empty() && !bullets.iter().any(|b| b == sentence) {
                bullets.push(sentence.to_string());
            }
        }
    }
    if bullets.is_empty() && !one_line.trim().is_empty() {
        bullets.push(one_line.trim().to_string());
    }
    bullets
}

#[async_trait]
impl<C: LlmClient> TaskExecutor for Summarizer<C> {
    fn name(&self) -> &str {
        "summarizer"
    }

    fn intent(&self) -> Intent {
        Intent::Summarization
    }

    async fn execute(
        &self,
        content: Option<&str>,
        _query: &str,
    ) -> Result<TaskResult, ExecutionError> {
        let content = content.filter(|c| !c.trim().is_empty()).ok_or_else(|| {
            ExecutionError::InsufficientContent(
                "summarization requires extracted content".to_string(),
            )
        })?;

        let (system, user) = self.build_prompt(content);
        let request = LlmRequest::new(system, user, self.config.model.clone())
            .with_temperature(SUMMARY_TEMPERATURE)
            .with_max_tokens(SUMMARY_MAX_TOKENS)
            .json();
        let output = self.client.complete(request).await.map_err(|e| {
            ExecutionError::UpstreamUnavailable(format!("summarizer llm call failed: {}", e))
        })?;

        let json = extract_json(&output).ok_or_else(|| {
            ExecutionError::UpstreamUnavailable("summary output contained no JSON".to_string())
        })?;
        let raw: RawSummary = serde_json::from_str(&json).map_err(|e| {
            ExecutionError::UpstreamUnavailable(format!("invalid summary JSON: {}", e))
        })?;

        if raw.one_line.trim().is_empty() || raw.detailed.trim().is_empty() {
            return Err(ExecutionError::UpstreamUnavailable(
                "summary output missing required fields".to_string(),
            ));
        }
        let bullets = normalize_bullets(raw.bullets, &raw.detailed, &raw.one_line);
        if bullets.is_empty() {
            return Err(ExecutionError::UpstreamUnavailable(
                "summary output had no usable bullets".to_string(),
            ));
        }
        debug!(bullets = bullets.len(), "summary assembled");

        Ok(TaskResult::Summary {
            one_line: raw.one_line.trim().to_string(),
            bullets,
            detailed: raw.detailed.trim().to_string(),
        })
    }
}
