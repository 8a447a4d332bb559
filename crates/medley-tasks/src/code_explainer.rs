//! Code explanation and review

use async_trait::async_trait;
use serde::Deserialize;

use medley_core::route::{ExecutionError, TaskExecutor};
use medley_core::types::{Intent, TaskResult};
use medley_llm::{extract_json, LlmClient, LlmRequest};

const CODE_TEMPERATURE: f32 = 0.2;
const CODE_MAX_TOKENS: u32 = 600;

#[derive(Debug, Clone)]
pub struct CodeExplainerConfig {
    pub model: String,
}

impl Default for CodeExplainerConfig {
    fn default() -> Self {
        Self {
            model: "gpt-4o-mini".to_string(),
        }
    }
}

/// Explains a code snippet and flags issues and complexity.
///
/// The snippet comes from extracted content when a file was uploaded, or
/// straight from the query when the user pasted code inline.
pub struct CodeExplainer<C: LlmClient> {
    client: C,
    config: CodeExplainerConfig,
}

#[derive(Debug, Deserialize)]
struct RawCodeAnalysis {
    #[serde(default)]
    explanation: String,
    #[serde(default)]
    language: String,
    #[serde(default)]
    issues: Vec<String>,
    #[serde(default)]
    time_complexity: String,
    #[serde(default)]
    space_complexity: String,
}

fn or_unknown(value: String) -> String {
    let value = value.trim();
    if value.is_empty() {
        "unknown".to_string()
    } else {
        value.to_string()
    }
}

impl<C: LlmClient> CodeExplainer<C> {
    pub fn new(client: C, config: CodeExplainerConfig) -> Self {
        Self { client, config }
    }

    fn build_prompt(&self, code: &str) -> (String, String) {
        let system = "You are an expert code reviewer. Reply with ONLY one JSON object, no \
             prose and no code fences."
            .to_string();
        let user = format!(
            "Explain the code below for a developer unfamiliar with it.\n\
             Return JSON: {{\"explanation\":\"what the code does and how\",\
             \"language\":\"detected language\",\
             \"issues\":[\"potential bug or smell\"],\
             \"time_complexity\":\"big-O\",\"space_complexity\":\"big-O\"}}\n\
             Use an empty issues array if the code is clean.\n\nCode:\n{}",
            code
        );
        (system, user)
    }
}

#[async_trait]
impl<C: LlmClient> TaskExecutor for CodeExplainer<C> {
    fn name(&self) -> &str {
        "code_explainer"
    }

    fn intent(&self) -> Intent {
        Intent::CodeExplanation
    }

    async fn execute(
        &self,
        content: Option<&str>,
        query: &str,
    ) -> Result<TaskResult, ExecutionError> {
        let code = content
            .filter(|c| !c.trim().is_empty())
            .or_else(|| Some(query).filter(|q| !q.trim().is_empty()))
            .ok_or_else(|| {
                ExecutionError::InsufficientContent(
                    "code explanation requires a snippet in the content or the query".to_string(),
                )
            })?;

        let (system, user) = self.build_prompt(code);
        let request = LlmRequest::new(system, user, self.config.model.clone())
            .with_temperature(CODE_TEMPERATURE)
            .with_max_tokens(CODE_MAX_TOKENS)
            .json();
        let output = self.client.complete(request).await.map_err(|e| {
            ExecutionError::UpstreamUnavailable(format!("code explainer llm call failed: {}", e))
        })?;

        let json = extract_json(&output).ok_or_else(|| {
            ExecutionError::UpstreamUnavailable("code analysis contained no JSON".to_string())
        })?;
        let raw: RawCodeAnalysis = serde_json::from_str(&json).map_err(|e| {
            ExecutionError::UpstreamUnavailable(format!("invalid code analysis JSON: {}", e))
        })?;

        if raw.explanation.trim().is_empty() {
            return Err(ExecutionError::UpstreamUnavailable(
                "code analysis missing an explanation".to_string(),
            ));
        }
        Ok(TaskResult::CodeExplanation {
            explanation: raw.explanation.trim().to_string(),
            language: or_unknown(raw.language),
            issues: raw
                .issues
                .into_iter()
                .map(|i| i.trim().to_string())
                .filter(|i| !i.is_empty())
                .collect(),
            time_complexity: or_unknown(raw.time_complexity),
            space_complexity: or_unknown(raw.space_complexity),
        })
    }
}
