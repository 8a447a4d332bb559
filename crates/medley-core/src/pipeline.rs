//! End-to-end request pipeline
//!
//! classify -> gate -> dispatch -> assemble, strictly in that order, one
//! task per request. `handle` is total: whatever fails, the caller gets a
//! fully populated envelope back.

use std::sync::Arc;

use tracing::{info, warn};

use crate::assemble::{assemble, TraceLog};
use crate::classify::IntentClassifier;
use crate::gate::{self, GateOutcome};
use crate::route::TaskRouter;
use crate::types::{ExtractionMetadata, InputEnvelope, ResponseEnvelope, SourceKind};

pub struct Pipeline {
    classifier: Arc<dyn IntentClassifier>,
    router: Arc<TaskRouter>,
}

impl Pipeline {
    pub fn new(classifier: Arc<dyn IntentClassifier>, router: Arc<TaskRouter>) -> Self {
        Self { classifier, router }
    }

    /// Run one request through to a final envelope.
    pub async fn handle(
        &self,
        input: InputEnvelope,
        metadata: Option<ExtractionMetadata>,
    ) -> ResponseEnvelope {
        let mut logs = TraceLog::new();
        match input.source_kind {
            SourceKind::RawText | SourceKind::None => logs.record("processing text input"),
            kind => logs.record(format!("processing {} input", kind)),
        }
        if let Some(content) = input.content() {
            logs.record(format!(
                "content prepared ({} chars)",
                content.chars().count()
            ));
        }

        logs.record("analyzing intent");
        let decision = self.classifier.classify(&input).await;
        info!(
            request_id = %input.request_id,
            intent = %decision.intent,
            confidence = decision.confidence,
            needs_clarification = decision.needs_clarification,
            "intent classified"
        );
        logs.record(format!(
            "intent identified: {} (confidence {:.2})",
            decision.intent, decision.confidence
        ));

        match gate::evaluate(&decision) {
            GateOutcome::Clarify { .. } => {
                logs.record("clarification needed before dispatch");
                assemble(&input, metadata, decision, None, logs)
            }
            GateOutcome::Dispatch(intent) => {
                logs.record(format!("dispatching task: {}", intent));
                let outcome = self
                    .router
                    .dispatch(intent, input.content(), &input.query)
                    .await;
                match &outcome {
                    Ok(result) => {
                        info!(request_id = %input.request_id, result = result.kind(), "task completed");
                        logs.record(format!("task completed: {}", result.kind()));
                    }
                    Err(err) => {
                        warn!(request_id = %input.request_id, error = %err, "task failed");
                        logs.record(format!("task failed: {}", err));
                    }
                }
                assemble(&input, metadata, decision, Some(outcome), logs)
            }
        }
    }
}
