//! Classifier seam

use async_trait::async_trait;

use crate::types::{InputEnvelope, IntentDecision};

/// Decides which capability a request is asking for.
///
/// Implementations must always return a fully populated decision. Transport
/// and parse failures are downgraded to an unknown-intent decision with a
/// clarification question, never surfaced as errors; the pipeline relies on
/// this to stay total.
#[async_trait]
pub trait IntentClassifier: Send + Sync {
    async fn classify(&self, input: &InputEnvelope) -> IntentDecision;
}
