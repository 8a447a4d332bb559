//! Clarification gate
//!
//! Sits between classification and dispatch. There are exactly two ways
//! forward: dispatch the decided intent, or return the question to the
//! caller. No path dispatches an unclear decision.

use crate::types::{Intent, IntentDecision, FALLBACK_QUESTION};

/// Gate verdict for one classification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GateOutcome {
    /// Proceed to the router with this intent
    Dispatch(Intent),
    /// Stop and hand the question back to the caller
    Clarify { question: String },
}

/// Decide whether a classification is actionable.
///
/// Decisions built through the `IntentDecision` constructors always carry a
/// question when clarification is needed; the fallback here only covers
/// hand-built decisions.
pub fn evaluate(decision: &IntentDecision) -> GateOutcome {
    if decision.needs_clarification {
        let question = decision
            .clarification_question
            .clone()
            .unwrap_or_else(|| FALLBACK_QUESTION.to_string());
        return GateOutcome::Clarify { question };
    }
    GateOutcome::Dispatch(decision.intent)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn confident_decision_dispatches() {
        let decision = IntentDecision::resolve(Intent::Qa, 0.8, None, "", 0.5);
        assert_eq!(evaluate(&decision), GateOutcome::Dispatch(Intent::Qa));
    }

    #[test]
    fn clarification_outcome_carries_the_question() {
        let decision = IntentDecision::unresolved("Which part should I summarize?", "");
        assert_eq!(
            evaluate(&decision),
            GateOutcome::Clarify {
                question: "Which part should I summarize?".to_string()
            }
        );
    }

    #[test]
    fn hand_built_decision_without_question_gets_fallback() {
        let decision = IntentDecision {
            intent: Intent::Unknown,
            confidence: 0.0,
            needs_clarification: true,
            clarification_question: None,
            reasoning: String::new(),
        };
        match evaluate(&decision) {
            GateOutcome::Clarify { question } => assert_eq!(question, FALLBACK_QUESTION),
            other => panic!("expected clarify, got {:?}", other),
        }
    }

    #[test]
    fn low_confidence_never_dispatches() {
        let decision = IntentDecision::resolve(Intent::Summarization, 0.2, None, "", 0.5);
        assert!(matches!(evaluate(&decision), GateOutcome::Clarify { .. }));
    }
}
