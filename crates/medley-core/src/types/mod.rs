//! Core type definitions for medley
//!
//! This module contains the fundamental types used throughout the system:
//! - InputEnvelope: normalized inbound request
//! - Intent / IntentDecision: classification verdict
//! - TaskResult: tagged union of executor outputs
//! - ResponseEnvelope: uniform caller-facing response

mod decision;
mod envelope;
mod input;
mod result;

pub use decision::{Intent, IntentDecision, FALLBACK_QUESTION};
pub use envelope::{ErrorInfo, ErrorKind, ExtractionMetadata, ResponseEnvelope};
pub use input::{InputEnvelope, SourceKind};
pub use result::{SentimentLabel, TaskResult};
