//! # Medley Core
//!
//! Core contracts and deterministic logic for the medley decision layer.
//!
//! This crate contains:
//! - Input / Intent / Decision / Result / Envelope definitions
//! - Classifier and TaskExecutor abstractions
//! - The clarification gate and intent-keyed routing
//! - Response envelope assembly
//!
//! This crate does NOT care about:
//! - Which LLM produces classifications
//! - How files are turned into text
//! - How requests arrive (HTTP, CLI, tests)

pub mod assemble;
pub mod classify;
pub mod gate;
pub mod pipeline;
pub mod route;
pub mod types;

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::assemble::{assemble, assemble_failure, TraceLog};
    pub use crate::classify::IntentClassifier;
    pub use crate::gate::{evaluate, GateOutcome};
    pub use crate::pipeline::Pipeline;
    pub use crate::route::{ExecutionError, TaskExecutor, TaskRouter};
    pub use crate::types::{
        ErrorInfo, ErrorKind, ExtractionMetadata, InputEnvelope, Intent, IntentDecision,
        ResponseEnvelope, SentimentLabel, SourceKind, TaskResult,
    };
}

// Re-export key types at crate root
pub use assemble::{assemble, assemble_failure, TraceLog};
pub use classify::IntentClassifier;
pub use gate::{evaluate, GateOutcome};
pub use pipeline::Pipeline;
pub use route::{ExecutionError, TaskExecutor, TaskRouter};
pub use types::{
    ErrorInfo, ErrorKind, ExtractionMetadata, InputEnvelope, Intent, IntentDecision,
    ResponseEnvelope, SentimentLabel, SourceKind, TaskResult,
};
