//! Intent-keyed routing
//!
//! The router is a closed dispatch table: one executor per intent, O(1)
//! lookup, and a routing error for gaps. `Unknown` is rejected before the
//! table is consulted so a registration bug can never dispatch it.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use thiserror::Error;
use tracing::debug;

use crate::types::{ErrorInfo, ErrorKind, Intent, TaskResult};

/// Failures an executor can produce.
#[derive(Debug, Error)]
pub enum ExecutionError {
    #[error("insufficient content: {0}")]
    InsufficientContent(String),
    #[error("upstream unavailable: {0}")]
    UpstreamUnavailable(String),
    #[error("no executor registered for intent '{0}'")]
    Routing(Intent),
}

impl ExecutionError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            ExecutionError::InsufficientContent(_) => ErrorKind::InsufficientContent,
            ExecutionError::UpstreamUnavailable(_) => ErrorKind::UpstreamUnavailable,
            ExecutionError::Routing(_) => ErrorKind::Routing,
        }
    }
}

impl From<&ExecutionError> for ErrorInfo {
    fn from(err: &ExecutionError) -> Self {
        ErrorInfo::new(err.kind(), err.to_string())
    }
}

/// One task capability.
///
/// Executors receive the extracted content and the caller's query and are
/// expected to fail with a typed error instead of panicking, whatever the
/// input looks like.
#[async_trait]
pub trait TaskExecutor: Send + Sync {
    /// Stable name used in logs.
    fn name(&self) -> &str;

    /// The intent this executor serves.
    fn intent(&self) -> Intent;

    async fn execute(
        &self,
        content: Option<&str>,
        query: &str,
    ) -> Result<TaskResult, ExecutionError>;
}

/// Intent-keyed executor table.
#[derive(Default)]
pub struct TaskRouter {
    executors: HashMap<Intent, Arc<dyn TaskExecutor>>,
}

impl TaskRouter {
    pub fn new() -> Self {
        Self {
            executors: HashMap::new(),
        }
    }

    /// Register an executor under its own intent. Re-registering an intent
    /// replaces the previous executor.
    pub fn register(&mut self, executor: Arc<dyn TaskExecutor>) {
        self.executors.insert(executor.intent(), executor);
    }

    pub fn get(&self, intent: Intent) -> Option<Arc<dyn TaskExecutor>> {
        self.executors.get(&intent).cloned()
    }

    pub fn registered_intents(&self) -> Vec<Intent> {
        let mut intents: Vec<Intent> = self.executors.keys().copied().collect();
        intents.sort_by_key(|intent| intent.as_str());
        intents
    }

    pub fn len(&self) -> usize {
        self.executors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.executors.is_empty()
    }

    /// Dispatch one request to the executor for `intent`.
    pub async fn dispatch(
        &self,
        intent: Intent,
        content: Option<&str>,
        query: &str,
    ) -> Result<TaskResult, ExecutionError> {
        if !intent.is_dispatchable() {
            return Err(ExecutionError::Routing(intent));
        }
        let executor = self.get(intent).ok_or(ExecutionError::Routing(intent))?;
        debug!(executor = executor.name(), intent = %intent, "dispatching task");
        executor.execute(content, query).await
    }
}
