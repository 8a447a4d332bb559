//! Clarification session store
//!
//! When a request stops at the clarification gate, its extracted content is
//! parked here so the follow-up answer can resume without re-uploading.
//! In-memory and per-process only; capacity-bounded with oldest-first
//! eviction, and a repeated session id overwrites its previous entry.

use std::collections::{HashMap, VecDeque};
use std::sync::RwLock;

use chrono::{DateTime, Utc};
use thiserror::Error;

use medley_core::types::{ExtractionMetadata, SourceKind};

const DEFAULT_SESSION_LIMIT: usize = 1_024;

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("session store internal error: {0}")]
    Internal(String),
}

/// Context held between a clarification question and its answer.
#[derive(Debug, Clone)]
pub struct StoredContext {
    pub extracted_content: Option<String>,
    pub source_kind: SourceKind,
    pub metadata: Option<ExtractionMetadata>,
    pub created_at: DateTime<Utc>,
}

impl StoredContext {
    pub fn new(
        extracted_content: Option<String>,
        source_kind: SourceKind,
        metadata: Option<ExtractionMetadata>,
    ) -> Self {
        Self {
            extracted_content,
            source_kind,
            metadata,
            created_at: Utc::now(),
        }
    }
}

/// In-memory session store with a hard capacity limit.
pub struct SessionStore {
    sessions: RwLock<HashMap<String, StoredContext>>,
    order: RwLock<VecDeque<String>>,
    capacity: usize,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_SESSION_LIMIT)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            sessions: RwLock::new(HashMap::new()),
            order: RwLock::new(VecDeque::new()),
            capacity: capacity.max(1),
        }
    }

    fn touch_order(order: &mut VecDeque<String>, session_id: &str) {
        order.retain(|id| id != session_id);
        order.push_back(session_id.to_string());
    }

    pub fn save(&self, session_id: &str, context: StoredContext) -> Result<(), SessionError> {
        let mut sessions = self
            .sessions
            .write()
            .map_err(|e| SessionError::Internal(e.to_string()))?;
        let mut order = self
            .order
            .write()
            .map_err(|e| SessionError::Internal(e.to_string()))?;

        if !sessions.contains_key(session_id) && sessions.len() >= self.capacity {
            if let Some(oldest_id) = order.pop_front() {
                sessions.remove(&oldest_id);
            }
        }
        sessions.insert(session_id.to_string(), context);
        Self::touch_order(&mut order, session_id);
        Ok(())
    }

    /// Remove and return the parked context for a session, if any.
    pub fn take(&self, session_id: &str) -> Result<Option<StoredContext>, SessionError> {
        let mut sessions = self
            .sessions
            .write()
            .map_err(|e| SessionError::Internal(e.to_string()))?;
        let context = sessions.remove(session_id);
        if context.is_some() {
            let mut order = self
                .order
                .write()
                .map_err(|e| SessionError::Internal(e.to_string()))?;
            order.retain(|id| id != session_id);
        }
        Ok(context)
    }
}

impl Default for SessionStore {
    fn default() -> Self {
        Self::new()
    }
}
