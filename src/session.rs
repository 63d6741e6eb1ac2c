//! In-process session layer: owns one `ChatHistory` per session.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use chrono::{DateTime, Utc};
use tokio::sync::Mutex as AsyncMutex;
use uuid::Uuid;

use crate::core::errors::RagError;
use crate::history::ChatHistory;
use crate::pipeline::RagPipeline;
use crate::rag::VectorIndex;

pub const DEFAULT_SESSION_ID: &str = "default";

#[derive(Debug, Clone)]
pub struct SessionInfo {
    pub id: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub message_count: usize,
}

struct SessionEntry {
    history: Arc<AsyncMutex<ChatHistory>>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl SessionEntry {
    fn new() -> Self {
        let now = Utc::now();
        Self {
            history: Arc::new(AsyncMutex::new(ChatHistory::new())),
            created_at: now,
            updated_at: now,
        }
    }
}

#[derive(Clone, Default)]
pub struct SessionStore {
    sessions: Arc<Mutex<HashMap<String, SessionEntry>>>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn create_session(&self) -> String {
        let id = Uuid::new_v4().to_string();
        self.lock().insert(id.clone(), SessionEntry::new());
        tracing::info!("Created session {}", id);
        id
    }

    /// Runs one question through `pipeline` against the session's history.
    ///
    /// Without a session id (or with a blank one) the shared `default` history
    /// is used and retrieval is not filtered by session.
    pub async fn ask(&self, pipeline: &RagPipeline, session_id: Option<&str>, query: &str) -> String {
        let session_id = session_id.filter(|id| !id.is_empty());
        let key = session_id.unwrap_or(DEFAULT_SESSION_ID);
        let history = self.history_handle(key);

        let answer = {
            let mut history = history.lock().await;
            pipeline.answer(query, &mut history, session_id).await
        };

        if let Some(entry) = self.lock().get_mut(key) {
            entry.updated_at = Utc::now();
        }
        answer
    }

    pub async fn history(&self, session_id: &str) -> Option<Vec<String>> {
        let handle = self.lock().get(session_id).map(|e| e.history.clone())?;
        let history = handle.lock().await;
        Some(history.entries().to_vec())
    }

    pub async fn list_sessions(&self) -> Vec<SessionInfo> {
        let snapshot: Vec<(String, DateTime<Utc>, DateTime<Utc>, Arc<AsyncMutex<ChatHistory>>)> =
            self.lock()
                .iter()
                .map(|(id, e)| (id.clone(), e.created_at, e.updated_at, e.history.clone()))
                .collect();

        let mut sessions = Vec::with_capacity(snapshot.len());
        for (id, created_at, updated_at, history) in snapshot {
            let message_count = history.lock().await.len();
            sessions.push(SessionInfo {
                id,
                created_at,
                updated_at,
                message_count,
            });
        }
        sessions.sort_by(|a, b| b.updated_at.cmp(&a.updated_at));
        sessions
    }

    /// Forgets the session's history and removes its vectors from the index.
    pub async fn end_session(
        &self,
        session_id: &str,
        index: &dyn VectorIndex,
    ) -> Result<bool, RagError> {
        let existed = self.lock().remove(session_id).is_some();

        if let Err(err) = index.delete_session(session_id).await {
            tracing::error!("Failed to delete vectors for session {}: {}", session_id, err);
            return Err(err);
        }

        tracing::info!("Ended session {}", session_id);
        Ok(existed)
    }

    fn history_handle(&self, key: &str) -> Arc<AsyncMutex<ChatHistory>> {
        self.lock()
            .entry(key.to_string())
            .or_insert_with(SessionEntry::new)
            .history
            .clone()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<String, SessionEntry>> {
        self.sessions
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}
