//! In-memory, process-lifetime chat session store.
//!
//! Appends are serialized per session through a per-session mutex, so turn
//! ordering reflects completion order of requests within one session while
//! distinct sessions never contend. Eviction/expiry is the host's concern.

use std::collections::HashMap;
use std::sync::Arc;

use serde::Serialize;
use tabletalk_core::{ChatSession, Role, Turn};
use tokio::sync::{Mutex, RwLock};

/// One line of the sessions listing.
#[derive(Debug, Clone, Serialize)]
pub struct SessionSummary {
    pub session_id: String,
    pub turn_count: usize,
    pub preview: String,
}

#[derive(Default)]
pub struct SessionStore {
    sessions: RwLock<HashMap<String, Arc<Mutex<ChatSession>>>>,
}

impl std::fmt::Debug for SessionStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionStore").finish_non_exhaustive()
    }
}

impl SessionStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the existing session's id, or mint a new unique one. The
    /// session entry is created eagerly so later appends always find it.
    pub async fn get_or_create(&self, session_id: Option<&str>) -> String {
        let id = session_id
            .filter(|s| !s.trim().is_empty())
            .map_or_else(|| uuid::Uuid::new_v4().to_string(), str::to_owned);
        let mut sessions = self.sessions.write().await;
        sessions
            .entry(id.clone())
            .or_insert_with(|| Arc::new(Mutex::new(ChatSession::new(id.clone()))));
        id
    }

    /// Append a turn, creating the session if needed. Serialized per
    /// session; the map lock is never held across the append itself.
    pub async fn append(&self, session_id: &str, turn: Turn) {
        let entry = {
            let mut sessions = self.sessions.write().await;
            Arc::clone(sessions.entry(session_id.to_owned()).or_insert_with(|| {
                Arc::new(Mutex::new(ChatSession::new(session_id.to_owned())))
            }))
        };
        entry.lock().await.turns.push(turn);
    }

    /// Point-in-time copy of one session.
    pub async fn snapshot(&self, session_id: &str) -> Option<ChatSession> {
        let entry = {
            let sessions = self.sessions.read().await;
            sessions.get(session_id).cloned()
        }?;
        let session = entry.lock().await;
        Some(session.clone())
    }

    /// All sessions with turn counts and a first-user-message preview.
    pub async fn list(&self) -> Vec<SessionSummary> {
        let entries: Vec<Arc<Mutex<ChatSession>>> = {
            let sessions = self.sessions.read().await;
            sessions.values().cloned().collect()
        };
        let mut summaries = Vec::with_capacity(entries.len());
        for entry in entries {
            let session = entry.lock().await;
            let preview = session
                .turns
                .iter()
                .find(|t| t.role == Role::User)
                .map(|t| tabletalk_llm::truncate(&t.content, 80).to_owned())
                .unwrap_or_default();
            summaries.push(SessionSummary {
                session_id: session.session_id.clone(),
                turn_count: session.turns.len(),
                preview,
            });
        }
        summaries
    }
}
