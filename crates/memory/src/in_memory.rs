//! In-memory session store: sessions live for the process lifetime.

use async_trait::async_trait;
use roamer_core::context::{ContextDelta, ExtractedContext};
use roamer_core::session::{SessionStats, SessionStore, Turn};
use std::collections::{HashMap, VecDeque};
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::debug;

/// Default number of turns kept per session.
pub const DEFAULT_MAX_HISTORY: usize = 50;

#[derive(Debug, Default)]
struct Session {
    turns: VecDeque<Turn>,
    context: ExtractedContext,
}

/// A session store keyed by session id.
///
/// History is a bounded FIFO: appending past `max_history` evicts from the
/// front, so a session never holds more than `max_history` turns.
pub struct InMemorySessionStore {
    sessions: Arc<RwLock<HashMap<String, Session>>>,
    max_history: usize,
}

impl InMemorySessionStore {
    pub fn new() -> Self {
        Self::with_max_history(DEFAULT_MAX_HISTORY)
    }

    /// A store with a custom history bound. A bound of zero is raised to one.
    pub fn with_max_history(max_history: usize) -> Self {
        Self {
            sessions: Arc::new(RwLock::new(HashMap::new())),
            max_history: max_history.max(1),
        }
    }
}

impl Default for InMemorySessionStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl SessionStore for InMemorySessionStore {
    fn name(&self) -> &str {
        "in_memory"
    }

    fn max_history(&self) -> usize {
        self.max_history
    }

    async fn append_turn(&self, session_id: &str, turn: Turn) {
        let mut sessions = self.sessions.write().await;
        let session = sessions.entry(session_id.to_string()).or_default();
        session.turns.push_back(turn);
        while session.turns.len() > self.max_history {
            session.turns.pop_front();
            debug!(session_id, "Evicted oldest turn");
        }
    }

    async fn recent_context(&self, session_id: &str, window: usize) -> Vec<Turn> {
        let sessions = self.sessions.read().await;
        match sessions.get(session_id) {
            Some(session) => {
                let skip = session.turns.len().saturating_sub(window);
                session.turns.iter().skip(skip).cloned().collect()
            }
            None => Vec::new(),
        }
    }

    async fn merge_context(&self, session_id: &str, delta: &ContextDelta) {
        let mut sessions = self.sessions.write().await;
        sessions
            .entry(session_id.to_string())
            .or_default()
            .context
            .merge(delta);
    }

    async fn get_context(&self, session_id: &str) -> ExtractedContext {
        self.sessions
            .read()
            .await
            .get(session_id)
            .map(|s| s.context.clone())
            .unwrap_or_default()
    }

    async fn history(&self, session_id: &str, limit: Option<usize>) -> Vec<Turn> {
        let window = limit.unwrap_or(self.max_history);
        self.recent_context(session_id, window).await
    }

    async fn clear(&self, session_id: &str) -> bool {
        self.sessions.write().await.remove(session_id).is_some()
    }

    async fn stats(&self) -> SessionStats {
        let sessions = self.sessions.read().await;
        SessionStats {
            sessions: sessions.len(),
            total_turns: sessions.values().map(|s| s.turns.len()).sum(),
        }
    }
}
