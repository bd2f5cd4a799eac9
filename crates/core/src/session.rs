//! Session memory: bounded turn history plus extracted context.
//!
//! The [`SessionStore`] trait is the only place conversation state lives.
//! Reads never create sessions; only mutations do, so a presentation layer
//! can poll a session speculatively without side effects.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use crate::agent::AgentId;
use crate::context::{ContextDelta, ExtractedContext};
use crate::message::Message;

/// Who produced a turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TurnRole {
    User,
    Agent,
}

/// One immutable entry in a session's history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Turn {
    pub role: TurnRole,
    pub content: String,
    pub timestamp: DateTime<Utc>,
    /// The responder that produced the turn; `None` for user turns.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub agent: Option<AgentId>,
}

impl Turn {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: TurnRole::User,
            content: content.into(),
            timestamp: Utc::now(),
            agent: None,
        }
    }

    pub fn agent(agent: AgentId, content: impl Into<String>) -> Self {
        Self {
            role: TurnRole::Agent,
            content: content.into(),
            timestamp: Utc::now(),
            agent: Some(agent),
        }
    }

    /// Convert to a provider message for request assembly.
    pub fn to_message(&self) -> Message {
        match self.role {
            TurnRole::User => Message::user(&self.content),
            TurnRole::Agent => Message::assistant(&self.content),
        }
    }
}

/// Aggregate counters across every live session.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionStats {
    pub sessions: usize,
    pub total_turns: usize,
}

/// Per-session conversational memory.
///
/// Implementations: in-memory (process lifetime).
#[async_trait]
pub trait SessionStore: Send + Sync {
    /// The store name (e.g., "in_memory").
    fn name(&self) -> &str;

    /// Maximum turns kept per session.
    fn max_history(&self) -> usize;

    /// Append a turn, creating the session if needed and evicting the oldest
    /// turns beyond `max_history`.
    async fn append_turn(&self, session_id: &str, turn: Turn);

    /// The last `window` turns in chronological order. Never mutates.
    async fn recent_context(&self, session_id: &str, window: usize) -> Vec<Turn>;

    /// Merge a delta into the session's context, creating the session if needed.
    async fn merge_context(&self, session_id: &str, delta: &ContextDelta);

    /// A snapshot of the session's context; empty for unknown sessions.
    async fn get_context(&self, session_id: &str) -> ExtractedContext;

    /// Up to `limit` most recent turns (all of them if `limit` is `None`).
    async fn history(&self, session_id: &str, limit: Option<usize>) -> Vec<Turn>;

    /// Drop a session entirely. Returns whether it existed.
    async fn clear(&self, session_id: &str) -> bool;

    /// Counters across all sessions.
    async fn stats(&self) -> SessionStats;
}
