//! Domain event system: decoupled observation of what the router does.
//!
//! Events are published as turns move through the orchestrator. Anything
//! that wants to watch (a CLI status line, a test) subscribes without the
//! orchestrator knowing about it.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::sync::broadcast;
use crate::agent::AgentId;

/// All domain events in the system.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum DomainEvent {
    /// An utterance arrived for a session
    UtteranceReceived {
        session_id: String,
        content_preview: String,
        timestamp: DateTime<Utc>,
    },

    /// The classifier picked a route
    Classified {
        session_id: String,
        agents: Vec<AgentId>,
        reason: String,
        timestamp: DateTime<Utc>,
    },

    /// An agent produced a response
    AgentResponded {
        session_id: String,
        agent: AgentId,
        tool_calls: usize,
        timestamp: DateTime<Utc>,
    },

    /// A tool was executed
    ToolExecuted {
        agent: AgentId,
        tool_name: String,
        success: bool,
        duration_ms: u64,
        timestamp: DateTime<Utc>,
    },

    /// Instructions were (re)generated for a cache key
    PromptRegenerated {
        cache_key: String,
        used_fallback: bool,
        timestamp: DateTime<Utc>,
    },

    /// A turn ended in the degraded state
    TurnDegraded {
        session_id: String,
        reason: String,
        timestamp: DateTime<Utc>,
    },
}

/// A broadcast-based event bus for domain events.
///
/// Uses `tokio::sync::broadcast` for multi-consumer pub/sub.
pub struct EventBus {
    sender: broadcast::Sender<Arc<DomainEvent>>,
}

impl EventBus {
    /// Create a new event bus with the given capacity.
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Publish an event to all subscribers.
    pub fn publish(&self, event: DomainEvent) {
        // No subscribers is fine
        let _ = self.sender.send(Arc::new(event));
    }

    /// Subscribe to receive events.
    pub fn subscribe(&self) -> broadcast::Receiver<Arc<DomainEvent>> {
        self.sender.subscribe()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(256)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn event_bus_publish_subscribe() {
        let bus = EventBus::new(16);
        let mut rx = bus.subscribe();

        bus.publish(DomainEvent::ToolExecuted {
            agent: AgentId::Information,
            tool_name: "weather_lookup".into(),
            success: true,
            duration_ms: 3,
            timestamp: Utc::now(),
        });

        let event = rx.recv().await.unwrap();
        match event.as_ref() {
            DomainEvent::ToolExecuted { tool_name, success, .. } => {
                assert_eq!(tool_name, "weather_lookup");
                assert!(success);
            }
            _ => panic!("Expected ToolExecuted event"),
        }
    }

    #[test]
    fn event_bus_no_subscribers_doesnt_panic() {
        let bus = EventBus::new(16);
        bus.publish(DomainEvent::TurnDegraded {
            session_id: "s1".into(),
            reason: "no subscribers".into(),
            timestamp: Utc::now(),
        });
    }
}
