//! The orchestrator: one turn from utterance to composed reply.
//!
//! Each turn walks a small state machine:
//!
//! ```text
//! Idle → Classifying → Dispatching → Composing → Done
//!                            └──────────────────→ Failed
//! ```
//!
//! Agents run one after the other, information first. When both run, the
//! planning agent sees the session context with the information agent's
//! delta already applied. Nothing is written to the session store until the
//! turn resolves: a successful turn records both deltas, the user turn and
//! each agent turn; a failed turn records only the user turn.
//!
//! Turns for one session are serialized; different sessions run in parallel.
//! Clearing a session waits for its in-flight turn. A session's lock is
//! dropped once no turn holds or waits on it.

use chrono::Utc;
use roamer_core::event::{DomainEvent, EventBus};
use roamer_core::{AgentId, ExtractedContext, SessionStore, Turn};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use crate::classifier::{Route, classify};
use crate::responder::{AgentResponse, Responder};

/// Separates agent sections in a composed reply.
pub const SECTION_BOUNDARY: &str = "\n\n---\n\n";

/// Shown when a turn fails before any agent produced text.
const DEGRADED_REPLY: &str =
    "I'm sorry, I couldn't complete that request right now. Please try again in a moment.";

/// Where a turn is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TurnState {
    Idle,
    Classifying,
    Dispatching,
    Composing,
    Done,
    Failed,
}

impl TurnState {
    pub fn as_str(&self) -> &'static str {
        match self {
            TurnState::Idle => "idle",
            TurnState::Classifying => "classifying",
            TurnState::Dispatching => "dispatching",
            TurnState::Composing => "composing",
            TurnState::Done => "done",
            TurnState::Failed => "failed",
        }
    }
}

/// How a turn ended.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum TurnStatus {
    Done,
    /// Partial success: the reply is whatever could be produced.
    Degraded { reason: String },
}

/// What the caller gets back for one utterance.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TurnOutcome {
    pub composed_text: String,
    /// Session context after the turn.
    pub context: ExtractedContext,
    pub status: TurnStatus,
    pub route: Route,
    pub agents: Vec<AgentId>,
}

impl TurnOutcome {
    pub fn is_degraded(&self) -> bool {
        matches!(self.status, TurnStatus::Degraded { .. })
    }
}

/// One agent's advertised abilities.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentCapabilities {
    pub agent: AgentId,
    pub name: String,
    pub tools: Vec<String>,
    pub capabilities: Vec<String>,
}

/// Counters for the whole router.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SystemStatus {
    pub agents_registered: usize,
    pub tools_available: usize,
    pub sessions: usize,
    pub total_turns: usize,
}

pub struct Orchestrator {
    store: Arc<dyn SessionStore>,
    information: Arc<dyn Responder>,
    planning: Arc<dyn Responder>,
    session_locks: Mutex<HashMap<String, Arc<Mutex<()>>>>,
    event_bus: Option<Arc<EventBus>>,
    tools_available: usize,
}

impl Orchestrator {
    pub fn new(
        store: Arc<dyn SessionStore>,
        information: Arc<dyn Responder>,
        planning: Arc<dyn Responder>,
    ) -> Self {
        let tools_available = information.tool_names().len() + planning.tool_names().len();
        Self {
            store,
            information,
            planning,
            session_locks: Mutex::new(HashMap::new()),
            event_bus: None,
            tools_available,
        }
    }

    pub fn with_event_bus(mut self, bus: Arc<EventBus>) -> Self {
        self.event_bus = Some(bus);
        self
    }

    /// Override the tool count reported by [`Orchestrator::status`].
    pub fn with_tools_available(mut self, count: usize) -> Self {
        self.tools_available = count;
        self
    }

    fn responder(&self, agent: AgentId) -> &Arc<dyn Responder> {
        match agent {
            AgentId::Information => &self.information,
            AgentId::Planning => &self.planning,
        }
    }

    fn publish(&self, event: DomainEvent) {
        if let Some(bus) = &self.event_bus {
            bus.publish(event);
        }
    }

    async fn session_lock(&self, session_id: &str) -> Arc<Mutex<()>> {
        let mut locks = self.session_locks.lock().await;
        locks
            .entry(session_id.to_string())
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone()
    }

    /// Drop the session's lock unless another caller still holds a handle.
    /// The caller must have dropped its own handle first.
    async fn release_lock(&self, session_id: &str) {
        let mut locks = self.session_locks.lock().await;
        if locks
            .get(session_id)
            .is_some_and(|lock| Arc::strong_count(lock) == 1)
        {
            locks.remove(session_id);
        }
    }

    /// Handle one utterance for a session. Never fails: problems come back
    /// as [`TurnStatus::Degraded`].
    pub async fn handle_utterance(&self, session_id: &str, text: &str) -> TurnOutcome {
        let lock = self.session_lock(session_id).await;
        let outcome = {
            let _turn = lock.lock().await;
            self.run_turn(session_id, text).await
        };
        drop(lock);
        self.release_lock(session_id).await;
        outcome
    }

    /// Forget a session's turns and context. Waits for any turn in flight.
    /// Returns whether the session existed.
    pub async fn clear_session(&self, session_id: &str) -> bool {
        let lock = self.session_lock(session_id).await;
        let existed = {
            let _turn = lock.lock().await;
            self.store.clear(session_id).await
        };
        drop(lock);
        self.release_lock(session_id).await;
        info!(session_id, existed, "Session cleared");
        existed
    }

    async fn run_turn(&self, session_id: &str, text: &str) -> TurnOutcome {
        let mut state = TurnState::Idle;
        advance(&mut state, TurnState::Classifying, session_id);
        self.publish(DomainEvent::UtteranceReceived {
            session_id: session_id.to_string(),
            content_preview: text.chars().take(80).collect(),
            timestamp: Utc::now(),
        });

        let context = self.store.get_context(session_id).await;
        let classification = classify(text, &context);
        let agents = classification.agents();
        info!(
            session_id,
            route = %classification.route,
            reason = classification.reason.as_str(),
            "Utterance classified"
        );
        self.publish(DomainEvent::Classified {
            session_id: session_id.to_string(),
            agents: agents.clone(),
            reason: classification.reason.as_str().to_string(),
            timestamp: Utc::now(),
        });

        advance(&mut state, TurnState::Dispatching, session_id);
        let mut effective = context;
        let mut responses: Vec<AgentResponse> = Vec::with_capacity(agents.len());
        for agent in &agents {
            debug!(session_id, agent = %agent, "Dispatching");
            match self.responder(*agent).respond(session_id, text, &effective).await {
                Ok(response) => {
                    effective.merge(&response.delta);
                    responses.push(response);
                }
                Err(e) => {
                    advance(&mut state, TurnState::Failed, session_id);
                    return self
                        .degrade(
                            session_id,
                            text,
                            e.to_string(),
                            &responses,
                            classification.route,
                            agents.clone(),
                        )
                        .await;
                }
            }
        }

        advance(&mut state, TurnState::Composing, session_id);
        for response in responses.iter().filter(|r| !r.delta.is_empty()) {
            self.store.merge_context(session_id, &response.delta).await;
        }
        self.store.append_turn(session_id, Turn::user(text)).await;
        for response in &responses {
            self.store
                .append_turn(session_id, Turn::agent(response.agent, &response.text))
                .await;
        }
        let composed_text = compose(&responses);

        advance(&mut state, TurnState::Done, session_id);
        TurnOutcome {
            composed_text,
            context: self.store.get_context(session_id).await,
            status: TurnStatus::Done,
            route: classification.route,
            agents,
        }
    }

    async fn degrade(
        &self,
        session_id: &str,
        text: &str,
        reason: String,
        partial: &[AgentResponse],
        route: Route,
        agents: Vec<AgentId>,
    ) -> TurnOutcome {
        warn!(session_id, reason = %reason, "Turn degraded");
        self.store.append_turn(session_id, Turn::user(text)).await;
        self.publish(DomainEvent::TurnDegraded {
            session_id: session_id.to_string(),
            reason: reason.clone(),
            timestamp: Utc::now(),
        });

        let composed_text = if partial.is_empty() {
            DEGRADED_REPLY.to_string()
        } else {
            compose(partial)
        };
        TurnOutcome {
            composed_text,
            context: self.store.get_context(session_id).await,
            status: TurnStatus::Degraded { reason },
            route,
            agents,
        }
    }

    /// The session's context. Read-only; unknown sessions give an empty one.
    pub async fn context(&self, session_id: &str) -> ExtractedContext {
        self.store.get_context(session_id).await
    }

    /// Up to `limit` most recent turns of a session.
    pub async fn history(&self, session_id: &str, limit: Option<usize>) -> Vec<Turn> {
        self.store.history(session_id, limit).await
    }

    /// What each agent can do, in dispatch order.
    pub fn capabilities(&self) -> Vec<AgentCapabilities> {
        AgentId::ALL
            .iter()
            .map(|agent| {
                let responder = self.responder(*agent);
                AgentCapabilities {
                    agent: *agent,
                    name: agent.display_name().to_string(),
                    tools: responder.tool_names().iter().map(|t| t.to_string()).collect(),
                    capabilities: responder
                        .capabilities()
                        .iter()
                        .map(|c| c.to_string())
                        .collect(),
                }
            })
            .collect()
    }

    pub async fn status(&self) -> SystemStatus {
        let stats = self.store.stats().await;
        SystemStatus {
            agents_registered: AgentId::ALL.len(),
            tools_available: self.tools_available,
            sessions: stats.sessions,
            total_turns: stats.total_turns,
        }
    }
}

fn advance(state: &mut TurnState, next: TurnState, session_id: &str) {
    debug!(session_id, from = state.as_str(), to = next.as_str(), "Turn state");
    *state = next;
}

/// Agent texts in dispatch order, separated by [`SECTION_BOUNDARY`].
fn compose(responses: &[AgentResponse]) -> String {
    responses
        .iter()
        .map(|r| r.text.as_str())
        .collect::<Vec<_>>()
        .join(SECTION_BOUNDARY)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::prompt_cache::PromptCache;
    use crate::test_helpers::{HangingProvider, ScriptedResponder};
    use crate::travel_agent::{AgentSettings, TravelAgent};
    use std::time::Duration;
    use roamer_core::{BudgetLevel, ContextDelta, TurnRole};
    use roamer_memory::InMemorySessionStore;

    struct Fixture {
        store: Arc<InMemorySessionStore>,
        information: Arc<ScriptedResponder>,
        planning: Arc<ScriptedResponder>,
        orchestrator: Orchestrator,
    }

    fn fixture(information: ScriptedResponder, planning: ScriptedResponder) -> Fixture {
        let store = Arc::new(InMemorySessionStore::new());
        let information = Arc::new(information);
        let planning = Arc::new(planning);
        let orchestrator = Orchestrator::new(store.clone(), information.clone(), planning.clone());
        Fixture {
            store,
            information,
            planning,
            orchestrator,
        }
    }

    fn destinations(names: &[&str]) -> ContextDelta {
        ContextDelta {
            destinations: names.iter().map(|s| s.to_string()).collect(),
            ..Default::default()
        }
    }

    fn budget(level: BudgetLevel) -> ContextDelta {
        ContextDelta {
            budget_level: Some(level),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn single_agent_turn_is_recorded() {
        let f = fixture(
            ScriptedResponder::replying(AgentId::Information, "Sunny in Tokyo.", destinations(&["Tokyo"])),
            ScriptedResponder::replying(AgentId::Planning, "unused", ContextDelta::default()),
        );

        let outcome = f
            .orchestrator
            .handle_utterance("s1", "What's the weather in Tokyo?")
            .await;

        assert_eq!(outcome.status, TurnStatus::Done);
        assert_eq!(outcome.route, Route::Information);
        assert_eq!(outcome.composed_text, "Sunny in Tokyo.");
        assert_eq!(outcome.context.destinations, vec!["Tokyo"]);
        assert!(f.planning.seen().is_empty());

        let history = f.store.history("s1", None).await;
        assert_eq!(history.len(), 2);
        assert_eq!(history[0].role, TurnRole::User);
        assert_eq!(history[1].agent, Some(AgentId::Information));
    }

    #[tokio::test]
    async fn planning_sees_information_delta() {
        let f = fixture(
            ScriptedResponder::replying(AgentId::Information, "Paris facts.", destinations(&["Paris"])),
            ScriptedResponder::replying(AgentId::Planning, "Paris plan.", ContextDelta::default()),
        );

        let outcome = f
            .orchestrator
            .handle_utterance("s1", "Plan a trip to Paris")
            .await;

        assert_eq!(outcome.route, Route::Both);
        assert_eq!(outcome.agents, vec![AgentId::Information, AgentId::Planning]);
        assert!(f.information.seen()[0].destinations.is_empty());
        assert_eq!(f.planning.seen()[0].destinations, vec!["Paris"]);
        assert_eq!(
            outcome.composed_text,
            format!("Paris facts.{SECTION_BOUNDARY}Paris plan.")
        );

        let history = f.store.history("s1", None).await;
        let agents: Vec<Option<AgentId>> = history.iter().map(|t| t.agent).collect();
        assert_eq!(agents, vec![None, Some(AgentId::Information), Some(AgentId::Planning)]);
    }

    #[tokio::test]
    async fn planning_wins_conflicts() {
        let f = fixture(
            ScriptedResponder::replying(AgentId::Information, "info", budget(BudgetLevel::Low)),
            ScriptedResponder::replying(AgentId::Planning, "plan", budget(BudgetLevel::High)),
        );

        let outcome = f
            .orchestrator
            .handle_utterance("s1", "Budget advice for Rome")
            .await;

        assert_eq!(outcome.context.budget_level, Some(BudgetLevel::High));
    }

    #[tokio::test]
    async fn planning_failure_keeps_information_text() {
        let f = fixture(
            ScriptedResponder::replying(AgentId::Information, "Paris facts.", destinations(&["Paris"])),
            ScriptedResponder::failing(AgentId::Planning),
        );

        let outcome = f
            .orchestrator
            .handle_utterance("s1", "Plan a trip to Paris")
            .await;

        assert!(outcome.is_degraded());
        assert_eq!(outcome.composed_text, "Paris facts.");
        // No delta from a failed turn
        assert!(outcome.context.is_empty());

        let history = f.store.history("s1", None).await;
        assert_eq!(history.len(), 1);
        assert_eq!(history[0].role, TurnRole::User);
    }

    #[tokio::test]
    async fn information_failure_skips_planning() {
        let f = fixture(
            ScriptedResponder::failing(AgentId::Information),
            ScriptedResponder::replying(AgentId::Planning, "plan", ContextDelta::default()),
        );

        let outcome = f
            .orchestrator
            .handle_utterance("s1", "Plan a trip to Paris")
            .await;

        assert!(outcome.is_degraded());
        assert_eq!(outcome.composed_text, DEGRADED_REPLY);
        assert!(f.planning.seen().is_empty());
    }

    #[tokio::test]
    async fn same_session_turns_do_not_interleave() {
        let f = fixture(
            ScriptedResponder::replying(AgentId::Information, "ok", ContextDelta::default()),
            ScriptedResponder::replying(AgentId::Planning, "unused", ContextDelta::default()),
        );
        let orchestrator = Arc::new(f.orchestrator);

        let handles: Vec<_> = (0..10)
            .map(|i| {
                let orchestrator = orchestrator.clone();
                tokio::spawn(async move {
                    orchestrator.handle_utterance("shared", &format!("hello {i}")).await
                })
            })
            .collect();
        for handle in handles {
            handle.await.unwrap();
        }

        let history = f.store.history("shared", None).await;
        assert_eq!(history.len(), 20);
        for pair in history.chunks(2) {
            assert_eq!(pair[0].role, TurnRole::User);
            assert_eq!(pair[1].role, TurnRole::Agent);
        }
    }

    #[tokio::test]
    async fn events_follow_the_turn() {
        let bus = Arc::new(EventBus::new(32));
        let mut events = bus.subscribe();
        let f = fixture(
            ScriptedResponder::failing(AgentId::Information),
            ScriptedResponder::replying(AgentId::Planning, "plan", ContextDelta::default()),
        );
        let orchestrator = f.orchestrator.with_event_bus(bus);

        orchestrator.handle_utterance("s1", "hello").await;

        let kinds: Vec<&'static str> = std::iter::from_fn(|| events.try_recv().ok())
            .map(|event| match event.as_ref() {
                DomainEvent::UtteranceReceived { .. } => "received",
                DomainEvent::Classified { .. } => "classified",
                DomainEvent::TurnDegraded { .. } => "degraded",
                _ => "other",
            })
            .collect();
        assert_eq!(kinds, vec!["received", "classified", "degraded"]);
    }

    #[tokio::test]
    async fn status_and_capabilities() {
        let f = fixture(
            ScriptedResponder::replying(AgentId::Information, "hi", ContextDelta::default()),
            ScriptedResponder::replying(AgentId::Planning, "hi", ContextDelta::default()),
        );
        let orchestrator = f.orchestrator.with_tools_available(9);
        orchestrator.handle_utterance("a", "hello").await;
        orchestrator.handle_utterance("b", "hello").await;

        let status = orchestrator.status().await;
        assert_eq!(
            status,
            SystemStatus {
                agents_registered: 2,
                tools_available: 9,
                sessions: 2,
                total_turns: 4,
            }
        );

        let caps = orchestrator.capabilities();
        assert_eq!(caps.len(), 2);
        assert_eq!(caps[0].agent, AgentId::Information);
        assert_eq!(caps[1].name, "TravelAgent");
    }

    #[tokio::test(start_paused = true)]
    async fn hung_completion_degrades_the_turn() {
        let store = Arc::new(InMemorySessionStore::new());
        let registry = Arc::new(roamer_tools::default_registry().unwrap());
        let prompts = Arc::new(PromptCache::fixed(Duration::from_secs(300)));
        let provider = Arc::new(HangingProvider::default());
        let settings = AgentSettings {
            call_timeout: Duration::from_secs(10),
            max_attempts: 2,
            retry_backoff: Duration::from_millis(1),
            ..AgentSettings::default()
        };
        let information = TravelAgent::information(
            provider.clone(),
            registry.clone(),
            store.clone(),
            prompts.clone(),
        )
        .with_settings(settings.clone());
        let planning = TravelAgent::planning(provider.clone(), registry, store.clone(), prompts)
            .with_settings(settings);
        let orchestrator = Orchestrator::new(store.clone(), Arc::new(information), Arc::new(planning));

        let outcome = orchestrator
            .handle_utterance("s1", "What's the weather in Tokyo?")
            .await;

        match &outcome.status {
            TurnStatus::Degraded { reason } => assert!(reason.contains("timed out")),
            other => panic!("expected a degraded turn, got {other:?}"),
        }
        assert_eq!(outcome.composed_text, DEGRADED_REPLY);
        assert_eq!(provider.call_count(), 2);
        let history = store.history("s1", None).await;
        assert_eq!(history.len(), 1);
        assert_eq!(history[0].role, TurnRole::User);
    }

    #[tokio::test]
    async fn clear_session_forgets_turns_and_context() {
        let f = fixture(
            ScriptedResponder::replying(AgentId::Information, "Sunny.", destinations(&["Tokyo"])),
            ScriptedResponder::replying(AgentId::Planning, "unused", ContextDelta::default()),
        );
        f.orchestrator.handle_utterance("s1", "weather in Tokyo").await;

        assert!(f.orchestrator.clear_session("s1").await);
        assert!(f.orchestrator.history("s1", None).await.is_empty());
        assert!(f.orchestrator.context("s1").await.is_empty());
        assert!(!f.orchestrator.clear_session("s1").await);
    }

    #[tokio::test]
    async fn session_locks_are_released() {
        let f = fixture(
            ScriptedResponder::replying(AgentId::Information, "ok", ContextDelta::default()),
            ScriptedResponder::replying(AgentId::Planning, "unused", ContextDelta::default()),
        );
        let orchestrator = Arc::new(f.orchestrator);

        let handles: Vec<_> = (0..8)
            .map(|i| {
                let orchestrator = orchestrator.clone();
                tokio::spawn(async move {
                    orchestrator
                        .handle_utterance(&format!("s{}", i % 3), "hello")
                        .await
                })
            })
            .collect();
        for handle in handles {
            handle.await.unwrap();
        }
        orchestrator.clear_session("s0").await;

        assert!(orchestrator.session_locks.lock().await.is_empty());
        assert_eq!(orchestrator.status().await.sessions, 2);
    }

    #[tokio::test]
    async fn reads_do_not_create_sessions() {
        let f = fixture(
            ScriptedResponder::replying(AgentId::Information, "hi", ContextDelta::default()),
            ScriptedResponder::replying(AgentId::Planning, "hi", ContextDelta::default()),
        );
        assert!(f.orchestrator.context("ghost").await.is_empty());
        assert!(f.orchestrator.history("ghost", Some(5)).await.is_empty());
        assert_eq!(f.orchestrator.status().await.sessions, 0);
    }
}
