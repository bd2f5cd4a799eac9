//! The travel agent: one responder implementation, configured as either the
//! information or the planning agent.
//!
//! A call makes at most two completions. The first offers the agent's tools;
//! if it asks for any, they run through the registry's scope check and the
//! results go back in a second completion with no tools offered. A rejected
//! tool call (out of scope, unknown, malformed) is never forwarded: the first
//! completion is redone once without tools instead.

use async_trait::async_trait;
use chrono::Utc;
use roamer_config::AppConfig;
use roamer_core::error::{ProviderError, ToolError};
use roamer_core::event::{DomainEvent, EventBus};
use roamer_core::message::{Message, MessageToolCall};
use roamer_core::provider::{Provider, ProviderRequest, ProviderResponse};
use roamer_core::tool::{ToolCall, ToolRegistry};
use roamer_core::{AgentId, ContextDelta, ExtractedContext, PlanningStatus, SessionStore, Turn};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

use crate::classifier::{contains_term, normalize};
use crate::error::AgentError;
use crate::extract::{canonical_destination, extract};
use crate::prompt_cache::{self, Personalization, PromptCache};
use crate::responder::{AgentResponse, Responder, ToolOutput};

/// Words that ask the planning agent for an itinerary.
const ITINERARY_REQUEST_TERMS: [&str; 4] = ["itinerary", "plan", "planning", "schedule"];

/// Tool arguments that name a destination.
const DESTINATION_ARGUMENTS: [&str; 2] = ["destination", "location"];

/// Per-call knobs shared by both agents.
#[derive(Debug, Clone)]
pub struct AgentSettings {
    pub model: String,
    pub temperature: f32,
    pub max_tokens: Option<u32>,
    /// Recent turns included in each request.
    pub context_window: usize,
    /// Bound on every completion and tool call.
    pub call_timeout: Duration,
    /// Completion attempts before giving up, at least one.
    pub max_attempts: u32,
    /// Backoff before retry `n` is `retry_backoff * n`.
    pub retry_backoff: Duration,
}

impl AgentSettings {
    pub fn from_config(config: &AppConfig, model: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            temperature: config.default_temperature,
            max_tokens: Some(config.default_max_tokens),
            context_window: config.memory.context_window,
            call_timeout: config.agents.call_timeout(),
            max_attempts: config.agents.max_attempts.max(1),
            retry_backoff: config.agents.retry_backoff(),
        }
    }
}

impl Default for AgentSettings {
    fn default() -> Self {
        let config = AppConfig::default();
        Self::from_config(&config, config.default_model.clone())
    }
}

/// How the tool phase of a call ended.
enum ToolPhase {
    /// Every call ran; outputs are in call order.
    Completed(Vec<(MessageToolCall, ToolOutput)>),
    /// A call was rejected before running.
    Rejected(ToolError),
}

pub struct TravelAgent {
    id: AgentId,
    tools: &'static [&'static str],
    provider: Arc<dyn Provider>,
    registry: Arc<ToolRegistry>,
    store: Arc<dyn SessionStore>,
    prompts: Arc<PromptCache>,
    settings: AgentSettings,
    event_bus: Option<Arc<EventBus>>,
}

impl TravelAgent {
    /// An agent with the default tool subset for `id`.
    pub fn new(
        id: AgentId,
        provider: Arc<dyn Provider>,
        registry: Arc<ToolRegistry>,
        store: Arc<dyn SessionStore>,
        prompts: Arc<PromptCache>,
    ) -> Self {
        let tools = match id {
            AgentId::Information => roamer_tools::INFORMATION_TOOLS,
            AgentId::Planning => roamer_tools::PLANNING_TOOLS,
        };
        Self {
            id,
            tools,
            provider,
            registry,
            store,
            prompts,
            settings: AgentSettings::default(),
            event_bus: None,
        }
    }

    /// The information agent: destination facts, weather, attractions, tips, currency.
    pub fn information(
        provider: Arc<dyn Provider>,
        registry: Arc<ToolRegistry>,
        store: Arc<dyn SessionStore>,
        prompts: Arc<PromptCache>,
    ) -> Self {
        Self::new(AgentId::Information, provider, registry, store, prompts)
    }

    /// The planning agent: itineraries, accommodation, budgets, packing.
    pub fn planning(
        provider: Arc<dyn Provider>,
        registry: Arc<ToolRegistry>,
        store: Arc<dyn SessionStore>,
        prompts: Arc<PromptCache>,
    ) -> Self {
        Self::new(AgentId::Planning, provider, registry, store, prompts)
    }

    pub fn with_settings(mut self, settings: AgentSettings) -> Self {
        self.settings = settings;
        self
    }

    /// Restrict the agent to a different tool subset.
    pub fn with_tools(mut self, tools: &'static [&'static str]) -> Self {
        self.tools = tools;
        self
    }

    pub fn with_event_bus(mut self, bus: Arc<EventBus>) -> Self {
        self.event_bus = Some(bus);
        self
    }

    fn publish(&self, event: DomainEvent) {
        if let Some(bus) = &self.event_bus {
            bus.publish(event);
        }
    }

    fn request(&self, messages: Vec<Message>, offer_tools: bool) -> ProviderRequest {
        let mut request = ProviderRequest::new(&self.settings.model, messages);
        request.temperature = self.settings.temperature;
        request.max_tokens = self.settings.max_tokens;
        if offer_tools {
            request.tools = self.registry.definitions_for(self.tools);
        }
        request
    }

    /// One completion with bounded retry. Every failure kind is retried.
    async fn complete_with_retry(
        &self,
        session_id: &str,
        messages: &[Message],
        offer_tools: bool,
    ) -> Result<ProviderResponse, AgentError> {
        let max_attempts = self.settings.max_attempts.max(1);
        let mut attempt = 0;
        loop {
            attempt += 1;
            let request = self.request(messages.to_vec(), offer_tools);
            let result =
                match tokio::time::timeout(self.settings.call_timeout, self.provider.complete(request))
                    .await
                {
                    Ok(result) => result,
                    Err(_) => Err(ProviderError::Timeout(format!(
                        "no completion within {:?}",
                        self.settings.call_timeout
                    ))),
                };

            match result {
                Ok(response) => return Ok(response),
                Err(e) if attempt < max_attempts => {
                    warn!(
                        session_id,
                        agent = %self.id,
                        attempt,
                        error = %e,
                        "Completion failed, retrying"
                    );
                    tokio::time::sleep(self.settings.retry_backoff * attempt).await;
                }
                Err(source) => {
                    return Err(AgentError::Provider {
                        agent: self.id,
                        attempts: attempt,
                        source,
                    });
                }
            }
        }
    }

    /// Run every requested tool call in order.
    async fn run_tools(&self, tool_calls: &[MessageToolCall]) -> Result<ToolPhase, AgentError> {
        let mut outputs = Vec::with_capacity(tool_calls.len());

        for tc in tool_calls {
            let arguments: serde_json::Value = match serde_json::from_str(&tc.arguments) {
                Ok(value) => value,
                Err(e) => {
                    return Ok(ToolPhase::Rejected(ToolError::InvalidArguments {
                        tool_name: tc.name.clone(),
                        reason: format!("arguments are not valid JSON: {e}"),
                    }));
                }
            };
            let call = ToolCall {
                id: tc.id.clone(),
                name: tc.name.clone(),
                arguments,
            };

            let start = std::time::Instant::now();
            let invoked = tokio::time::timeout(
                self.settings.call_timeout,
                self.registry.invoke_scoped(self.id.as_str(), self.tools, &call),
            )
            .await;
            let duration_ms = start.elapsed().as_millis() as u64;

            let output = match invoked {
                Err(_) => {
                    self.publish_tool(&call.name, false, duration_ms);
                    return Err(AgentError::Tool {
                        agent: self.id,
                        source: ToolError::Timeout {
                            tool_name: call.name,
                            timeout_ms: self.settings.call_timeout.as_millis() as u64,
                        },
                    });
                }
                Ok(Err(e)) if e.is_call_rejection() => return Ok(ToolPhase::Rejected(e)),
                Ok(Err(e)) => {
                    warn!(agent = %self.id, tool = %call.name, error = %e, "Tool execution failed");
                    ToolOutput {
                        tool: call.name,
                        arguments: call.arguments,
                        output: format!("Error: {e}"),
                        success: false,
                    }
                }
                Ok(Ok(result)) => ToolOutput {
                    tool: call.name,
                    arguments: call.arguments,
                    output: result.output,
                    success: result.success,
                },
            };

            debug!(agent = %self.id, tool = %output.tool, success = output.success, duration_ms, "Tool executed");
            self.publish_tool(&output.tool, output.success, duration_ms);
            outputs.push((tc.clone(), output));
        }

        Ok(ToolPhase::Completed(outputs))
    }

    fn publish_tool(&self, tool_name: &str, success: bool, duration_ms: u64) {
        self.publish(DomainEvent::ToolExecuted {
            agent: self.id,
            tool_name: tool_name.to_string(),
            success,
            duration_ms,
            timestamp: Utc::now(),
        });
    }

    /// Facts inferred from the utterance and from the tools that ran.
    ///
    /// For the planning agent, a built itinerary resolves any open request,
    /// an unmet itinerary request opens one, and any other answer to an open
    /// request resolves it.
    fn infer_delta(
        &self,
        utterance: &str,
        context: &ExtractedContext,
        tool_outputs: &[ToolOutput],
    ) -> ContextDelta {
        let mut delta = extract(utterance);

        let named = tool_outputs
            .iter()
            .filter(|o| o.success)
            .flat_map(|o| {
                DESTINATION_ARGUMENTS
                    .iter()
                    .filter_map(|key| o.arguments.get(*key).and_then(|v| v.as_str()))
            })
            .filter_map(canonical_destination);
        for destination in named {
            if !delta
                .destinations
                .iter()
                .any(|d| d.eq_ignore_ascii_case(&destination))
            {
                delta.destinations.push(destination);
            }
        }

        if self.id == AgentId::Planning {
            let built = tool_outputs
                .iter()
                .any(|o| o.tool == "build_itinerary" && o.success);
            if built {
                delta.planning = Some(PlanningStatus::Resolved);
            } else if requests_itinerary(utterance) {
                delta.planning = Some(PlanningStatus::Open(utterance.trim().to_string()));
            } else if context.has_open_planning() {
                delta.planning = Some(PlanningStatus::Resolved);
            }
        }

        delta
    }
}

fn requests_itinerary(utterance: &str) -> bool {
    let text = normalize(utterance);
    ITINERARY_REQUEST_TERMS
        .iter()
        .any(|term| contains_term(&text, term))
}

fn system_message(instructions: &str, context: &ExtractedContext) -> Message {
    if context.is_empty() {
        return Message::system(instructions);
    }
    Message::system(format!(
        "{instructions}\n\nKnown trip context:\n{}",
        context.render()
    ))
}

#[async_trait]
impl Responder for TravelAgent {
    fn id(&self) -> AgentId {
        self.id
    }

    fn tool_names(&self) -> &[&'static str] {
        self.tools
    }

    fn capabilities(&self) -> &[&'static str] {
        prompt_cache::capabilities(self.id)
    }

    async fn respond(
        &self,
        session_id: &str,
        utterance: &str,
        context: &ExtractedContext,
    ) -> Result<AgentResponse, AgentError> {
        let history = self
            .store
            .recent_context(session_id, self.settings.context_window)
            .await;
        let instructions = self
            .prompts
            .instructions(self.id, &Personalization::from_context(context))
            .await;

        let mut messages = vec![system_message(&instructions, context)];
        messages.extend(history.iter().map(Turn::to_message));
        messages.push(Message::user(utterance));

        debug!(
            session_id,
            agent = %self.id,
            history = history.len(),
            tools = self.tools.len(),
            "Requesting completion"
        );

        let first = self.complete_with_retry(session_id, &messages, true).await?;
        let mut tool_outputs = Vec::new();

        let text = if first.message.tool_calls.is_empty() {
            first.message.content
        } else {
            match self.run_tools(&first.message.tool_calls).await? {
                ToolPhase::Completed(results) => {
                    let mut followup = messages.clone();
                    followup.push(first.message.clone());
                    for (tc, output) in &results {
                        followup.push(Message::tool_result(&tc.id, &output.output));
                    }
                    tool_outputs = results.into_iter().map(|(_, output)| output).collect();
                    self.complete_with_retry(session_id, &followup, false)
                        .await?
                        .message
                        .content
                }
                ToolPhase::Rejected(e) => {
                    warn!(
                        session_id,
                        agent = %self.id,
                        error = %e,
                        "Tool call rejected, retrying without tools"
                    );
                    self.complete_with_retry(session_id, &messages, false)
                        .await?
                        .message
                        .content
                }
            }
        };

        let text = text.trim().to_string();
        if text.is_empty() {
            return Err(AgentError::EmptyResponse { agent: self.id });
        }

        let delta = self.infer_delta(utterance, context, &tool_outputs);

        info!(
            session_id,
            agent = %self.id,
            tool_calls = tool_outputs.len(),
            "Agent responded"
        );
        self.publish(DomainEvent::AgentResponded {
            session_id: session_id.to_string(),
            agent: self.id,
            tool_calls: tool_outputs.len(),
            timestamp: Utc::now(),
        });

        Ok(AgentResponse {
            agent: self.id,
            text,
            tool_outputs,
            delta,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::{
        FailingProvider, HangingProvider, SequentialMockProvider, StalledTool, make_text_response,
        make_tool_call, make_tool_call_response,
    };
    use roamer_core::BudgetLevel;
    use roamer_core::message::Role;
    use roamer_memory::InMemorySessionStore;

    fn registry() -> Arc<ToolRegistry> {
        Arc::new(roamer_tools::default_registry().unwrap())
    }

    fn store() -> Arc<InMemorySessionStore> {
        Arc::new(InMemorySessionStore::new())
    }

    fn prompts() -> Arc<PromptCache> {
        Arc::new(PromptCache::fixed(Duration::from_secs(300)))
    }

    fn fast_settings() -> AgentSettings {
        AgentSettings {
            retry_backoff: Duration::from_millis(1),
            ..AgentSettings::default()
        }
    }

    fn agent(id: AgentId, provider: Arc<dyn Provider>, store: Arc<InMemorySessionStore>) -> TravelAgent {
        TravelAgent::new(id, provider, registry(), store, prompts()).with_settings(fast_settings())
    }

    #[tokio::test]
    async fn weather_question_uses_weather_tool() {
        let provider = Arc::new(SequentialMockProvider::tool_then_answer(
            vec![make_tool_call("weather_lookup", serde_json::json!({"location": "Tokyo"}))],
            "",
            "Tokyo is mild this week.",
        ));
        let info = agent(AgentId::Information, provider.clone(), store());

        let response = info
            .respond("s1", "What's the weather in Tokyo?", &ExtractedContext::default())
            .await
            .unwrap();

        assert_eq!(response.text, "Tokyo is mild this week.");
        assert_eq!(response.tool_outputs.len(), 1);
        assert!(response.tool_outputs[0].success);
        assert!(response.tool_outputs[0].output.contains("forecast"));
        assert_eq!(response.delta.destinations, vec!["Tokyo"]);

        let requests = provider.requests();
        assert_eq!(requests.len(), 2);
        assert_eq!(requests[0].tools.len(), roamer_tools::INFORMATION_TOOLS.len());
        assert!(requests[1].tools.is_empty());
        let tool_message = requests[1].messages.last().unwrap();
        assert_eq!(tool_message.role, Role::Tool);
        assert_eq!(tool_message.tool_call_id.as_deref(), Some("call_weather_lookup"));
    }

    #[tokio::test]
    async fn only_allowed_tools_are_offered() {
        let provider = Arc::new(SequentialMockProvider::single_text("Here is your plan."));
        let planning = agent(AgentId::Planning, provider.clone(), store());

        planning
            .respond("s1", "pack for Oslo", &ExtractedContext::default())
            .await
            .unwrap();

        let offered: Vec<String> = provider.requests()[0]
            .tools
            .iter()
            .map(|t| t.name.clone())
            .collect();
        assert_eq!(offered, roamer_tools::PLANNING_TOOLS);
    }

    #[tokio::test]
    async fn out_of_scope_call_is_never_forwarded() {
        let provider = Arc::new(SequentialMockProvider::tool_then_answer(
            vec![make_tool_call("build_itinerary", serde_json::json!({"destination": "Rome"}))],
            "",
            "Rome is lovely in spring.",
        ));
        let info = agent(AgentId::Information, provider.clone(), store());

        let response = info
            .respond("s1", "Tell me about Rome", &ExtractedContext::default())
            .await
            .unwrap();

        assert_eq!(response.text, "Rome is lovely in spring.");
        assert!(response.tool_outputs.is_empty());
        let requests = provider.requests();
        // The retry carries no tools and no tool result
        assert!(requests[1].tools.is_empty());
        assert!(requests[1].messages.iter().all(|m| m.role != Role::Tool));
    }

    #[tokio::test]
    async fn malformed_arguments_take_the_rejection_path() {
        let mut bad = make_tool_call("weather_lookup", serde_json::json!({}));
        bad.arguments = "{not json".into();
        let provider = Arc::new(SequentialMockProvider::new(vec![
            make_tool_call_response(vec![bad], ""),
            make_text_response("Weather data is unavailable right now."),
        ]));
        let info = agent(AgentId::Information, provider.clone(), store());

        let response = info
            .respond("s1", "weather?", &ExtractedContext::default())
            .await
            .unwrap();
        assert!(response.tool_outputs.is_empty());
        assert_eq!(provider.call_count(), 2);
    }

    #[tokio::test]
    async fn rejected_itinerary_call_leaves_planning_open() {
        let provider = Arc::new(SequentialMockProvider::tool_then_answer(
            vec![make_tool_call(
                "build_itinerary",
                serde_json::json!({"destination": "Rome", "start_date": "next tuesday"}),
            )],
            "",
            "I need a start date in YYYY-MM-DD form.",
        ));
        let planning = agent(AgentId::Planning, provider.clone(), store());

        // The tool rejects the start date, so nothing ran
        let response = planning
            .respond("s1", "Plan 3 days in Rome", &ExtractedContext::default())
            .await
            .unwrap();
        assert!(response.tool_outputs.is_empty());
        assert_eq!(
            response.delta.planning,
            Some(PlanningStatus::Open("Plan 3 days in Rome".into()))
        );
    }

    #[tokio::test]
    async fn successful_itinerary_resolves_planning() {
        let provider = Arc::new(SequentialMockProvider::tool_then_answer(
            vec![make_tool_call(
                "build_itinerary",
                serde_json::json!({"destination": "paris", "duration_days": 5, "travelers": 2}),
            )],
            "",
            "Day 1: Welcome walking tour of Paris",
        ));
        let planning = agent(AgentId::Planning, provider, store());

        let ctx = ExtractedContext {
            destinations: vec!["Paris".into()],
            budget_level: Some(BudgetLevel::Medium),
            ..Default::default()
        };
        let response = planning
            .respond("s1", "Plan a 5-day trip to Paris for 2 people, medium budget", &ctx)
            .await
            .unwrap();

        assert_eq!(response.delta.planning, Some(PlanningStatus::Resolved));
        assert_eq!(response.delta.destinations, vec!["Paris"]);
        assert_eq!(response.delta.budget_level, Some(BudgetLevel::Medium));
    }

    #[tokio::test]
    async fn request_carries_context_and_history() {
        let store = store();
        store.append_turn("s1", Turn::user("I like museums")).await;
        store
            .append_turn("s1", Turn::agent(AgentId::Information, "Noted."))
            .await;
        let provider = Arc::new(SequentialMockProvider::single_text("Try the Louvre."));
        let info = agent(AgentId::Information, provider.clone(), store);

        let ctx = ExtractedContext {
            destinations: vec!["Paris".into()],
            ..Default::default()
        };
        info.respond("s1", "Any ideas?", &ctx).await.unwrap();

        let request = &provider.requests()[0];
        assert_eq!(request.messages.len(), 4);
        assert_eq!(request.messages[0].role, Role::System);
        assert!(request.messages[0].content.contains("- destinations: Paris"));
        assert_eq!(request.messages[1].content, "I like museums");
        assert_eq!(request.messages[2].role, Role::Assistant);
        assert_eq!(request.messages[3].content, "Any ideas?");
    }

    #[tokio::test]
    async fn completion_failures_are_retried_then_reported() {
        let provider = Arc::new(FailingProvider::unavailable());
        let info = agent(AgentId::Information, provider.clone(), store());

        let err = info
            .respond("s1", "weather in Rome", &ExtractedContext::default())
            .await
            .unwrap_err();

        assert!(matches!(err, AgentError::Provider { attempts: 2, .. }));
        assert_eq!(provider.call_count(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn hung_completion_times_out_on_every_attempt() {
        let provider = Arc::new(HangingProvider::default());
        let info = TravelAgent::information(provider.clone(), registry(), store(), prompts())
            .with_settings(AgentSettings {
                call_timeout: Duration::from_secs(10),
                max_attempts: 2,
                ..fast_settings()
            });

        let start = tokio::time::Instant::now();
        let err = info
            .respond("s1", "weather in Rome", &ExtractedContext::default())
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            AgentError::Provider { attempts: 2, source: ProviderError::Timeout(_), .. }
        ));
        assert_eq!(provider.call_count(), 2);
        assert!(start.elapsed() >= Duration::from_secs(20));
    }

    #[tokio::test(start_paused = true)]
    async fn hung_tool_times_out() {
        let mut tools = ToolRegistry::new();
        tools.register(Box::new(StalledTool)).unwrap();
        let provider = Arc::new(SequentialMockProvider::new(vec![make_tool_call_response(
            vec![make_tool_call("stalled_lookup", serde_json::json!({"location": "Lima"}))],
            "",
        )]));
        let info = TravelAgent::information(provider.clone(), Arc::new(tools), store(), prompts())
            .with_tools(&["stalled_lookup"])
            .with_settings(fast_settings());

        let err = info
            .respond("s1", "Is it raining in Lima?", &ExtractedContext::default())
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            AgentError::Tool {
                agent: AgentId::Information,
                source: ToolError::Timeout { ref tool_name, .. },
            } if tool_name == "stalled_lookup"
        ));
        // No follow-up completion after the tool failed
        assert_eq!(provider.call_count(), 1);
    }

    #[tokio::test]
    async fn answering_an_open_request_resolves_it() {
        let provider = Arc::new(SequentialMockProvider::single_text(
            "Day 1: Colosseum. Day 2: Vatican. Day 3: Trastevere.",
        ));
        let planning = agent(AgentId::Planning, provider, store());
        let ctx = ExtractedContext {
            destinations: vec!["Rome".into()],
            open_planning: Some("I want an itinerary".into()),
            ..Default::default()
        };

        let response = planning.respond("s1", "sounds good, go ahead", &ctx).await.unwrap();
        assert_eq!(response.delta.planning, Some(PlanningStatus::Resolved));
    }

    #[tokio::test]
    async fn empty_text_is_an_error() {
        let provider = Arc::new(SequentialMockProvider::single_text("   "));
        let info = agent(AgentId::Information, provider, store());
        let err = info
            .respond("s1", "hello", &ExtractedContext::default())
            .await
            .unwrap_err();
        assert!(matches!(err, AgentError::EmptyResponse { agent: AgentId::Information }));
    }

    #[tokio::test]
    async fn agents_never_write_the_store() {
        let store = store();
        let provider = Arc::new(SequentialMockProvider::single_text("Hi!"));
        let info = agent(AgentId::Information, provider, store.clone());

        info.respond("s1", "hello", &ExtractedContext::default())
            .await
            .unwrap();

        assert!(store.history("s1", None).await.is_empty());
        assert_eq!(store.stats().await.sessions, 0);
    }

    #[test]
    fn itinerary_requests_are_detected() {
        assert!(requests_itinerary("Can you plan my week?"));
        assert!(requests_itinerary("An ITINERARY please"));
        assert!(!requests_itinerary("Which planet is nearest?"));
    }
}
