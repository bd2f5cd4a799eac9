//! Shared test helpers for agent and orchestrator tests.

use async_trait::async_trait;
use roamer_core::error::ProviderError;
use roamer_core::message::{Message, MessageToolCall};
use roamer_core::error::ToolError;
use roamer_core::provider::{Provider, ProviderRequest, ProviderResponse, Usage};
use roamer_core::tool::{ParamType, Tool, ToolResult, ToolSpec};
use roamer_core::{AgentId, ContextDelta, ExtractedContext};
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use crate::error::AgentError;
use crate::responder::{AgentResponse, Responder};

/// A mock provider that returns a sequence of scripted responses.
///
/// Each call to `complete` returns the next response in the queue and
/// records the request. Panics if more calls are made than responses
/// provided.
pub struct SequentialMockProvider {
    responses: Mutex<Vec<ProviderResponse>>,
    requests: Mutex<Vec<ProviderRequest>>,
}

impl SequentialMockProvider {
    pub fn new(responses: Vec<ProviderResponse>) -> Self {
        Self {
            responses: Mutex::new(responses),
            requests: Mutex::new(Vec::new()),
        }
    }

    /// Create a provider that returns a single text response (no tool calls).
    pub fn single_text(text: &str) -> Self {
        Self::new(vec![make_text_response(text)])
    }

    /// Create a provider that first returns tool calls, then a final answer.
    pub fn tool_then_answer(tool_calls: Vec<MessageToolCall>, thought: &str, answer: &str) -> Self {
        Self::new(vec![
            make_tool_call_response(tool_calls, thought),
            make_text_response(answer),
        ])
    }

    pub fn call_count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }

    /// Every request received so far, in order.
    pub fn requests(&self) -> Vec<ProviderRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl Provider for SequentialMockProvider {
    fn name(&self) -> &str {
        "sequential_mock"
    }

    async fn complete(&self, request: ProviderRequest) -> Result<ProviderResponse, ProviderError> {
        let mut requests = self.requests.lock().unwrap();
        let responses = self.responses.lock().unwrap();
        let call = requests.len();

        if call >= responses.len() {
            panic!(
                "SequentialMockProvider: no more responses (call #{}, have {})",
                call,
                responses.len()
            );
        }

        requests.push(request);
        Ok(responses[call].clone())
    }
}

/// A provider whose every call fails with the same error.
pub struct FailingProvider {
    error: ProviderError,
    calls: Mutex<usize>,
}

impl FailingProvider {
    pub fn new(error: ProviderError) -> Self {
        Self {
            error,
            calls: Mutex::new(0),
        }
    }

    pub fn unavailable() -> Self {
        Self::new(ProviderError::ServiceUnavailable("mock outage".into()))
    }

    pub fn call_count(&self) -> usize {
        *self.calls.lock().unwrap()
    }
}

#[async_trait]
impl Provider for FailingProvider {
    fn name(&self) -> &str {
        "failing_mock"
    }

    async fn complete(&self, _request: ProviderRequest) -> Result<ProviderResponse, ProviderError> {
        *self.calls.lock().unwrap() += 1;
        Err(self.error.clone())
    }
}

/// A provider that never answers. Counts calls.
#[derive(Default)]
pub struct HangingProvider {
    calls: AtomicUsize,
}

impl HangingProvider {
    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Provider for HangingProvider {
    fn name(&self) -> &str {
        "hanging_mock"
    }

    async fn complete(&self, _request: ProviderRequest) -> Result<ProviderResponse, ProviderError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        std::future::pending().await
    }
}

/// A tool named `stalled_lookup` whose execution never finishes.
pub struct StalledTool;

#[async_trait]
impl Tool for StalledTool {
    fn spec(&self) -> ToolSpec {
        ToolSpec::new("stalled_lookup", "Looks something up, eventually")
            .required("location", ParamType::String, "Where to look")
    }

    async fn execute(&self, _arguments: serde_json::Value) -> Result<ToolResult, ToolError> {
        std::future::pending().await
    }
}

/// A responder that returns a scripted result and records the effective
/// context of every call.
pub struct ScriptedResponder {
    id: AgentId,
    result: Result<(String, ContextDelta), AgentError>,
    seen: Mutex<Vec<ExtractedContext>>,
}

impl ScriptedResponder {
    pub fn replying(id: AgentId, text: &str, delta: ContextDelta) -> Self {
        Self {
            id,
            result: Ok((text.to_string(), delta)),
            seen: Mutex::new(Vec::new()),
        }
    }

    pub fn failing(id: AgentId) -> Self {
        Self {
            id,
            result: Err(AgentError::Provider {
                agent: id,
                attempts: 2,
                source: ProviderError::ServiceUnavailable("mock outage".into()),
            }),
            seen: Mutex::new(Vec::new()),
        }
    }

    /// Effective contexts passed to `respond`, in call order.
    pub fn seen(&self) -> Vec<ExtractedContext> {
        self.seen.lock().unwrap().clone()
    }
}

#[async_trait]
impl Responder for ScriptedResponder {
    fn id(&self) -> AgentId {
        self.id
    }

    fn tool_names(&self) -> &[&'static str] {
        &[]
    }

    fn capabilities(&self) -> &[&'static str] {
        &["scripted replies"]
    }

    async fn respond(
        &self,
        _session_id: &str,
        _utterance: &str,
        context: &ExtractedContext,
    ) -> Result<AgentResponse, AgentError> {
        self.seen.lock().unwrap().push(context.clone());
        let (text, delta) = self.result.clone()?;
        Ok(AgentResponse {
            agent: self.id,
            text,
            tool_outputs: Vec::new(),
            delta,
        })
    }
}

/// Create a simple text response (no tool calls).
pub fn make_text_response(text: &str) -> ProviderResponse {
    ProviderResponse {
        message: Message::assistant(text),
        usage: Some(Usage {
            prompt_tokens: 10,
            completion_tokens: 5,
            total_tokens: 15,
        }),
        model: "mock-model".into(),
    }
}

/// Create a response with tool calls and optional thought content.
pub fn make_tool_call_response(tool_calls: Vec<MessageToolCall>, thought: &str) -> ProviderResponse {
    let mut msg = Message::assistant(thought);
    msg.tool_calls = tool_calls;
    ProviderResponse {
        message: msg,
        usage: Some(Usage {
            prompt_tokens: 10,
            completion_tokens: 5,
            total_tokens: 15,
        }),
        model: "mock-model".into(),
    }
}

/// Helper to create a tool call.
pub fn make_tool_call(name: &str, args: serde_json::Value) -> MessageToolCall {
    MessageToolCall {
        id: format!("call_{}", name),
        name: name.to_string(),
        arguments: serde_json::to_string(&args).unwrap(),
    }
}
