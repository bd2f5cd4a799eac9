//! The responder seam between the orchestrator and the agents.

use async_trait::async_trait;
use roamer_core::{AgentId, ContextDelta, ExtractedContext};
use serde::{Deserialize, Serialize};

use crate::error::AgentError;

/// One tool call an agent made while answering.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolOutput {
    pub tool: String,
    pub arguments: serde_json::Value,
    /// What the completion service was shown: the tool output, or the error.
    pub output: String,
    pub success: bool,
}

/// What an agent produced for one utterance.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentResponse {
    pub agent: AgentId,
    pub text: String,
    pub tool_outputs: Vec<ToolOutput>,
    /// Facts inferred from the utterance and the tool calls.
    pub delta: ContextDelta,
}

/// A handler bound to instructions and a subset of tools.
///
/// Responders read session memory but never write it; the orchestrator
/// records turns and merges deltas once the whole turn resolves.
#[async_trait]
pub trait Responder: Send + Sync {
    fn id(&self) -> AgentId;

    /// The only tools this responder may call.
    fn tool_names(&self) -> &[&'static str];

    /// What this responder can help with, for display.
    fn capabilities(&self) -> &[&'static str];

    /// Answer `utterance` given the effective context for this call.
    async fn respond(
        &self,
        session_id: &str,
        utterance: &str,
        context: &ExtractedContext,
    ) -> Result<AgentResponse, AgentError>;
}
