//! Failures an agent can report to the orchestrator.

use roamer_core::AgentId;
use roamer_core::error::{ProviderError, ToolError};
use thiserror::Error;

/// Why an agent could not produce a response.
///
/// The orchestrator turns every variant into a degraded turn; none of them
/// reach the caller as an error.
#[derive(Debug, Clone, Error)]
pub enum AgentError {
    #[error("{agent}: completion failed after {attempts} attempt(s): {source}")]
    Provider {
        agent: AgentId,
        attempts: u32,
        #[source]
        source: ProviderError,
    },

    #[error("{agent}: tool call could not be completed: {source}")]
    Tool {
        agent: AgentId,
        #[source]
        source: ToolError,
    },

    #[error("{agent}: completion service returned no text")]
    EmptyResponse { agent: AgentId },
}

impl AgentError {
    /// The agent that failed.
    pub fn agent(&self) -> AgentId {
        match self {
            AgentError::Provider { agent, .. }
            | AgentError::Tool { agent, .. }
            | AgentError::EmptyResponse { agent } => *agent,
        }
    }
}
