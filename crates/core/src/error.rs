//! Error types for the Roamer domain.
//!
//! Uses `thiserror` for ergonomic error definitions.
//! Each bounded context has its own error enum; crates that compose them
//! (`roamer-agent`, `roamer-config`) define their own on top.

use thiserror::Error;

// --- Bounded context errors ---

/// Failures surfaced by the completion service boundary.
///
/// The agent layer treats every variant the same way: bounded retry, then
/// degrade. They are kept distinct for logging.
#[derive(Debug, Clone, Error)]
pub enum ProviderError {
    #[error("Completion service unavailable: {0}")]
    ServiceUnavailable(String),

    #[error("Rate limited by provider, retry after {retry_after_secs}s")]
    RateLimited { retry_after_secs: u64 },

    #[error("Request timed out: {0}")]
    Timeout(String),

    #[error("API request failed: {message} (status: {status_code})")]
    ApiError { status_code: u16, message: String },

    #[error("Authentication failed: {0}")]
    AuthenticationFailed(String),

    #[error("Provider not configured: {0}")]
    NotConfigured(String),

    #[error("Network error: {0}")]
    Network(String),
}

#[derive(Debug, Clone, Error)]
pub enum ToolError {
    #[error("Tool already registered: {0}")]
    Duplicate(String),

    #[error("Tool not found: {0}")]
    Unknown(String),

    #[error("Invalid arguments for {tool_name}: {reason}")]
    InvalidArguments { tool_name: String, reason: String },

    #[error("Tool {tool_name} is outside the scope of agent {agent}")]
    ScopeViolation { agent: String, tool_name: String },

    #[error("Invalid tool spec for {tool_name}: {reason}")]
    InvalidSpec { tool_name: String, reason: String },

    #[error("Tool execution failed: {tool_name}: {reason}")]
    ExecutionFailed { tool_name: String, reason: String },

    #[error("Tool timed out: {tool_name} after {timeout_ms}ms")]
    Timeout { tool_name: String, timeout_ms: u64 },
}

impl ToolError {
    /// Whether the error comes from a malformed or disallowed tool call
    /// (as opposed to a failure inside the tool itself).
    pub fn is_call_rejection(&self) -> bool {
        matches!(
            self,
            ToolError::Unknown(_) | ToolError::InvalidArguments { .. } | ToolError::ScopeViolation { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn provider_error_displays_correctly() {
        let err = ProviderError::ApiError {
            status_code: 503,
            message: "upstream overloaded".into(),
        };
        assert!(err.to_string().contains("503"));
        assert!(err.to_string().contains("upstream overloaded"));
    }

    #[test]
    fn scope_violation_names_agent_and_tool() {
        let err = ToolError::ScopeViolation {
            agent: "information".into(),
            tool_name: "build_itinerary".into(),
        };
        assert!(err.to_string().contains("information"));
        assert!(err.to_string().contains("build_itinerary"));
    }

    #[test]
    fn call_rejections_are_classified() {
        assert!(ToolError::Unknown("x".into()).is_call_rejection());
        assert!(
            ToolError::ScopeViolation { agent: "a".into(), tool_name: "b".into() }
                .is_call_rejection()
        );
        assert!(
            !ToolError::ExecutionFailed { tool_name: "t".into(), reason: "boom".into() }
                .is_call_rejection()
        );
    }
}
