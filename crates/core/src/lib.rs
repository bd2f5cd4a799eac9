//! # Roamer Core
//!
//! Domain types, traits, and error definitions for the Roamer travel agent
//! router. This crate has **no framework dependencies**: it defines the
//! domain model that every other crate implements against.
//!
//! ## Design Philosophy
//!
//! Every external boundary is a trait here: the completion service
//! ([`Provider`]), the tools ([`Tool`]), the session memory
//! ([`SessionStore`]). Implementations live in their own crates, which keeps
//! the dependency graph pointing inward and makes every seam mockable.

pub mod agent;
pub mod context;
pub mod error;
pub mod event;
pub mod message;
pub mod provider;
pub mod session;
pub mod tool;

// Re-export key types at crate root for ergonomics
pub use agent::AgentId;
pub use context::{BudgetLevel, ContextDelta, ExtractedContext, PlanningStatus};
pub use error::{ProviderError, ToolError};
pub use event::{DomainEvent, EventBus};
pub use message::{Message, MessageToolCall, Role};
pub use provider::{Provider, ProviderRequest, ProviderResponse, ToolDefinition};
pub use session::{SessionStats, SessionStore, Turn, TurnRole};
pub use tool::{ParamSpec, ParamType, Tool, ToolCall, ToolRegistry, ToolResult, ToolSpec};
