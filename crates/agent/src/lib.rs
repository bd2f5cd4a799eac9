//! Request routing for Roamer: the heart of the travel assistant.
//!
//! A turn flows through four pieces:
//!
//! 1. the **classifier** decides which agents an utterance needs;
//! 2. each **travel agent** asks the completion service for an answer,
//!    calling its own subset of tools along the way;
//! 3. the **prompt cache** supplies each agent's (personalized) instructions;
//! 4. the **orchestrator** runs the agents in order, records the turn, and
//!    composes one reply.
//!
//! Context extraction and example-prompt suggestions sit alongside.

pub mod classifier;
pub mod error;
pub mod extract;
pub mod orchestrator;
pub mod prompt_cache;
pub mod responder;
pub mod suggestions;
pub mod travel_agent;

#[cfg(test)]
pub(crate) mod test_helpers;

pub use classifier::{Classification, Route, RouteReason, classify};
pub use error::AgentError;
pub use orchestrator::{
    AgentCapabilities, Orchestrator, SECTION_BOUNDARY, SystemStatus, TurnOutcome, TurnState,
    TurnStatus,
};
pub use prompt_cache::{LlmPromptGenerator, Personalization, PromptCache, PromptGenerator};
pub use responder::{AgentResponse, Responder, ToolOutput};
pub use suggestions::{SuggestionCategory, SuggestionService};
pub use travel_agent::{AgentSettings, TravelAgent};
