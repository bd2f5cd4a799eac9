//! Time-bounded cache of generated agent instructions.
//!
//! Instructions are generated per agent and personalization (budget tier,
//! interests, destinations, preferences) and reused for the configured TTL. Generation
//! failures never surface: the cache hands back the agent's fixed
//! instructions instead and does not store them, so the next request tries
//! again.
//!
//! Entries are shared across sessions behind an `RwLock`. Concurrent misses
//! for one key may both regenerate; the last write wins.

use async_trait::async_trait;
use chrono::Utc;
use roamer_core::event::{DomainEvent, EventBus};
use roamer_core::message::Message;
use roamer_core::provider::{Provider, ProviderRequest};
use roamer_core::{AgentId, BudgetLevel, ExtractedContext};
use std::collections::{BTreeMap, HashMap};
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;
use tokio::time::Instant;
use tracing::{debug, info, warn};

use crate::error::AgentError;

/// The slice of context that shapes an agent's instructions.
///
/// Canonical: interests, destinations and preference values are lowercased
/// and sorted, so equivalent contexts share a cache entry.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct Personalization {
    pub budget_level: Option<BudgetLevel>,
    pub interests: Vec<String>,
    pub destinations: Vec<String>,
    pub preferences: BTreeMap<String, String>,
}

impl Personalization {
    pub fn from_context(context: &ExtractedContext) -> Self {
        let canonical = |items: &[String]| {
            let mut out: Vec<String> = items.iter().map(|s| s.trim().to_lowercase()).collect();
            out.sort();
            out.dedup();
            out
        };
        Self {
            budget_level: context.budget_level,
            interests: canonical(&context.interests),
            destinations: canonical(&context.destinations),
            preferences: context
                .preferences
                .iter()
                .map(|(k, v)| (k.trim().to_lowercase(), v.trim().to_lowercase()))
                .collect(),
        }
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// Cache key for `agent` under this personalization.
    pub fn cache_key(&self, agent: AgentId) -> String {
        format!("instructions/{agent}/{}", self.key_fragment())
    }

    /// The personalization part of a cache key.
    pub(crate) fn key_fragment(&self) -> String {
        let preferences: Vec<String> = self
            .preferences
            .iter()
            .map(|(k, v)| format!("{k}:{v}"))
            .collect();
        format!(
            "budget={}/interests={}/destinations={}/preferences={}",
            self.budget_level.map(|b| b.as_str()).unwrap_or("-"),
            self.interests.join(","),
            self.destinations.join(","),
            preferences.join(","),
        )
    }

    /// A one-paragraph description used when asking for instructions.
    pub fn describe(&self) -> String {
        let mut parts = Vec::new();
        if let Some(level) = self.budget_level {
            parts.push(format!("Budget level: {level}."));
        }
        if !self.interests.is_empty() {
            parts.push(format!("Interests: {}.", self.interests.join(", ")));
        }
        if !self.destinations.is_empty() {
            parts.push(format!("Destinations: {}.", self.destinations.join(", ")));
        }
        for (key, value) in &self.preferences {
            parts.push(format!("{}: {value}.", key.replace('_', " ")));
        }
        if parts.is_empty() {
            "No traveller preferences are known yet.".to_string()
        } else {
            parts.join(" ")
        }
    }
}

/// Produces agent instructions. Called only on a cache miss or expiry.
#[async_trait]
pub trait PromptGenerator: Send + Sync {
    async fn generate(
        &self,
        agent: AgentId,
        personalization: &Personalization,
    ) -> Result<String, AgentError>;
}

/// The fixed instructions for an agent, used whenever generation is off or
/// fails.
pub fn fallback_instructions(agent: AgentId) -> &'static str {
    match agent {
        AgentId::Information => {
            "You are an expert travel information agent specialised in destination details, weather and cultural insight.\n\n\
             Your capabilities include:\n\
             - Detailed destination information and cultural context\n\
             - Current weather conditions and forecasts\n\
             - Attractions, activities and points of interest\n\
             - Practical travel tips and local customs\n\
             - Currency and payment information\n\n\
             When responding, be informative yet concise, give practical and actionable advice, \
             keep safety and cultural sensitivity in mind, and structure your answer clearly."
        }
        AgentId::Planning => {
            "You are an expert travel planning agent specialised in itineraries, accommodation and complete trip plans.\n\n\
             Your capabilities include:\n\
             - Detailed day-by-day itineraries\n\
             - Accommodation suggestions for a preference and budget\n\
             - Travel budget and cost estimates\n\
             - Personalised packing lists\n\n\
             When responding, produce structured, easy-to-follow plans, respect budget constraints, \
             give realistic time estimates, and include practical recommendations."
        }
    }
}

/// Capability lines advertised for each agent.
pub fn capabilities(agent: AgentId) -> &'static [&'static str] {
    match agent {
        AgentId::Information => &[
            "Get destination information and cultural context",
            "Check weather conditions and forecasts",
            "Find attractions, activities, and points of interest",
            "Provide travel tips and local customs advice",
            "Currency and payment information",
        ],
        AgentId::Planning => &[
            "Create detailed day-by-day itineraries",
            "Suggest accommodations based on preferences",
            "Estimate travel budgets and costs",
            "Generate personalized packing lists",
        ],
    }
}

#[derive(Debug, Clone)]
struct CacheEntry {
    text: String,
    created_at: Instant,
}

/// Shared TTL cache for generated text.
pub struct PromptCache {
    ttl: Duration,
    entries: RwLock<HashMap<String, CacheEntry>>,
    generator: Option<Arc<dyn PromptGenerator>>,
    event_bus: Option<Arc<EventBus>>,
}

impl PromptCache {
    /// A cache that generates instructions through `generator`.
    pub fn new(ttl: Duration, generator: Arc<dyn PromptGenerator>) -> Self {
        Self {
            ttl,
            entries: RwLock::new(HashMap::new()),
            generator: Some(generator),
            event_bus: None,
        }
    }

    /// A cache that always serves the fixed instructions.
    pub fn fixed(ttl: Duration) -> Self {
        Self {
            ttl,
            entries: RwLock::new(HashMap::new()),
            generator: None,
            event_bus: None,
        }
    }

    pub fn with_event_bus(mut self, bus: Arc<EventBus>) -> Self {
        self.event_bus = Some(bus);
        self
    }

    /// Instructions for `agent` under `personalization`.
    pub async fn instructions(&self, agent: AgentId, personalization: &Personalization) -> String {
        let Some(generator) = &self.generator else {
            return fallback_instructions(agent).to_string();
        };

        let key = personalization.cache_key(agent);
        match self
            .get_or_generate(&key, || generator.generate(agent, personalization))
            .await
        {
            Ok(text) => text,
            Err(e) => {
                warn!(agent = %agent, error = %e, "Instruction generation failed, using fixed instructions");
                self.publish(&key, true);
                fallback_instructions(agent).to_string()
            }
        }
    }

    /// Return the live entry for `key`, or run `generate` and store its
    /// output. Errors are passed through and nothing is stored.
    pub async fn get_or_generate<F, Fut, E>(&self, key: &str, generate: F) -> Result<String, E>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<String, E>>,
    {
        if let Some(text) = self.lookup(key).await {
            debug!(cache_key = key, "Prompt cache hit");
            return Ok(text);
        }

        let text = generate().await?;
        self.entries.write().await.insert(
            key.to_string(),
            CacheEntry {
                text: text.clone(),
                created_at: Instant::now(),
            },
        );
        info!(cache_key = key, "Prompt regenerated");
        self.publish(key, false);
        Ok(text)
    }

    async fn lookup(&self, key: &str) -> Option<String> {
        let entries = self.entries.read().await;
        entries
            .get(key)
            .filter(|entry| entry.created_at.elapsed() < self.ttl)
            .map(|entry| entry.text.clone())
    }

    /// Drop every entry so the next request regenerates. Returns how many
    /// entries were dropped.
    pub async fn clear(&self) -> usize {
        let mut entries = self.entries.write().await;
        let dropped = entries.len();
        entries.clear();
        info!(dropped, "Prompt cache cleared");
        dropped
    }

    fn publish(&self, key: &str, used_fallback: bool) {
        if let Some(bus) = &self.event_bus {
            bus.publish(DomainEvent::PromptRegenerated {
                cache_key: key.to_string(),
                used_fallback,
                timestamp: Utc::now(),
            });
        }
    }
}

/// Generates instructions through the completion service.
pub struct LlmPromptGenerator {
    provider: Arc<dyn Provider>,
    model: String,
    timeout: Duration,
}

impl LlmPromptGenerator {
    pub fn new(provider: Arc<dyn Provider>, model: impl Into<String>, timeout: Duration) -> Self {
        Self {
            provider,
            model: model.into(),
            timeout,
        }
    }
}

#[async_trait]
impl PromptGenerator for LlmPromptGenerator {
    async fn generate(
        &self,
        agent: AgentId,
        personalization: &Personalization,
    ) -> Result<String, AgentError> {
        let brief = format!(
            "Write the system instructions for the {} of a travel assistant.\n\
             Its capabilities:\n- {}\n\n\
             Traveller profile: {}\n\n\
             Return only the instructions, addressed to the agent in the second person.",
            agent.display_name(),
            capabilities(agent).join("\n- "),
            personalization.describe(),
        );
        let mut request = ProviderRequest::new(
            &self.model,
            vec![
                Message::system("You write concise, well-structured system prompts for AI travel agents."),
                Message::user(brief),
            ],
        );
        request.temperature = 0.7;
        request.max_tokens = Some(500);

        let response = tokio::time::timeout(self.timeout, self.provider.complete(request))
            .await
            .map_err(|_| AgentError::Provider {
                agent,
                attempts: 1,
                source: roamer_core::error::ProviderError::Timeout(format!(
                    "instruction generation exceeded {:?}",
                    self.timeout
                )),
            })?
            .map_err(|source| AgentError::Provider {
                agent,
                attempts: 1,
                source,
            })?;

        let text = response.message.content.trim().to_string();
        if text.is_empty() {
            return Err(AgentError::EmptyResponse { agent });
        }
        Ok(text)
    }
}
