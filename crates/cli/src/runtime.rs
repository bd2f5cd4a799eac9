//! Wiring: builds the provider, store, tools, agents and orchestrator from
//! configuration.

use std::sync::Arc;

use roamer_agent::{
    AgentSettings, LlmPromptGenerator, Orchestrator, PromptCache, SuggestionService, TravelAgent,
};
use roamer_config::AppConfig;
use roamer_core::event::EventBus;
use roamer_core::SessionStore;
use roamer_memory::InMemorySessionStore;

pub struct Runtime {
    pub orchestrator: Orchestrator,
    /// Shared by instructions and suggestions.
    pub prompts: Arc<PromptCache>,
    pub suggestions: SuggestionService,
    pub model: String,
}

impl Runtime {
    /// Assemble every component. Makes no network calls.
    ///
    /// Without an API key, instructions and suggestions fall back to the
    /// fixed ones so offline commands still work.
    pub fn build(config: &AppConfig) -> Result<Self, Box<dyn std::error::Error>> {
        let router = roamer_providers::build_from_config(config);
        let provider = router.default().ok_or("No default provider configured")?;
        let model = roamer_providers::default_model(config);

        let store: Arc<dyn SessionStore> =
            Arc::new(InMemorySessionStore::with_max_history(config.memory.max_history));
        let registry = Arc::new(roamer_tools::default_registry()?);
        let event_bus = Arc::new(EventBus::default());

        let dynamic = config.prompts.dynamic && config.has_api_key();
        let ttl = config.prompts.cache_ttl();
        let prompts = if dynamic {
            let generator = LlmPromptGenerator::new(
                provider.clone(),
                model.clone(),
                config.agents.call_timeout(),
            );
            PromptCache::new(ttl, Arc::new(generator))
        } else {
            PromptCache::fixed(ttl)
        };
        let prompts = Arc::new(prompts.with_event_bus(event_bus.clone()));

        let settings = AgentSettings::from_config(config, model.clone());
        let information = TravelAgent::information(
            provider.clone(),
            registry.clone(),
            store.clone(),
            prompts.clone(),
        )
        .with_settings(settings.clone())
        .with_event_bus(event_bus.clone());
        let planning = TravelAgent::planning(
            provider.clone(),
            registry.clone(),
            store.clone(),
            prompts.clone(),
        )
        .with_settings(settings)
        .with_event_bus(event_bus.clone());

        let orchestrator = Orchestrator::new(store, Arc::new(information), Arc::new(planning))
            .with_event_bus(event_bus)
            .with_tools_available(registry.len());

        let suggestions = if dynamic {
            SuggestionService::new(
                provider,
                model.clone(),
                config.agents.call_timeout(),
                prompts.clone(),
            )
        } else {
            SuggestionService::fixed(prompts.clone())
        };

        tracing::debug!(
            provider = %config.default_provider,
            model = %model,
            dynamic_prompts = dynamic,
            tools = registry.len(),
            "Runtime assembled"
        );

        Ok(Self {
            orchestrator,
            prompts,
            suggestions,
            model,
        })
    }
}
