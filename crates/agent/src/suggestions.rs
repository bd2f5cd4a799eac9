//! Example prompts to show a traveller who does not know where to start.
//!
//! Suggestions are generated per category, or per traveller context, through
//! the completion service and kept in the shared [`PromptCache`]. When
//! generation fails, or produces nothing usable, a fixed list is served
//! instead.

use roamer_core::error::ProviderError;
use roamer_core::message::Message;
use roamer_core::provider::{Provider, ProviderRequest};
use roamer_core::ExtractedContext;
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, warn};

use crate::prompt_cache::{Personalization, PromptCache};

/// Parsed suggestions are capped at this many entries.
const MAX_SUGGESTIONS: usize = 20;

const FALLBACK_SUGGESTIONS: [&str; 12] = [
    "Plan a weekend getaway for two people with a moderate budget",
    "What are the best attractions in Paris for first-time visitors?",
    "Create a 7-day itinerary for Japan in spring",
    "Suggest budget-friendly accommodations in Barcelona",
    "What's the weather like in Thailand during monsoon season?",
    "Plan a family trip to Disney World for 5 days",
    "Recommend restaurants in Rome for food lovers",
    "Create a packing list for a winter trip to Iceland",
    "Suggest activities in New York City for art enthusiasts",
    "Plan a romantic getaway to Santorini for a couple",
    "What are the visa requirements for traveling to India?",
    "Create a budget estimate for a month-long backpacking trip in Europe",
];

/// Topic a batch of suggestions focuses on.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SuggestionCategory {
    #[default]
    General,
    Planning,
    Information,
    Budget,
    Accommodation,
    Activities,
}

impl SuggestionCategory {
    pub const ALL: [SuggestionCategory; 6] = [
        SuggestionCategory::General,
        SuggestionCategory::Planning,
        SuggestionCategory::Information,
        SuggestionCategory::Budget,
        SuggestionCategory::Accommodation,
        SuggestionCategory::Activities,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            SuggestionCategory::General => "general",
            SuggestionCategory::Planning => "planning",
            SuggestionCategory::Information => "information",
            SuggestionCategory::Budget => "budget",
            SuggestionCategory::Accommodation => "accommodation",
            SuggestionCategory::Activities => "activities",
        }
    }

    fn focus(&self) -> &'static str {
        match self {
            SuggestionCategory::General => {
                "diverse travel planning prompts covering itinerary planning, destination research, budget planning, and travel tips"
            }
            SuggestionCategory::Planning => {
                "travel planning prompts focused on itinerary creation, trip organization, and travel logistics"
            }
            SuggestionCategory::Information => {
                "travel information prompts about destinations, weather, attractions, and cultural insights"
            }
            SuggestionCategory::Budget => {
                "budget-focused travel prompts about cost estimation, money-saving tips, and financial planning for trips"
            }
            SuggestionCategory::Accommodation => {
                "accommodation-related travel prompts about hotels, booking, and lodging recommendations"
            }
            SuggestionCategory::Activities => {
                "activity-focused travel prompts about attractions, tours, and things to do at destinations"
            }
        }
    }

    fn cache_key(&self, count: usize) -> String {
        format!("suggestions/{}/n={count}", self.as_str())
    }
}

impl std::fmt::Display for SuggestionCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SuggestionCategory {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_lowercase();
        Self::ALL
            .into_iter()
            .find(|c| c.as_str() == wanted)
            .ok_or_else(|| format!("unknown suggestion category '{s}'"))
    }
}

/// Why a batch of suggestions could not be generated.
#[derive(Debug, Error)]
pub enum SuggestionError {
    #[error(transparent)]
    Provider(#[from] ProviderError),

    #[error("suggestion generation timed out after {0:?}")]
    Timeout(Duration),

    #[error("generated text contained no usable suggestions")]
    Unusable,
}

/// Serves example prompts per category.
pub struct SuggestionService {
    provider: Option<Arc<dyn Provider>>,
    model: String,
    timeout: Duration,
    cache: Arc<PromptCache>,
}

impl SuggestionService {
    pub fn new(
        provider: Arc<dyn Provider>,
        model: impl Into<String>,
        timeout: Duration,
        cache: Arc<PromptCache>,
    ) -> Self {
        Self {
            provider: Some(provider),
            model: model.into(),
            timeout,
            cache,
        }
    }

    /// A service that only ever serves the fixed list.
    pub fn fixed(cache: Arc<PromptCache>) -> Self {
        Self {
            provider: None,
            model: String::new(),
            timeout: Duration::ZERO,
            cache,
        }
    }

    /// Up to `count` suggestions for `category`. Never fails.
    pub async fn suggestions(&self, category: SuggestionCategory, count: usize) -> Vec<String> {
        let Some(provider) = &self.provider else {
            return fallback_suggestions(count);
        };

        let key = category.cache_key(count);
        let now = chrono::Utc::now();
        let system = format!(
            "You are a travel planning assistant. Generate {count} realistic and diverse travel planning prompts that users might ask.\n\n\
             The prompts should be practical, varied in scope and budget, mix domestic and international destinations, \
             cover different travel styles (family, solo, romantic, business, adventure) and consider that it is {}.\n\n\
             Focus on category: {category}\n\n\
             Return only a JSON array of strings, no other text.",
            now.format("%B %Y"),
        );
        let user = format!("Generate {count} {}.", category.focus());

        match self
            .cached(provider.as_ref(), &key, system, user, 0.8, 800)
            .await
        {
            Ok(list) => list.into_iter().take(count).collect(),
            Err(e) => {
                warn!(category = %category, error = %e, "Suggestion generation failed, using fixed list");
                fallback_suggestions(count)
            }
        }
    }

    /// Up to `count` suggestions tailored to what is known about a
    /// traveller. Falls back to general suggestions when nothing is known or
    /// generation fails. Never fails.
    pub async fn for_context(&self, context: &ExtractedContext, count: usize) -> Vec<String> {
        let personalization = Personalization::from_context(context);
        let Some(provider) = self.provider.as_ref().filter(|_| !personalization.is_empty()) else {
            return self.suggestions(SuggestionCategory::General, count).await;
        };

        let key = format!(
            "suggestions/contextual/{}/n={count}",
            personalization.key_fragment()
        );
        let system = format!(
            "Generate {count} personalized travel prompts based on the user's preferences: {}\n\n\
             The prompts should be relevant to their interests and preferences. Return only a JSON array of strings.",
            personalization.describe(),
        );
        let user = format!("Create {count} travel prompts that match my preferences.");

        match self
            .cached(provider.as_ref(), &key, system, user, 0.7, 400)
            .await
        {
            Ok(list) => list.into_iter().take(count).collect(),
            Err(e) => {
                warn!(error = %e, "Contextual suggestion generation failed, using general list");
                self.suggestions(SuggestionCategory::General, count).await
            }
        }
    }

    /// The cached list under `key`, generating it on a miss.
    async fn cached(
        &self,
        provider: &dyn Provider,
        key: &str,
        system: String,
        user: String,
        temperature: f32,
        max_tokens: u32,
    ) -> Result<Vec<String>, SuggestionError> {
        let stored = self
            .cache
            .get_or_generate(key, || {
                self.generate(provider, key, system, user, temperature, max_tokens)
            })
            .await?;
        let parsed: Vec<String> = serde_json::from_str(&stored).unwrap_or_default();
        if parsed.is_empty() {
            return Err(SuggestionError::Unusable);
        }
        Ok(parsed)
    }

    /// Generate, parse, and return the suggestions as a JSON array string
    /// ready for caching.
    async fn generate(
        &self,
        provider: &dyn Provider,
        key: &str,
        system: String,
        user: String,
        temperature: f32,
        max_tokens: u32,
    ) -> Result<String, SuggestionError> {
        let mut request = ProviderRequest::new(
            &self.model,
            vec![Message::system(system), Message::user(user)],
        );
        request.temperature = temperature;
        request.max_tokens = Some(max_tokens);

        let response = tokio::time::timeout(self.timeout, provider.complete(request))
            .await
            .map_err(|_| SuggestionError::Timeout(self.timeout))??;

        let parsed = parse_suggestions(&response.message.content);
        debug!(cache_key = key, parsed = parsed.len(), "Suggestions generated");
        if parsed.is_empty() {
            return Err(SuggestionError::Unusable);
        }
        serde_json::to_string(&parsed).map_err(|_| SuggestionError::Unusable)
    }
}

/// The first `count` entries of the fixed list.
pub fn fallback_suggestions(count: usize) -> Vec<String> {
    FALLBACK_SUGGESTIONS
        .iter()
        .take(count)
        .map(|s| s.to_string())
        .collect()
}

/// Read suggestions out of generated text: a JSON array of strings, or
/// failing that one suggestion per line with numbering, bullets and quotes
/// stripped. Short lines are dropped, duplicates removed.
pub fn parse_suggestions(text: &str) -> Vec<String> {
    let text = text.trim();
    let candidates: Vec<String> = match serde_json::from_str::<Vec<String>>(text) {
        Ok(items) => items,
        Err(_) => text.lines().map(clean_line).collect(),
    };

    let mut out: Vec<String> = Vec::new();
    for item in candidates {
        let item = item.trim();
        if item.chars().count() <= 10 || out.iter().any(|seen| seen.eq_ignore_ascii_case(item)) {
            continue;
        }
        out.push(item.to_string());
        if out.len() == MAX_SUGGESTIONS {
            break;
        }
    }
    out
}

fn clean_line(line: &str) -> String {
    line.trim()
        .trim_start_matches(|c: char| c.is_ascii_digit() || matches!(c, '.' | ')' | '-' | '*' | ' ' | '"' | '\''))
        .trim_end_matches(['"', '\'', ','])
        .to_string()
}
