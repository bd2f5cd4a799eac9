//! `roamer suggest`: Example prompts to get started.

use roamer_agent::SuggestionCategory;
use roamer_config::AppConfig;

use crate::runtime::Runtime;

pub async fn run(category: &str, count: Option<usize>) -> Result<(), Box<dyn std::error::Error>> {
    let category: SuggestionCategory = category.parse()?;
    let config = AppConfig::load().map_err(|e| format!("Failed to load config: {e}"))?;
    let count = count.unwrap_or(config.prompts.suggestion_count).max(1);
    let runtime = Runtime::build(&config)?;

    let suggestions = runtime.suggestions.suggestions(category, count).await;

    println!("Try asking ({category}):");
    for (i, suggestion) in suggestions.iter().enumerate() {
        println!("  {}. {suggestion}", i + 1);
    }
    Ok(())
}
