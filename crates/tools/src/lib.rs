//! Built-in travel tools for Roamer.
//!
//! Every tool is a deterministic, read-only stand-in for an external data
//! source (weather service, attraction catalogue, exchange rates). Agents
//! reach them only through the [`ToolRegistry`], which validates arguments
//! against each tool's spec before execution.

pub mod attractions_search;
pub mod build_itinerary;
pub mod currency_info;
pub mod destination_info;
pub mod estimate_budget;
pub mod packing_list;
pub mod places;
pub mod suggest_accommodations;
pub mod travel_tips;
pub mod weather_lookup;

mod support;

use roamer_core::error::ToolError;
use roamer_core::tool::ToolRegistry;

/// Tools the information agent may call.
pub const INFORMATION_TOOLS: &[&str] = &[
    "destination_info",
    "weather_lookup",
    "attractions_search",
    "travel_tips",
    "currency_info",
];

/// Tools the planning agent may call.
pub const PLANNING_TOOLS: &[&str] = &[
    "build_itinerary",
    "suggest_accommodations",
    "estimate_budget",
    "packing_list",
];

/// Create a registry with all built-in travel tools.
pub fn default_registry() -> Result<ToolRegistry, ToolError> {
    let mut registry = ToolRegistry::new();
    registry.register(Box::new(destination_info::DestinationInfoTool))?;
    registry.register(Box::new(weather_lookup::WeatherLookupTool))?;
    registry.register(Box::new(attractions_search::AttractionsSearchTool))?;
    registry.register(Box::new(travel_tips::TravelTipsTool))?;
    registry.register(Box::new(currency_info::CurrencyInfoTool))?;
    registry.register(Box::new(build_itinerary::BuildItineraryTool))?;
    registry.register(Box::new(suggest_accommodations::SuggestAccommodationsTool))?;
    registry.register(Box::new(estimate_budget::EstimateBudgetTool))?;
    registry.register(Box::new(packing_list::PackingListTool))?;
    Ok(registry)
}

#[cfg(test)]
mod tests {
    use super::*;
    use roamer_core::tool::ToolCall;

    #[test]
    fn registry_holds_every_scoped_tool() {
        let registry = default_registry().unwrap();
        assert_eq!(registry.len(), INFORMATION_TOOLS.len() + PLANNING_TOOLS.len());
        let all: Vec<&str> = INFORMATION_TOOLS.iter().chain(PLANNING_TOOLS).copied().collect();
        assert_eq!(registry.definitions_for(&all).len(), all.len());
    }

    #[test]
    fn scopes_are_disjoint() {
        assert!(INFORMATION_TOOLS.iter().all(|t| !PLANNING_TOOLS.contains(t)));
    }

    #[tokio::test]
    async fn registry_validates_before_execution() {
        let registry = default_registry().unwrap();
        let err = registry
            .invoke("estimate_budget", serde_json::json!({"destination": "Paris", "travelers": "two"}))
            .await
            .unwrap_err();
        assert!(matches!(err, ToolError::InvalidArguments { .. }));
    }

    #[tokio::test]
    async fn planning_scope_cannot_reach_weather() {
        let registry = default_registry().unwrap();
        let call = ToolCall {
            id: "call_1".into(),
            name: "weather_lookup".into(),
            arguments: serde_json::json!({"location": "Paris"}),
        };
        let err = registry
            .invoke_scoped("planning", PLANNING_TOOLS, &call)
            .await
            .unwrap_err();
        assert!(matches!(err, ToolError::ScopeViolation { .. }));
    }
}
