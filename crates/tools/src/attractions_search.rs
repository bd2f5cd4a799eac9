//! Attraction search, optionally filtered by traveller interests.

use async_trait::async_trait;
use roamer_core::error::ToolError;
use roamer_core::tool::{ParamType, Tool, ToolResult, ToolSpec};
use serde::Serialize;
use serde_json::json;

use crate::support::{required_str, string_list};

pub struct AttractionsSearchTool;

#[derive(Debug, Clone, Serialize)]
struct Attraction {
    name: String,
    kind: &'static str,
    category: &'static str,
    rating: f32,
    description: &'static str,
    estimated_time: &'static str,
    cost: &'static str,
}

const CATALOGUE: [(&str, &str, &str, f32, &str, &str, &str); 7] = [
    ("Historic City Center", "Historical", "history", 4.5, "Historic architecture and cultural sites dating back centuries", "2-3 hours", "Free"),
    ("National Art Museum", "Cultural", "art", 4.3, "Local and international art spanning multiple centuries, museum highlights included", "2-3 hours", "$15-25 per person"),
    ("Scenic Viewpoint", "Nature", "nature", 4.7, "Panoramic views of the city and surrounding landscape, perfect for sunset", "1-2 hours", "Free"),
    ("Central Food Market", "Culinary", "food", 4.4, "Bustling market with authentic street food and local delicacies", "1-2 hours", "$10-30 per meal"),
    ("Adventure Park", "Recreation", "adventure", 4.2, "Outdoor activities including hiking trails and zip-lining", "Half day", "$30-50 per person"),
    ("Local Cultural Center", "Cultural", "culture", 4.1, "Local traditions, customs and cultural heritage", "1-2 hours", "$8-15 per person"),
    ("Old Town Night Quarter", "Entertainment", "nightlife", 4.0, "Bars, live music and late-night shopping streets", "Evening", "Varies"),
];

fn catalogue(destination: &str) -> Vec<Attraction> {
    CATALOGUE
        .iter()
        .map(|&(name, kind, category, rating, description, estimated_time, cost)| Attraction {
            name: format!("{destination} {name}"),
            kind,
            category,
            rating,
            description,
            estimated_time,
            cost,
        })
        .collect()
}

fn matches_interest(attraction: &Attraction, interest: &str) -> bool {
    attraction.category.contains(interest)
        || attraction.kind.to_lowercase().contains(interest)
        || attraction.description.to_lowercase().contains(interest)
}

#[async_trait]
impl Tool for AttractionsSearchTool {
    fn spec(&self) -> ToolSpec {
        ToolSpec::new(
            "attractions_search",
            "Search for attractions and things to do at a destination, optionally filtered by interests such as history, art, food or nature.",
        )
        .required("destination", ParamType::String, "City to search")
        .optional("interests", ParamType::StringList, "Interests to filter by")
    }

    async fn execute(&self, arguments: serde_json::Value) -> Result<ToolResult, ToolError> {
        let destination = required_str("attractions_search", &arguments, "destination")?;
        let interests = string_list(&arguments, "interests");

        let all = catalogue(destination);
        let mut categories: Vec<&str> = all.iter().map(|a| a.category).collect();
        categories.sort_unstable();

        let found: Vec<Attraction> = if interests.is_empty() {
            all
        } else {
            all.into_iter()
                .filter(|a| interests.iter().any(|i| matches_interest(a, i)))
                .collect()
        };

        Ok(ToolResult::structured(json!({
            "destination": destination,
            "interests_filter": interests,
            "total_found": found.len(),
            "attractions": found,
            "categories_available": categories,
            "planning_tips": [
                "Book tickets in advance for popular attractions",
                "Check opening hours before visiting",
                "Consider a city pass for discounts",
                "Group nearby attractions for efficient touring"
            ],
        })))
    }
}
