//! Packing list generator, shaped by trip length, season and activities.

use async_trait::async_trait;
use roamer_core::error::ToolError;
use roamer_core::tool::{ParamType, Tool, ToolResult, ToolSpec};
use serde_json::json;

use crate::support::{count, optional_str, required_str, string_list};

pub struct PackingListTool;

const DOCUMENTS: &[&str] = &[
    "Passport (valid for 6+ months)",
    "Visa (if required)",
    "Travel insurance documents",
    "Flight tickets and hotel confirmations",
    "Copies of important documents (stored separately)",
];

const HEALTH: &[&str] = &[
    "Prescription medications",
    "Basic first aid kit",
    "Toiletries (travel size)",
    "Sunscreen (SPF 30+)",
    "Hand sanitizer",
];

const ELECTRONICS: &[&str] = &[
    "Phone and charger",
    "Portable battery pack",
    "Universal power adapter",
];

fn season_items(season: &str) -> &'static [&'static str] {
    match season {
        "winter" => &["Heavy winter coat", "Warm hat and gloves", "Thermal underwear", "Waterproof boots"],
        "summer" => &["Sun hat", "Sunglasses", "Light, breathable clothing", "Swimwear"],
        "fall" | "autumn" => &["Warm layers", "Medium weight jacket", "Rain protection"],
        _ => &["Light rain jacket", "Layers for temperature changes", "Compact umbrella"],
    }
}

const ACTIVITY_ITEMS: [(&[&str], &[&str]); 4] = [
    (&["hiking", "walking", "trek", "nature", "adventure"], &["Sturdy hiking boots", "Moisture-wicking clothing", "Daypack", "Quick-dry towel"]),
    (&["swimming", "beach", "water"], &["Swimwear (2 sets)", "Beach towel", "Waterproof bag", "Flip-flops"]),
    (&["business", "meeting", "conference"], &["Business attire", "Laptop and charger", "Business cards"]),
    (&["formal", "dinner", "theater", "nightlife"], &["Formal wear", "Dress shoes", "Evening bag"]),
];

fn activity_items(activities: &[String]) -> Vec<&'static str> {
    let mut items = Vec::new();
    for (triggers, extra) in ACTIVITY_ITEMS {
        if activities.iter().any(|a| triggers.contains(&a.as_str())) {
            for item in extra {
                if !items.contains(item) {
                    items.push(*item);
                }
            }
        }
    }
    items
}

#[async_trait]
impl Tool for PackingListTool {
    fn spec(&self) -> ToolSpec {
        ToolSpec::new(
            "packing_list",
            "Generate a packing list for a trip based on its length, season and planned activities.",
        )
        .required("destination", ParamType::String, "Destination city")
        .optional("duration_days", ParamType::Integer, "Trip length in days (default 3)")
        .optional("season", ParamType::String, "spring, summer, fall or winter (default spring)")
        .optional("activities", ParamType::StringList, "Planned activities or interests")
    }

    async fn execute(&self, arguments: serde_json::Value) -> Result<ToolResult, ToolError> {
        let destination = required_str("packing_list", &arguments, "destination")?;
        let days = count(&arguments, "duration_days", 3, 365);
        let season = optional_str(&arguments, "season")
            .map(str::to_lowercase)
            .unwrap_or_else(|| "spring".to_string());
        let activities = string_list(&arguments, "activities");

        let basics = vec![
            format!("Underwear for {} days", days + 2),
            format!("Socks for {} days", days + 2),
            "Comfortable walking shoes".to_string(),
            "Casual pants (2 pairs)".to_string(),
            "Shirts or tops (3-4)".to_string(),
            "One dressy outfit".to_string(),
        ];

        let mut tips = vec![
            "Roll clothes instead of folding to save space",
            "Pack essentials in your carry-on",
            "Leave room for souvenirs",
        ];
        if days <= 3 {
            tips.push("Consider carry-on only for short trips");
        }
        if days >= 7 {
            tips.push("Plan for laundry every 5-7 days");
        }

        Ok(ToolResult::structured(json!({
            "destination": destination,
            "duration_days": days,
            "season": season,
            "activities": activities,
            "categories": {
                "documents": DOCUMENTS,
                "clothing": basics,
                "weather_specific": season_items(&season),
                "activity_specific": activity_items(&activities),
                "health_and_hygiene": HEALTH,
                "electronics": ELECTRONICS,
            },
            "packing_tips": tips,
        })))
    }
}
