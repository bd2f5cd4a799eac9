//! Accommodation suggestions priced by budget tier.

use async_trait::async_trait;
use roamer_core::context::BudgetLevel;
use roamer_core::error::ToolError;
use roamer_core::tool::{ParamType, Tool, ToolResult, ToolSpec};
use serde_json::json;

use crate::support::{budget_level, count, required_str};

pub struct SuggestAccommodationsTool;

/// Nightly price band in USD for a tier.
fn price_band(level: BudgetLevel) -> (u32, u32) {
    match level {
        BudgetLevel::Low => (30, 80),
        BudgetLevel::Medium => (80, 200),
        BudgetLevel::High => (200, 500),
    }
}

#[async_trait]
impl Tool for SuggestAccommodationsTool {
    fn spec(&self) -> ToolSpec {
        ToolSpec::new(
            "suggest_accommodations",
            "Suggest hotels, apartments and B&Bs for a destination within a budget tier, with nightly and total price ranges.",
        )
        .required("destination", ParamType::String, "City to stay in")
        .optional("budget_level", ParamType::String, "low, medium or high (default medium)")
        .optional("nights", ParamType::Integer, "Number of nights (default 3)")
        .optional("travelers", ParamType::Integer, "Number of guests (default 2)")
    }

    async fn execute(&self, arguments: serde_json::Value) -> Result<ToolResult, ToolError> {
        let destination = required_str("suggest_accommodations", &arguments, "destination")?;
        let level = budget_level(&arguments);
        let nights = count(&arguments, "nights", 3, 60);
        let travelers = count(&arguments, "travelers", 2, 50);
        let (min, max) = price_band(level);
        let mid = (min + max) / 2;

        let option = |name: String, kind: &str, rating: f32, low: u32, high: u32, location: &str| {
            json!({
                "name": name,
                "type": kind,
                "rating": rating,
                "price_per_night_usd": { "min": low, "max": high },
                "total_cost_usd": { "min": low * nights, "max": high * nights },
                "location": location,
            })
        };

        let options = vec![
            option(
                format!("Grand {destination} Hotel"),
                "Hotel",
                4.3,
                mid,
                max,
                "City center, walking distance to main attractions",
            ),
            option(
                format!("Cozy {destination} Apartment"),
                "Apartment",
                4.6,
                min,
                mid,
                "Residential neighborhood, authentic local area",
            ),
            option(
                format!("{destination} Heritage B&B"),
                "Bed & Breakfast",
                4.7,
                min + 20,
                max - 10,
                "Historic quarter, charming neighborhood",
            ),
        ];

        Ok(ToolResult::structured(json!({
            "destination": destination,
            "budget_level": level,
            "nights": nights,
            "travelers": travelers,
            "options": options,
            "booking_recommendations": [
                "Book 2-4 weeks in advance for better rates",
                "Check cancellation policies carefully",
                "Read recent guest reviews",
                "Weigh location against budget"
            ],
        })))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn medium_tier_by_default() {
        let result = SuggestAccommodationsTool
            .execute(json!({"destination": "Lisbon"}))
            .await
            .unwrap();
        let data = result.data.unwrap();
        assert_eq!(data["budget_level"], "medium");
        assert_eq!(data["options"][1]["price_per_night_usd"]["min"], 80);
        assert_eq!(data["options"][1]["total_cost_usd"]["min"], 240);
        assert!(result.output.contains("Grand Lisbon Hotel"));
    }

    #[tokio::test]
    async fn price_ranges_are_ordered_in_every_tier() {
        for tier in ["low", "medium", "high"] {
            let result = SuggestAccommodationsTool
                .execute(json!({"destination": "Rome", "budget_level": tier}))
                .await
                .unwrap();
            for option in result.data.unwrap()["options"].as_array().unwrap() {
                let band = &option["price_per_night_usd"];
                assert!(band["min"].as_u64() < band["max"].as_u64(), "{tier}: {band}");
            }
        }
    }

    #[tokio::test]
    async fn luxury_tier_is_pricier() {
        let result = SuggestAccommodationsTool
            .execute(json!({"destination": "Dubai", "budget_level": "luxury", "nights": 2}))
            .await
            .unwrap();
        let data = result.data.unwrap();
        assert_eq!(data["budget_level"], "high");
        assert_eq!(data["options"][0]["price_per_night_usd"]["min"], 350);
        assert_eq!(data["options"][0]["total_cost_usd"]["max"], 1000);
    }
}
