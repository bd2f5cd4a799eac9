//! Destination overview tool.

use async_trait::async_trait;
use roamer_core::error::ToolError;
use roamer_core::tool::{ParamType, Tool, ToolResult, ToolSpec};
use serde_json::json;

use crate::places;
use crate::support::required_str;

pub struct DestinationInfoTool;

#[async_trait]
impl Tool for DestinationInfoTool {
    fn spec(&self) -> ToolSpec {
        ToolSpec::new(
            "destination_info",
            "Get general information about a destination: overview, language, time zone, currency, visa notes, best time to visit and emergency contacts.",
        )
        .required("destination", ParamType::String, "City or country to describe")
    }

    async fn execute(&self, arguments: serde_json::Value) -> Result<ToolResult, ToolError> {
        let destination = required_str("destination_info", &arguments, "destination")?;

        let data = match places::lookup(destination) {
            Some(place) => json!({
                "destination": place.name,
                "country": place.country,
                "description": format!(
                    "{} offers visitors a blend of traditional and modern experiences, with rich culture and history.",
                    place.name
                ),
                "local_language": place.language,
                "time_zone": place.time_zone,
                "currency": format!("{} ({})", place.currency_name, place.currency_code),
                "best_time_to_visit": "Spring and fall are ideal for pleasant weather and fewer crowds",
                "visa_requirements": format!(
                    "Check {} entry rules for your nationality; a passport valid for 6+ months is required",
                    place.country
                ),
                "emergency_contacts": "Local emergency number and tourist police; register with your embassy for long stays",
                "known_destination": true,
            }),
            None => json!({
                "destination": destination,
                "description": format!(
                    "{destination} offers visitors a unique blend of traditional and modern experiences."
                ),
                "local_language": "Local language varies by region",
                "time_zone": "Check local time zone before travel",
                "currency": "Local currency; major credit cards widely accepted",
                "best_time_to_visit": "Spring and fall are ideal for pleasant weather and fewer crowds",
                "visa_requirements": "Check visa requirements based on your nationality; most countries require a valid passport",
                "emergency_contacts": "Local emergency number and tourist police",
                "known_destination": false,
            }),
        };

        Ok(ToolResult::structured(data))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn known_destination_has_specifics() {
        let result = DestinationInfoTool
            .execute(json!({"destination": "paris"}))
            .await
            .unwrap();
        let data = result.data.unwrap();
        assert_eq!(data["destination"], "Paris");
        assert_eq!(data["local_language"], "French");
        assert!(result.output.contains("EUR"));
    }

    #[tokio::test]
    async fn unknown_destination_gets_generic_overview() {
        let result = DestinationInfoTool
            .execute(json!({"destination": "Atlantis"}))
            .await
            .unwrap();
        assert!(result.success);
        assert_eq!(result.data.unwrap()["known_destination"], false);
        assert!(result.output.contains("Atlantis"));
    }
}
