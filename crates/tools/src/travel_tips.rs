//! Cultural, safety, money and practical travel tips.

use async_trait::async_trait;
use roamer_core::error::ToolError;
use roamer_core::tool::{ParamType, Tool, ToolResult, ToolSpec};
use serde_json::{Map, Value, json};

use crate::support::{optional_str, required_str};

pub struct TravelTipsTool;

const SECTIONS: [(&str, &[&str]); 6] = [
    ("cultural", &[
        "Respect local customs and traditions",
        "Learn basic phrases in the local language (hello, thank you, please, excuse me)",
        "Dress appropriately for religious sites and cultural venues",
        "Show interest in local culture and ask questions respectfully",
    ]),
    ("safety", &[
        "Keep copies of important documents (passport, visa, insurance)",
        "Stay aware of your surroundings, especially in crowded areas",
        "Use reputable transportation services and official taxis",
        "Avoid displaying expensive items or large amounts of cash",
        "Register with your embassy if staying for extended periods",
    ]),
    ("money", &[
        "Notify your bank of travel plans to avoid card blocks",
        "Keep cash in multiple locations",
        "Understand local tipping customs",
        "Use ATMs affiliated with major banks when possible",
        "Budget extra for unexpected expenses and souvenirs",
    ]),
    ("practical", &[
        "Download offline maps and translation apps",
        "Pack a portable charger and universal adapter",
        "Research local transportation options and apps",
        "Consider travel insurance for health and trip coverage",
    ]),
    ("communication", &[
        "Carry your hotel address written in the local language",
        "Tourist information centers usually have English speakers",
        "Use gestures and patience when language barriers exist",
    ]),
    ("health", &[
        "Check whether vaccinations are required or recommended",
        "Bring a basic first aid kit and necessary prescriptions",
        "Stay hydrated and eat safely prepared food",
    ]),
];

#[async_trait]
impl Tool for TravelTipsTool {
    fn spec(&self) -> ToolSpec {
        ToolSpec::new(
            "travel_tips",
            "Get travel tips and local customs for a destination: cultural etiquette, safety, money, practical, communication and health advice.",
        )
        .required("destination", ParamType::String, "Destination the tips are for")
        .optional(
            "category",
            ParamType::String,
            "One of cultural, safety, money, practical, communication, health; omit for all",
        )
    }

    async fn execute(&self, arguments: serde_json::Value) -> Result<ToolResult, ToolError> {
        let destination = required_str("travel_tips", &arguments, "destination")?;
        let category = optional_str(&arguments, "category").map(str::to_lowercase);

        let mut sections = Map::new();
        for (name, tips) in SECTIONS {
            if category.as_deref().is_none_or(|c| c == name) {
                sections.insert(format!("{name}_tips"), json!(tips));
            }
        }

        if sections.is_empty() {
            let known: Vec<&str> = SECTIONS.iter().map(|(name, _)| *name).collect();
            return Err(ToolError::InvalidArguments {
                tool_name: "travel_tips".into(),
                reason: format!("unknown category; expected one of {}", known.join(", ")),
            });
        }

        sections.insert("destination".into(), Value::String(destination.to_string()));
        Ok(ToolResult::structured(Value::Object(sections)))
    }
}
