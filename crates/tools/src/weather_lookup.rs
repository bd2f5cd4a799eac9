//! Weather lookup tool: deterministic stand-in for a forecast API.
//!
//! Conditions are derived from a hash of the location so the same city
//! always gets the same forecast, which keeps agent tests reproducible.

use async_trait::async_trait;
use roamer_core::error::ToolError;
use roamer_core::tool::{ParamType, Tool, ToolResult, ToolSpec};
use serde::Serialize;

use crate::support::{optional_str, required_str, stable_hash};

pub struct WeatherLookupTool;

#[async_trait]
impl Tool for WeatherLookupTool {
    fn spec(&self) -> ToolSpec {
        ToolSpec::new(
            "weather_lookup",
            "Look up weather conditions and a 7-day forecast for a destination. Returns temperature, conditions, humidity, wind and packing recommendations.",
        )
        .required("location", ParamType::String, "The city or destination to look up")
        .optional("date", ParamType::String, "Travel date (YYYY-MM-DD); defaults to today")
        .optional("units", ParamType::String, "Temperature units: metric (default) or imperial")
    }

    async fn execute(&self, arguments: serde_json::Value) -> Result<ToolResult, ToolError> {
        let location = required_str("weather_lookup", &arguments, "location")?;
        let units = optional_str(&arguments, "units").unwrap_or("metric");
        let date = optional_str(&arguments, "date")
            .map(str::to_string)
            .unwrap_or_else(|| chrono::Utc::now().format("%Y-%m-%d").to_string());

        let weather = generate_weather(location, &date, units);
        let data = serde_json::to_value(&weather).map_err(|e| ToolError::ExecutionFailed {
            tool_name: "weather_lookup".into(),
            reason: e.to_string(),
        })?;
        Ok(ToolResult::structured(data))
    }
}

#[derive(Serialize)]
struct WeatherData {
    location: String,
    date: String,
    temperature: f64,
    units: String,
    conditions: String,
    humidity: u32,
    wind_speed_kmh: u32,
    wind_direction: String,
    forecast: Vec<ForecastDay>,
    recommendations: Vec<String>,
}

#[derive(Serialize)]
struct ForecastDay {
    day: String,
    high: f64,
    low: f64,
    condition: String,
}

const CONDITIONS: [&str; 8] = [
    "Clear skies",
    "Partly cloudy",
    "Overcast",
    "Light rain",
    "Heavy rain",
    "Thunderstorms",
    "Snow",
    "Foggy",
];

const WIND_DIRECTIONS: [&str; 8] = ["N", "NE", "E", "SE", "S", "SW", "W", "NW"];

fn generate_weather(location: &str, date: &str, units: &str) -> WeatherData {
    let hash = stable_hash(location);
    let imperial = units == "imperial";
    let convert = |celsius: f64| {
        let value = if imperial { celsius * 9.0 / 5.0 + 32.0 } else { celsius };
        (value * 10.0).round() / 10.0
    };

    // -5 to 34°C
    let base_c = f64::from(hash % 40) - 5.0;
    let conditions = CONDITIONS[(hash as usize / 7) % CONDITIONS.len()];

    let forecast = (0..7u32)
        .map(|offset| {
            let drift = f64::from((hash.wrapping_add(offset * 13)) % 7) - 3.0;
            let day = match offset {
                0 => "Today".to_string(),
                1 => "Tomorrow".to_string(),
                n => format!("Day {}", n + 1),
            };
            ForecastDay {
                day,
                high: convert(base_c + 4.0 + drift),
                low: convert(base_c - 4.0 + drift),
                condition: CONDITIONS[(hash as usize / 7 + offset as usize) % CONDITIONS.len()]
                    .to_string(),
            }
        })
        .collect();

    WeatherData {
        location: location.to_string(),
        date: date.to_string(),
        temperature: convert(base_c),
        units: if imperial { "°F" } else { "°C" }.to_string(),
        conditions: conditions.to_string(),
        humidity: 30 + (hash % 60),
        wind_speed_kmh: 5 + (hash % 30),
        wind_direction: WIND_DIRECTIONS[(hash as usize / 3) % WIND_DIRECTIONS.len()].to_string(),
        forecast,
        recommendations: recommendations(base_c, conditions),
    }
}

fn recommendations(base_c: f64, conditions: &str) -> Vec<String> {
    let mut tips = vec!["Comfortable walking shoes are essential".to_string()];
    if base_c < 5.0 {
        tips.push("Pack a warm coat, hat and gloves".into());
    } else if base_c < 15.0 {
        tips.push("Pack light layers for temperature changes".into());
    } else {
        tips.push("Sunscreen recommended for outdoor activities".into());
    }
    if conditions.contains("rain") || conditions.contains("Thunder") {
        tips.push("Bring a light rain jacket or umbrella".into());
    }
    tips
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn lookup_returns_weather() {
        let tool = WeatherLookupTool;
        let result = tool
            .execute(serde_json::json!({"location": "Tokyo"}))
            .await
            .unwrap();

        assert!(result.success);
        assert!(result.output.contains("Tokyo"));
        assert!(result.output.contains("temperature"));
        let data = result.data.unwrap();
        assert_eq!(data["forecast"].as_array().unwrap().len(), 7);
    }

    #[tokio::test]
    async fn imperial_units() {
        let tool = WeatherLookupTool;
        let result = tool
            .execute(serde_json::json!({"location": "New York", "units": "imperial"}))
            .await
            .unwrap();

        assert!(result.output.contains("°F"));
    }

    #[tokio::test]
    async fn deterministic_results() {
        let tool = WeatherLookupTool;
        let args = serde_json::json!({"location": "London", "date": "2026-05-01"});
        let r1 = tool.execute(args.clone()).await.unwrap();
        let r2 = tool.execute(args).await.unwrap();

        assert_eq!(r1.output, r2.output);
    }

    #[tokio::test]
    async fn missing_location_returns_error() {
        let tool = WeatherLookupTool;
        let result = tool.execute(serde_json::json!({})).await;
        assert!(result.is_err());
    }

    #[test]
    fn tool_definition() {
        let def = WeatherLookupTool.spec().to_definition();
        assert_eq!(def.name, "weather_lookup");
        assert_eq!(def.parameters["required"], serde_json::json!(["location"]));
    }
}
