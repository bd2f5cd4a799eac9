//! Day-by-day itinerary builder.
//!
//! Plans are assembled from three day templates (arrival, immersion,
//! adventure); trips longer than three days repeat the last template.

use async_trait::async_trait;
use chrono::{Days, NaiveDate};
use roamer_core::error::ToolError;
use roamer_core::tool::{ParamType, Tool, ToolResult, ToolSpec};
use serde::Serialize;
use serde_json::json;

use crate::support::{budget_level, count, optional_str, required_str, string_list};

pub struct BuildItineraryTool;

/// Longest trip the builder will lay out.
pub const MAX_DAYS: u32 = 30;

#[derive(Debug, Serialize)]
struct Activity {
    time: &'static str,
    activity: String,
    duration: &'static str,
    cost_usd: u32,
    kind: &'static str,
}

#[derive(Debug, Serialize)]
struct DayPlan {
    day: u32,
    date: String,
    theme: &'static str,
    activities: Vec<Activity>,
    estimated_daily_cost_usd: u32,
}

type Template = [(&'static str, &'static str, &'static str, u32, &'static str); 5];

const ARRIVAL: Template = [
    ("09:00", "Arrival and hotel check-in", "2 hours", 0, "logistics"),
    ("11:00", "Welcome walking tour of {dest}", "3 hours", 25, "sightseeing"),
    ("14:00", "Lunch at a traditional local restaurant", "1.5 hours", 35, "dining"),
    ("16:00", "Visit the historic center of {dest}", "2 hours", 10, "culture"),
    ("19:00", "Dinner and evening stroll", "3 hours", 45, "dining"),
];

const IMMERSION: Template = [
    ("09:00", "Visit the national museum", "3 hours", 20, "culture"),
    ("12:30", "Lunch break", "1 hour", 25, "dining"),
    ("14:00", "Explore the local markets of {dest}", "2 hours", 30, "shopping"),
    ("16:30", "Scenic viewpoint visit", "1.5 hours", 0, "nature"),
    ("19:00", "Traditional dinner experience", "2.5 hours", 50, "dining"),
];

const ADVENTURE: Template = [
    ("09:00", "Day trip adventure activity near {dest}", "4 hours", 60, "adventure"),
    ("13:00", "Picnic lunch", "1 hour", 15, "dining"),
    ("15:00", "Cultural workshop", "2 hours", 40, "culture"),
    ("18:00", "Farewell dinner", "2 hours", 55, "dining"),
    ("20:30", "Evening entertainment", "2 hours", 30, "entertainment"),
];

fn template_for(day: u32) -> (&'static str, &'static Template) {
    match day {
        1 => ("Arrival & Exploration", &ARRIVAL),
        2 => ("Cultural Immersion", &IMMERSION),
        _ => ("Adventure & Farewell", &ADVENTURE),
    }
}

fn parse_start(raw: Option<&str>) -> Result<Option<NaiveDate>, ToolError> {
    raw.map(|s| {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").map_err(|_| ToolError::InvalidArguments {
            tool_name: "build_itinerary".into(),
            reason: format!("start_date '{s}' must be YYYY-MM-DD"),
        })
    })
    .transpose()
}

fn plan_day(day: u32, destination: &str, start: Option<NaiveDate>) -> DayPlan {
    let (theme, template) = template_for(day);
    let activities: Vec<Activity> = template
        .iter()
        .map(|&(time, label, duration, cost_usd, kind)| Activity {
            time,
            activity: label.replace("{dest}", destination),
            duration,
            cost_usd,
            kind,
        })
        .collect();
    let date = start
        .and_then(|d| d.checked_add_days(Days::new(u64::from(day - 1))))
        .map(|d| d.format("%Y-%m-%d").to_string())
        .unwrap_or_else(|| format!("Day {day}"));

    DayPlan {
        day,
        date,
        theme,
        estimated_daily_cost_usd: activities.iter().map(|a| a.cost_usd).sum(),
        activities,
    }
}

#[async_trait]
impl Tool for BuildItineraryTool {
    fn spec(&self) -> ToolSpec {
        ToolSpec::new(
            "build_itinerary",
            "Build a day-by-day travel itinerary with timed activities and per-day cost estimates.",
        )
        .required("destination", ParamType::String, "City to plan for")
        .optional("duration_days", ParamType::Integer, "Trip length in days (default 3)")
        .optional("start_date", ParamType::String, "First day of the trip (YYYY-MM-DD)")
        .optional("travelers", ParamType::Integer, "Number of travelers (default 2)")
        .optional("budget_level", ParamType::String, "low, medium or high")
        .optional("interests", ParamType::StringList, "Traveler interests to highlight")
    }

    async fn execute(&self, arguments: serde_json::Value) -> Result<ToolResult, ToolError> {
        let destination = required_str("build_itinerary", &arguments, "destination")?;
        let days = count(&arguments, "duration_days", 3, MAX_DAYS);
        let travelers = count(&arguments, "travelers", 2, 50);
        let start = parse_start(optional_str(&arguments, "start_date"))?;

        let daily_plans: Vec<DayPlan> = (1..=days)
            .map(|day| plan_day(day, destination, start))
            .collect();
        let per_person: u32 = daily_plans.iter().map(|d| d.estimated_daily_cost_usd).sum();
        let total_activities: usize = daily_plans.iter().map(|d| d.activities.len()).sum();

        Ok(ToolResult::structured(json!({
            "destination": destination,
            "duration_days": days,
            "start_date": start.map(|d| d.format("%Y-%m-%d").to_string()),
            "travelers": travelers,
            "budget_level": budget_level(&arguments),
            "interests": string_list(&arguments, "interests"),
            "daily_plans": daily_plans,
            "summary": {
                "total_activities": total_activities,
                "activity_cost_per_person_usd": per_person,
                "activity_cost_for_group_usd": per_person * travelers,
                "recommendations": [
                    "Book popular attractions in advance",
                    "Carry comfortable walking shoes",
                    "Keep some cash for small vendors"
                ]
            },
        })))
    }
}
