//! Trip budget estimation.
//!
//! Per-person cost is the tier's daily rates times the number of days plus
//! one-off costs (flights by tier, insurance, visa fees, airport transfers);
//! the group total multiplies by travelers.

use async_trait::async_trait;
use roamer_core::context::BudgetLevel;
use roamer_core::error::ToolError;
use roamer_core::tool::{ParamType, Tool, ToolResult, ToolSpec};
use serde::Serialize;
use serde_json::json;

use crate::support::{budget_level, count, required_str};

pub struct EstimateBudgetTool;

#[derive(Debug, Clone, Copy, Serialize)]
struct DailyRates {
    accommodation: u32,
    meals: u32,
    local_transport: u32,
    attractions: u32,
    shopping: u32,
    miscellaneous: u32,
}

impl DailyRates {
    fn for_level(level: BudgetLevel) -> Self {
        let (accommodation, meals, local_transport, attractions, shopping, miscellaneous) =
            match level {
                BudgetLevel::Low => (45, 30, 8, 15, 10, 12),
                BudgetLevel::Medium => (120, 55, 15, 25, 20, 20),
                BudgetLevel::High => (250, 100, 30, 50, 50, 40),
            };
        Self {
            accommodation,
            meals,
            local_transport,
            attractions,
            shopping,
            miscellaneous,
        }
    }

    fn total(&self) -> u32 {
        self.accommodation
            + self.meals
            + self.local_transport
            + self.attractions
            + self.shopping
            + self.miscellaneous
    }
}

fn flights(level: BudgetLevel) -> u32 {
    match level {
        BudgetLevel::Low => 400,
        BudgetLevel::Medium => 600,
        BudgetLevel::High => 1200,
    }
}

const TRAVEL_INSURANCE: u32 = 50;
const VISA_FEES: u32 = 30;
const AIRPORT_TRANSFERS: u32 = 40;

#[async_trait]
impl Tool for EstimateBudgetTool {
    fn spec(&self) -> ToolSpec {
        ToolSpec::new(
            "estimate_budget",
            "Estimate a trip budget: daily costs by category, one-off costs such as flights and insurance, per-person and group totals.",
        )
        .required("destination", ParamType::String, "Destination city")
        .optional("duration_days", ParamType::Integer, "Trip length in days (default 3)")
        .optional("travelers", ParamType::Integer, "Number of travelers (default 1)")
        .optional("budget_level", ParamType::String, "low, medium or high (default medium)")
    }

    async fn execute(&self, arguments: serde_json::Value) -> Result<ToolResult, ToolError> {
        let destination = required_str("estimate_budget", &arguments, "destination")?;
        let days = count(&arguments, "duration_days", 3, 365);
        let travelers = count(&arguments, "travelers", 1, 50);
        let level = budget_level(&arguments);

        let rates = DailyRates::for_level(level);
        let daily_total = rates.total();
        let stay_total = daily_total * days;
        let one_off = flights(level) + TRAVEL_INSURANCE + VISA_FEES + AIRPORT_TRANSFERS;
        let per_person = stay_total + one_off;
        let group = per_person * travelers;

        Ok(ToolResult::structured(json!({
            "destination": destination,
            "duration_days": days,
            "travelers": travelers,
            "budget_level": level,
            "daily_rates_usd": rates,
            "one_time_costs_usd": {
                "flights": flights(level),
                "travel_insurance": TRAVEL_INSURANCE,
                "visa_fees": VISA_FEES,
                "airport_transfers": AIRPORT_TRANSFERS,
            },
            "totals_usd": {
                "daily_average": daily_total,
                "stay_total_per_person": stay_total,
                "grand_total_per_person": per_person,
                "grand_total_for_group": group,
                "recommended_emergency_fund": group * 15 / 100,
            },
            "budget_tips": [
                "Book flights 6-8 weeks in advance",
                "Eat at local restaurants and markets",
                "Use public transportation",
                "Travel during shoulder season"
            ],
        })))
    }
}
