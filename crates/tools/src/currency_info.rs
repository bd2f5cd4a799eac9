//! Currency, payment and tipping information.

use async_trait::async_trait;
use roamer_core::error::ToolError;
use roamer_core::tool::{ParamType, Tool, ToolResult, ToolSpec};
use serde_json::json;

use crate::places;
use crate::support::required_str;

pub struct CurrencyInfoTool;

#[async_trait]
impl Tool for CurrencyInfoTool {
    fn spec(&self) -> ToolSpec {
        ToolSpec::new(
            "currency_info",
            "Get currency information for a destination: local currency, approximate exchange rate, payment methods, ATM access and tipping culture.",
        )
        .required("destination", ParamType::String, "City or country")
        .optional("amount_usd", ParamType::Number, "An amount in US dollars to convert")
    }

    async fn execute(&self, arguments: serde_json::Value) -> Result<ToolResult, ToolError> {
        let destination = required_str("currency_info", &arguments, "destination")?;
        let amount = arguments["amount_usd"].as_f64();

        let (code, name, symbol, per_usd) = match places::lookup(destination) {
            Some(p) => (p.currency_code, p.currency_name, p.currency_symbol, Some(p.per_usd)),
            None => ("LOCAL", "Local currency", "", None),
        };

        let exchange_rate = match per_usd {
            Some(rate) => format!("1 USD ≈ {rate} {code} (approximate, rates change daily)"),
            None => "Check a current exchange rate before travel".to_string(),
        };
        let converted = amount
            .zip(per_usd)
            .map(|(usd, rate)| format!("{usd:.2} USD ≈ {symbol}{:.2}", usd * rate));

        let mut data = json!({
            "destination": destination,
            "currency_name": name,
            "currency_code": code,
            "symbol": symbol,
            "exchange_rate": exchange_rate,
            "payment_methods": {
                "cash": "Essential for small vendors and markets",
                "credit_cards": "Visa and Mastercard accepted at most hotels and restaurants",
                "mobile_payments": "Apple Pay and Google Pay available in major cities"
            },
            "atm_availability": "Readily available in cities; expect withdrawal fees plus conversion",
            "tipping_culture": {
                "restaurants": "10-15% for good service, sometimes included in the bill",
                "taxis": "Round up the fare",
                "hotels": "Small tip per bag for porters"
            },
            "money_saving_tips": [
                "Use bank ATMs instead of exchange kiosks",
                "Pay in local currency to avoid conversion fees",
                "Avoid airport currency exchanges"
            ],
        });
        if let Some(converted) = converted {
            data["conversion"] = json!(converted);
        }
        if let Some(rate) = per_usd {
            data["per_usd"] = json!(rate);
        }

        Ok(ToolResult::structured(data))
    }
}
