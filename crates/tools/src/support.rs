//! Argument helpers shared by the travel tools.
//!
//! Arguments reach a tool only after the registry has checked them against
//! the tool's spec, so these helpers only deal with optional fields and
//! defaults.

use roamer_core::context::BudgetLevel;
use roamer_core::error::ToolError;
use serde_json::Value;

/// A required string argument, trimmed.
pub(crate) fn required_str<'a>(tool: &str, args: &'a Value, key: &str) -> Result<&'a str, ToolError> {
    args[key]
        .as_str()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .ok_or_else(|| ToolError::InvalidArguments {
            tool_name: tool.to_string(),
            reason: format!("'{key}' must be a non-empty string"),
        })
}

pub(crate) fn optional_str<'a>(args: &'a Value, key: &str) -> Option<&'a str> {
    args[key].as_str().map(str::trim).filter(|s| !s.is_empty())
}

/// A positive integer argument clamped to `1..=max`, or `default`.
pub(crate) fn count(args: &Value, key: &str, default: u32, max: u32) -> u32 {
    args[key]
        .as_u64()
        .map(|n| n.clamp(1, u64::from(max)) as u32)
        .unwrap_or(default)
}

pub(crate) fn string_list(args: &Value, key: &str) -> Vec<String> {
    args[key]
        .as_array()
        .map(|items| {
            items
                .iter()
                .filter_map(Value::as_str)
                .map(|s| s.trim().to_lowercase())
                .filter(|s| !s.is_empty())
                .collect()
        })
        .unwrap_or_default()
}

/// The budget tier named by `budget_level`, falling back to medium.
pub(crate) fn budget_level(args: &Value) -> BudgetLevel {
    optional_str(args, "budget_level")
        .and_then(|s| s.parse().ok())
        .unwrap_or(BudgetLevel::Medium)
}

/// Stable string hash so stand-in data varies by place but never by run.
pub(crate) fn stable_hash(text: &str) -> u32 {
    text.to_lowercase()
        .bytes()
        .fold(0u32, |acc, b| acc.wrapping_mul(31).wrapping_add(u32::from(b)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn count_clamps_and_defaults() {
        assert_eq!(count(&json!({"n": 0}), "n", 3, 30), 1);
        assert_eq!(count(&json!({"n": 400}), "n", 3, 30), 30);
        assert_eq!(count(&json!({}), "n", 3, 30), 3);
    }

    #[test]
    fn budget_level_aliases() {
        assert_eq!(budget_level(&json!({"budget_level": "luxury"})), BudgetLevel::High);
        assert_eq!(budget_level(&json!({"budget_level": "nonsense"})), BudgetLevel::Medium);
        assert_eq!(budget_level(&json!({})), BudgetLevel::Medium);
    }

    #[test]
    fn hash_ignores_case() {
        assert_eq!(stable_hash("Paris"), stable_hash("paris"));
    }

    #[test]
    fn blank_required_string_rejected() {
        let err = required_str("t", &json!({"destination": "  "}), "destination").unwrap_err();
        assert!(matches!(err, ToolError::InvalidArguments { .. }));
    }
}
