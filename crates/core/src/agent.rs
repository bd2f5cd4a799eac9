//! Agent identity types.

use serde::{Deserialize, Serialize};

/// The fixed set of responders a request can be routed to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AgentId {
    /// Read-only destination facts: weather, attractions, currency, culture, tips.
    Information,
    /// Itineraries, accommodation, budgets, packing.
    Planning,
}

impl AgentId {
    /// Every responder, in dispatch order.
    pub const ALL: [AgentId; 2] = [AgentId::Information, AgentId::Planning];

    /// Stable machine identifier.
    pub fn as_str(&self) -> &'static str {
        match self {
            AgentId::Information => "information",
            AgentId::Planning => "planning",
        }
    }

    /// Human-readable name used in composed responses.
    pub fn display_name(&self) -> &'static str {
        match self {
            AgentId::Information => "InfoAgent",
            AgentId::Planning => "TravelAgent",
        }
    }
}

impl std::fmt::Display for AgentId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dispatch_order_is_information_first() {
        assert_eq!(AgentId::ALL, [AgentId::Information, AgentId::Planning]);
    }

    #[test]
    fn serializes_as_snake_case() {
        let json = serde_json::to_string(&AgentId::Planning).unwrap();
        assert_eq!(json, "\"planning\"");
    }
}
