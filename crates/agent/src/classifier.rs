//! Deterministic request classification.
//!
//! An utterance is matched against two disjoint term sets on word
//! boundaries. Naming a known destination counts as an information term: a
//! place on its own is a request for facts about it.
//!
//! Routing rules, in order:
//!
//! 1. terms from both sets, or no terms while a planning request is still
//!    open, route to **both** agents;
//! 2. information terms only route to the information agent;
//! 3. planning terms only route to the planning agent;
//! 4. anything else goes to the information agent, the read-only choice.

use roamer_core::{AgentId, ExtractedContext};
use serde::{Deserialize, Serialize};
use std::sync::LazyLock;

/// Terms that ask for facts.
pub const INFORMATION_TERMS: &[&str] = &[
    "weather",
    "forecast",
    "climate",
    "temperature",
    "attractions",
    "sightseeing",
    "things to do",
    "landmarks",
    "museums",
    "currency",
    "exchange rate",
    "money",
    "culture",
    "customs",
    "history",
    "language",
    "tips",
    "advice",
    "visa",
    "safety",
];

/// Terms that ask for a plan.
pub const PLANNING_TERMS: &[&str] = &[
    "itinerary",
    "plan",
    "planning",
    "schedule",
    "trip",
    "budget",
    "cost",
    "costs",
    "accommodation",
    "accommodations",
    "hotel",
    "hotels",
    "lodging",
    "stay",
    "packing",
    "pack",
    "luggage",
    "book",
    "booking",
    "reserve",
    "reservation",
];

static GAZETTEER: LazyLock<Vec<(&'static str, String)>> = LazyLock::new(|| {
    roamer_tools::places::known_destinations()
        .map(|name| (name, normalize(name)))
        .collect()
});

/// Which agents handle a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Route {
    Information,
    Planning,
    Both,
}

impl Route {
    /// The agents to invoke, in dispatch order.
    pub fn agents(&self) -> Vec<AgentId> {
        match self {
            Route::Information => vec![AgentId::Information],
            Route::Planning => vec![AgentId::Planning],
            Route::Both => AgentId::ALL.to_vec(),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Route::Information => "information",
            Route::Planning => "planning",
            Route::Both => "both",
        }
    }
}

impl std::fmt::Display for Route {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Which rule produced a route.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RouteReason {
    MixedTerms,
    OpenPlanningFollowUp,
    InformationTerms,
    PlanningTerms,
    NoTermsDefault,
}

impl RouteReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            RouteReason::MixedTerms => "mixed_terms",
            RouteReason::OpenPlanningFollowUp => "open_planning_follow_up",
            RouteReason::InformationTerms => "information_terms",
            RouteReason::PlanningTerms => "planning_terms",
            RouteReason::NoTermsDefault => "no_terms_default",
        }
    }
}

/// The outcome of classifying one utterance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Classification {
    pub route: Route,
    pub reason: RouteReason,
    /// Information terms found, destinations by their canonical names.
    pub information_terms: Vec<String>,
    pub planning_terms: Vec<String>,
}

impl Classification {
    pub fn agents(&self) -> Vec<AgentId> {
        self.route.agents()
    }
}

/// Classify an utterance given the session's context.
///
/// Pure: the same inputs always give the same classification.
pub fn classify(utterance: &str, context: &ExtractedContext) -> Classification {
    let text = normalize(utterance);

    let mut information_terms: Vec<String> = matching_terms(&text, INFORMATION_TERMS);
    information_terms.extend(
        GAZETTEER
            .iter()
            .filter(|(_, normalized)| contains_term(&text, normalized))
            .map(|(name, _)| name.to_string()),
    );
    let planning_terms = matching_terms(&text, PLANNING_TERMS);

    let (route, reason) = match (information_terms.is_empty(), planning_terms.is_empty()) {
        (false, false) => (Route::Both, RouteReason::MixedTerms),
        (true, true) if context.has_open_planning() => {
            (Route::Both, RouteReason::OpenPlanningFollowUp)
        }
        (false, true) => (Route::Information, RouteReason::InformationTerms),
        (true, false) => (Route::Planning, RouteReason::PlanningTerms),
        (true, true) => (Route::Information, RouteReason::NoTermsDefault),
    };

    Classification {
        route,
        reason,
        information_terms,
        planning_terms,
    }
}

/// Lowercase, turn every non-alphanumeric run into one space, and pad with a
/// space on each side so terms can be matched as ` term `.
pub(crate) fn normalize(text: &str) -> String {
    let mut out = String::with_capacity(text.len() + 2);
    out.push(' ');
    for c in text.chars().flat_map(char::to_lowercase) {
        if c.is_alphanumeric() {
            out.push(c);
        } else if !out.ends_with(' ') {
            out.push(' ');
        }
    }
    if !out.ends_with(' ') {
        out.push(' ');
    }
    out
}

/// Whether a normalized text contains `term` on word boundaries. `term` may
/// be raw or already normalized.
pub(crate) fn contains_term(normalized_text: &str, term: &str) -> bool {
    let term = normalize(term);
    !term.trim().is_empty() && normalized_text.contains(&term)
}

fn matching_terms(text: &str, terms: &[&str]) -> Vec<String> {
    terms
        .iter()
        .filter(|term| contains_term(text, term))
        .map(|term| term.to_string())
        .collect()
}
