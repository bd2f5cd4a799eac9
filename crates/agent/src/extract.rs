//! Context extraction from free text.
//!
//! Pulls destinations, dates, trip length, party size, budget tier,
//! interests and travel style out of an utterance as a [`ContextDelta`]. Nothing here fails:
//! text that mentions none of these yields an empty delta.

use regex::Regex;
use roamer_core::{BudgetLevel, ContextDelta};
use std::collections::BTreeMap;
use std::sync::LazyLock;

use crate::classifier::{contains_term, normalize};

static ISO_DATE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b\d{4}-\d{2}-\d{2}\b").expect("valid date pattern"));

static US_DATE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b\d{1,2}/\d{1,2}/\d{4}\b").expect("valid date pattern"));

static MONTH_DAY: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)\b(?:jan(?:uary)?|feb(?:ruary)?|mar(?:ch)?|apr(?:il)?|may|june?|july?|aug(?:ust)?|sep(?:t(?:ember)?)?|oct(?:ober)?|nov(?:ember)?|dec(?:ember)?)\s+\d{1,2}(?:st|nd|rd|th)?\b",
    )
    .expect("valid date pattern")
});

static DURATION: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(\d{1,3})[\s-]*(day|week)s?\b").expect("valid duration pattern")
});

static PARTY_SIZE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(\d{1,3})\s+(?:people|persons?|travell?ers?|adults|guests)\b")
        .expect("valid party pattern")
});

static GROUP_OF: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\bgroup\s+of\s+(\d{1,3})\b").expect("valid party pattern"));

/// Budget cues, most specific tier first so "medium budget" reads as medium.
const BUDGET_CUES: [(BudgetLevel, &[&str]); 3] = [
    (
        BudgetLevel::High,
        &["luxury", "premium", "high-end", "high budget", "expensive"],
    ),
    (
        BudgetLevel::Medium,
        &["moderate", "mid-range", "medium", "reasonable"],
    ),
    (
        BudgetLevel::Low,
        &["cheap", "affordable", "budget", "low cost", "low-cost", "low budget"],
    ),
];

const INTEREST_CUES: [(&str, &[&str]); 8] = [
    ("history", &["history", "historical", "historic"]),
    ("art", &["art", "arts", "galleries", "gallery"]),
    ("food", &["food", "cuisine", "restaurants", "foodie"]),
    ("nature", &["nature", "hiking", "outdoors", "parks"]),
    ("nightlife", &["nightlife", "bars", "clubs"]),
    ("shopping", &["shopping", "markets"]),
    ("museums", &["museum", "museums"]),
    ("sports", &["sport", "sports"]),
];

/// Preference key holding the traveller's style.
pub const TRAVEL_STYLE: &str = "travel_style";

/// Travel style cues. The first style with a matching cue wins.
const STYLE_CUES: [(&str, &[&str]); 4] = [
    ("business", &["business trip", "business travel", "for work", "conference"]),
    ("adventurous", &["adventurous", "adventure", "thrill", "off the beaten path"]),
    ("relaxed", &["relaxed", "relaxing", "laid-back", "laid back", "unwind"]),
    ("cultural", &["cultural", "cultural immersion", "heritage"]),
];

/// Extract everything recognisable from an utterance.
pub fn extract(utterance: &str) -> ContextDelta {
    let normalized = normalize(utterance);

    ContextDelta {
        destinations: destinations_in(utterance),
        budget_level: budget_level(&normalized),
        travel_dates: travel_dates(utterance),
        duration_days: duration_days(utterance),
        travelers: travelers(utterance),
        interests: interests(&normalized),
        preferences: preferences(&normalized),
        ..ContextDelta::default()
    }
}

/// Known destinations named in `text`, canonically spelled, in the order
/// they first appear.
pub fn destinations_in(text: &str) -> Vec<String> {
    let normalized = normalize(text);
    let mut found: Vec<(usize, &'static str)> = roamer_tools::places::known_destinations()
        .filter_map(|name| {
            let needle = normalize(name);
            normalized.find(&needle).map(|pos| (pos, name))
        })
        .collect();
    found.sort_by_key(|(pos, _)| *pos);
    found.into_iter().map(|(_, name)| name.to_string()).collect()
}

/// The canonical spelling of a destination named in a tool argument.
///
/// Known places get their gazetteer name; anything else is kept as given.
pub fn canonical_destination(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }
    let name = roamer_tools::places::lookup(trimmed)
        .filter(|place| place.name.eq_ignore_ascii_case(trimmed))
        .map(|place| place.name.to_string())
        .unwrap_or_else(|| trimmed.to_string());
    Some(name)
}

fn budget_level(normalized: &str) -> Option<BudgetLevel> {
    BUDGET_CUES
        .iter()
        .find(|(_, cues)| cues.iter().any(|cue| contains_term(normalized, cue)))
        .map(|(level, _)| *level)
}

fn travel_dates(text: &str) -> Option<String> {
    [&*ISO_DATE, &*US_DATE, &*MONTH_DAY]
        .into_iter()
        .find_map(|re| re.find(text))
        .map(|m| m.as_str().to_string())
}

fn duration_days(text: &str) -> Option<u32> {
    let caps = DURATION.captures(text)?;
    let n: u32 = caps.get(1)?.as_str().parse().ok()?;
    let unit = caps.get(2)?.as_str().to_lowercase();
    let days = if unit == "week" { n.saturating_mul(7) } else { n };
    (days > 0).then_some(days)
}

fn travelers(text: &str) -> Option<u32> {
    let caps = PARTY_SIZE
        .captures(text)
        .or_else(|| GROUP_OF.captures(text))?;
    let n: u32 = caps.get(1)?.as_str().parse().ok()?;
    (n > 0).then_some(n)
}

fn interests(normalized: &str) -> Vec<String> {
    INTEREST_CUES
        .iter()
        .filter(|(_, cues)| cues.iter().any(|cue| contains_term(normalized, cue)))
        .map(|(label, _)| label.to_string())
        .collect()
}

fn preferences(normalized: &str) -> BTreeMap<String, String> {
    let mut out = BTreeMap::new();
    if let Some((style, _)) = STYLE_CUES
        .iter()
        .find(|(_, cues)| cues.iter().any(|cue| contains_term(normalized, cue)))
    {
        out.insert(TRAVEL_STYLE.to_string(), style.to_string());
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scenario_trip_request() {
        let delta = extract("Plan a 5-day trip to Paris for 2 people, medium budget");
        assert_eq!(delta.destinations, vec!["Paris"]);
        assert_eq!(delta.duration_days, Some(5));
        assert_eq!(delta.travelers, Some(2));
        assert_eq!(delta.budget_level, Some(BudgetLevel::Medium));
        assert!(delta.planning.is_none());
    }

    #[test]
    fn destinations_keep_order_and_canonical_case() {
        let delta = extract("from new york to tokyo, then back via LONDON");
        assert_eq!(delta.destinations, vec!["New York", "Tokyo", "London"]);
    }

    #[test]
    fn date_formats() {
        assert_eq!(extract("leaving 2026-06-14").travel_dates.as_deref(), Some("2026-06-14"));
        assert_eq!(extract("leaving 6/14/2026").travel_dates.as_deref(), Some("6/14/2026"));
        assert_eq!(extract("leaving June 14th").travel_dates.as_deref(), Some("June 14th"));
        assert_eq!(extract("leaving soon").travel_dates, None);
    }

    #[test]
    fn weeks_become_days() {
        assert_eq!(extract("2 weeks in Rome").duration_days, Some(14));
        assert_eq!(extract("0 days").duration_days, None);
    }

    #[test]
    fn party_size_patterns() {
        assert_eq!(extract("3 travelers").travelers, Some(3));
        assert_eq!(extract("a group of 6 friends").travelers, Some(6));
        assert_eq!(extract("just me").travelers, None);
    }

    #[test]
    fn budget_tiers() {
        assert_eq!(extract("something cheap").budget_level, Some(BudgetLevel::Low));
        assert_eq!(extract("on a budget").budget_level, Some(BudgetLevel::Low));
        assert_eq!(extract("mid-range hotels").budget_level, Some(BudgetLevel::Medium));
        assert_eq!(extract("a high-end resort").budget_level, Some(BudgetLevel::High));
        assert_eq!(extract("what to wear").budget_level, None);
    }

    #[test]
    fn interests_are_labelled() {
        let delta = extract("I love art galleries, street food and museums");
        assert_eq!(delta.interests, vec!["art", "food", "museums"]);
    }

    #[test]
    fn travel_style_becomes_a_preference() {
        let delta = extract("Something relaxing by the sea, please");
        assert_eq!(delta.preferences[TRAVEL_STYLE], "relaxed");
        assert_eq!(
            extract("heading to Tokyo for a conference").preferences[TRAVEL_STYLE],
            "business"
        );
        assert!(extract("weather in Oslo").preferences.is_empty());
    }

    #[test]
    fn plain_chat_yields_empty_delta() {
        assert!(extract("thanks!").is_empty());
    }

    #[test]
    fn canonical_names_for_tool_arguments() {
        assert_eq!(canonical_destination(" paris ").as_deref(), Some("Paris"));
        assert_eq!(canonical_destination("Reykjavik").as_deref(), Some("Reykjavik"));
        // Country names are not rewritten into a city
        assert_eq!(canonical_destination("Japan").as_deref(), Some("Japan"));
        assert_eq!(canonical_destination("  "), None);
    }
}
