//! Extracted travel context and its merge policy.
//!
//! Every agent invocation may infer a [`ContextDelta`]. Deltas are folded into
//! a session's [`ExtractedContext`] with two rules:
//!
//! - scalar keys are **last-write-wins**;
//! - list keys (`destinations`, `interests`) are **appended and de-duplicated**
//!   (case-insensitive, first spelling kept).
//!
//! `preferences` merges key by key, last write wins per key.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::str::FromStr;

/// Spending tier for a trip.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BudgetLevel {
    Low,
    Medium,
    High,
}

impl BudgetLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            BudgetLevel::Low => "low",
            BudgetLevel::Medium => "medium",
            BudgetLevel::High => "high",
        }
    }
}

impl std::fmt::Display for BudgetLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BudgetLevel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "low" | "budget" | "cheap" => Ok(BudgetLevel::Low),
            "medium" | "mid" | "moderate" => Ok(BudgetLevel::Medium),
            "high" | "luxury" | "premium" => Ok(BudgetLevel::High),
            other => Err(format!("unknown budget level '{other}'")),
        }
    }
}

/// State of a planning request that spans turns.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", content = "request", rename_all = "snake_case")]
pub enum PlanningStatus {
    /// A planning request is waiting on more details.
    Open(String),
    /// The outstanding request was answered.
    Resolved,
}

/// Structured facts accumulated over a session.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ExtractedContext {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub destinations: Vec<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub budget_level: Option<BudgetLevel>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub travel_dates: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration_days: Option<u32>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub travelers: Option<u32>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub interests: Vec<String>,

    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub preferences: BTreeMap<String, String>,

    /// An unresolved planning request from an earlier turn.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub open_planning: Option<String>,
}

/// A partial update to an [`ExtractedContext`]. `None` means "no opinion".
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ContextDelta {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub destinations: Vec<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub budget_level: Option<BudgetLevel>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub travel_dates: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration_days: Option<u32>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub travelers: Option<u32>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub interests: Vec<String>,

    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub preferences: BTreeMap<String, String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub planning: Option<PlanningStatus>,
}

impl ExtractedContext {
    /// Apply a delta under the merge policy described at module level.
    pub fn merge(&mut self, delta: &ContextDelta) {
        append_dedup(&mut self.destinations, &delta.destinations);
        append_dedup(&mut self.interests, &delta.interests);

        if let Some(level) = delta.budget_level {
            self.budget_level = Some(level);
        }
        if let Some(dates) = &delta.travel_dates {
            self.travel_dates = Some(dates.clone());
        }
        if let Some(days) = delta.duration_days {
            self.duration_days = Some(days);
        }
        if let Some(n) = delta.travelers {
            self.travelers = Some(n);
        }
        for (key, value) in &delta.preferences {
            self.preferences.insert(key.clone(), value.clone());
        }
        match &delta.planning {
            Some(PlanningStatus::Open(request)) => self.open_planning = Some(request.clone()),
            Some(PlanningStatus::Resolved) => self.open_planning = None,
            None => {}
        }
    }

    /// A copy of this context with `delta` applied.
    pub fn merged(&self, delta: &ContextDelta) -> Self {
        let mut next = self.clone();
        next.merge(delta);
        next
    }

    pub fn has_open_planning(&self) -> bool {
        self.open_planning.is_some()
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// Render the context as a bullet list for inclusion in instructions.
    pub fn render(&self) -> String {
        let mut lines = Vec::new();
        if !self.destinations.is_empty() {
            lines.push(format!("- destinations: {}", self.destinations.join(", ")));
        }
        if let Some(level) = self.budget_level {
            lines.push(format!("- budget_level: {level}"));
        }
        if let Some(dates) = &self.travel_dates {
            lines.push(format!("- travel_dates: {dates}"));
        }
        if let Some(days) = self.duration_days {
            lines.push(format!("- duration_days: {days}"));
        }
        if let Some(n) = self.travelers {
            lines.push(format!("- travelers: {n}"));
        }
        if !self.interests.is_empty() {
            lines.push(format!("- interests: {}", self.interests.join(", ")));
        }
        for (key, value) in &self.preferences {
            lines.push(format!("- preference.{key}: {value}"));
        }
        if let Some(request) = &self.open_planning {
            lines.push(format!("- open_planning_request: {request}"));
        }
        lines.join("\n")
    }
}

impl ContextDelta {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

fn append_dedup(target: &mut Vec<String>, incoming: &[String]) {
    for item in incoming {
        let item = item.trim();
        if item.is_empty() {
            continue;
        }
        if !target.iter().any(|existing| existing.eq_ignore_ascii_case(item)) {
            target.push(item.to_string());
        }
    }
}
