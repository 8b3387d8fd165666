// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! # Instinct — durable unit of learned behavior
//!
//! An instinct pairs a human-readable trigger with a prescribed action and a
//! confidence score. It is created the first time a [`Pattern`] is detected
//! and reinforced every time the same pattern is detected again.
//!
//! ## Confidence lifecycle
//!
//! - **Creation**: confidence comes from a step function of the pattern's
//!   support count ([`ConfidenceConfig::steps`]).
//! - **Reinforcement**: each re-detection adds a fixed increment, capped at
//!   the ceiling (0.95 by default).
//!
//! There is no decay: confidence never decreases over the life of a record.
//! Values are kept at two decimals so the persisted document round-trips
//! exactly.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;

use super::config::ConfidenceConfig;
use super::observation::single_line;
use super::pattern::Pattern;

/// Provenance tag of instincts produced by observation analysis
pub const SESSION_OBSERVATION_SOURCE: &str = "session-observation";

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct InstinctId(pub String);

impl InstinctId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// `workflow-grep-read` -> `Workflow Grep Read`
    pub fn title(&self) -> String {
        title_case(&self.0)
    }
}

impl fmt::Display for InstinctId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Coarse category of an instinct. Unknown values read from disk are kept
/// verbatim so foreign instincts still cluster by their own domain.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum InstinctDomain {
    Workflow,
    ToolUsage,
    ErrorHandling,
    General,
    Other(String),
}

impl InstinctDomain {
    pub fn as_str(&self) -> &str {
        match self {
            InstinctDomain::Workflow => "workflow",
            InstinctDomain::ToolUsage => "tool-usage",
            InstinctDomain::ErrorHandling => "error-handling",
            InstinctDomain::General => "general",
            InstinctDomain::Other(other) => other,
        }
    }
}

impl From<String> for InstinctDomain {
    fn from(value: String) -> Self {
        match value.as_str() {
            "workflow" => InstinctDomain::Workflow,
            "tool-usage" => InstinctDomain::ToolUsage,
            "error-handling" => InstinctDomain::ErrorHandling,
            "general" | "" => InstinctDomain::General,
            _ => InstinctDomain::Other(value),
        }
    }
}

impl From<&str> for InstinctDomain {
    fn from(value: &str) -> Self {
        InstinctDomain::from(value.to_string())
    }
}

impl From<InstinctDomain> for String {
    fn from(value: InstinctDomain) -> Self {
        value.as_str().to_string()
    }
}

impl fmt::Display for InstinctDomain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Instinct {
    pub id: InstinctId,
    pub trigger: String,
    pub action: String,
    pub domain: InstinctDomain,
    pub confidence: f64,
    pub observation_count: u32,
    pub source: String,
    pub last_updated: NaiveDate,
}

impl Instinct {
    /// First detection of a pattern
    pub fn from_pattern(pattern: &Pattern, config: &ConfidenceConfig, today: NaiveDate) -> Self {
        let (trigger, action, domain) = describe(pattern);
        Self {
            id: pattern.instinct_id(),
            trigger,
            action,
            domain,
            confidence: initial_confidence(pattern.count(), config),
            observation_count: pattern.count().max(1),
            source: SESSION_OBSERVATION_SOURCE.to_string(),
            last_updated: today,
        }
    }

    /// Re-detection of the pattern this instinct was built from. Confidence
    /// grows by one increment; descriptive fields are refreshed from the
    /// latest evidence.
    pub fn reinforce(&mut self, pattern: &Pattern, config: &ConfidenceConfig, today: NaiveDate) {
        let (trigger, action, domain) = describe(pattern);
        self.trigger = trigger;
        self.action = action;
        self.domain = domain;
        self.confidence = reinforced_confidence(self.confidence, config);
        self.observation_count = pattern.count().max(1);
        self.last_updated = today;
    }
}

/// Trigger, action and domain rendered for a pattern. Trigger and action
/// are single trimmed lines so they survive the document round trip.
fn describe(pattern: &Pattern) -> (String, String, InstinctDomain) {
    let (trigger, action, domain) = match pattern {
        Pattern::Workflow { sequence, .. } => (
            "when performing multi-step code operations".to_string(),
            format!("Follow the workflow pattern: {}", sequence),
            InstinctDomain::Workflow,
        ),
        Pattern::ToolPreference { tool, ratio, .. } => (
            "when needing to use development tools".to_string(),
            format!("Prefer using {} (used {}% of the time)", tool, ratio),
            InstinctDomain::ToolUsage,
        ),
        Pattern::ErrorResolution {
            error_tool,
            resolution_tool,
            ..
        } => (
            format!("when {} produces an error", error_tool),
            format!("Try using {} to resolve the issue", resolution_tool),
            InstinctDomain::ErrorHandling,
        ),
    };
    (single_line(&trigger), single_line(&action), domain)
}

/// Confidence assigned on first detection
pub fn initial_confidence(count: u32, config: &ConfidenceConfig) -> f64 {
    let raw = config
        .steps
        .iter()
        .find(|step| count <= step.max_count)
        .map(|step| step.confidence)
        .unwrap_or(config.top);
    round_confidence(raw.min(config.ceiling))
}

/// Confidence after one more confirmation. Never lower than `current` once
/// that is brought into `[0, ceiling]`.
pub fn reinforced_confidence(current: f64, config: &ConfidenceConfig) -> f64 {
    let current = clamp_confidence(current, config.ceiling);
    let next = round_confidence((current + config.increment).min(config.ceiling));
    next.max(current)
}

/// `value` limited to `[0, ceiling]`; non-finite values count as zero
pub fn clamp_confidence(value: f64, ceiling: f64) -> f64 {
    if value.is_finite() {
        value.clamp(0.0, ceiling)
    } else {
        0.0
    }
}

/// Two-decimal rounding used for every persisted confidence value
pub fn round_confidence(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// `tool-usage-read` -> `Tool Usage Read`
pub fn title_case(slug: &str) -> String {
    slug.split('-')
        .filter(|w| !w.is_empty())
        .map(|w| {
            let mut chars = w.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 3, 14).unwrap()
    }

    fn workflow(count: u32) -> Pattern {
        Pattern::Workflow {
            sequence: "Grep -> Read -> Edit".to_string(),
            count,
            sessions: 1,
        }
    }

    #[test]
    fn test_initial_confidence_steps() {
        let config = ConfidenceConfig::default();
        assert_eq!(initial_confidence(1, &config), 0.3);
        assert_eq!(initial_confidence(2, &config), 0.3);
        assert_eq!(initial_confidence(3, &config), 0.5);
        assert_eq!(initial_confidence(5, &config), 0.5);
        assert_eq!(initial_confidence(10, &config), 0.7);
        assert_eq!(initial_confidence(11, &config), 0.85);
        assert_eq!(initial_confidence(10_000, &config), 0.85);
    }

    #[test]
    fn test_reinforcement_is_capped_and_monotonic() {
        let config = ConfidenceConfig::default();
        let mut confidence = 0.85;
        for _ in 0..10 {
            let next = reinforced_confidence(confidence, &config);
            assert!(next >= confidence);
            assert!(next <= 0.95);
            confidence = next;
        }
        assert_eq!(confidence, 0.95);

        // Hand-edited values outside the range are pulled back into it
        assert_eq!(reinforced_confidence(0.99, &config), 0.95);
        assert_eq!(reinforced_confidence(3.5, &config), 0.95);
        assert_eq!(reinforced_confidence(-1.0, &config), 0.05);
        assert_eq!(reinforced_confidence(f64::NAN, &config), 0.05);
    }

    #[test]
    fn test_clamp_confidence() {
        assert_eq!(clamp_confidence(0.4, 0.95), 0.4);
        assert_eq!(clamp_confidence(1.7, 0.95), 0.95);
        assert_eq!(clamp_confidence(-0.2, 0.95), 0.0);
        assert_eq!(clamp_confidence(f64::INFINITY, 0.95), 0.0);
    }

    #[test]
    fn test_actions_are_single_trimmed_lines() {
        let config = ConfidenceConfig::default();
        let workflow = Pattern::Workflow {
            sequence: "Grep -> Read -> Edit ".to_string(),
            count: 3,
            sessions: 1,
        };
        let instinct = Instinct::from_pattern(&workflow, &config, today());
        assert_eq!(instinct.action, "Follow the workflow pattern: Grep -> Read -> Edit");

        let preference = Pattern::ToolPreference {
            tool: "Read\n## Evidence".to_string(),
            count: 7,
            ratio: 70,
        };
        let instinct = Instinct::from_pattern(&preference, &config, today());
        assert_eq!(instinct.action, "Prefer using Read ## Evidence (used 70% of the time)");
    }

    #[test]
    fn test_from_pattern_and_reinforce() {
        let config = ConfidenceConfig::default();
        let mut instinct = Instinct::from_pattern(&workflow(3), &config, today());
        assert_eq!(instinct.id.as_str(), "workflow-grep-read-edit");
        assert_eq!(instinct.domain, InstinctDomain::Workflow);
        assert_eq!(instinct.confidence, 0.5);
        assert_eq!(instinct.action, "Follow the workflow pattern: Grep -> Read -> Edit");

        let later = NaiveDate::from_ymd_opt(2026, 3, 15).unwrap();
        instinct.reinforce(&workflow(4), &config, later);
        assert_eq!(instinct.confidence, 0.55);
        assert_eq!(instinct.observation_count, 4);
        assert_eq!(instinct.last_updated, later);
    }

    #[test]
    fn test_domain_keeps_unknown_values() {
        assert_eq!(InstinctDomain::from("workflow"), InstinctDomain::Workflow);
        assert_eq!(InstinctDomain::from(""), InstinctDomain::General);
        let custom = InstinctDomain::from("testing");
        assert_eq!(custom.as_str(), "testing");
    }

    #[test]
    fn test_title_case() {
        assert_eq!(title_case("workflow-grep-read-edit"), "Workflow Grep Read Edit");
        assert_eq!(InstinctId::new("tool-preference-read").title(), "Tool Preference Read");
    }
}
