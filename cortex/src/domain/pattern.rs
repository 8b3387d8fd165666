// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! Detected patterns.
//!
//! A [`Pattern`] is the ephemeral output of one detector over one analysis
//! pass. Patterns are never persisted; they only feed instinct creation and
//! reinforcement, and the [`InstinctId`] they map to is a pure function of the
//! pattern's identity so that repeated detection lands on the same record.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;

use super::instinct::InstinctId;

/// Maximum length of the slug part of an instinct id.
pub const ID_SLUG_MAX_LEN: usize = 50;

static NON_ALPHANUMERIC: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[^a-z0-9]+").expect("static regex"));

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PatternType {
    Workflow,
    ToolPreference,
    ErrorResolution,
}

impl PatternType {
    pub fn as_str(&self) -> &'static str {
        match self {
            PatternType::Workflow => "workflow",
            PatternType::ToolPreference => "tool-preference",
            PatternType::ErrorResolution => "error-resolution",
        }
    }
}

impl fmt::Display for PatternType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum Pattern {
    /// A recurring tool sequence, e.g. `Grep -> Read -> Edit`
    Workflow {
        sequence: String,
        count: u32,
        sessions: usize,
    },
    /// A tool used for a large share of all tool invocations
    ToolPreference {
        tool: String,
        count: u32,
        /// Share of all tool starts, as a rounded percentage
        ratio: u32,
    },
    /// A tool whose error was repeatedly followed by a successful other call
    ErrorResolution {
        error_tool: String,
        resolution_tool: String,
        count: u32,
    },
}

impl Pattern {
    pub fn pattern_type(&self) -> PatternType {
        match self {
            Pattern::Workflow { .. } => PatternType::Workflow,
            Pattern::ToolPreference { .. } => PatternType::ToolPreference,
            Pattern::ErrorResolution { .. } => PatternType::ErrorResolution,
        }
    }

    /// Support count backing this pattern
    pub fn count(&self) -> u32 {
        match self {
            Pattern::Workflow { count, .. }
            | Pattern::ToolPreference { count, .. }
            | Pattern::ErrorResolution { count, .. } => *count,
        }
    }

    /// The type-specific payload that identifies the pattern
    pub fn payload(&self) -> String {
        match self {
            Pattern::Workflow { sequence, .. } => sequence.clone(),
            Pattern::ToolPreference { tool, .. } => tool.clone(),
            Pattern::ErrorResolution {
                error_tool,
                resolution_tool,
                ..
            } => format!("{}-{}", error_tool, resolution_tool),
        }
    }

    /// Deterministic instinct id: `<type>-<slug(payload)>`.
    pub fn instinct_id(&self) -> InstinctId {
        InstinctId(format!("{}-{}", self.pattern_type(), slugify(&self.payload())))
    }
}

/// Lowercase, collapse non-alphanumeric runs to `-`, trim dashes and
/// truncate. Total over all inputs; truncation collisions are accepted.
pub fn slugify(text: &str) -> String {
    let lowered = text.to_lowercase();
    let dashed = NON_ALPHANUMERIC.replace_all(&lowered, "-");
    dashed
        .trim_matches('-')
        .chars()
        .take(ID_SLUG_MAX_LEN)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_workflow_id() {
        let pattern = Pattern::Workflow {
            sequence: "Grep -> Read -> Edit".to_string(),
            count: 3,
            sessions: 1,
        };
        assert_eq!(pattern.instinct_id().as_str(), "workflow-grep-read-edit");
    }

    #[test]
    fn test_id_ignores_support_count() {
        let a = Pattern::ErrorResolution {
            error_tool: "Bash".to_string(),
            resolution_tool: "Edit".to_string(),
            count: 2,
        };
        let b = Pattern::ErrorResolution {
            error_tool: "Bash".to_string(),
            resolution_tool: "Edit".to_string(),
            count: 9,
        };
        assert_eq!(a.instinct_id(), b.instinct_id());
        assert_eq!(a.instinct_id().as_str(), "error-resolution-bash-edit");
    }

    #[test]
    fn test_slugify_truncates_and_trims() {
        assert_eq!(slugify("  --Hello, World!--  "), "hello-world");
        assert_eq!(slugify(&"a".repeat(80)).len(), ID_SLUG_MAX_LEN);
        assert_eq!(slugify("!!!"), "");
    }

    #[test]
    fn test_pattern_serializes_with_type_tag() {
        let pattern = Pattern::ToolPreference {
            tool: "Read".to_string(),
            count: 7,
            ratio: 70,
        };
        let json = serde_json::to_value(&pattern).unwrap();
        assert_eq!(json["type"], "tool-preference");
        assert_eq!(json["ratio"], 70);
    }
}
