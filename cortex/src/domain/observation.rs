// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! Observation records: one tool-use lifecycle event per log line.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// Session assigned to observations that carry none.
pub const UNKNOWN_SESSION: &str = "unknown";

/// Lifecycle tag of an observation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ObservationEvent {
    ToolStart,
    ToolComplete,
    /// Any other lifecycle tag (session start/end, prompts, ...)
    #[default]
    #[serde(other)]
    Other,
}

/// A single immutable event read from the observation log.
///
/// Hooks are not strict about types: a numeric session or tool is kept as
/// its text. Tool names are folded onto one trimmed line.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Observation {
    #[serde(default, deserialize_with = "deserialize_session")]
    pub session: Option<String>,
    #[serde(default)]
    pub event: ObservationEvent,
    #[serde(default, deserialize_with = "deserialize_tool")]
    pub tool: Option<String>,
    /// Tool result. Usually a string, but hooks may record structured output.
    #[serde(default)]
    pub output: Option<Value>,
}

impl Observation {
    pub fn session_id(&self) -> &str {
        self.session.as_deref().unwrap_or(UNKNOWN_SESSION)
    }

    pub fn is_tool_event(&self) -> bool {
        matches!(
            self.event,
            ObservationEvent::ToolStart | ObservationEvent::ToolComplete
        )
    }

    /// Output rendered as text; `None` when absent or empty.
    pub fn output_text(&self) -> Option<String> {
        value_text(self.output.clone()?).filter(|text| !text.is_empty())
    }
}

/// Collapse whitespace and control characters into single spaces and trim
/// both ends.
pub fn single_line(text: &str) -> String {
    text.split(|c: char| c.is_whitespace() || c.is_control())
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

fn value_text(value: Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) => Some(s),
        other => Some(other.to_string()),
    }
}

fn deserialize_session<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<Value>::deserialize(deserializer)?.and_then(value_text))
}

fn deserialize_tool<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<Value>::deserialize(deserializer)?
        .and_then(value_text)
        .map(|tool| single_line(&tool))
        .filter(|tool| !tool.is_empty()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_tool_event() {
        let obs: Observation = serde_json::from_str(
            r#"{"session":"s1","event":"tool_complete","tool":"Bash","output":"ok"}"#,
        )
        .unwrap();
        assert_eq!(obs.event, ObservationEvent::ToolComplete);
        assert_eq!(obs.session_id(), "s1");
        assert_eq!(obs.output_text().as_deref(), Some("ok"));
    }

    #[test]
    fn test_unknown_event_and_missing_session() {
        let obs: Observation =
            serde_json::from_str(r#"{"event":"session_end","timestamp":"2026-01-01"}"#).unwrap();
        assert_eq!(obs.event, ObservationEvent::Other);
        assert_eq!(obs.session_id(), UNKNOWN_SESSION);
        assert!(!obs.is_tool_event());
    }

    #[test]
    fn test_structured_output_is_rendered() {
        let obs: Observation =
            serde_json::from_str(r#"{"event":"tool_complete","output":{"exit":1}}"#).unwrap();
        assert_eq!(obs.output_text().as_deref(), Some(r#"{"exit":1}"#));
    }

    #[test]
    fn test_non_string_session_and_tool_are_kept_as_text() {
        let obs: Observation =
            serde_json::from_str(r#"{"session":42,"event":"tool_start","tool":7}"#).unwrap();
        assert_eq!(obs.session_id(), "42");
        assert_eq!(obs.tool.as_deref(), Some("7"));

        let obs: Observation =
            serde_json::from_str(r#"{"session":null,"event":"tool_start","tool":null}"#).unwrap();
        assert_eq!(obs.session_id(), UNKNOWN_SESSION);
        assert!(obs.tool.is_none());
    }

    #[test]
    fn test_tool_names_are_folded_onto_one_line() {
        let obs: Observation = serde_json::from_str(
            r#"{"event":"tool_start","tool":"  Read\n## Evidence\t\u0007x "}"#,
        )
        .unwrap();
        assert_eq!(obs.tool.as_deref(), Some("Read ## Evidence x"));

        let blank: Observation =
            serde_json::from_str(r#"{"event":"tool_start","tool":" \n "}"#).unwrap();
        assert!(blank.tool.is_none());
    }

    #[test]
    fn test_single_line() {
        assert_eq!(single_line("Grep -> Read -> Edit "), "Grep -> Read -> Edit");
        assert_eq!(single_line("a\r\n\n b"), "a b");
        assert_eq!(single_line(""), "");
    }
}
