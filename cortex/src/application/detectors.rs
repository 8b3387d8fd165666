// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! # Pattern Detectors
//!
//! Three independent analyzers over the same observation list. Each is a
//! pure function of (observations, thresholds): no I/O, no shared state.
//!
//! | Detector | Emits | Rule |
//! |----------|-------|------|
//! | [`WorkflowSequenceDetector`] | `workflow` | length-3 tool windows per session seen ≥ 3 times |
//! | [`ToolPreferenceDetector`] | `tool-preference` | tool share of `tool_start` > 20% and count ≥ 5 |
//! | [`ErrorResolutionDetector`] | `error-resolution` | error followed within 4 observations by a clean completion, ≥ 2 times |
//!
//! Output order follows first occurrence in the log, so repeated runs over
//! the same log emit identical pattern lists.

use std::collections::HashSet;

use indexmap::IndexMap;

use crate::domain::{DetectionConfig, Observation, ObservationEvent, Pattern};

/// Tool name recorded when an error or resolution event carries none
pub const UNKNOWN_TOOL: &str = "unknown";

/// Separator between tool names in a workflow sequence key
pub const SEQUENCE_SEPARATOR: &str = " -> ";

pub trait PatternDetector: Send + Sync {
    fn name(&self) -> &'static str;

    fn detect(&self, observations: &[Observation]) -> Vec<Pattern>;
}

/// Every detector with thresholds taken from `config`
pub fn default_detectors(config: &DetectionConfig) -> Vec<Box<dyn PatternDetector>> {
    vec![
        Box::new(WorkflowSequenceDetector::new(config)),
        Box::new(ToolPreferenceDetector::new(config)),
        Box::new(ErrorResolutionDetector::new(config)),
    ]
}

pub struct WorkflowSequenceDetector {
    window: usize,
    min_count: u32,
    min_sessions: usize,
}

impl WorkflowSequenceDetector {
    pub fn new(config: &DetectionConfig) -> Self {
        Self {
            window: config.workflow_window.max(1),
            min_count: config.workflow_min_count,
            min_sessions: config.workflow_min_sessions,
        }
    }
}

#[derive(Default)]
struct SequenceStats<'a> {
    count: u32,
    sessions: HashSet<&'a str>,
}

impl PatternDetector for WorkflowSequenceDetector {
    fn name(&self) -> &'static str {
        "workflow"
    }

    fn detect(&self, observations: &[Observation]) -> Vec<Pattern> {
        let mut sessions: IndexMap<&str, Vec<&str>> = IndexMap::new();
        for obs in observations.iter().filter(|o| o.is_tool_event()) {
            if let Some(tool) = obs.tool.as_deref() {
                sessions.entry(obs.session_id()).or_default().push(tool);
            }
        }

        let mut sequences: IndexMap<String, SequenceStats> = IndexMap::new();
        for (session, tools) in sessions {
            for window in tools.windows(self.window) {
                let stats = sequences
                    .entry(window.join(SEQUENCE_SEPARATOR))
                    .or_default();
                stats.count += 1;
                stats.sessions.insert(session);
            }
        }

        sequences
            .into_iter()
            .filter(|(_, stats)| {
                stats.count >= self.min_count && stats.sessions.len() >= self.min_sessions
            })
            .map(|(sequence, stats)| Pattern::Workflow {
                sequence,
                count: stats.count,
                sessions: stats.sessions.len(),
            })
            .collect()
    }
}

pub struct ToolPreferenceDetector {
    min_ratio: f64,
    min_count: u32,
}

impl ToolPreferenceDetector {
    pub fn new(config: &DetectionConfig) -> Self {
        Self {
            min_ratio: config.preference_min_ratio,
            min_count: config.preference_min_count,
        }
    }
}

impl PatternDetector for ToolPreferenceDetector {
    fn name(&self) -> &'static str {
        "tool-preference"
    }

    fn detect(&self, observations: &[Observation]) -> Vec<Pattern> {
        let mut usage: IndexMap<&str, u32> = IndexMap::new();
        for obs in observations {
            if obs.event == ObservationEvent::ToolStart {
                if let Some(tool) = obs.tool.as_deref() {
                    *usage.entry(tool).or_default() += 1;
                }
            }
        }

        let total: u32 = usage.values().sum();
        if total == 0 {
            return Vec::new();
        }

        usage
            .into_iter()
            .filter_map(|(tool, count)| {
                let ratio = f64::from(count) / f64::from(total);
                (ratio > self.min_ratio && count >= self.min_count).then(|| {
                    Pattern::ToolPreference {
                        tool: tool.to_string(),
                        count,
                        ratio: (ratio * 100.0).round() as u32,
                    }
                })
            })
            .collect()
    }
}

pub struct ErrorResolutionDetector {
    lookahead: usize,
    min_count: u32,
    markers: Vec<String>,
}

impl ErrorResolutionDetector {
    pub fn new(config: &DetectionConfig) -> Self {
        Self {
            lookahead: config.error_lookahead,
            min_count: config.error_min_count,
            markers: config.error_markers.iter().map(|m| m.to_lowercase()).collect(),
        }
    }

    fn is_error(&self, output: &str) -> bool {
        let output = output.to_lowercase();
        self.markers.iter().any(|marker| output.contains(marker.as_str()))
    }

    /// Output text of a completion event, if it has any
    fn completion_output(obs: &Observation) -> Option<String> {
        if obs.event == ObservationEvent::ToolComplete {
            obs.output_text()
        } else {
            None
        }
    }
}

impl PatternDetector for ErrorResolutionDetector {
    fn name(&self) -> &'static str {
        "error-resolution"
    }

    fn detect(&self, observations: &[Observation]) -> Vec<Pattern> {
        let mut pairs: IndexMap<(&str, &str), u32> = IndexMap::new();

        for (i, obs) in observations.iter().enumerate() {
            let is_error = Self::completion_output(obs).is_some_and(|out| self.is_error(&out));
            if !is_error {
                continue;
            }

            let end = observations.len().min(i + 1 + self.lookahead);
            let resolution = observations[i + 1..end].iter().find(|next| {
                Self::completion_output(next).is_some_and(|out| !self.is_error(&out))
            });

            if let Some(resolution) = resolution {
                let error_tool = obs.tool.as_deref().unwrap_or(UNKNOWN_TOOL);
                let resolution_tool = resolution.tool.as_deref().unwrap_or(UNKNOWN_TOOL);
                *pairs.entry((error_tool, resolution_tool)).or_default() += 1;
            }
        }

        pairs
            .into_iter()
            .filter(|(_, count)| *count >= self.min_count)
            .map(|((error_tool, resolution_tool), count)| Pattern::ErrorResolution {
                error_tool: error_tool.to_string(),
                resolution_tool: resolution_tool.to_string(),
                count,
            })
            .collect()
    }
}
