// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! Domain events for the learning loop.
//! Recorded in pass reports so callers can log or export what changed.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::evolved::ArtifactKind;
use super::instinct::InstinctId;
use super::pattern::PatternType;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum LearningEvent {
    /// First detection of a pattern produced a new instinct
    InstinctCreated {
        instinct_id: InstinctId,
        pattern_type: PatternType,
        confidence: f64,
        observation_count: u32,
        timestamp: DateTime<Utc>,
    },

    /// A pattern was detected again and its instinct gained confidence
    InstinctReinforced {
        instinct_id: InstinctId,
        old_confidence: f64,
        new_confidence: f64,
        timestamp: DateTime<Utc>,
    },

    /// Clustering produced a group large enough to evolve
    ClusterFormed {
        instinct_ids: Vec<InstinctId>,
        timestamp: DateTime<Utc>,
    },

    /// An artifact was synthesized from a cluster
    ArtifactEvolved {
        name: String,
        kind: ArtifactKind,
        instinct_ids: Vec<InstinctId>,
        confidence: f64,
        written: bool,
        timestamp: DateTime<Utc>,
    },
}

impl LearningEvent {
    pub fn timestamp(&self) -> DateTime<Utc> {
        match self {
            LearningEvent::InstinctCreated { timestamp, .. } => *timestamp,
            LearningEvent::InstinctReinforced { timestamp, .. } => *timestamp,
            LearningEvent::ClusterFormed { timestamp, .. } => *timestamp,
            LearningEvent::ArtifactEvolved { timestamp, .. } => *timestamp,
        }
    }

    pub fn event_type(&self) -> &'static str {
        match self {
            LearningEvent::InstinctCreated { .. } => "instinct_created",
            LearningEvent::InstinctReinforced { .. } => "instinct_reinforced",
            LearningEvent::ClusterFormed { .. } => "cluster_formed",
            LearningEvent::ArtifactEvolved { .. } => "artifact_evolved",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_serialization() {
        let event = LearningEvent::InstinctReinforced {
            instinct_id: InstinctId::new("workflow-grep-read-edit"),
            old_confidence: 0.5,
            new_confidence: 0.55,
            timestamp: Utc::now(),
        };

        let json = serde_json::to_string(&event).unwrap();
        let deserialized: LearningEvent = serde_json::from_str(&json).unwrap();

        assert_eq!(event.event_type(), deserialized.event_type());
        assert!(json.contains(r#""type":"instinct_reinforced""#));
    }
}
