// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! Clusters of related instincts and the artifacts evolved from them.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;

use super::instinct::{Instinct, InstinctId};

/// A non-empty group of related instincts, valid for one evolution pass.
#[derive(Debug, Clone, PartialEq)]
pub struct InstinctCluster {
    members: Vec<Instinct>,
}

impl InstinctCluster {
    /// Returns `None` for an empty member list
    pub fn new(members: Vec<Instinct>) -> Option<Self> {
        if members.is_empty() {
            None
        } else {
            Some(Self { members })
        }
    }

    pub fn members(&self) -> &[Instinct] {
        &self.members
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    pub fn ids(&self) -> Vec<InstinctId> {
        self.members.iter().map(|i| i.id.clone()).collect()
    }

    pub fn total_observations(&self) -> u64 {
        self.members.iter().map(|i| u64::from(i.observation_count)).sum()
    }

    pub fn mean_confidence(&self) -> f64 {
        self.members.iter().map(|i| i.confidence).sum::<f64>() / self.members.len() as f64
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ArtifactKind {
    Skill,
    Command,
    Agent,
}

impl ArtifactKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ArtifactKind::Skill => "skill",
            ArtifactKind::Command => "command",
            ArtifactKind::Agent => "agent",
        }
    }

    /// Location of an artifact relative to the evolved directory
    pub fn relative_path(&self, name: &str) -> PathBuf {
        match self {
            ArtifactKind::Skill => PathBuf::from("skills").join(name).join("SKILL.md"),
            ArtifactKind::Command => PathBuf::from("commands").join(format!("{}.md", name)),
            ArtifactKind::Agent => PathBuf::from("agents").join(format!("{}.md", name)),
        }
    }
}

impl fmt::Display for ArtifactKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A skill, command or agent synthesized from one cluster.
#[derive(Debug, Clone, PartialEq)]
pub struct EvolvedArtifact {
    pub name: String,
    pub kind: ArtifactKind,
    pub confidence: f64,
    /// Source instinct ids, in cluster order
    pub evolved_from: Vec<InstinctId>,
    pub evolved_date: NaiveDate,
    pub cluster: InstinctCluster,
}

impl EvolvedArtifact {
    pub fn total_observations(&self) -> u64 {
        self.cluster.total_observations()
    }
}
