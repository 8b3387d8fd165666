// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! # EvolutionService — Instincts → Skills, Commands, Agents
//!
//! Clusters stored instincts and synthesizes one artifact per cluster.
//!
//! ## Classification
//!
//! Triggers and actions of every member are lower-cased and joined; each
//! artifact kind scores one point per indicator phrase found in that text.
//! The highest score wins, ties go agent > command > skill, and a cluster
//! matching no indicator at all becomes a skill.
//!
//! ## Naming
//!
//! `<domain>-<word>-<word>`: the most frequent member domain followed by the
//! two most frequent action words longer than four characters that are not
//! stopwords. Frequency ties keep first-seen order.
//!
//! ## Confidence
//!
//! Mean member confidence plus a size boost and an evidence boost, each
//! bounded, capped at the ceiling.
//!
//! Without `execute` the pass is a preview: it reports every artifact and
//! where it would be written, and touches nothing.

use std::path::PathBuf;
use std::sync::Arc;

use chrono::{NaiveDate, Utc};
use indexmap::IndexMap;
use serde::Serialize;

use super::clustering::InstinctClusterer;
use crate::domain::{
    round_confidence, ArtifactKind, ArtifactRepository, ClassifierConfig, ConfidenceConfig,
    EvolvedArtifact, InstinctCluster, InstinctId, InstinctRepository, LearningConfig,
    LearningEvent, Result,
};

/// Indicator hits per artifact kind
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct KindScores {
    pub command: usize,
    pub agent: usize,
    pub skill: usize,
}

impl KindScores {
    /// Winning kind under the agent > command > skill tie order
    pub fn winner(&self) -> ArtifactKind {
        let ranked = [
            (ArtifactKind::Agent, self.agent),
            (ArtifactKind::Command, self.command),
            (ArtifactKind::Skill, self.skill),
        ];
        let mut best = (ArtifactKind::Skill, 0);
        for (kind, score) in ranked {
            if score > best.1 {
                best = (kind, score);
            }
        }
        best.0
    }
}

fn cluster_text(cluster: &InstinctCluster) -> String {
    let triggers: Vec<String> = cluster.members().iter().map(|m| m.trigger.to_lowercase()).collect();
    let actions: Vec<String> = cluster.members().iter().map(|m| m.action.to_lowercase()).collect();
    format!("{} {}", triggers.join(" "), actions.join(" "))
}

pub fn score_kinds(cluster: &InstinctCluster, config: &ClassifierConfig) -> KindScores {
    let text = cluster_text(cluster);
    let hits = |indicators: &[String]| {
        indicators
            .iter()
            .filter(|phrase| text.contains(phrase.to_lowercase().as_str()))
            .count()
    };
    KindScores {
        command: hits(&config.command_indicators),
        agent: hits(&config.agent_indicators),
        skill: hits(&config.skill_indicators),
    }
}

pub fn classify(cluster: &InstinctCluster, config: &ClassifierConfig) -> ArtifactKind {
    score_kinds(cluster, config).winner()
}

/// Most frequent items, first-seen order breaking ties
fn most_frequent<'a>(items: impl IntoIterator<Item = &'a str>, limit: usize) -> Vec<&'a str> {
    let mut counts: IndexMap<&str, usize> = IndexMap::new();
    for item in items {
        *counts.entry(item).or_default() += 1;
    }
    // Stable sort keeps first-seen order within equal counts
    counts.sort_by(|_, a, _, b| b.cmp(a));
    counts.into_iter().take(limit).map(|(item, _)| item).collect()
}

/// Artifact name for a cluster; never empty
pub fn artifact_name(cluster: &InstinctCluster, config: &ClassifierConfig) -> String {
    let domain = most_frequent(cluster.members().iter().map(|m| m.domain.as_str()), 1);

    let actions = cluster
        .members()
        .iter()
        .map(|m| m.action.to_lowercase())
        .collect::<Vec<_>>()
        .join(" ");
    let words = actions
        .split_whitespace()
        .filter(|w| w.chars().count() > config.name_min_word_len)
        .filter(|w| !config.name_stopwords.iter().any(|s| s.as_str() == *w));
    let top_words = most_frequent(words, 2);

    let joined = domain
        .into_iter()
        .chain(top_words)
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join("-")
        .to_lowercase();

    let name: String = joined
        .chars()
        .filter(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || *c == '-')
        .take(config.name_max_len)
        .collect();
    let name = name.trim_matches('-');

    if name.is_empty() {
        format!("evolved-{}", Utc::now().timestamp())
    } else {
        name.to_string()
    }
}

/// Confidence of an artifact evolved from `cluster`
pub fn cluster_confidence(cluster: &InstinctCluster, config: &ConfidenceConfig) -> f64 {
    let size_boost = (cluster.len() as f64 * config.cluster_size_boost).min(config.cluster_size_cap);
    let evidence_boost = (cluster.total_observations() as f64 * config.cluster_observation_boost)
        .min(config.cluster_observation_cap);
    round_confidence((cluster.mean_confidence() + size_boost + evidence_boost).min(config.ceiling))
}

#[derive(Debug, Clone, Default)]
pub struct EvolutionOptions {
    /// Write artifacts; otherwise preview only
    pub execute: bool,
    /// Restrict clustering to instincts of this domain
    pub domain: Option<String>,
    /// Overrides the configured minimum cluster size
    pub min_cluster_size: Option<usize>,
}

/// One evolved cluster as reported to the caller
#[derive(Debug, Clone, Serialize)]
pub struct ClusterSummary {
    pub name: String,
    #[serde(rename = "type")]
    pub kind: ArtifactKind,
    pub instincts: Vec<InstinctId>,
    pub confidence: f64,
    pub observations: u64,
    pub path: PathBuf,
    pub created: bool,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct EvolutionReport {
    pub clusters: Vec<ClusterSummary>,
    /// Paths written in this pass
    pub created: Vec<PathBuf>,
    /// Instincts considered after domain filtering
    #[serde(skip)]
    pub analyzed: usize,
    #[serde(skip)]
    pub events: Vec<LearningEvent>,
}

pub struct EvolutionService {
    instincts: Arc<dyn InstinctRepository>,
    artifacts: Arc<dyn ArtifactRepository>,
    config: LearningConfig,
    today: NaiveDate,
}

impl EvolutionService {
    pub fn new(
        instincts: Arc<dyn InstinctRepository>,
        artifacts: Arc<dyn ArtifactRepository>,
        config: LearningConfig,
    ) -> Self {
        Self {
            instincts,
            artifacts,
            config,
            today: Utc::now().date_naive(),
        }
    }

    /// Date stamped as `evolved_date`
    pub fn with_date(mut self, today: NaiveDate) -> Self {
        self.today = today;
        self
    }

    pub fn evolve(&self, options: &EvolutionOptions) -> Result<EvolutionReport> {
        let mut instincts = self.instincts.load_all()?;
        if let Some(domain) = options.domain.as_deref() {
            instincts.retain(|i| i.domain.as_str() == domain);
        }

        let mut report = EvolutionReport {
            analyzed: instincts.len(),
            ..EvolutionReport::default()
        };

        if instincts.is_empty() {
            tracing::info!(domain = ?options.domain, "No instincts to evolve");
            return Ok(report);
        }

        let min_cluster_size = options
            .min_cluster_size
            .unwrap_or(self.config.clustering.min_cluster_size);
        let clusterer = InstinctClusterer::new(self.config.clustering.clone())
            .with_min_cluster_size(min_cluster_size);

        for cluster in clusterer.cluster(&instincts) {
            let timestamp = Utc::now();
            let ids = cluster.ids();
            report.events.push(LearningEvent::ClusterFormed {
                instinct_ids: ids.clone(),
                timestamp,
            });

            let artifact = EvolvedArtifact {
                name: artifact_name(&cluster, &self.config.classifier),
                kind: classify(&cluster, &self.config.classifier),
                confidence: cluster_confidence(&cluster, &self.config.confidence),
                evolved_from: ids.clone(),
                evolved_date: self.today,
                cluster,
            };

            let (path, created) = if options.execute {
                let path = self.artifacts.save(&artifact)?;
                tracing::info!(name = %artifact.name, kind = %artifact.kind, path = %path.display(), "Evolved artifact written");
                report.created.push(path.clone());
                (path, true)
            } else {
                (self.artifacts.location(&artifact), false)
            };

            report.events.push(LearningEvent::ArtifactEvolved {
                name: artifact.name.clone(),
                kind: artifact.kind,
                instinct_ids: ids.clone(),
                confidence: artifact.confidence,
                written: created,
                timestamp,
            });

            report.clusters.push(ClusterSummary {
                observations: artifact.total_observations(),
                name: artifact.name,
                kind: artifact.kind,
                instincts: ids,
                confidence: artifact.confidence,
                path,
                created,
            });
        }

        tracing::info!(
            instincts = report.analyzed,
            clusters = report.clusters.len(),
            written = report.created.len(),
            min_cluster_size,
            "Evolution complete"
        );

        Ok(report)
    }
}
