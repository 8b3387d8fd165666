// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! # ObservationAnalyzer — Observations → Instincts
//!
//! Runs every [`PatternDetector`] over the observation log and folds the
//! detected patterns into the instinct store.
//!
//! ## Upsert
//!
//! Each pattern maps to a deterministic [`InstinctId`]. An unknown id
//! creates an instinct whose confidence comes from the step table; a known
//! id is reinforced by one increment up to the ceiling. Two patterns whose
//! ids collide after slug truncation merge onto one record: the second one
//! counts as an update.
//!
//! A dry run performs the same bookkeeping against an in-pass copy of the
//! store and writes nothing.

use std::collections::BTreeMap;
use std::sync::Arc;

use chrono::{NaiveDate, Utc};
use serde::Serialize;

use super::detectors::{default_detectors, PatternDetector};
use crate::domain::{
    ConfidenceConfig, Instinct, InstinctId, InstinctRepository, LearningConfig, LearningEvent,
    Observation, Pattern, Result,
};

/// Outcome of one analysis pass
#[derive(Debug, Clone, Default, Serialize)]
pub struct AnalysisReport {
    /// Observations read from the log
    pub analyzed: usize,
    /// Patterns emitted by all detectors
    pub patterns: usize,
    pub created: usize,
    pub updated: usize,
    #[serde(skip)]
    pub events: Vec<LearningEvent>,
}

pub struct ObservationAnalyzer {
    repository: Arc<dyn InstinctRepository>,
    detectors: Vec<Box<dyn PatternDetector>>,
    confidence: ConfidenceConfig,
    today: NaiveDate,
    dry_run: bool,
}

impl ObservationAnalyzer {
    pub fn new(repository: Arc<dyn InstinctRepository>, config: &LearningConfig) -> Self {
        Self {
            repository,
            detectors: default_detectors(&config.detection),
            confidence: config.confidence.clone(),
            today: Utc::now().date_naive(),
            dry_run: false,
        }
    }

    /// Date stamped on created and reinforced instincts
    pub fn with_date(mut self, today: NaiveDate) -> Self {
        self.today = today;
        self
    }

    pub fn with_dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    pub fn with_detectors(mut self, detectors: Vec<Box<dyn PatternDetector>>) -> Self {
        self.detectors = detectors;
        self
    }

    /// All patterns, in detector order
    pub fn detect(&self, observations: &[Observation]) -> Vec<Pattern> {
        self.detectors
            .iter()
            .flat_map(|detector| {
                let patterns = detector.detect(observations);
                tracing::debug!(detector = detector.name(), count = patterns.len(), "Detector finished");
                patterns
            })
            .collect()
    }

    pub fn analyze(&self, observations: &[Observation]) -> Result<AnalysisReport> {
        let mut report = AnalysisReport {
            analyzed: observations.len(),
            ..AnalysisReport::default()
        };

        if observations.is_empty() {
            tracing::info!("No observations to analyze");
            return Ok(report);
        }

        let patterns = self.detect(observations);
        report.patterns = patterns.len();

        let mut store = self.repository.load()?;
        let mut touched: Vec<InstinctId> = Vec::new();

        for pattern in &patterns {
            let id = pattern.instinct_id();
            let timestamp = Utc::now();

            match store.get_mut(&id) {
                Some(existing) => {
                    let old_confidence = existing.confidence;
                    existing.reinforce(pattern, &self.confidence, self.today);
                    tracing::debug!(
                        instinct_id = %id,
                        old_confidence,
                        new_confidence = existing.confidence,
                        "Reinforced instinct"
                    );
                    report.updated += 1;
                    report.events.push(LearningEvent::InstinctReinforced {
                        instinct_id: id.clone(),
                        old_confidence,
                        new_confidence: existing.confidence,
                        timestamp,
                    });
                }
                None => {
                    let instinct = Instinct::from_pattern(pattern, &self.confidence, self.today);
                    tracing::debug!(
                        instinct_id = %id,
                        confidence = instinct.confidence,
                        "Created instinct"
                    );
                    report.created += 1;
                    report.events.push(LearningEvent::InstinctCreated {
                        instinct_id: id.clone(),
                        pattern_type: pattern.pattern_type(),
                        confidence: instinct.confidence,
                        observation_count: instinct.observation_count,
                        timestamp,
                    });
                    store.insert(id.clone(), instinct);
                }
            }

            if !touched.contains(&id) {
                touched.push(id);
            }
        }

        if !self.dry_run {
            self.persist(&store, &touched)?;
        }

        tracing::info!(
            analyzed = report.analyzed,
            patterns = report.patterns,
            created = report.created,
            updated = report.updated,
            dry_run = self.dry_run,
            "Analysis complete"
        );

        Ok(report)
    }

    fn persist(&self, store: &BTreeMap<InstinctId, Instinct>, touched: &[InstinctId]) -> Result<()> {
        for id in touched {
            if let Some(instinct) = store.get(id) {
                self.repository.save(instinct)?;
            }
        }
        Ok(())
    }
}
