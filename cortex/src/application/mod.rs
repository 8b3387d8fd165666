// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! Application
//!
//! Analysis and evolution passes over the learning store.
//!
//! # Architecture
//!
//! - **Layer:** Application Layer
//! - **Purpose:** Pattern detection, instinct upsert, clustering and artifact synthesis

pub mod analyzer;
pub mod clustering;
pub mod detectors;
pub mod evolution;

pub use analyzer::{AnalysisReport, ObservationAnalyzer};
pub use clustering::{similarity, InstinctClusterer};
pub use detectors::{
    default_detectors, ErrorResolutionDetector, PatternDetector, ToolPreferenceDetector,
    WorkflowSequenceDetector,
};
pub use evolution::{
    artifact_name, classify, cluster_confidence, score_kinds, ClusterSummary, EvolutionOptions,
    EvolutionReport, EvolutionService, KindScores,
};
