// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! Command implementations for the homunculus CLI

pub mod analyze;
pub mod config;
pub mod evolve;
pub mod instincts;

pub use self::analyze::AnalyzeArgs;
pub use self::config::ConfigCommand;
pub use self::evolve::EvolveArgs;
pub use self::instincts::InstinctsCommand;

use anyhow::{Context, Result};
use std::path::PathBuf;

use homunculus_cortex::{LearningConfig, LearningEvent};

/// Discover and load configuration, then apply environment overrides
pub fn load_config(config_override: Option<PathBuf>) -> Result<LearningConfig> {
    LearningConfig::load_or_default(config_override).context("Failed to load configuration")
}

/// Emit the events a pass recorded on the log stream
pub fn log_events(events: &[LearningEvent]) {
    for event in events {
        let detail = serde_json::to_string(event).unwrap_or_default();
        tracing::debug!(
            event_type = event.event_type(),
            timestamp = %event.timestamp(),
            %detail,
            "Learning event"
        );
    }
}
