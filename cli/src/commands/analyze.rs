// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! Observation analysis command
//!
//! Reads the observation log, upserts instincts and prints a one-line JSON
//! summary (`{"analyzed":..,"patterns":..,"created":..,"updated":..}`) on
//! stdout. Diagnostics go to stderr through the tracing subscriber.

use anyhow::{Context, Result};
use chrono::Utc;
use clap::Args;
use std::path::PathBuf;
use std::sync::Arc;

use homunculus_cortex::{
    AnalysisReport, FileInstinctRepository, LearningConfig, ObservationAnalyzer, ObservationLog,
    StoreLock,
};

#[derive(Args, Debug, Clone, Default)]
pub struct AnalyzeArgs {
    /// Show detailed analysis output on stderr
    #[arg(long)]
    pub verbose: bool,

    /// Analyze but don't write instinct files
    #[arg(long)]
    pub dry_run: bool,
}

pub fn handle_command(args: AnalyzeArgs, config_override: Option<PathBuf>) -> Result<()> {
    let config = super::load_config(config_override)?;
    let report = run(&args, &config)?;
    println!("{}", serde_json::to_string(&report).context("Failed to encode summary")?);
    Ok(())
}

/// One analysis pass against the store described by `config`
pub fn run(args: &AnalyzeArgs, config: &LearningConfig) -> Result<AnalysisReport> {
    let paths = &config.paths;
    let log = ObservationLog::for_store(paths);

    tracing::debug!(path = %log.path().display(), "Reading observations");
    let observations = log
        .read()
        .with_context(|| format!("Failed to read observations from {}", log.path().display()))?;

    if observations.is_empty() {
        tracing::info!("No observations to analyze");
        return Ok(AnalysisReport::default());
    }

    let _lock = if args.dry_run {
        None
    } else {
        Some(StoreLock::acquire(paths.lock_file()).context("Another pass is writing to the store")?)
    };

    if let Some(last) = log.last_analyzed() {
        tracing::debug!(last_analyzed = %last, "Previous analysis");
    }

    let repository = Arc::new(
        FileInstinctRepository::for_store(paths)
            .with_confidence_ceiling(config.confidence.ceiling),
    );
    let report = ObservationAnalyzer::new(repository, config)
        .with_dry_run(args.dry_run)
        .analyze(&observations)
        .context("Analysis failed")?;
    super::log_events(&report.events);

    if !args.dry_run {
        log.mark_analyzed(Utc::now())
            .context("Failed to write analysis marker")?;
    }

    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use homunculus_cortex::{InstinctRepository, StorePaths};

    fn store() -> (tempfile::TempDir, LearningConfig) {
        let dir = tempfile::tempdir().unwrap();
        let mut config = LearningConfig::default();
        config.paths = StorePaths::new(dir.path());

        let mut lines = String::new();
        for _ in 0..3 {
            for tool in ["Grep", "Read", "Edit"] {
                lines.push_str(&format!(
                    "{{\"session\":\"s1\",\"event\":\"tool_start\",\"tool\":\"{}\"}}\n",
                    tool
                ));
            }
        }
        std::fs::write(config.paths.observations_file(), lines).unwrap();
        (dir, config)
    }

    #[test]
    fn test_analyze_writes_instincts_and_marker() {
        let (_dir, config) = store();
        let report = run(&AnalyzeArgs::default(), &config).unwrap();
        assert_eq!(report.analyzed, 9);
        assert!(report.created >= 1);

        let stored = FileInstinctRepository::for_store(&config.paths).load().unwrap();
        assert_eq!(stored.len(), report.created);
        assert_eq!(report.events.len(), report.created);
        assert!(report
            .events
            .iter()
            .all(|event| event.event_type() == "instinct_created"));
        assert!(config.paths.analysis_marker().exists());
        assert!(!config.paths.lock_file().exists());
    }

    #[test]
    fn test_dry_run_writes_nothing() {
        let (_dir, config) = store();
        let args = AnalyzeArgs {
            dry_run: true,
            ..AnalyzeArgs::default()
        };
        let report = run(&args, &config).unwrap();
        assert!(report.created >= 1);
        assert!(!config.paths.personal_dir().exists());
        assert!(!config.paths.analysis_marker().exists());
    }

    #[test]
    fn test_held_lock_fails_the_pass() {
        let (_dir, config) = store();
        let _held = StoreLock::acquire(config.paths.lock_file()).unwrap();
        assert!(run(&AnalyzeArgs::default(), &config).is_err());
        assert!(!config.paths.personal_dir().exists());
    }

    #[test]
    fn test_reinforcement_respects_ceiling_for_hand_edited_confidence() {
        let (_dir, config) = store();
        let mut lines = String::new();
        for tool in ["Read"; 7].iter().chain(["Write"; 3].iter()) {
            lines.push_str(&format!(
                "{{\"session\":\"s1\",\"event\":\"tool_start\",\"tool\":\"{}\"}}\n",
                tool
            ));
        }
        std::fs::write(config.paths.observations_file(), lines).unwrap();
        std::fs::create_dir_all(config.paths.personal_dir()).unwrap();
        std::fs::write(
            config.paths.personal_dir().join("tool-preference-read.md"),
            "---\nid: tool-preference-read\nconfidence: 3.5\n---\n\n## Action\nPrefer using Read\n",
        )
        .unwrap();

        let report = run(&AnalyzeArgs::default(), &config).unwrap();
        assert!(report.updated >= 1);

        let stored = FileInstinctRepository::for_store(&config.paths).load().unwrap();
        let read = &stored[&homunculus_cortex::InstinctId::new("tool-preference-read")];
        assert_eq!(read.confidence, 0.95);
        let raw = std::fs::read_to_string(
            config.paths.personal_dir().join("tool-preference-read.md"),
        )
        .unwrap();
        assert!(raw.contains("confidence: 0.95"));
    }

    #[test]
    fn test_summary_shape() {
        let (_dir, config) = store();
        let report = run(&AnalyzeArgs::default(), &config).unwrap();
        let json = serde_json::to_value(&report).unwrap();
        let keys: Vec<_> = json.as_object().unwrap().keys().cloned().collect();
        assert_eq!(keys.len(), 4);
        for key in ["analyzed", "patterns", "created", "updated"] {
            assert!(json.get(key).is_some());
        }
    }
}
