// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! Instinct evolution command
//!
//! Previews by default. `--execute` writes artifacts unless `--dry-run` is
//! also given. `--json` replaces the human-readable preview with
//! `{"clusters":[...],"created":[...]}` on stdout.

use anyhow::{Context, Result};
use clap::Args;
use colored::Colorize;
use std::fmt::Write as _;
use std::path::PathBuf;
use std::sync::Arc;

use homunculus_cortex::{
    parse_or_default, EvolutionOptions, EvolutionReport, EvolutionService, FileArtifactRepository,
    FileInstinctRepository, LearningConfig, StoreLock,
};

#[derive(Args, Debug, Clone, Default)]
pub struct EvolveArgs {
    /// Create the evolved artifacts (default is preview)
    #[arg(long)]
    pub execute: bool,

    /// Preview without creating, even with --execute
    #[arg(long)]
    pub dry_run: bool,

    /// Only evolve instincts in this domain
    #[arg(long, value_name = "DOMAIN")]
    pub domain: Option<String>,

    /// Minimum instincts required to form a cluster
    #[arg(long, value_name = "N")]
    pub threshold: Option<String>,

    /// Output JSON instead of human-readable text
    #[arg(long)]
    pub json: bool,
}

impl EvolveArgs {
    pub fn writes(&self) -> bool {
        self.execute && !self.dry_run
    }

    /// Cluster size floor; an unparseable value keeps the configured one
    pub fn min_cluster_size(&self, config: &LearningConfig) -> usize {
        let default = config.clustering.min_cluster_size;
        match self.threshold.as_deref() {
            Some(raw) => parse_or_default("--threshold", raw, default),
            None => default,
        }
    }
}

pub fn handle_command(args: EvolveArgs, config_override: Option<PathBuf>) -> Result<()> {
    let config = super::load_config(config_override)?;
    let report = run(&args, &config)?;

    if args.json {
        println!("{}", serde_json::to_string(&report).context("Failed to encode report")?);
    } else {
        print!("{}", render_report(&report, &args, args.min_cluster_size(&config)));
    }
    Ok(())
}

pub fn run(args: &EvolveArgs, config: &LearningConfig) -> Result<EvolutionReport> {
    let paths = &config.paths;
    let options = EvolutionOptions {
        execute: args.writes(),
        domain: args.domain.clone(),
        min_cluster_size: Some(args.min_cluster_size(config)),
    };

    let _lock = if options.execute {
        Some(StoreLock::acquire(paths.lock_file()).context("Another pass is writing to the store")?)
    } else {
        None
    };

    let service = EvolutionService::new(
        Arc::new(
            FileInstinctRepository::for_store(paths)
                .with_confidence_ceiling(config.confidence.ceiling),
        ),
        Arc::new(FileArtifactRepository::new(paths.evolved_dir())),
        config.clone(),
    );

    let report = service.evolve(&options).context("Evolution failed")?;
    super::log_events(&report.events);
    Ok(report)
}

/// Human-readable preview of a report
pub fn render_report(report: &EvolutionReport, args: &EvolveArgs, min_cluster_size: usize) -> String {
    let mut out = String::new();

    if report.analyzed == 0 {
        match &args.domain {
            Some(domain) => {
                let _ = writeln!(out, "No instincts found in domain: {}", domain);
            }
            None => {
                let _ = writeln!(out, "No instincts found to evolve.");
            }
        }
        return out;
    }

    let _ = writeln!(out, "Analyzing {} instincts...\n", report.analyzed);

    if report.clusters.is_empty() {
        let _ = writeln!(
            out,
            "{}",
            format!("No clusters found meeting threshold of {} instincts.", min_cluster_size).yellow()
        );
        let _ = writeln!(out, "Try lowering the threshold with --threshold 2");
        return out;
    }

    let _ = writeln!(
        out,
        "{}\n",
        format!("Found {} cluster(s) ready for evolution:", report.clusters.len()).bold()
    );

    for (i, cluster) in report.clusters.iter().enumerate() {
        let ids: Vec<&str> = cluster.instincts.iter().map(|id| id.as_str()).collect();
        let kind = cluster.kind.as_str();
        let kind = format!("{}{}", kind[..1].to_uppercase(), &kind[1..]);

        let _ = writeln!(out, "{}", format!("## Cluster {}: {}", i + 1, cluster.name).bold());
        let _ = writeln!(out, "Instincts: {}", ids.join(", "));
        let _ = writeln!(out, "Type: {}", kind.cyan());
        let _ = writeln!(
            out,
            "Confidence: {:.0}% (based on {} observations)",
            cluster.confidence * 100.0,
            cluster.observations
        );
        if cluster.created {
            let _ = writeln!(out, "{}", format!("Created: {}", cluster.path.display()).green());
        } else {
            let _ = writeln!(out, "Would create: {}", cluster.path.display());
        }
        let _ = writeln!(out);
    }

    if !args.writes() {
        let _ = writeln!(out, "---");
        let _ = writeln!(out, "Run with --execute to create these files.");
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use homunculus_cortex::StorePaths;

    fn store() -> (tempfile::TempDir, LearningConfig) {
        let dir = tempfile::tempdir().unwrap();
        let mut config = LearningConfig::default();
        config.paths = StorePaths::new(dir.path());

        let personal = config.paths.personal_dir();
        std::fs::create_dir_all(&personal).unwrap();
        for (id, trigger) in [
            ("review-diff", "when reviewing pull requests"),
            ("review-tests", "when reviewing test changes"),
            ("review-docs", "when reviewing documentation"),
        ] {
            std::fs::write(
                personal.join(format!("{}.md", id)),
                format!(
                    "---\nid: {}\ntrigger: {}\nconfidence: 0.5\ndomain: review\nobservation_count: 2\n---\n\n## Action\nReview every changed file carefully\n",
                    id, trigger
                ),
            )
            .unwrap();
        }
        (dir, config)
    }

    #[test]
    fn test_threshold_falls_back_when_unparseable() {
        let config = LearningConfig::default();
        let mut args = EvolveArgs {
            threshold: Some("two".to_string()),
            ..EvolveArgs::default()
        };
        assert_eq!(args.min_cluster_size(&config), 3);
        args.threshold = Some("2".to_string());
        assert_eq!(args.min_cluster_size(&config), 2);
    }

    #[test]
    fn test_dry_run_overrides_execute() {
        let args = EvolveArgs {
            execute: true,
            dry_run: true,
            ..EvolveArgs::default()
        };
        assert!(!args.writes());
    }

    #[test]
    fn test_preview_then_execute() {
        let (_dir, config) = store();

        let preview_args = EvolveArgs::default();
        let preview = run(&preview_args, &config).unwrap();
        assert_eq!(preview.clusters.len(), 1);
        assert!(!config.paths.evolved_dir().exists());

        let text = render_report(&preview, &preview_args, 3);
        assert!(text.contains("Analyzing 3 instincts..."));
        assert!(text.contains("review-diff, review-docs, review-tests"));
        assert!(text.contains("Would create: "));
        assert!(text.contains("Run with --execute to create these files."));

        let execute_args = EvolveArgs {
            execute: true,
            ..EvolveArgs::default()
        };
        let report = run(&execute_args, &config).unwrap();
        assert_eq!(report.created.len(), 1);
        assert!(report.created[0].exists());
        assert!(!config.paths.lock_file().exists());

        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["created"].as_array().unwrap().len(), 1);
        assert_eq!(json["clusters"][0]["instincts"].as_array().unwrap().len(), 3);
    }

    #[test]
    fn test_empty_store_messages() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = LearningConfig::default();
        config.paths = StorePaths::new(dir.path());

        let args = EvolveArgs {
            domain: Some("testing".to_string()),
            ..EvolveArgs::default()
        };
        let report = run(&args, &config).unwrap();
        assert!(render_report(&report, &args, 3).contains("No instincts found in domain: testing"));

        let report = run(&EvolveArgs::default(), &config).unwrap();
        assert_eq!(
            serde_json::to_string(&report).unwrap(),
            r#"{"clusters":[],"created":[]}"#
        );
    }
}
