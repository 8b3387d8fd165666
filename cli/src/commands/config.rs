// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! Configuration management commands
//!
//! Commands: show, validate, generate

use anyhow::{Context, Result};
use clap::Subcommand;
use colored::Colorize;
use std::path::PathBuf;

use homunculus_cortex::{LearningConfig, StorePaths, CONFIG_PATH_ENV};

const GENERATED_HEADER: &str = "\
# homunculus configuration
#
# Every key is optional; omitted keys keep the defaults shown here.
# Discovery order: --config, HOMUNCULUS_CONFIG_PATH, ./homunculus-config.yaml,
# <root>/config.yaml. HOMUNCULUS_ROOT, HOMUNCULUS_MIN_CLUSTER_SIZE and
# HOMUNCULUS_SIMILARITY_THRESHOLD override the file.

";

#[derive(Subcommand, Debug)]
pub enum ConfigCommand {
    /// Show current configuration
    Show {
        /// Show config file paths checked
        #[arg(long)]
        paths: bool,
    },

    /// Validate configuration file
    Validate {
        /// Path to config file (default: discover)
        #[arg(value_name = "FILE")]
        file: Option<PathBuf>,
    },

    /// Generate sample configuration
    Generate {
        /// Output path
        #[arg(short, long, default_value = "./homunculus-config.yaml")]
        output: PathBuf,
    },
}

pub fn handle_command(command: ConfigCommand, config_override: Option<PathBuf>) -> Result<()> {
    match command {
        ConfigCommand::Show { paths } => show(config_override, paths),
        ConfigCommand::Validate { file } => validate(file.or(config_override)),
        ConfigCommand::Generate { output } => generate(output),
    }
}

fn show(config_override: Option<PathBuf>, show_paths: bool) -> Result<()> {
    let config = super::load_config(config_override.clone())?;

    if show_paths {
        println!("{}", "Configuration discovery paths:".bold());
        if let Some(path) = &config_override {
            println!("  1. --config flag: {}", path.display());
        } else {
            println!("  1. --config flag: {}", "(not set)".dimmed());
        }
        println!(
            "  2. {}: {}",
            CONFIG_PATH_ENV,
            std::env::var(CONFIG_PATH_ENV)
                .unwrap_or_else(|_| "(not set)".to_string())
                .dimmed()
        );
        println!("  3. ./homunculus-config.yaml");
        println!("  4. {}", StorePaths::default().config_file().display());
        println!();
    }

    println!("{}", "Current configuration:".bold());
    println!();

    let paths = &config.paths;
    println!("{}", "Store:".bold());
    println!("  Root: {}", paths.root().display());
    println!("  Observations: {}", paths.observations_file().display());
    println!("  Personal instincts: {}", paths.personal_dir().display());
    println!("  Inherited instincts: {}", paths.inherited_dir().display());
    println!("  Evolved artifacts: {}", paths.evolved_dir().display());
    println!();

    let detection = &config.detection;
    println!("{}", "Detection:".bold());
    println!(
        "  Workflow: window {}, min count {}, min sessions {}",
        detection.workflow_window, detection.workflow_min_count, detection.workflow_min_sessions
    );
    println!(
        "  Tool preference: ratio > {}, min count {}",
        detection.preference_min_ratio, detection.preference_min_count
    );
    println!(
        "  Error resolution: lookahead {}, min count {}, markers {}",
        detection.error_lookahead,
        detection.error_min_count,
        detection.error_markers.join(", ")
    );
    println!();

    println!("{}", "Confidence:".bold());
    println!(
        "  Increment: {}  Ceiling: {}",
        config.confidence.increment, config.confidence.ceiling
    );
    for step in &config.confidence.steps {
        println!("    count <= {} → {}", step.max_count, step.confidence);
    }
    println!("    otherwise → {}", config.confidence.top);
    println!();

    println!("{}", "Clustering:".bold());
    println!(
        "  Similarity threshold: {}",
        config.clustering.similarity_threshold
    );
    println!("  Min cluster size: {}", config.clustering.min_cluster_size);
    println!();

    Ok(())
}

fn validate(config_path: Option<PathBuf>) -> Result<()> {
    println!("Validating configuration...");

    let config = super::load_config(config_path)?;

    config
        .validate()
        .context("Configuration validation failed")?;

    println!("{}", "✓ Configuration is valid".green());

    Ok(())
}

/// Sample configuration containing every default
pub fn sample_config() -> Result<String> {
    let body = LearningConfig::default()
        .to_yaml_string()
        .context("Failed to render default configuration")?;
    Ok(format!("{}{}", GENERATED_HEADER, body))
}

fn generate(output: PathBuf) -> Result<()> {
    let sample = sample_config()?;

    std::fs::write(&output, sample)
        .with_context(|| format!("Failed to write config to {:?}", output))?;

    println!(
        "{}",
        format!("✓ Configuration generated: {}", output.display()).green()
    );

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sample_config_loads_back_as_defaults() {
        let sample = sample_config().unwrap();
        assert!(sample.starts_with("# homunculus configuration"));

        let parsed = LearningConfig::from_yaml_str(&sample).unwrap();
        parsed.validate().unwrap();
        assert_eq!(parsed.clustering.min_cluster_size, 3);
        assert_eq!(parsed.detection.error_lookahead, 4);
        assert_eq!(parsed.listing.min_confidence, 0.5);
    }
}
