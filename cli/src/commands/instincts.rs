// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! Instinct inspection commands

use anyhow::{Context, Result};
use clap::Subcommand;
use colored::Colorize;
use std::path::PathBuf;

use homunculus_cortex::{FileInstinctRepository, Instinct, InstinctRepository, LearningConfig};

#[derive(Subcommand, Debug)]
pub enum InstinctsCommand {
    /// List personal and inherited instincts
    List {
        /// Hide instincts below this confidence (default from config: 0.5)
        #[arg(long, value_name = "X")]
        min_confidence: Option<f64>,

        /// Output JSON array instead of human-readable text
        #[arg(long)]
        json: bool,
    },
}

pub fn handle_command(command: InstinctsCommand, config_override: Option<PathBuf>) -> Result<()> {
    let config = super::load_config(config_override)?;
    match command {
        InstinctsCommand::List {
            min_confidence,
            json,
        } => {
            let min_confidence = min_confidence.unwrap_or(config.listing.min_confidence);
            let instincts = list(&config, min_confidence)?;
            if json {
                println!(
                    "{}",
                    serde_json::to_string(&instincts).context("Failed to encode instincts")?
                );
            } else {
                print_table(&instincts, min_confidence);
            }
            Ok(())
        }
    }
}

/// Stored instincts at or above `min_confidence`, in store order
pub fn list(config: &LearningConfig, min_confidence: f64) -> Result<Vec<Instinct>> {
    let repository = FileInstinctRepository::for_store(&config.paths)
        .with_confidence_ceiling(config.confidence.ceiling);
    let mut instincts = repository
        .load_all()
        .context("Failed to load instincts")?;
    instincts.retain(|i| i.confidence >= min_confidence);
    Ok(instincts)
}

fn print_table(instincts: &[Instinct], min_confidence: f64) {
    if instincts.is_empty() {
        println!(
            "{}",
            format!("No instincts with confidence >= {:.2}", min_confidence).yellow()
        );
        return;
    }

    println!("{}", format!("{} instinct(s):", instincts.len()).bold());
    println!();
    for instinct in instincts {
        println!(
            "  {:>3.0}%  {}  [{}] {}",
            instinct.confidence * 100.0,
            instinct.id.as_str().bold(),
            instinct.domain,
            instinct.source.dimmed()
        );
        if !instinct.trigger.is_empty() {
            println!("        {}", instinct.trigger.dimmed());
        }
        println!("        → {}", instinct.action);
    }
}
