// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! # homunculus
//!
//! Continuous-learning passes over a local knowledge store.
//!
//! ## Commands
//!
//! - `homunculus analyze [--verbose] [--dry-run]` - Mine the observation log into instincts
//! - `homunculus evolve [--execute] [--dry-run] [--domain D] [--threshold N] [--json]` - Cluster instincts into skills, commands and agents
//! - `homunculus instincts list [--min-confidence X] [--json]` - Inspect stored instincts
//! - `homunculus config show|validate|generate` - Configuration management
//!
//! Machine-readable summaries go to stdout; logs and diagnostics go to stderr.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use colored::Colorize;
use std::path::PathBuf;

use homunculus_cli::commands::{self, AnalyzeArgs, ConfigCommand, EvolveArgs, InstinctsCommand};

/// homunculus - Learn instincts from tool usage and evolve them
#[derive(Parser)]
#[command(name = "homunculus")]
#[command(version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Path to configuration file (overrides discovery)
    #[arg(
        short,
        long,
        global = true,
        env = "HOMUNCULUS_CONFIG_PATH",
        value_name = "FILE"
    )]
    config: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, global = true, env = "HOMUNCULUS_LOG_LEVEL", default_value = "info")]
    log_level: String,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Analyze observations and create or reinforce instincts
    #[command(name = "analyze")]
    Analyze(AnalyzeArgs),

    /// Cluster instincts into skills, commands or agents
    #[command(name = "evolve")]
    Evolve(EvolveArgs),

    /// Instinct inspection
    #[command(name = "instincts")]
    Instincts {
        #[command(subcommand)]
        command: InstinctsCommand,
    },

    /// Configuration management
    #[command(name = "config")]
    Config {
        #[command(subcommand)]
        command: ConfigCommand,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let level = match &cli.command {
        Some(Commands::Analyze(args)) if args.verbose => "debug",
        _ => cli.log_level.as_str(),
    };
    init_logging(level)?;

    match cli.command {
        Some(Commands::Analyze(args)) => commands::analyze::handle_command(args, cli.config),
        Some(Commands::Evolve(args)) => commands::evolve::handle_command(args, cli.config),
        Some(Commands::Instincts { command }) => {
            commands::instincts::handle_command(command, cli.config)
        }
        Some(Commands::Config { command }) => commands::config::handle_command(command, cli.config),
        None => {
            // No command provided - show help
            eprintln!("{}", "No command specified. Use --help for usage.".yellow());
            std::process::exit(1);
        }
    }
}

/// Initialize tracing subscriber for logging; everything goes to stderr
fn init_logging(level: &str) -> Result<()> {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .or_else(|_| tracing_subscriber::EnvFilter::try_new(level))
        .context("Failed to create log filter")?;

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .compact()
        .init();

    Ok(())
}
