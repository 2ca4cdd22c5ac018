// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! # Agentforge CLI
//!
//! The `agentforge` binary provisions a RAG knowledge base plus an agent for a
//! source repository and tears them down again.
//!
//! ## Commands
//!
//! - `agentforge infra create|destroy|validate|list|providers` - Agent infrastructure
//! - `agentforge config show|validate|generate` - Configuration management

use anyhow::Result;
use clap::{Parser, Subcommand};
use colored::Colorize;
use std::path::PathBuf;

use agentforge_cli::commands::{self, ConfigCommand, InfraCommand};
use agentforge_cli::logging::init_logging;
use agentforge_core::domain::config::ForgeConfigManifest;

/// Agentforge - RAG knowledge bases and agents for your repositories
#[derive(Parser)]
#[command(name = "agentforge")]
#[command(version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Path to configuration file (overrides discovery)
    #[arg(
        short,
        long,
        global = true,
        env = "AGENTFORGE_CONFIG_PATH",
        value_name = "FILE"
    )]
    config: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, global = true, env = "AGENTFORGE_LOG_LEVEL", default_value = "info")]
    log_level: String,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Agent infrastructure operations
    #[command(name = "infra")]
    Infra {
        #[command(subcommand)]
        command: InfraCommand,
    },

    /// Configuration management
    #[command(name = "config")]
    Config {
        #[command(subcommand)]
        command: ConfigCommand,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    // The log format lives in the config file; a broken file is reported by the command itself
    let log_format = ForgeConfigManifest::load_or_default(cli.config.clone())
        .map(|c| c.spec.observability.logging.format)
        .unwrap_or_else(|_| "compact".to_string());
    init_logging(&cli.log_level, &log_format)?;

    match cli.command {
        Some(Commands::Infra { command }) => commands::infra::handle_command(command, cli.config).await,
        Some(Commands::Config { command }) => {
            commands::config::handle_command(command, cli.config).await
        }
        None => {
            eprintln!("{}", "No command specified. Use --help for usage.".yellow());
            std::process::exit(1);
        }
    }
}
