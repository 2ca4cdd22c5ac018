// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! Configuration management commands
//!
//! Commands: show, validate, generate

use anyhow::{bail, Context, Result};
use clap::Subcommand;
use colored::Colorize;
use std::path::PathBuf;

use agentforge_core::domain::config::{ForgeConfigManifest, StorageConfig};
use agentforge_core::domain::provider::{AiConfigurationRequest, ProviderConfig};

#[derive(Subcommand)]
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
        /// Output path (default: ./agentforge-config.yaml)
        #[arg(short, long, default_value = "./agentforge-config.yaml")]
        output: PathBuf,

        /// Include examples and comments
        #[arg(long)]
        examples: bool,

        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
}

pub async fn handle_command(
    command: ConfigCommand,
    config_override: Option<PathBuf>,
) -> Result<()> {
    match command {
        ConfigCommand::Show { paths } => show(config_override, paths).await,
        ConfigCommand::Validate { file } => validate(file.or(config_override)).await,
        ConfigCommand::Generate {
            output,
            examples,
            force,
        } => generate(output, examples, force).await,
    }
}

fn or_unset(value: &str) -> String {
    if value.is_empty() {
        "(not set)".dimmed().to_string()
    } else {
        value.to_string()
    }
}

async fn show(config_override: Option<PathBuf>, show_paths: bool) -> Result<()> {
    let config = ForgeConfigManifest::load_or_default(config_override.clone())
        .context("Failed to load configuration")?;

    if show_paths {
        println!("{}", "Configuration discovery paths:".bold());
        if let Some(path) = &config_override {
            println!("  1. --config flag: {}", path.display());
        } else {
            println!("  1. --config flag: {}", "(not set)".dimmed());
        }
        println!(
            "  2. AGENTFORGE_CONFIG_PATH: {}",
            std::env::var("AGENTFORGE_CONFIG_PATH")
                .unwrap_or_else(|_| "(not set)".to_string())
                .dimmed()
        );
        println!("  3. ./agentforge-config.yaml");
        println!("  4. ~/.agentforge/config.yaml");
        println!("  5. /etc/agentforge/config.yaml");
        println!();
    }

    println!("{}", "Current configuration:".bold());
    println!();

    println!("{}", "Host:".bold());
    println!("  Name: {}", config.metadata.name);
    println!();

    let git = &config.spec.git;
    println!("{}", "Git:".bold());
    println!("  Workspace root: {}", git.workspace_root.display());
    println!(
        "  Token: {}",
        if git.token.is_some() { "(set)".to_string() } else { "(not set)".dimmed().to_string() }
    );
    println!();

    let providers = &config.spec.providers;
    println!("{}", "Providers:".bold());
    println!("  Default provider: {}", providers.default_provider);
    println!("  {}", "local".bold());
    println!("    Ollama URL: {}", or_unset(&providers.local.ollama_url));
    println!("    Model: {}", or_unset(&providers.local.model));
    println!("    Chroma URL: {}", or_unset(&providers.local.chroma_url));
    println!("    Embedding model: {}", or_unset(&providers.local.embedding_model));
    println!("  {}", "bedrock".bold());
    println!("    Region: {}", or_unset(&providers.bedrock.region));
    println!("    Foundation model: {}", or_unset(&providers.bedrock.foundation_model));
    println!("    Agent role: {}", or_unset(&providers.bedrock.agent_service_role_arn));
    println!(
        "    Knowledge base role: {}",
        or_unset(&providers.bedrock.knowledge_base_service_role_arn)
    );
    println!("    S3 bucket: {}", or_unset(&providers.bedrock.s3_bucket_name));
    println!();

    println!("{}", "Storage:".bold());
    println!("  Backend: {}", storage_label(&config.spec.storage));
    println!();

    let logging = &config.spec.observability.logging;
    println!("{}", "Logging:".bold());
    println!("  Level: {}", logging.level);
    println!("  Format: {}", logging.format);
    println!();

    Ok(())
}

async fn validate(config_path: Option<PathBuf>) -> Result<()> {
    println!("Validating configuration...");

    let config = ForgeConfigManifest::load_or_default(config_path)
        .context("Failed to load configuration")?;

    config
        .validate()
        .context("Configuration validation failed")?;

    let defaults = default_provider_config(&config)?;
    let kind = defaults.kind();
    println!("  Default provider: {} ({})", kind.as_str().bold(), kind.label());
    match defaults.validate() {
        Ok(()) => println!("  Provider defaults: {}", "complete".green()),
        Err(e) => println!(
            "  Provider defaults: {}",
            format!("incomplete ({}), requests must supply it", e).yellow()
        ),
    }
    println!("  Record store: {}", storage_label(&config.spec.storage));
    println!("  Workspace root: {}", config.spec.git.workspace_root.display());

    println!("{}", "✓ Configuration is valid".green());

    Ok(())
}

/// The provider settings a request without overrides resolves to
fn default_provider_config(config: &ForgeConfigManifest) -> Result<ProviderConfig> {
    AiConfigurationRequest::default()
        .resolve(&config.spec.providers)
        .context("Invalid default provider")
}

fn storage_label(storage: &StorageConfig) -> &'static str {
    match storage {
        StorageConfig::InMemory => "in_memory (records last one command)",
        StorageConfig::Postgres { .. } => "postgres",
    }
}

async fn generate(output: PathBuf, with_examples: bool, force: bool) -> Result<()> {
    if output.exists() && !force {
        bail!(
            "{} already exists, pass --force to overwrite it",
            output.display()
        );
    }

    let sample = if with_examples {
        include_str!("../../templates/config-with-examples.yaml")
    } else {
        include_str!("../../templates/config-minimal.yaml")
    };

    std::fs::write(&output, sample)
        .with_context(|| format!("Failed to write config to {:?}", output))?;

    println!(
        "{}",
        format!("✓ Configuration generated: {}", output.display()).green()
    );
    println!(
        "Check provider settings with: agentforge --config {} infra validate",
        output.display()
    );

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use agentforge_core::domain::provider::ProviderKind;

    #[test]
    fn test_templates_are_valid_manifests() {
        for template in [
            include_str!("../../templates/config-minimal.yaml"),
            include_str!("../../templates/config-with-examples.yaml"),
        ] {
            let manifest = ForgeConfigManifest::from_yaml_str(template).unwrap();
            manifest.validate().unwrap();
            default_provider_config(&manifest).unwrap().validate().unwrap();
        }
    }

    #[test]
    fn test_default_provider_config_follows_manifest() {
        let mut manifest = ForgeConfigManifest::default();
        let local = default_provider_config(&manifest).unwrap();
        assert_eq!(local.kind(), ProviderKind::Local);
        assert!(local.validate().is_ok());

        manifest.spec.providers.default_provider = "bedrock".to_string();
        let bedrock = default_provider_config(&manifest).unwrap();
        assert_eq!(bedrock.kind(), ProviderKind::ManagedCloud);
        // No platform-level cloud settings: requests have to supply them
        assert!(bedrock.validate().is_err());
    }

    #[tokio::test]
    async fn test_generate_refuses_to_overwrite_without_force() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("agentforge-config.yaml");
        std::fs::write(&path, "keep me").unwrap();

        let err = generate(path.clone(), false, false).await.unwrap_err();
        assert!(err.to_string().contains("--force"));
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "keep me");

        generate(path.clone(), false, true).await.unwrap();
        let written = ForgeConfigManifest::from_yaml_file(&path).unwrap();
        assert_eq!(written.spec.providers.default_provider, "local");
    }
}
