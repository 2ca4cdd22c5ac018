// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! Agent infrastructure commands
//!
//! Commands: create, destroy, validate, list, providers
//!
//! With the in-memory record store nothing outlives the process, so `create`
//! can write the infrastructure record to a file (`--record`) and `destroy`
//! can read it back from there.

use anyhow::{bail, Context, Result};
use clap::Subcommand;
use colored::Colorize;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::warn;
use uuid::Uuid;

use agentforge_core::application::factory::{
    AgentInfrastructureFactory, FactoryError, StandardAgentInfrastructureFactory,
};
use agentforge_core::application::provider_factory::StandardProviderBackends;
use agentforge_core::application::repository_factory::create_infrastructure_repository;
use agentforge_core::domain::config::{ForgeConfigManifest, StorageConfig};
use agentforge_core::domain::infrastructure::{InfrastructureId, InfrastructureRecord};
use agentforge_core::domain::provider::{AiConfigurationRequest, ProviderConfig, ProviderKind};
use agentforge_core::infrastructure::db::Database;
use agentforge_core::infrastructure::event_bus::EventBus;

#[derive(Subcommand)]
pub enum InfraCommand {
    /// Provision a knowledge base and an agent for a repository
    Create {
        /// Repository URL or local path
        #[arg(long, value_name = "URL")]
        repo: String,

        /// Provider name (bedrock, local); defaults to spec.providers.default_provider
        #[arg(long)]
        provider: Option<String>,

        /// YAML file with provider settings layered over the configured defaults
        #[arg(long, value_name = "FILE")]
        provider_file: Option<PathBuf>,

        /// Write the infrastructure record to this file
        #[arg(long, value_name = "FILE")]
        record: Option<PathBuf>,
    },

    /// Tear down provisioned infrastructure
    Destroy {
        /// Infrastructure ID
        #[arg(value_name = "ID", required_unless_present = "record")]
        id: Option<Uuid>,

        /// Read the infrastructure record from this file instead of the record store
        #[arg(long, value_name = "FILE", conflicts_with = "id")]
        record: Option<PathBuf>,
    },

    /// Validate provider settings without touching any resource
    Validate {
        #[arg(long)]
        provider: Option<String>,

        #[arg(long, value_name = "FILE")]
        provider_file: Option<PathBuf>,
    },

    /// List recorded infrastructure
    List,

    /// Show the providers this installation can provision
    Providers,
}

pub async fn handle_command(command: InfraCommand, config_path: Option<PathBuf>) -> Result<()> {
    let config = ForgeConfigManifest::load_or_default(config_path)
        .context("Failed to load configuration")?;
    config
        .validate()
        .context("Configuration validation failed")?;

    let factory = build_factory(&config).await?;

    match command {
        InfraCommand::Create {
            repo,
            provider,
            provider_file,
            record,
        } => {
            let provider_config = resolve_provider(&config, provider, provider_file.as_deref())?;
            create(&factory, &provider_config, &repo, record.as_deref()).await
        }
        InfraCommand::Destroy { id, record } => destroy(&factory, id, record.as_deref()).await,
        InfraCommand::Validate {
            provider,
            provider_file,
        } => {
            let provider_config = resolve_provider(&config, provider, provider_file.as_deref())?;
            validate(&factory, &provider_config)
        }
        InfraCommand::List => list(&factory, &config).await,
        InfraCommand::Providers => providers(&factory),
    }
}

async fn build_factory(config: &ForgeConfigManifest) -> Result<StandardAgentInfrastructureFactory> {
    let pool = match &config.spec.storage {
        StorageConfig::InMemory => None,
        StorageConfig::Postgres { connection_string } => {
            let db = Database::new(connection_string).await?;
            db.ensure_schema().await?;
            Some(db.get_pool().clone())
        }
    };
    let repository = create_infrastructure_repository(&config.spec.storage.backend(), pool)?;
    let backends = StandardProviderBackends::new(config.spec.git.clone());

    Ok(StandardAgentInfrastructureFactory::new(
        Arc::new(backends),
        repository,
        Arc::new(EventBus::with_default_capacity()),
    ))
}

/// Merge `--provider-file` and `--provider` over the configured provider defaults
pub fn resolve_provider(
    config: &ForgeConfigManifest,
    provider: Option<String>,
    provider_file: Option<&Path>,
) -> Result<ProviderConfig> {
    let mut request = match provider_file {
        Some(path) => {
            let content = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read provider file {:?}", path))?;
            serde_yaml::from_str::<AiConfigurationRequest>(&content)
                .with_context(|| format!("Failed to parse provider file {:?}", path))?
        }
        None => AiConfigurationRequest::default(),
    };
    if let Some(provider) = provider {
        request.provider = provider;
    }

    Ok(request.resolve(&config.spec.providers)?)
}

/// Cancels the returned token on Ctrl-C
fn cancel_on_ctrl_c() -> CancellationToken {
    let ctx = CancellationToken::new();
    let token = ctx.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("Interrupted, cancelling the running operation");
            token.cancel();
        }
    });
    ctx
}

fn write_record(path: &Path, record: &InfrastructureRecord) -> Result<()> {
    let json = serde_json::to_string_pretty(record)?;
    std::fs::write(path, json).with_context(|| format!("Failed to write record to {:?}", path))?;
    println!("Record written to {}", path.display());
    Ok(())
}

fn read_record(path: &Path) -> Result<InfrastructureRecord> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read record {:?}", path))?;
    serde_json::from_str(&content).with_context(|| format!("Failed to parse record {:?}", path))
}

async fn create(
    factory: &StandardAgentInfrastructureFactory,
    provider_config: &ProviderConfig,
    repo: &str,
    record_path: Option<&Path>,
) -> Result<()> {
    println!(
        "Provisioning {} infrastructure for {}...",
        provider_config.kind().label(),
        repo.bold()
    );

    let ctx = cancel_on_ctrl_c();
    match factory
        .create_agent_infrastructure(&ctx, provider_config, repo)
        .await
    {
        Ok(result) => {
            if let Some(path) = record_path {
                let record = factory.get_agent_infrastructure(result.infrastructure_id).await?;
                write_record(path, &record)?;
            }
            println!("{}", "✓ Agent infrastructure ready".green());
            println!("{}", serde_json::to_string_pretty(&result)?);
            Ok(())
        }
        Err(FactoryError::Provisioning { id, reason }) => {
            let record = factory.get_agent_infrastructure(id).await.ok();
            if let (Some(path), Some(record)) = (record_path, &record) {
                write_record(path, record)?;
            }
            if record.map(|r| !r.resources.is_empty()).unwrap_or(false) {
                println!(
                    "{}",
                    format!(
                        "⚠ Some resources were created. Run 'agentforge infra destroy {}' to remove them.",
                        id
                    )
                    .yellow()
                );
            }
            bail!("Provisioning failed: {}", reason)
        }
        Err(e) => Err(e.into()),
    }
}

async fn destroy(
    factory: &StandardAgentInfrastructureFactory,
    id: Option<Uuid>,
    record_path: Option<&Path>,
) -> Result<()> {
    let ctx = cancel_on_ctrl_c();

    if let Some(path) = record_path {
        let record = read_record(path)?;
        let id = record.id;
        let outcome = factory.destroy_recorded_infrastructure(&ctx, record).await;
        if let Ok(updated) = &outcome {
            write_record(path, updated)?;
        }
        outcome.with_context(|| format!("Failed to destroy infrastructure {}", id))?;
        println!("{}", format!("✓ Infrastructure {} destroyed", id).green());
        return Ok(());
    }

    let Some(id) = id else {
        bail!("an infrastructure ID or --record is required");
    };
    let id = InfrastructureId(id);
    factory
        .destroy_agent_infrastructure(&ctx, id)
        .await
        .with_context(|| format!("Failed to destroy infrastructure {}", id))?;
    println!("{}", format!("✓ Infrastructure {} destroyed", id).green());
    Ok(())
}

fn validate(factory: &StandardAgentInfrastructureFactory, provider_config: &ProviderConfig) -> Result<()> {
    println!("Validating {} provider settings...", provider_config.kind());
    factory
        .validate_agent_config(provider_config)
        .context("Provider configuration is invalid")?;
    println!("{}", "✓ Provider configuration is valid".green());
    Ok(())
}

async fn list(factory: &StandardAgentInfrastructureFactory, config: &ForgeConfigManifest) -> Result<()> {
    let records = factory.list_agent_infrastructure().await?;

    if records.is_empty() {
        println!("{}", "No infrastructure found".yellow());
        if matches!(config.spec.storage, StorageConfig::InMemory) {
            println!("The in-memory record store only lives as long as one command; configure postgres storage to keep records.");
        }
        return Ok(());
    }

    println!("{} records found:", records.len());
    println!(
        "{:<38} {:<9} {:<12} {:<42} {}",
        "ID", "PROVIDER", "STATUS", "KNOWLEDGE BASE", "AGENT"
    );
    for record in records {
        println!(
            "{:<38} {:<9} {:<12} {:<42} {}",
            record.id.to_string(),
            record.provider.as_str(),
            record.status.as_str(),
            record.resources.rag_id,
            record.resources.agent_id
        );
    }
    Ok(())
}

fn providers(factory: &StandardAgentInfrastructureFactory) -> Result<()> {
    let available = factory.supported_providers();
    println!("{}", "Providers:".bold());
    for kind in ProviderKind::ALL {
        if available.contains(&kind) {
            println!("  {} ({}) {}", kind.as_str().bold(), kind.label(), "available".green());
        } else {
            println!(
                "  {} ({}) {}",
                kind.as_str().bold(),
                kind.label(),
                "not available: no cloud service adapter is configured".dimmed()
            );
        }
    }
    Ok(())
}
