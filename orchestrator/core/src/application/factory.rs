// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! Agent Infrastructure Factory
//!
//! Application service that provisions and destroys the RAG pipeline + agent
//! pair for a repository on the provider named by a [`ProviderConfig`].
//!
//! # DDD Pattern: Application Service
//!
//! - **Layer:** Application
//! - **Responsibility:** Wire provider builders into the provisioning workflows
//! - **Collaborators:**
//!   - Domain: ProviderConfig, ResourceHandle, InfrastructureRecord
//!   - Application: CreateSetupWorkflow, TeardownWorkflow, CleanupWorkflow
//!   - Infrastructure: ProviderBackends, InfrastructureRepository, EventBus
//!
//! # Flow (create)
//!
//! 1. Validate the provider configuration (no resource is touched before this)
//! 2. Open a working copy and select the provider's builder pair
//! 3. Run the create-setup workflow
//! 4. Persist an [`InfrastructureRecord`], `ready` or `failed` with the partial handle
//! 5. Publish an [`InfrastructureEvent`]
//!
//! Destroy never infers the provider from resource ids. It loads the stored
//! record and tears down with the provider and configuration recorded there; an
//! unknown id is [`FactoryError::NotFound`].

use async_trait::async_trait;
use chrono::Utc;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

use crate::application::cleanup::CleanupWorkflow;
use crate::application::create_setup::CreateSetupWorkflow;
use crate::application::provider_factory::{BuilderPair, ProviderBackends};
use crate::application::teardown::TeardownWorkflow;
use crate::domain::codebase::{Codebase, CodebaseError};
use crate::domain::events::InfrastructureEvent;
use crate::domain::infrastructure::{InfrastructureId, InfrastructureRecord, InfrastructureResult};
use crate::domain::provider::{ConfigError, ProviderConfig, ProviderKind};
use crate::domain::repository::{InfrastructureRepository, RepositoryError};
use crate::domain::resource::ResourceHandle;
use crate::domain::workflow::{Workflow, WorkflowError};
use crate::infrastructure::event_bus::EventBus;

#[derive(Debug, thiserror::Error)]
pub enum FactoryError {
    #[error("invalid provider configuration: {0}")]
    InvalidConfig(#[from] ConfigError),

    #[error("provider {0} is not available on this platform")]
    ProviderUnavailable(ProviderKind),

    #[error("infrastructure {0} not found")]
    NotFound(InfrastructureId),

    #[error("codebase error: {0}")]
    Codebase(#[from] CodebaseError),

    #[error("provisioning infrastructure {id} failed: {reason}")]
    Provisioning {
        id: InfrastructureId,
        reason: WorkflowError,
    },

    #[error("tearing down infrastructure {id} failed: {reason}")]
    Teardown {
        id: InfrastructureId,
        reason: WorkflowError,
    },

    #[error("infrastructure record {id} is inconsistent: {reason}")]
    InconsistentRecord { id: InfrastructureId, reason: String },

    #[error("repository error: {0}")]
    Repository(#[from] RepositoryError),
}

/// Agent Infrastructure Factory
#[async_trait]
pub trait AgentInfrastructureFactory: Send + Sync {
    /// Provision a knowledge base and an agent for `repository_url`
    ///
    /// # Errors
    ///
    /// - `InvalidConfig` / `ProviderUnavailable`: nothing was created
    /// - `Provisioning`: a workflow step failed; the record was stored as
    ///   `failed` with whatever resources exist, so it can still be destroyed
    async fn create_agent_infrastructure(
        &self,
        ctx: &CancellationToken,
        config: &ProviderConfig,
        repository_url: &str,
    ) -> Result<InfrastructureResult, FactoryError>;

    /// Destroy the existing infrastructure, then create it again with `config`
    async fn update_agent_infrastructure(
        &self,
        ctx: &CancellationToken,
        id: InfrastructureId,
        config: &ProviderConfig,
        repository_url: &str,
    ) -> Result<InfrastructureResult, FactoryError>;

    async fn destroy_agent_infrastructure(
        &self,
        ctx: &CancellationToken,
        id: InfrastructureId,
    ) -> Result<(), FactoryError>;

    /// Destroy from a record held by the caller rather than the repository
    async fn destroy_recorded_infrastructure(
        &self,
        ctx: &CancellationToken,
        record: InfrastructureRecord,
    ) -> Result<InfrastructureRecord, FactoryError>;

    /// Pure check of the selected variant; touches no provider.
    fn validate_agent_config(&self, config: &ProviderConfig) -> Result<(), FactoryError>;

    fn supported_providers(&self) -> Vec<ProviderKind>;

    async fn get_agent_infrastructure(
        &self,
        id: InfrastructureId,
    ) -> Result<InfrastructureRecord, FactoryError>;

    async fn list_agent_infrastructure(&self) -> Result<Vec<InfrastructureRecord>, FactoryError>;
}

/// Standard implementation of AgentInfrastructureFactory
pub struct StandardAgentInfrastructureFactory {
    backends: Arc<dyn ProviderBackends>,
    repository: Arc<dyn InfrastructureRepository>,
    event_bus: Arc<EventBus>,
}

impl StandardAgentInfrastructureFactory {
    pub fn new(
        backends: Arc<dyn ProviderBackends>,
        repository: Arc<dyn InfrastructureRepository>,
        event_bus: Arc<EventBus>,
    ) -> Self {
        Self {
            backends,
            repository,
            event_bus,
        }
    }

    /// Teardown for handles that carry a vector store id, the reduced cleanup
    /// pass for handles that only carry a RAG id. Returns every recorded failure.
    async fn run_teardown(
        &self,
        ctx: &CancellationToken,
        provider: ProviderKind,
        codebase: Arc<dyn Codebase>,
        builders: BuilderPair,
        resources: ResourceHandle,
    ) -> Result<(), (WorkflowError, Vec<WorkflowError>)> {
        if resources.vector_store_id.is_empty() {
            let mut workflow =
                CleanupWorkflow::with_resources(provider, codebase, builders.rag, builders.agent, resources);
            let result = workflow.run(ctx).await;
            result.map_err(|e| (e, workflow.failures().to_vec()))
        } else {
            let mut workflow =
                TeardownWorkflow::with_resources(provider, codebase, builders.rag, builders.agent, resources);
            let result = workflow.run(ctx).await;
            result.map_err(|e| (e, workflow.failures().to_vec()))
        }
    }
}

#[async_trait]
impl AgentInfrastructureFactory for StandardAgentInfrastructureFactory {
    async fn create_agent_infrastructure(
        &self,
        ctx: &CancellationToken,
        config: &ProviderConfig,
        repository_url: &str,
    ) -> Result<InfrastructureResult, FactoryError> {
        self.validate_agent_config(config)?;

        let id = InfrastructureId::new();
        let provider = config.kind();
        info!(
            infrastructure_id = %id,
            provider = %provider,
            repository = %repository_url,
            "Creating agent infrastructure"
        );

        let codebase = self.backends.open_codebase(repository_url)?;
        let builders = self.backends.builders(config, codebase.path())?;

        let mut workflow = CreateSetupWorkflow::new(provider, codebase, builders.rag, builders.agent);
        let outcome = workflow.run(ctx).await;

        let mut record = InfrastructureRecord::new(
            id,
            config.clone(),
            repository_url,
            workflow.resources().clone(),
        );

        match outcome {
            Ok(()) => {
                record.mark_ready();
                if let Err(e) = self.repository.save(&record).await {
                    error!(
                        infrastructure_id = %id,
                        rag_id = %record.resources.rag_id,
                        agent_id = %record.resources.agent_id,
                        "Provisioned resources could not be recorded: {}", e
                    );
                    return Err(e.into());
                }

                self.event_bus.publish(InfrastructureEvent::InfrastructureProvisioned {
                    infrastructure_id: id,
                    provider,
                    resources: record.resources.clone(),
                    provisioned_at: Utc::now(),
                });

                info!(
                    infrastructure_id = %id,
                    provider = %provider,
                    knowledge_base_id = %record.resources.rag_id,
                    agent_id = %record.resources.agent_id,
                    "Agent infrastructure ready"
                );
                Ok(InfrastructureResult::from(&record))
            }
            Err(reason) => {
                record.mark_failed(reason.to_string());
                if let Err(e) = self.repository.save(&record).await {
                    error!(infrastructure_id = %id, "Failed to record failed provisioning: {}", e);
                }

                self.event_bus.publish(InfrastructureEvent::ProvisioningFailed {
                    infrastructure_id: id,
                    provider,
                    resources: record.resources.clone(),
                    error: reason.to_string(),
                    failed_at: Utc::now(),
                });

                if !record.resources.is_empty() {
                    warn!(
                        infrastructure_id = %id,
                        rag_id = %record.resources.rag_id,
                        "Partially provisioned resources remain; destroy the infrastructure to remove them"
                    );
                }
                Err(FactoryError::Provisioning { id, reason })
            }
        }
    }

    async fn update_agent_infrastructure(
        &self,
        ctx: &CancellationToken,
        id: InfrastructureId,
        config: &ProviderConfig,
        repository_url: &str,
    ) -> Result<InfrastructureResult, FactoryError> {
        self.validate_agent_config(config)?;

        if let Err(e) = self.destroy_agent_infrastructure(ctx, id).await {
            warn!(infrastructure_id = %id, "Failed to destroy existing infrastructure before update: {}", e);
        }

        self.create_agent_infrastructure(ctx, config, repository_url).await
    }

    async fn destroy_agent_infrastructure(
        &self,
        ctx: &CancellationToken,
        id: InfrastructureId,
    ) -> Result<(), FactoryError> {
        let record = self
            .repository
            .find_by_id(id)
            .await?
            .ok_or(FactoryError::NotFound(id))?;

        self.destroy_recorded_infrastructure(ctx, record).await?;
        Ok(())
    }

    async fn destroy_recorded_infrastructure(
        &self,
        ctx: &CancellationToken,
        mut record: InfrastructureRecord,
    ) -> Result<InfrastructureRecord, FactoryError> {
        let id = record.id;
        let provider = record.provider;

        if record.provider_config.kind() != provider {
            return Err(FactoryError::InconsistentRecord {
                id,
                reason: format!(
                    "provider is {} but the stored configuration is for {}",
                    provider,
                    record.provider_config.kind()
                ),
            });
        }

        if record.is_destroyed() {
            info!(infrastructure_id = %id, "Infrastructure already destroyed");
            return Ok(record);
        }

        info!(
            infrastructure_id = %id,
            provider = %provider,
            rag_id = %record.resources.rag_id,
            agent_id = %record.resources.agent_id,
            "Destroying agent infrastructure"
        );

        let codebase = self.backends.open_codebase(&record.repository_url)?;
        let builders = self.backends.builders(&record.provider_config, codebase.path())?;

        match self
            .run_teardown(ctx, provider, codebase, builders, record.resources.clone())
            .await
        {
            Ok(()) => {
                record.mark_destroyed();
                self.repository.save(&record).await?;

                self.event_bus.publish(InfrastructureEvent::InfrastructureTornDown {
                    infrastructure_id: id,
                    provider,
                    torn_down_at: Utc::now(),
                });
                info!(infrastructure_id = %id, "Agent infrastructure destroyed");
                Ok(record)
            }
            Err((reason, failures)) => {
                record.mark_failed(format!("teardown: {}", reason));
                if let Err(e) = self.repository.save(&record).await {
                    error!(infrastructure_id = %id, "Failed to record teardown failure: {}", e);
                }

                self.event_bus.publish(InfrastructureEvent::TeardownFailed {
                    infrastructure_id: id,
                    provider,
                    resources: record.resources.clone(),
                    errors: failures.iter().map(|e| e.to_string()).collect(),
                    failed_at: Utc::now(),
                });
                Err(FactoryError::Teardown { id, reason })
            }
        }
    }

    fn validate_agent_config(&self, config: &ProviderConfig) -> Result<(), FactoryError> {
        config.validate()?;

        let provider = config.kind();
        if !self.backends.supported_providers().contains(&provider) {
            return Err(FactoryError::ProviderUnavailable(provider));
        }
        Ok(())
    }

    fn supported_providers(&self) -> Vec<ProviderKind> {
        self.backends.supported_providers()
    }

    async fn get_agent_infrastructure(
        &self,
        id: InfrastructureId,
    ) -> Result<InfrastructureRecord, FactoryError> {
        self.repository
            .find_by_id(id)
            .await?
            .ok_or(FactoryError::NotFound(id))
    }

    async fn list_agent_infrastructure(&self) -> Result<Vec<InfrastructureRecord>, FactoryError> {
        Ok(self.repository.list_all().await?)
    }
}
