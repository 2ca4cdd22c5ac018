// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! Bedrock Agent Builder
//!
//! Creates a Bedrock agent on the configured foundation model, associates it
//! with the knowledge base built by [`super::BedrockRagBuilder`] and publishes
//! it under the `default` alias. The alias id is the agent version recorded
//! in the resource handle.

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use super::services::{resource_tags, AgentRequest, ManagedCloudServices};
use super::{ignore_missing, resource_name, step_failed};
use crate::domain::builder::{cancellable, AgentBuilder, AgentDeployment, BuilderError};
use crate::domain::provider::ManagedCloudConfig;

pub const DEFAULT_ALIAS: &str = "default";

const AGENT_INSTRUCTION: &str = "You are an agent that helps with code refactoring tasks. \
Answer questions about the repository using the attached knowledge base and cite the files you rely on.";

pub struct BedrockAgentBuilder {
    services: ManagedCloudServices,
    config: ManagedCloudConfig,
    name: String,
}

impl BedrockAgentBuilder {
    /// `name` identifies the codebase the agent serves, usually the working copy directory name
    pub fn new(services: ManagedCloudServices, config: ManagedCloudConfig, name: impl Into<String>) -> Self {
        Self {
            services,
            config,
            name: name.into(),
        }
    }

    /// Full ARN of the foundation model; plain model ids are expanded for the configured region
    pub fn foundation_model_arn(&self) -> String {
        if self.config.foundation_model.starts_with("arn:") {
            self.config.foundation_model.clone()
        } else {
            format!(
                "arn:aws:bedrock:{}::foundation-model/{}",
                self.config.region, self.config.foundation_model
            )
        }
    }

    fn agent_request(&self) -> AgentRequest {
        AgentRequest {
            name: resource_name(&format!("agent-{}", self.name)),
            description: format!("Code assistant for {}", self.name),
            instruction: AGENT_INSTRUCTION.to_string(),
            foundation_model_arn: self.foundation_model_arn(),
            role_arn: self.config.agent_service_role_arn.clone(),
            tags: resource_tags(&self.name),
        }
    }

    async fn roll_back(&self, agent_id: &str) {
        if let Err(e) = self.services.agents.delete_agent(agent_id).await {
            warn!(agent_id = %agent_id, error = %e, "Failed to remove partially created agent");
        }
    }
}

#[async_trait]
impl AgentBuilder for BedrockAgentBuilder {
    async fn build(
        &self,
        ctx: &CancellationToken,
        rag_id: &str,
    ) -> Result<AgentDeployment, BuilderError> {
        if rag_id.is_empty() {
            return Err(BuilderError::InvalidInput("rag_id is required".to_string()));
        }

        let request = self.agent_request();
        let agent_id = cancellable(ctx, self.services.agents.create_agent(&request))
            .await
            .map_err(|e| step_failed("failed to create agent", e))?;

        if let Err(e) = cancellable(
            ctx,
            self.services.agents.associate_knowledge_base(&agent_id, rag_id),
        )
        .await
        {
            self.roll_back(&agent_id).await;
            return Err(step_failed("failed to associate agent with knowledge base", e));
        }

        let alias_id = match cancellable(
            ctx,
            self.services.agents.create_alias(&agent_id, DEFAULT_ALIAS),
        )
        .await
        {
            Ok(id) => id,
            Err(e) => {
                self.roll_back(&agent_id).await;
                return Err(step_failed("failed to create agent alias", e));
            }
        };

        info!(
            agent_id = %agent_id,
            alias_id = %alias_id,
            knowledge_base_id = %rag_id,
            model = %request.foundation_model_arn,
            "Bedrock agent created"
        );
        Ok(AgentDeployment::new(agent_id, alias_id))
    }

    async fn tear_down(
        &self,
        ctx: &CancellationToken,
        agent_id: &str,
        agent_version: &str,
        rag_id: &str,
    ) -> Result<(), BuilderError> {
        if !rag_id.is_empty() {
            ignore_missing(
                cancellable(
                    ctx,
                    self.services
                        .agents
                        .disassociate_knowledge_base(agent_id, agent_version, rag_id),
                )
                .await,
            )
            .map_err(|e| step_failed("failed to disassociate agent from knowledge base", e))?;
        }

        ignore_missing(cancellable(ctx, self.services.agents.delete_agent(agent_id)).await)
            .map_err(|e| step_failed("failed to delete agent", e))?;

        info!(agent_id = %agent_id, agent_version = %agent_version, "Bedrock agent deleted");
        Ok(())
    }
}
