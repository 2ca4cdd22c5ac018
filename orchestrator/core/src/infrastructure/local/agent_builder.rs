// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! Local Agent Builder
//!
//! A local agent is a model served by Ollama answering over a Chroma
//! collection, so there is no server-side agent object to create. Building
//! checks that the model is available and mints an `agent-<uuid>` id; teardown
//! only records the release.

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;
use tracing::info;
use uuid::Uuid;

use crate::domain::builder::{cancellable, AgentBuilder, AgentDeployment, BuilderError};
use crate::infrastructure::local::ollama::OllamaClient;

pub const LOCAL_AGENT_VERSION: &str = "v1.0.0";

pub struct LocalAgentBuilder {
    ollama: OllamaClient,
    model: String,
}

impl LocalAgentBuilder {
    pub fn new(ollama: OllamaClient, model: impl Into<String>) -> Self {
        Self {
            ollama,
            model: model.into(),
        }
    }
}

#[async_trait]
impl AgentBuilder for LocalAgentBuilder {
    async fn build(
        &self,
        ctx: &CancellationToken,
        rag_id: &str,
    ) -> Result<AgentDeployment, BuilderError> {
        if rag_id.is_empty() {
            return Err(BuilderError::InvalidInput("rag_id is required".to_string()));
        }

        cancellable(ctx, self.ollama.ensure_model(&self.model)).await?;

        let deployment = AgentDeployment::new(format!("agent-{}", Uuid::new_v4()), LOCAL_AGENT_VERSION);
        info!(
            agent_id = %deployment.agent_id,
            agent_version = %deployment.agent_version,
            rag_id = %rag_id,
            model = %self.model,
            ollama = %self.ollama.endpoint(),
            "Local agent created"
        );
        Ok(deployment)
    }

    async fn tear_down(
        &self,
        _ctx: &CancellationToken,
        agent_id: &str,
        agent_version: &str,
        rag_id: &str,
    ) -> Result<(), BuilderError> {
        info!(
            agent_id = %agent_id,
            agent_version = %agent_version,
            rag_id = %rag_id,
            "Local agent torn down"
        );
        Ok(())
    }
}
