// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! Create-Setup Workflow
//!
//! Provisions a RAG pipeline and an agent bound to it for one codebase:
//!
//! 1. clone the repository into a local working copy
//! 2. build the RAG pipeline, recording its id as both `rag_id` and
//!    `vector_store_id`
//! 3. build the agent against that `rag_id`, recording id and version
//!
//! Every step is fail-fast. A RAG pipeline created before an agent failure is
//! left in place; the partially filled [`ResourceHandle`] is what the caller
//! hands to a teardown workflow to remove it. The working copy is removed after
//! the steps whatever the outcome, and a failure there is only logged.
//!
//! # Architecture
//!
//! - **Layer:** Application Layer
//! - **Purpose:** Fail-fast provisioning state machine

use async_trait::async_trait;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{error, info};

use crate::domain::builder::{AgentBuilder, RagBuilder};
use crate::domain::codebase::Codebase;
use crate::domain::provider::ProviderKind;
use crate::domain::resource::ResourceHandle;
use crate::domain::workflow::{Workflow, WorkflowError};

pub struct CreateSetupWorkflow {
    provider: ProviderKind,
    codebase: Arc<dyn Codebase>,
    rag_builder: Arc<dyn RagBuilder>,
    agent_builder: Arc<dyn AgentBuilder>,
    resources: ResourceHandle,
}

impl CreateSetupWorkflow {
    pub fn new(
        provider: ProviderKind,
        codebase: Arc<dyn Codebase>,
        rag_builder: Arc<dyn RagBuilder>,
        agent_builder: Arc<dyn AgentBuilder>,
    ) -> Self {
        Self {
            provider,
            codebase,
            rag_builder,
            agent_builder,
            resources: ResourceHandle::empty(),
        }
    }

    pub fn provider(&self) -> ProviderKind {
        self.provider
    }

    async fn provision(&mut self, ctx: &CancellationToken) -> Result<(), WorkflowError> {
        let provider = self.provider;

        info!(
            provider = %provider,
            path = %self.codebase.path().display(),
            "Cloning repository"
        );
        self.codebase
            .clone_repository(ctx)
            .await
            .map_err(|reason| WorkflowError::Clone { reason })?;

        info!(provider = %provider, "Building {} RAG pipeline", provider.label());
        let rag_id = self
            .rag_builder
            .build(ctx)
            .await
            .map_err(|reason| WorkflowError::BuildRag { provider, reason })?;
        self.resources.record_rag(rag_id);
        info!(provider = %provider, rag_id = %self.resources.rag_id, "RAG pipeline ready");

        info!(provider = %provider, rag_id = %self.resources.rag_id, "Building {} agent", provider.label());
        let deployment = self
            .agent_builder
            .build(ctx, &self.resources.rag_id)
            .await
            .map_err(|reason| WorkflowError::BuildAgent { provider, reason })?;
        self.resources.record_agent(deployment);
        info!(
            provider = %provider,
            agent_id = %self.resources.agent_id,
            agent_version = %self.resources.agent_version,
            "Agent ready"
        );

        Ok(())
    }
}

#[async_trait]
impl Workflow for CreateSetupWorkflow {
    async fn run(&mut self, ctx: &CancellationToken) -> Result<(), WorkflowError> {
        self.resources = ResourceHandle::empty();

        let result = self.provision(ctx).await;

        if let Err(e) = self.codebase.cleanup().await {
            error!(provider = %self.provider, "Failed to clean up codebase: {}", e);
        }

        if let Err(e) = &result {
            error!(provider = %self.provider, step = %e.step(), "Create-setup workflow failed: {}", e);
        }
        result
    }

    fn resources(&self) -> &ResourceHandle {
        &self.resources
    }
}
