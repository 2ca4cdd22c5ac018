// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! Cleanup Workflow
//!
//! Single-pass variant of [`TeardownWorkflow`](crate::application::teardown::TeardownWorkflow)
//! for callers that only hold the combined identifier: a provider that
//! produces one id for both roles does not need `vector_store_id` filled in,
//! the RAG step falls back to `rag_id`.
//!
//! The working copy removal is the third recorded step here. It runs after the
//! resource steps, so when it fails together with one of them the returned
//! error is still the resource failure.

use async_trait::async_trait;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info};

use crate::application::failures::FailureLog;
use crate::application::teardown::{tear_down_agent, tear_down_rag};
use crate::domain::builder::{AgentBuilder, RagBuilder};
use crate::domain::codebase::Codebase;
use crate::domain::provider::ProviderKind;
use crate::domain::resource::ResourceHandle;
use crate::domain::workflow::{Workflow, WorkflowError};

pub struct CleanupWorkflow {
    provider: ProviderKind,
    codebase: Arc<dyn Codebase>,
    rag_builder: Arc<dyn RagBuilder>,
    agent_builder: Arc<dyn AgentBuilder>,
    resources: ResourceHandle,
    failures: Vec<WorkflowError>,
}

impl CleanupWorkflow {
    pub fn new(
        provider: ProviderKind,
        codebase: Arc<dyn Codebase>,
        rag_builder: Arc<dyn RagBuilder>,
        agent_builder: Arc<dyn AgentBuilder>,
    ) -> Self {
        Self::with_resources(
            provider,
            codebase,
            rag_builder,
            agent_builder,
            ResourceHandle::empty(),
        )
    }

    pub fn with_resources(
        provider: ProviderKind,
        codebase: Arc<dyn Codebase>,
        rag_builder: Arc<dyn RagBuilder>,
        agent_builder: Arc<dyn AgentBuilder>,
        resources: ResourceHandle,
    ) -> Self {
        Self {
            provider,
            codebase,
            rag_builder,
            agent_builder,
            resources,
            failures: Vec::new(),
        }
    }

    pub fn set_resources(&mut self, resources: ResourceHandle) {
        self.resources = resources;
    }

    pub fn failures(&self) -> &[WorkflowError] {
        &self.failures
    }
}

#[async_trait]
impl Workflow for CleanupWorkflow {
    async fn run(&mut self, ctx: &CancellationToken) -> Result<(), WorkflowError> {
        let mut log = FailureLog::new();

        if self.resources.can_tear_down_agent() {
            tear_down_agent(self.provider, self.agent_builder.as_ref(), ctx, &self.resources, &mut log)
                .await;
        } else {
            debug!(provider = %self.provider, "Skipping agent cleanup: agent_id or rag_id not set");
        }

        if !self.resources.rag_id.is_empty() {
            let vector_store_id = if self.resources.vector_store_id.is_empty() {
                self.resources.rag_id.as_str()
            } else {
                self.resources.vector_store_id.as_str()
            };
            tear_down_rag(
                self.provider,
                self.rag_builder.as_ref(),
                ctx,
                vector_store_id,
                &self.resources.rag_id,
                &mut log,
            )
            .await;
        } else {
            debug!(provider = %self.provider, "Skipping RAG cleanup: rag_id not set");
        }

        info!(provider = %self.provider, path = %self.codebase.path().display(), "Cleaning up codebase");
        if let Err(reason) = self.codebase.cleanup().await {
            error!(provider = %self.provider, "Codebase cleanup failed: {}", reason);
            log.record(WorkflowError::Cleanup { reason });
        }

        let result = log.finish("cleanup");
        self.failures = log.into_errors();
        result
    }

    fn resources(&self) -> &ResourceHandle {
        &self.resources
    }
}
