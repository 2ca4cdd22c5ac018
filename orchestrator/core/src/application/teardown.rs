// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! Teardown Workflow
//!
//! Reverses a possibly partial [`ResourceHandle`]: agent first, then the RAG
//! pipeline, then the local working copy.
//!
//! Teardown is best-effort. Each resource step runs only when its identifiers
//! are present (an absent id means the resource was never created or is
//! already gone, so the step is skipped without error). A failing step is
//! recorded and the next step still runs. At the end every recorded error is
//! logged with its index and the first one is returned; [`TeardownWorkflow::failures`]
//! exposes the full list of the most recent run.
//!
//! # Architecture
//!
//! - **Layer:** Application Layer
//! - **Purpose:** Best-effort reverse-order teardown state machine

use async_trait::async_trait;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info};

use crate::application::failures::FailureLog;
use crate::domain::builder::{AgentBuilder, RagBuilder};
use crate::domain::codebase::Codebase;
use crate::domain::provider::ProviderKind;
use crate::domain::resource::ResourceHandle;
use crate::domain::workflow::{Workflow, WorkflowError};

pub struct TeardownWorkflow {
    provider: ProviderKind,
    codebase: Arc<dyn Codebase>,
    rag_builder: Arc<dyn RagBuilder>,
    agent_builder: Arc<dyn AgentBuilder>,
    resources: ResourceHandle,
    failures: Vec<WorkflowError>,
}

impl TeardownWorkflow {
    /// Workflow with an empty handle; call [`set_resources`](Self::set_resources) before running.
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

    /// Every error recorded by the most recent run, in step order
    pub fn failures(&self) -> &[WorkflowError] {
        &self.failures
    }
}

#[async_trait]
impl Workflow for TeardownWorkflow {
    async fn run(&mut self, ctx: &CancellationToken) -> Result<(), WorkflowError> {
        let mut log = FailureLog::new();

        if self.resources.can_tear_down_agent() {
            tear_down_agent(self.provider, self.agent_builder.as_ref(), ctx, &self.resources, &mut log)
                .await;
        } else {
            debug!(provider = %self.provider, "Skipping agent teardown: agent_id or rag_id not set");
        }

        if self.resources.can_tear_down_rag() {
            tear_down_rag(
                self.provider,
                self.rag_builder.as_ref(),
                ctx,
                &self.resources.vector_store_id,
                &self.resources.rag_id,
                &mut log,
            )
            .await;
        } else {
            debug!(provider = %self.provider, "Skipping RAG teardown: vector_store_id or rag_id not set");
        }

        let result = log.finish("teardown");
        self.failures = log.into_errors();

        if let Err(e) = self.codebase.cleanup().await {
            error!(provider = %self.provider, "Failed to clean up codebase: {}", e);
        }

        result
    }

    fn resources(&self) -> &ResourceHandle {
        &self.resources
    }
}

pub(crate) async fn tear_down_agent(
    provider: ProviderKind,
    agent_builder: &dyn AgentBuilder,
    ctx: &CancellationToken,
    resources: &ResourceHandle,
    log: &mut FailureLog,
) {
    info!(
        provider = %provider,
        agent_id = %resources.agent_id,
        rag_id = %resources.rag_id,
        "Tearing down {} agent",
        provider.label()
    );
    match agent_builder
        .tear_down(ctx, &resources.agent_id, &resources.agent_version, &resources.rag_id)
        .await
    {
        Ok(()) => info!(provider = %provider, agent_id = %resources.agent_id, "Agent torn down"),
        Err(reason) => {
            error!(provider = %provider, agent_id = %resources.agent_id, "Agent teardown failed: {}", reason);
            log.record(WorkflowError::TearDownAgent { provider, reason });
        }
    }
}

pub(crate) async fn tear_down_rag(
    provider: ProviderKind,
    rag_builder: &dyn RagBuilder,
    ctx: &CancellationToken,
    vector_store_id: &str,
    rag_id: &str,
    log: &mut FailureLog,
) {
    info!(
        provider = %provider,
        vector_store_id = %vector_store_id,
        rag_id = %rag_id,
        "Tearing down {} RAG pipeline",
        provider.label()
    );
    match rag_builder.tear_down(ctx, vector_store_id, rag_id).await {
        Ok(()) => info!(provider = %provider, rag_id = %rag_id, "RAG pipeline torn down"),
        Err(reason) => {
            error!(provider = %provider, rag_id = %rag_id, "RAG teardown failed: {}", reason);
            log.record(WorkflowError::TearDownRag { provider, reason });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::test_support::{
        CallLog, MockAgentBuilder, MockCodebase, MockRagBuilder,
    };
    use crate::domain::builder::{AgentDeployment, BuilderError};
    use crate::domain::codebase::CodebaseError;

    struct Fixture {
        log: CallLog,
        codebase: Arc<MockCodebase>,
        rag: Arc<MockRagBuilder>,
        agent: Arc<MockAgentBuilder>,
    }

    impl Fixture {
        fn new(codebase: MockCodebase, rag: MockRagBuilder, agent: MockAgentBuilder, log: CallLog) -> Self {
            Self {
                log,
                codebase: Arc::new(codebase),
                rag: Arc::new(rag),
                agent: Arc::new(agent),
            }
        }

        fn healthy() -> Self {
            let log = CallLog::new();
            Self::new(
                MockCodebase::new(&log),
                MockRagBuilder::returning(&log, "unused"),
                MockAgentBuilder::returning(&log, AgentDeployment::new("unused", "unused")),
                log,
            )
        }

        fn workflow(&self, resources: ResourceHandle) -> TeardownWorkflow {
            TeardownWorkflow::with_resources(
                ProviderKind::ManagedCloud,
                self.codebase.clone(),
                self.rag.clone(),
                self.agent.clone(),
                resources,
            )
        }
    }

    #[tokio::test]
    async fn test_full_handle_tears_down_everything_once() {
        let fx = Fixture::healthy();
        let mut wf = fx.workflow(ResourceHandle::new("vs-1", "rag-1", "agent-1", "v1"));

        wf.run(&CancellationToken::new()).await.unwrap();

        assert_eq!(
            fx.agent.teardown_calls(),
            vec![("agent-1".to_string(), "v1".to_string(), "rag-1".to_string())]
        );
        assert_eq!(fx.rag.teardown_calls(), vec![("vs-1".to_string(), "rag-1".to_string())]);
        assert_eq!(fx.codebase.cleanup_count(), 1);
        assert_eq!(fx.log.entries(), vec!["agent.tear_down", "rag.tear_down", "cleanup"]);
        assert!(wf.failures().is_empty());
    }

    #[tokio::test]
    async fn test_empty_handle_only_cleans_up() {
        let fx = Fixture::healthy();
        let mut wf = fx.workflow(ResourceHandle::empty());

        assert!(wf.run(&CancellationToken::new()).await.is_ok());
        assert!(fx.agent.teardown_calls().is_empty());
        assert!(fx.rag.teardown_calls().is_empty());
        assert_eq!(fx.codebase.cleanup_count(), 1);
    }

    #[tokio::test]
    async fn test_agent_ids_without_rag_skip_both_steps() {
        let fx = Fixture::healthy();
        let mut wf = fx.workflow(ResourceHandle::new("", "", "agent-1", "v1"));

        assert!(wf.run(&CancellationToken::new()).await.is_ok());
        assert!(fx.agent.teardown_calls().is_empty());
        assert!(fx.rag.teardown_calls().is_empty());
    }

    #[tokio::test]
    async fn test_agent_failure_still_attempts_rag_and_is_returned() {
        let log = CallLog::new();
        let fx = Fixture::new(
            MockCodebase::new(&log),
            MockRagBuilder::returning(&log, "unused"),
            MockAgentBuilder::returning(&log, AgentDeployment::new("unused", "unused"))
                .with_teardown_error(BuilderError::Provider("agent is busy".to_string())),
            log,
        );
        let mut wf = fx.workflow(ResourceHandle::new("vs-1", "rag-1", "agent-1", "v1"));

        let err = wf.run(&CancellationToken::new()).await.unwrap_err();

        assert_eq!(
            err,
            WorkflowError::TearDownAgent {
                provider: ProviderKind::ManagedCloud,
                reason: BuilderError::Provider("agent is busy".to_string()),
            }
        );
        assert_eq!(fx.rag.teardown_calls().len(), 1);
        assert_eq!(fx.codebase.cleanup_count(), 1);
    }

    #[tokio::test]
    async fn test_rag_failure_only_is_returned_and_cleanup_runs() {
        let log = CallLog::new();
        let fx = Fixture::new(
            MockCodebase::new(&log),
            MockRagBuilder::returning(&log, "unused")
                .with_teardown_error(BuilderError::Provider("data source in use".to_string())),
            MockAgentBuilder::returning(&log, AgentDeployment::new("unused", "unused")),
            log,
        );
        let mut wf = fx.workflow(ResourceHandle::new("vs-1", "rag-1", "agent-1", "v1"));

        let err = wf.run(&CancellationToken::new()).await.unwrap_err();

        assert!(matches!(err, WorkflowError::TearDownRag { .. }));
        assert_eq!(fx.codebase.cleanup_count(), 1);
    }

    #[tokio::test]
    async fn test_codebase_cleanup_failure_is_logged_not_returned() {
        let log = CallLog::new();
        let fx = Fixture::new(
            MockCodebase::new(&log).with_cleanup_error(CodebaseError::Io("permission denied".to_string())),
            MockRagBuilder::returning(&log, "unused"),
            MockAgentBuilder::returning(&log, AgentDeployment::new("unused", "unused")),
            log,
        );
        let mut wf = fx.workflow(ResourceHandle::new("vs-1", "rag-1", "agent-1", "v1"));

        assert_eq!(wf.run(&CancellationToken::new()).await, Ok(()));
        assert!(wf.failures().is_empty());
        assert_eq!(fx.codebase.cleanup_count(), 1);
        assert_eq!(fx.agent.teardown_calls().len(), 1);
        assert_eq!(fx.rag.teardown_calls().len(), 1);
    }

    #[tokio::test]
    async fn test_both_failures_are_kept_first_is_returned() {
        let log = CallLog::new();
        let fx = Fixture::new(
            MockCodebase::new(&log).with_cleanup_error(CodebaseError::Io("busy".to_string())),
            MockRagBuilder::returning(&log, "unused")
                .with_teardown_error(BuilderError::Network("timeout".to_string())),
            MockAgentBuilder::returning(&log, AgentDeployment::new("unused", "unused"))
                .with_teardown_error(BuilderError::NotFound("agent-1".to_string())),
            log,
        );
        let mut wf = fx.workflow(ResourceHandle::new("vs-1", "rag-1", "agent-1", "v1"));

        let err = wf.run(&CancellationToken::new()).await.unwrap_err();

        assert!(matches!(err, WorkflowError::TearDownAgent { .. }));
        assert_eq!(wf.failures().len(), 2);
        assert!(matches!(wf.failures()[1], WorkflowError::TearDownRag { .. }));
    }

    #[tokio::test]
    async fn test_set_resources_before_run() {
        let fx = Fixture::healthy();
        let mut wf = TeardownWorkflow::new(
            ProviderKind::Local,
            fx.codebase.clone(),
            fx.rag.clone(),
            fx.agent.clone(),
        );
        wf.set_resources(ResourceHandle::new("rag-7", "rag-7", "", ""));

        wf.run(&CancellationToken::new()).await.unwrap();

        assert!(fx.agent.teardown_calls().is_empty());
        assert_eq!(fx.rag.teardown_calls(), vec![("rag-7".to_string(), "rag-7".to_string())]);
        assert_eq!(wf.resources().rag_id, "rag-7");
    }
}
