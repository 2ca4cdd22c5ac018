// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! # Provisioning Workflow Contract
//!
//! Every workflow variant (create-setup, teardown, cleanup) exposes the same
//! capability: run it once against a cancellation context, then read the
//! resource identifiers it ended up with.
//!
//! Step failures are always wrapped in a [`WorkflowError`] that names the step
//! and the provider, so a caller (or an operator reading logs) can tell which
//! of the sequential calls failed without parsing provider messages.
//!
//! # Architecture
//!
//! - **Layer:** Domain Layer
//! - **Purpose:** Uniform `run` contract and step-scoped error taxonomy

use async_trait::async_trait;
use std::fmt;
use tokio_util::sync::CancellationToken;

use crate::domain::builder::BuilderError;
use crate::domain::codebase::CodebaseError;
use crate::domain::provider::ProviderKind;
use crate::domain::resource::ResourceHandle;

#[async_trait]
pub trait Workflow: Send {
    /// Execute every step of the workflow in order.
    async fn run(&mut self, ctx: &CancellationToken) -> Result<(), WorkflowError>;

    /// Identifiers known to the workflow, valid after success or partial failure.
    fn resources(&self) -> &ResourceHandle;
}

/// The sequential steps a workflow can perform
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WorkflowStep {
    CloneRepository,
    BuildRag,
    BuildAgent,
    TearDownAgent,
    TearDownRag,
    CleanupCodebase,
}

impl WorkflowStep {
    pub fn as_str(&self) -> &'static str {
        match self {
            WorkflowStep::CloneRepository => "clone_repository",
            WorkflowStep::BuildRag => "build_rag",
            WorkflowStep::BuildAgent => "build_agent",
            WorkflowStep::TearDownAgent => "tear_down_agent",
            WorkflowStep::TearDownRag => "tear_down_rag",
            WorkflowStep::CleanupCodebase => "cleanup_codebase",
        }
    }
}

impl fmt::Display for WorkflowStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum WorkflowError {
    #[error("failed to clone repository: {reason}")]
    Clone { reason: CodebaseError },

    #[error("failed to build {} RAG pipeline: {reason}", .provider.label())]
    BuildRag {
        provider: ProviderKind,
        reason: BuilderError,
    },

    #[error("failed to build {} agent: {reason}", .provider.label())]
    BuildAgent {
        provider: ProviderKind,
        reason: BuilderError,
    },

    #[error("failed to tear down {} agent: {reason}", .provider.label())]
    TearDownAgent {
        provider: ProviderKind,
        reason: BuilderError,
    },

    #[error("failed to tear down {} RAG pipeline: {reason}", .provider.label())]
    TearDownRag {
        provider: ProviderKind,
        reason: BuilderError,
    },

    #[error("failed to clean up codebase: {reason}")]
    Cleanup { reason: CodebaseError },
}

impl WorkflowError {
    pub fn step(&self) -> WorkflowStep {
        match self {
            WorkflowError::Clone { .. } => WorkflowStep::CloneRepository,
            WorkflowError::BuildRag { .. } => WorkflowStep::BuildRag,
            WorkflowError::BuildAgent { .. } => WorkflowStep::BuildAgent,
            WorkflowError::TearDownAgent { .. } => WorkflowStep::TearDownAgent,
            WorkflowError::TearDownRag { .. } => WorkflowStep::TearDownRag,
            WorkflowError::Cleanup { .. } => WorkflowStep::CleanupCodebase,
        }
    }

    /// True when the underlying call stopped because the context was cancelled.
    pub fn is_cancelled(&self) -> bool {
        match self {
            WorkflowError::Clone { reason } | WorkflowError::Cleanup { reason } => {
                matches!(reason, CodebaseError::Cancelled)
            }
            WorkflowError::BuildRag { reason, .. }
            | WorkflowError::BuildAgent { reason, .. }
            | WorkflowError::TearDownAgent { reason, .. }
            | WorkflowError::TearDownRag { reason, .. } => {
                matches!(reason, BuilderError::Cancelled)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages_name_step_and_provider() {
        let err = WorkflowError::BuildRag {
            provider: ProviderKind::ManagedCloud,
            reason: BuilderError::Provider("quota exceeded".to_string()),
        };
        assert_eq!(err.to_string(), "failed to build Bedrock RAG pipeline: quota exceeded");
        assert_eq!(err.step(), WorkflowStep::BuildRag);

        let err = WorkflowError::TearDownAgent {
            provider: ProviderKind::Local,
            reason: BuilderError::NotFound("agent-1".to_string()),
        };
        assert_eq!(
            err.to_string(),
            "failed to tear down local agent: resource not found: agent-1"
        );
    }

    #[test]
    fn test_is_cancelled() {
        let cancelled = WorkflowError::Clone {
            reason: CodebaseError::Cancelled,
        };
        assert!(cancelled.is_cancelled());

        let failed = WorkflowError::BuildAgent {
            provider: ProviderKind::Local,
            reason: BuilderError::Network("connection refused".to_string()),
        };
        assert!(!failed.is_cancelled());
    }
}
