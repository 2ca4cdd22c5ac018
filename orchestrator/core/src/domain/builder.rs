// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! Builder Capability Interfaces (Anti-Corruption Layer)
//!
//! A builder is the pluggable adapter that performs the provider-specific
//! create and destroy calls for one kind of resource. Workflows depend only on
//! these traits, so a provider is swapped by handing a different pair to the
//! workflow, never by touching the workflow itself.
//!
//! Every call receives the caller's [`CancellationToken`]. Implementations
//! are expected to race their I/O against `ctx.cancelled()` and return
//! [`BuilderError::Cancelled`] promptly.
//!
//! Implementations live in `infrastructure/local` and `infrastructure/bedrock`.
//!
//! # Architecture
//!
//! - **Layer:** Domain Layer
//! - **Purpose:** Capability contracts consumed by the provisioning workflows

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio_util::sync::CancellationToken;

/// Builds and destroys the knowledge base / vector store for a codebase.
#[async_trait]
pub trait RagBuilder: Send + Sync {
    /// Build the RAG pipeline from the working copy and return its identifier.
    async fn build(&self, ctx: &CancellationToken) -> Result<String, BuilderError>;

    /// Remove the RAG pipeline and anything created alongside it.
    async fn tear_down(
        &self,
        ctx: &CancellationToken,
        vector_store_id: &str,
        rag_id: &str,
    ) -> Result<(), BuilderError>;
}

/// Builds and destroys an agent bound to exactly one knowledge base.
#[async_trait]
pub trait AgentBuilder: Send + Sync {
    /// Create an agent connected to the given RAG pipeline.
    async fn build(
        &self,
        ctx: &CancellationToken,
        rag_id: &str,
    ) -> Result<AgentDeployment, BuilderError>;

    /// Remove the agent and its association with the RAG pipeline.
    async fn tear_down(
        &self,
        ctx: &CancellationToken,
        agent_id: &str,
        agent_version: &str,
        rag_id: &str,
    ) -> Result<(), BuilderError>;
}

/// Identifiers returned by a successful agent build.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgentDeployment {
    pub agent_id: String,
    /// Version or alias used to address a deployable instance of the agent
    pub agent_version: String,
}

impl AgentDeployment {
    pub fn new(agent_id: impl Into<String>, agent_version: impl Into<String>) -> Self {
        Self {
            agent_id: agent_id.into(),
            agent_version: agent_version.into(),
        }
    }
}

/// Errors raised by builder implementations
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum BuilderError {
    #[error("network error: {0}")]
    Network(String),

    #[error("{0}")]
    Provider(String),

    #[error("resource not found: {0}")]
    NotFound(String),

    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("io error: {0}")]
    Io(String),

    #[error("operation cancelled")]
    Cancelled,
}

impl From<std::io::Error> for BuilderError {
    fn from(err: std::io::Error) -> Self {
        BuilderError::Io(err.to_string())
    }
}

impl From<reqwest::Error> for BuilderError {
    fn from(err: reqwest::Error) -> Self {
        BuilderError::Network(err.to_string())
    }
}

/// Run `fut` unless `ctx` is cancelled first.
pub async fn cancellable<T, F>(ctx: &CancellationToken, fut: F) -> Result<T, BuilderError>
where
    F: std::future::Future<Output = Result<T, BuilderError>>,
{
    tokio::select! {
        biased;
        _ = ctx.cancelled() => Err(BuilderError::Cancelled),
        result = fut => result,
    }
}
