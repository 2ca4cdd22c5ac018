// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! Codebase Capability
//!
//! The local working copy of the source repository that a RAG pipeline is
//! built from. Workflows clone it before provisioning and always release it
//! afterwards, whatever the outcome.
//!
//! See `infrastructure::codebase::GitCodebase` for the git implementation.

use async_trait::async_trait;
use std::path::Path;
use tokio_util::sync::CancellationToken;

#[async_trait]
pub trait Codebase: Send + Sync {
    /// Clone the repository into the local working copy
    async fn clone_repository(&self, ctx: &CancellationToken) -> Result<(), CodebaseError>;

    /// Location of the working copy (valid before the clone happens)
    fn path(&self) -> &Path;

    /// Remove the working copy
    async fn cleanup(&self) -> Result<(), CodebaseError>;
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CodebaseError {
    #[error("clone failed: {0}")]
    Clone(String),

    #[error("invalid repository URL: {0}")]
    InvalidUrl(String),

    #[error("io error: {0}")]
    Io(String),

    #[error("operation cancelled")]
    Cancelled,
}

impl From<std::io::Error> for CodebaseError {
    fn from(err: std::io::Error) -> Self {
        CodebaseError::Io(err.to_string())
    }
}

impl From<git2::Error> for CodebaseError {
    fn from(err: git2::Error) -> Self {
        CodebaseError::Clone(err.message().to_string())
    }
}
