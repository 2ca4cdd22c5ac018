// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! # Domain Repository Interfaces
//!
//! Persistence contract for the [`InfrastructureRecord`] aggregate, defined in
//! the domain layer and implemented in `crate::infrastructure::repositories`.
//!
//! | Trait | Aggregate | Implementations |
//! |-------|-----------|----------------|
//! | `InfrastructureRepository` | `InfrastructureRecord` | `InMemoryInfrastructureRepository`, `PostgresInfrastructureRepository` |
//!
//! ## Storage Backend Abstraction
//!
//! The concrete implementation is selected at startup from the `storage`
//! section of `agentforge-config.yaml`. The in-memory store lives only as long
//! as the process; PostgreSQL keeps records between CLI invocations.

use async_trait::async_trait;

use crate::domain::infrastructure::{InfrastructureId, InfrastructureRecord};

/// Storage backend enum for pluggable persistence
#[derive(Debug, Clone)]
pub enum StorageBackend {
    InMemory,
    PostgreSQL(PostgresConfig),
}

#[derive(Debug, Clone)]
pub struct PostgresConfig {
    pub connection_string: String,
}

/// Repository interface for provisioned infrastructure records
#[async_trait]
pub trait InfrastructureRepository: Send + Sync {
    /// Save record (create or update)
    async fn save(&self, record: &InfrastructureRecord) -> Result<(), RepositoryError>;

    /// Find record by ID
    async fn find_by_id(
        &self,
        id: InfrastructureId,
    ) -> Result<Option<InfrastructureRecord>, RepositoryError>;

    /// List all records, newest first
    async fn list_all(&self) -> Result<Vec<InfrastructureRecord>, RepositoryError>;

    /// Delete record by ID
    async fn delete(&self, id: InfrastructureId) -> Result<(), RepositoryError>;
}

/// Repository errors
#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    #[error("Entity not found: {0}")]
    NotFound(String),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Unknown error: {0}")]
    Unknown(String),
}

impl From<sqlx::Error> for RepositoryError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::RowNotFound => RepositoryError::NotFound("Row not found".to_string()),
            _ => RepositoryError::Database(err.to_string()),
        }
    }
}

impl From<serde_json::Error> for RepositoryError {
    fn from(err: serde_json::Error) -> Self {
        RepositoryError::Serialization(err.to_string())
    }
}
