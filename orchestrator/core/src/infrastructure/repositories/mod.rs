// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! Repository Implementations
//!
//! Infrastructure implementations of the repository abstraction defined in
//! `crate::domain::repository`.
//!
//! # Architecture
//!
//! - **Layer:** Infrastructure
//! - **Purpose:** Persist and retrieve infrastructure records
//! - **Pattern:** Repository (DDD), Adapter (Hexagonal Architecture)
//!
//! # Available Implementations
//!
//! - **InMemoryInfrastructureRepository** - Thread-safe HashMap-backed storage, lives as long as the process
//! - **PostgresInfrastructureRepository** - `agent_infrastructure` table
//!
//! # Usage
//!
//! ```no_run
//! # async fn example(database_url: &str) -> anyhow::Result<()> {
//! use agentforge_core::domain::repository::InfrastructureRepository;
//! use agentforge_core::infrastructure::repositories::postgres_infrastructure::PostgresInfrastructureRepository;
//!
//! let pool = sqlx::PgPool::connect(database_url).await?;
//! let repo = PostgresInfrastructureRepository::new(pool);
//! let records = repo.list_all().await?;
//! # Ok(())
//! # }
//! ```

pub mod postgres_infrastructure;

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use crate::domain::infrastructure::{InfrastructureId, InfrastructureRecord};
use crate::domain::repository::{InfrastructureRepository, RepositoryError};

#[derive(Clone, Default)]
pub struct InMemoryInfrastructureRepository {
    records: Arc<RwLock<HashMap<InfrastructureId, InfrastructureRecord>>>,
}

impl InMemoryInfrastructureRepository {
    pub fn new() -> Self {
        Self {
            records: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    fn poisoned() -> RepositoryError {
        RepositoryError::Unknown("record store lock poisoned".to_string())
    }
}

#[async_trait]
impl InfrastructureRepository for InMemoryInfrastructureRepository {
    async fn save(&self, record: &InfrastructureRecord) -> Result<(), RepositoryError> {
        let mut records = self.records.write().map_err(|_| Self::poisoned())?;
        records.insert(record.id, record.clone());
        Ok(())
    }

    async fn find_by_id(
        &self,
        id: InfrastructureId,
    ) -> Result<Option<InfrastructureRecord>, RepositoryError> {
        let records = self.records.read().map_err(|_| Self::poisoned())?;
        Ok(records.get(&id).cloned())
    }

    async fn list_all(&self) -> Result<Vec<InfrastructureRecord>, RepositoryError> {
        let records = self.records.read().map_err(|_| Self::poisoned())?;
        let mut all: Vec<InfrastructureRecord> = records.values().cloned().collect();
        all.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(all)
    }

    async fn delete(&self, id: InfrastructureId) -> Result<(), RepositoryError> {
        let mut records = self.records.write().map_err(|_| Self::poisoned())?;
        records
            .remove(&id)
            .map(|_| ())
            .ok_or_else(|| RepositoryError::NotFound(format!("Infrastructure {} not found", id)))
    }
}
