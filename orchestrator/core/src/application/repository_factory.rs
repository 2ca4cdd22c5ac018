// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! Repository Factory - Application Layer
//!
//! Creates the infrastructure record store for the configured storage backend.
//! The domain layer only defines the repository trait; this factory picks the
//! concrete implementation so the domain stays free of infrastructure
//! dependencies.
//!
//! # Architecture
//!
//! - **Layer:** Application Layer
//! - **Purpose:** Storage backend selection for infrastructure records

use anyhow::{anyhow, Result};
use sqlx::PgPool;
use std::sync::Arc;

use crate::domain::repository::{InfrastructureRepository, StorageBackend};
use crate::infrastructure::repositories::postgres_infrastructure::PostgresInfrastructureRepository;
use crate::infrastructure::repositories::InMemoryInfrastructureRepository;

/// Creates an InfrastructureRepository implementation based on the configured backend.
/// The PostgreSQL backend needs a connected pool.
pub fn create_infrastructure_repository(
    backend: &StorageBackend,
    pool: Option<PgPool>,
) -> Result<Arc<dyn InfrastructureRepository>> {
    match backend {
        StorageBackend::InMemory => Ok(Arc::new(InMemoryInfrastructureRepository::new())),
        StorageBackend::PostgreSQL(_) => {
            let pool = pool.ok_or_else(|| anyhow!("PostgreSQL storage selected but no connection pool was provided"))?;
            Ok(Arc::new(PostgresInfrastructureRepository::new(pool)))
        }
    }
}
