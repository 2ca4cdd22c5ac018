// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! Postgres Infrastructure Records
//!
//! Stores [`InfrastructureRecord`]s in the `agent_infrastructure` table
//! (created by `Database::ensure_schema`). The provider configuration, the
//! resource handle and the metadata map are kept as JSONB.
//!
//! # Architecture
//!
//! - **Layer:** Infrastructure Layer
//! - **Purpose:** Durable record store so teardown can run from another process

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::postgres::PgPool;
use sqlx::Row;

use crate::domain::infrastructure::{InfrastructureId, InfrastructureRecord, InfrastructureStatus};
use crate::domain::provider::{ProviderConfig, ProviderKind};
use crate::domain::repository::{InfrastructureRepository, RepositoryError};
use crate::domain::resource::ResourceHandle;

pub struct PostgresInfrastructureRepository {
    pool: PgPool,
}

impl PostgresInfrastructureRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl InfrastructureRepository for PostgresInfrastructureRepository {
    async fn save(&self, record: &InfrastructureRecord) -> Result<(), RepositoryError> {
        let provider_config_json = serde_json::to_value(&record.provider_config)?;
        let resources_json = serde_json::to_value(&record.resources)?;
        let metadata_json = serde_json::Value::Object(record.metadata.clone());

        sqlx::query(
            r#"
            INSERT INTO agent_infrastructure (
                id, provider, provider_config, repository_url, resources,
                status, failure_reason, metadata, created_at, updated_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            ON CONFLICT (id) DO UPDATE SET
                provider_config = EXCLUDED.provider_config,
                resources = EXCLUDED.resources,
                status = EXCLUDED.status,
                failure_reason = EXCLUDED.failure_reason,
                metadata = EXCLUDED.metadata,
                updated_at = EXCLUDED.updated_at
            "#,
        )
        .bind(record.id.0)
        .bind(record.provider.as_str())
        .bind(provider_config_json)
        .bind(&record.repository_url)
        .bind(resources_json)
        .bind(record.status.as_str())
        .bind(&record.failure_reason)
        .bind(metadata_json)
        .bind(record.created_at)
        .bind(record.updated_at)
        .execute(&self.pool)
        .await
        .map_err(|e| RepositoryError::Database(format!("Failed to save infrastructure record: {}", e)))?;

        Ok(())
    }

    async fn find_by_id(
        &self,
        id: InfrastructureId,
    ) -> Result<Option<InfrastructureRecord>, RepositoryError> {
        let row = sqlx::query(
            r#"
            SELECT
                id, provider, provider_config, repository_url, resources,
                status, failure_reason, metadata, created_at, updated_at
            FROM agent_infrastructure
            WHERE id = $1
            "#,
        )
        .bind(id.0)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| RepositoryError::Database(e.to_string()))?;

        row.map(parse_record_row).transpose()
    }

    async fn list_all(&self) -> Result<Vec<InfrastructureRecord>, RepositoryError> {
        let rows = sqlx::query(
            r#"
            SELECT
                id, provider, provider_config, repository_url, resources,
                status, failure_reason, metadata, created_at, updated_at
            FROM agent_infrastructure
            ORDER BY created_at DESC
            "#,
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e| RepositoryError::Database(e.to_string()))?;

        rows.into_iter().map(parse_record_row).collect()
    }

    async fn delete(&self, id: InfrastructureId) -> Result<(), RepositoryError> {
        let result = sqlx::query("DELETE FROM agent_infrastructure WHERE id = $1")
            .bind(id.0)
            .execute(&self.pool)
            .await
            .map_err(|e| RepositoryError::Database(e.to_string()))?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound(format!("Infrastructure {} not found", id)));
        }

        Ok(())
    }
}

fn parse_record_row(row: sqlx::postgres::PgRow) -> Result<InfrastructureRecord, RepositoryError> {
    let id: uuid::Uuid = row.get("id");
    let provider: String = row.get("provider");
    let provider_config_val: serde_json::Value = row.get("provider_config");
    let repository_url: String = row.get("repository_url");
    let resources_val: serde_json::Value = row.get("resources");
    let status: String = row.get("status");
    let failure_reason: Option<String> = row.get("failure_reason");
    let metadata_val: serde_json::Value = row.get("metadata");
    let created_at: DateTime<Utc> = row.get("created_at");
    let updated_at: DateTime<Utc> = row.get("updated_at");

    let provider: ProviderKind = provider
        .parse()
        .map_err(|e| RepositoryError::Serialization(format!("Invalid provider column: {}", e)))?;

    let provider_config: ProviderConfig = serde_json::from_value(provider_config_val).map_err(|e| {
        RepositoryError::Serialization(format!("Failed to deserialize provider_config: {}", e))
    })?;

    let resources: ResourceHandle = serde_json::from_value(resources_val)
        .map_err(|e| RepositoryError::Serialization(format!("Failed to deserialize resources: {}", e)))?;

    let status = InfrastructureStatus::parse(&status)
        .ok_or_else(|| RepositoryError::Serialization(format!("Unknown status: {}", status)))?;

    let metadata = match metadata_val {
        serde_json::Value::Object(map) => map,
        _ => serde_json::Map::new(),
    };

    Ok(InfrastructureRecord {
        id: InfrastructureId(id),
        provider,
        provider_config,
        repository_url,
        resources,
        status,
        failure_reason,
        metadata,
        created_at,
        updated_at,
    })
}
