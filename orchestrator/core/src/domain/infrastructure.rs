// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! # Agent Infrastructure Aggregate
//!
//! An [`InfrastructureRecord`] is what the factory persists after a create
//! workflow: the resource handle plus the provider that produced it. Teardown
//! is always driven by the stored provider tag, never by the shape of the
//! identifiers.
//!
//! # Architecture
//!
//! - **Layer:** Domain Layer
//! - **Purpose:** Aggregate root for provisioned agent infrastructure

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::provider::{ProviderConfig, ProviderKind};
use crate::domain::resource::ResourceHandle;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct InfrastructureId(pub Uuid);

impl InfrastructureId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for InfrastructureId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for InfrastructureId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Infrastructure status lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InfrastructureStatus {
    /// Resources exist but the agent may not be serving yet
    Initializing,
    /// Create workflow completed
    Ready,
    /// Create workflow stopped part way; the handle lists what exists
    Failed,
    /// Teardown completed
    Destroyed,
}

impl InfrastructureStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            InfrastructureStatus::Initializing => "initializing",
            InfrastructureStatus::Ready => "ready",
            InfrastructureStatus::Failed => "failed",
            InfrastructureStatus::Destroyed => "destroyed",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "initializing" => Some(InfrastructureStatus::Initializing),
            "ready" => Some(InfrastructureStatus::Ready),
            "failed" => Some(InfrastructureStatus::Failed),
            "destroyed" => Some(InfrastructureStatus::Destroyed),
            _ => None,
        }
    }
}

impl std::fmt::Display for InfrastructureStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InfrastructureRecord {
    pub id: InfrastructureId,
    pub provider: ProviderKind,
    pub provider_config: ProviderConfig,
    pub repository_url: String,
    pub resources: ResourceHandle,
    pub status: InfrastructureStatus,
    #[serde(default)]
    pub failure_reason: Option<String>,
    #[serde(default)]
    pub metadata: serde_json::Map<String, serde_json::Value>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl InfrastructureRecord {
    pub fn new(
        id: InfrastructureId,
        provider_config: ProviderConfig,
        repository_url: impl Into<String>,
        resources: ResourceHandle,
    ) -> Self {
        let now = Utc::now();
        Self {
            id,
            provider: provider_config.kind(),
            metadata: provider_config.metadata(),
            provider_config,
            repository_url: repository_url.into(),
            resources,
            status: InfrastructureStatus::Initializing,
            failure_reason: None,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn mark_ready(&mut self) {
        self.status = InfrastructureStatus::Ready;
        self.failure_reason = None;
        self.updated_at = Utc::now();
    }

    pub fn mark_failed(&mut self, reason: impl Into<String>) {
        self.status = InfrastructureStatus::Failed;
        self.failure_reason = Some(reason.into());
        self.updated_at = Utc::now();
    }

    pub fn mark_destroyed(&mut self) {
        self.status = InfrastructureStatus::Destroyed;
        self.resources = ResourceHandle::empty();
        self.updated_at = Utc::now();
    }

    pub fn is_destroyed(&self) -> bool {
        self.status == InfrastructureStatus::Destroyed
    }
}

/// What a create or update call hands back to its caller.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InfrastructureResult {
    pub infrastructure_id: InfrastructureId,
    pub provider: ProviderKind,
    pub agent_id: String,
    pub agent_version: String,
    pub knowledge_base_id: String,
    pub vector_store_id: String,
    pub status: InfrastructureStatus,
    pub metadata: serde_json::Map<String, serde_json::Value>,
}

impl From<&InfrastructureRecord> for InfrastructureResult {
    fn from(record: &InfrastructureRecord) -> Self {
        Self {
            infrastructure_id: record.id,
            provider: record.provider,
            agent_id: record.resources.agent_id.clone(),
            agent_version: record.resources.agent_version.clone(),
            knowledge_base_id: record.resources.rag_id.clone(),
            vector_store_id: record.resources.vector_store_id.clone(),
            status: record.status,
            metadata: record.metadata.clone(),
        }
    }
}
