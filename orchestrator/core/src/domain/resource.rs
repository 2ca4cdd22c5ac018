// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! # Resource Handle
//!
//! The bundle of provider-side identifiers that flows from a create workflow,
//! through the caller's persistence, back into a teardown workflow.
//!
//! A handle starts empty and is filled in step by step as provisioning
//! succeeds, so a handle captured after a failure describes exactly what
//! exists on the provider side.
//!
//! | Field | Set by | Notes |
//! |-------|--------|-------|
//! | `vector_store_id` | RAG build | Equals `rag_id` for providers without a distinct vector store |
//! | `rag_id` | RAG build | Required before any agent build or teardown |
//! | `agent_id` | Agent build | Always set together with `agent_version` |
//! | `agent_version` | Agent build | Alias/version used to address the agent |
//!
//! # Architecture
//!
//! - **Layer:** Domain Layer
//! - **Purpose:** Value object shared by every workflow variant

use serde::{Deserialize, Serialize};

use crate::domain::builder::AgentDeployment;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceHandle {
    #[serde(default)]
    pub vector_store_id: String,
    #[serde(default)]
    pub rag_id: String,
    #[serde(default)]
    pub agent_id: String,
    #[serde(default)]
    pub agent_version: String,
}

impl ResourceHandle {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn new(
        vector_store_id: impl Into<String>,
        rag_id: impl Into<String>,
        agent_id: impl Into<String>,
        agent_version: impl Into<String>,
    ) -> Self {
        Self {
            vector_store_id: vector_store_id.into(),
            rag_id: rag_id.into(),
            agent_id: agent_id.into(),
            agent_version: agent_version.into(),
        }
    }

    /// Record a freshly built knowledge base. Every supported provider uses
    /// the knowledge base identifier as its vector store identifier too.
    pub fn record_rag(&mut self, rag_id: impl Into<String>) {
        let rag_id = rag_id.into();
        self.vector_store_id = rag_id.clone();
        self.rag_id = rag_id;
    }

    pub fn record_agent(&mut self, deployment: AgentDeployment) {
        self.agent_id = deployment.agent_id;
        self.agent_version = deployment.agent_version;
    }

    /// An agent is only torn down when we also know the RAG it is bound to.
    pub fn can_tear_down_agent(&self) -> bool {
        !self.agent_id.is_empty() && !self.rag_id.is_empty()
    }

    pub fn can_tear_down_rag(&self) -> bool {
        !self.vector_store_id.is_empty() && !self.rag_id.is_empty()
    }

    pub fn has_agent(&self) -> bool {
        !self.agent_id.is_empty()
    }

    pub fn is_empty(&self) -> bool {
        self.vector_store_id.is_empty()
            && self.rag_id.is_empty()
            && self.agent_id.is_empty()
            && self.agent_version.is_empty()
    }

    /// `(vector_store_id, rag_id, agent_id, agent_version)`
    pub fn ids(&self) -> (&str, &str, &str, &str) {
        (
            &self.vector_store_id,
            &self.rag_id,
            &self.agent_id,
            &self.agent_version,
        )
    }
}
