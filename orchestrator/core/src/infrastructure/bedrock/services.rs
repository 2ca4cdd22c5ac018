// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! Managed Cloud Service Contracts (Anti-Corruption Layer)
//!
//! The Bedrock builders only sequence calls; the calls themselves go through
//! these traits. A cloud SDK adapter implements them and is injected into the
//! provider backends as a [`ManagedCloudServices`] bundle.
//!
//! | Trait | Bedrock / AWS operations |
//! |-------|--------------------------|
//! | [`KnowledgeBaseService`] | `CreateKnowledgeBase`, `DeleteKnowledgeBase` |
//! | [`DocumentStore`] | S3 upload/delete under a prefix, `CreateDataSource`, `DeleteDataSource` |
//! | [`AgentService`] | `CreateAgent`, `AssociateAgentKnowledgeBase`, `CreateAgentAlias`, `DisassociateAgentKnowledgeBase`, `DeleteAgent` |
//!
//! # Architecture
//!
//! - **Layer:** Infrastructure Layer
//! - **Purpose:** Capability seams for the managed cloud provider

use async_trait::async_trait;
use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

use crate::domain::builder::BuilderError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KnowledgeBaseRequest {
    pub name: String,
    pub description: String,
    /// Role the knowledge base assumes to read the uploaded documents
    pub role_arn: String,
    pub tags: HashMap<String, String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AgentRequest {
    pub name: String,
    pub description: String,
    pub instruction: String,
    pub foundation_model_arn: String,
    pub role_arn: String,
    pub tags: HashMap<String, String>,
}

#[async_trait]
pub trait KnowledgeBaseService: Send + Sync {
    /// Returns the knowledge base id
    async fn create_knowledge_base(&self, request: &KnowledgeBaseRequest) -> Result<String, BuilderError>;

    async fn delete_knowledge_base(&self, knowledge_base_id: &str) -> Result<(), BuilderError>;
}

#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Upload every file under `local_dir` below `prefix`
    async fn upload_directory(&self, local_dir: &Path, prefix: &str) -> Result<(), BuilderError>;

    async fn delete_directory(&self, prefix: &str) -> Result<(), BuilderError>;

    /// Register `prefix` as a data source of the knowledge base; returns the data source id
    async fn create_data_source(&self, knowledge_base_id: &str, prefix: &str) -> Result<String, BuilderError>;

    /// Remove every data source attached to the knowledge base
    async fn delete_data_sources(&self, knowledge_base_id: &str) -> Result<(), BuilderError>;
}

#[async_trait]
pub trait AgentService: Send + Sync {
    /// Returns the agent id
    async fn create_agent(&self, request: &AgentRequest) -> Result<String, BuilderError>;

    async fn associate_knowledge_base(&self, agent_id: &str, knowledge_base_id: &str) -> Result<(), BuilderError>;

    /// Returns the alias id
    async fn create_alias(&self, agent_id: &str, alias_name: &str) -> Result<String, BuilderError>;

    async fn disassociate_knowledge_base(
        &self,
        agent_id: &str,
        agent_version: &str,
        knowledge_base_id: &str,
    ) -> Result<(), BuilderError>;

    async fn delete_agent(&self, agent_id: &str) -> Result<(), BuilderError>;
}

/// Service clients for one cloud account and region
#[derive(Clone)]
pub struct ManagedCloudServices {
    pub knowledge_bases: Arc<dyn KnowledgeBaseService>,
    pub documents: Arc<dyn DocumentStore>,
    pub agents: Arc<dyn AgentService>,
}

impl ManagedCloudServices {
    pub fn new(
        knowledge_bases: Arc<dyn KnowledgeBaseService>,
        documents: Arc<dyn DocumentStore>,
        agents: Arc<dyn AgentService>,
    ) -> Self {
        Self {
            knowledge_bases,
            documents,
            agents,
        }
    }
}

/// Tags applied to every resource created for an agent
pub fn resource_tags(repository: &str) -> HashMap<String, String> {
    HashMap::from([
        ("managed-by".to_string(), "agentforge".to_string()),
        ("repository".to_string(), repository.to_string()),
    ])
}
