// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! Provider Backends
//!
//! Turns a [`ProviderConfig`] into the matched RAG/agent builder pair for one
//! working copy. Dispatch is a closed `match` over the config variants: adding
//! a provider means adding one variant and one arm here, the workflows are
//! never touched.
//!
//! # Architecture
//!
//! - **Layer:** Application Layer
//! - **Purpose:** Strategy seam between the factory and the provider adapters

use std::path::Path;
use std::sync::Arc;
use tracing::debug;

use crate::application::factory::FactoryError;
use crate::domain::builder::{AgentBuilder, RagBuilder};
use crate::domain::codebase::Codebase;
use crate::domain::config::GitConfig;
use crate::domain::provider::{
    LocalConfig, ProviderConfig, ProviderKind, DEFAULT_CHROMA_URL, DEFAULT_EMBEDDING_MODEL,
};
use crate::infrastructure::bedrock::{BedrockAgentBuilder, BedrockRagBuilder, ManagedCloudServices};
use crate::infrastructure::codebase::GitCodebase;
use crate::infrastructure::local::{ChromaClient, LocalAgentBuilder, LocalRagBuilder, OllamaClient};

/// Builders for one provider, bound to one working copy
#[derive(Clone)]
pub struct BuilderPair {
    pub rag: Arc<dyn RagBuilder>,
    pub agent: Arc<dyn AgentBuilder>,
}

pub trait ProviderBackends: Send + Sync {
    /// A fresh working copy for the repository. Nothing is cloned yet.
    fn open_codebase(&self, repository_url: &str) -> Result<Arc<dyn Codebase>, FactoryError>;

    fn builders(
        &self,
        config: &ProviderConfig,
        codebase_path: &Path,
    ) -> Result<BuilderPair, FactoryError>;

    /// Providers this instance can build for
    fn supported_providers(&self) -> Vec<ProviderKind>;
}

pub struct StandardProviderBackends {
    git: GitConfig,
    http: reqwest::Client,
    managed_cloud: Option<ManagedCloudServices>,
}

impl StandardProviderBackends {
    pub fn new(git: GitConfig) -> Self {
        Self {
            git,
            http: reqwest::Client::new(),
            managed_cloud: None,
        }
    }

    /// Enable the managed cloud provider with the given service clients
    pub fn with_managed_cloud(mut self, services: ManagedCloudServices) -> Self {
        self.managed_cloud = Some(services);
        self
    }

    fn local_builders(&self, config: &LocalConfig, codebase_path: &Path) -> BuilderPair {
        let ollama = OllamaClient::new(self.http.clone(), config.ollama_url.clone());
        let chroma = ChromaClient::new(
            self.http.clone(),
            or_default(&config.chroma_url, DEFAULT_CHROMA_URL),
        );
        let embedding_model = or_default(&config.embedding_model, DEFAULT_EMBEDDING_MODEL);

        BuilderPair {
            rag: Arc::new(LocalRagBuilder::new(
                ollama.clone(),
                chroma,
                embedding_model,
                codebase_path,
            )),
            agent: Arc::new(LocalAgentBuilder::new(ollama, config.model.clone())),
        }
    }
}

fn or_default(value: &str, default: &str) -> String {
    if value.trim().is_empty() {
        default.to_string()
    } else {
        value.to_string()
    }
}

impl ProviderBackends for StandardProviderBackends {
    fn open_codebase(&self, repository_url: &str) -> Result<Arc<dyn Codebase>, FactoryError> {
        let codebase = GitCodebase::new(repository_url, &self.git.workspace_root, self.git.token.clone())?;
        Ok(Arc::new(codebase))
    }

    fn builders(
        &self,
        config: &ProviderConfig,
        codebase_path: &Path,
    ) -> Result<BuilderPair, FactoryError> {
        debug!(provider = %config.kind(), path = %codebase_path.display(), "Selecting builders");

        match config {
            ProviderConfig::ManagedCloud(cloud) => {
                let services = self
                    .managed_cloud
                    .clone()
                    .ok_or(FactoryError::ProviderUnavailable(ProviderKind::ManagedCloud))?;
                let name = codebase_path
                    .file_name()
                    .map(|n| n.to_string_lossy().to_string())
                    .unwrap_or_default();

                Ok(BuilderPair {
                    rag: Arc::new(BedrockRagBuilder::new(
                        services.clone(),
                        cloud.clone(),
                        codebase_path,
                    )),
                    agent: Arc::new(BedrockAgentBuilder::new(services, cloud.clone(), name)),
                })
            }
            ProviderConfig::Local(local) => Ok(self.local_builders(local, codebase_path)),
        }
    }

    fn supported_providers(&self) -> Vec<ProviderKind> {
        ProviderKind::ALL
            .into_iter()
            .filter(|kind| *kind != ProviderKind::ManagedCloud || self.managed_cloud.is_some())
            .collect()
    }
}
