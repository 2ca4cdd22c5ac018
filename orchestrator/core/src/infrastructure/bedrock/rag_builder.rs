// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! Bedrock RAG Builder
//!
//! Build order: create the knowledge base, upload the working copy below
//! `codebases/<kb-id>/`, then register that prefix as the knowledge base's
//! data source. The knowledge base id is returned as the RAG id; it also
//! serves as the vector store id.
//!
//! Teardown runs in reverse. Each step accepts an already-missing resource,
//! so teardown can be repeated after a partial failure.

use async_trait::async_trait;
use std::path::PathBuf;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use super::services::{resource_tags, KnowledgeBaseRequest, ManagedCloudServices};
use super::{document_prefix, ignore_missing, resource_name, step_failed};
use crate::domain::builder::{cancellable, BuilderError, RagBuilder};
use crate::domain::provider::ManagedCloudConfig;

pub struct BedrockRagBuilder {
    services: ManagedCloudServices,
    config: ManagedCloudConfig,
    codebase_path: PathBuf,
}

impl BedrockRagBuilder {
    pub fn new(
        services: ManagedCloudServices,
        config: ManagedCloudConfig,
        codebase_path: impl Into<PathBuf>,
    ) -> Self {
        Self {
            services,
            config,
            codebase_path: codebase_path.into(),
        }
    }

    fn knowledge_base_request(&self) -> KnowledgeBaseRequest {
        let source = self
            .codebase_path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_default();

        KnowledgeBaseRequest {
            name: resource_name(&source),
            description: format!("Source code knowledge base for {}", source),
            role_arn: self.config.knowledge_base_service_role_arn.clone(),
            tags: resource_tags(&source),
        }
    }

    /// Best-effort removal of what a failed build already created
    async fn roll_back(&self, knowledge_base_id: &str, uploaded: bool) {
        if uploaded {
            if let Err(e) = self
                .services
                .documents
                .delete_directory(&document_prefix(knowledge_base_id))
                .await
            {
                warn!(knowledge_base_id = %knowledge_base_id, error = %e, "Failed to remove uploaded documents");
            }
        }
        if let Err(e) = self
            .services
            .knowledge_bases
            .delete_knowledge_base(knowledge_base_id)
            .await
        {
            warn!(knowledge_base_id = %knowledge_base_id, error = %e, "Failed to remove knowledge base");
        }
    }
}

#[async_trait]
impl RagBuilder for BedrockRagBuilder {
    async fn build(&self, ctx: &CancellationToken) -> Result<String, BuilderError> {
        let request = self.knowledge_base_request();
        let knowledge_base_id = cancellable(
            ctx,
            self.services.knowledge_bases.create_knowledge_base(&request),
        )
        .await
        .map_err(|e| step_failed("failed to create RAG pipeline", e))?;

        let prefix = document_prefix(&knowledge_base_id);
        if let Err(e) = cancellable(
            ctx,
            self.services
                .documents
                .upload_directory(&self.codebase_path, &prefix),
        )
        .await
        {
            self.roll_back(&knowledge_base_id, false).await;
            return Err(step_failed("failed to upload codebase to S3", e));
        }

        let data_source_id = match cancellable(
            ctx,
            self.services
                .documents
                .create_data_source(&knowledge_base_id, &prefix),
        )
        .await
        {
            Ok(id) => id,
            Err(e) => {
                self.roll_back(&knowledge_base_id, true).await;
                return Err(step_failed("failed to create data source", e));
            }
        };

        info!(
            knowledge_base_id = %knowledge_base_id,
            data_source_id = %data_source_id,
            bucket = %self.config.s3_bucket_name,
            prefix = %prefix,
            "Bedrock knowledge base created"
        );
        Ok(knowledge_base_id)
    }

    async fn tear_down(
        &self,
        ctx: &CancellationToken,
        vector_store_id: &str,
        rag_id: &str,
    ) -> Result<(), BuilderError> {
        let knowledge_base_id = if rag_id.is_empty() { vector_store_id } else { rag_id };
        if knowledge_base_id.is_empty() {
            return Err(BuilderError::InvalidInput("rag_id is required".to_string()));
        }

        ignore_missing(
            cancellable(
                ctx,
                self.services.documents.delete_data_sources(knowledge_base_id),
            )
            .await,
        )
        .map_err(|e| step_failed("failed to delete data source", e))?;

        ignore_missing(
            cancellable(
                ctx,
                self.services
                    .documents
                    .delete_directory(&document_prefix(knowledge_base_id)),
            )
            .await,
        )
        .map_err(|e| step_failed("failed to delete uploaded codebase", e))?;

        ignore_missing(
            cancellable(
                ctx,
                self.services
                    .knowledge_bases
                    .delete_knowledge_base(knowledge_base_id),
            )
            .await,
        )
        .map_err(|e| step_failed("failed to delete RAG pipeline", e))?;

        info!(knowledge_base_id = %knowledge_base_id, "Bedrock knowledge base deleted");
        Ok(())
    }
}
