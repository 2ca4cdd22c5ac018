// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! Managed cloud provider (Amazon Bedrock knowledge bases and agents).
//!
//! The builders here sequence the Bedrock calls; the calls go through the
//! traits in [`services`], so the crate carries no cloud SDK of its own.

pub mod agent_builder;
pub mod rag_builder;
pub mod services;

#[cfg(test)]
pub(crate) mod testing;

pub use agent_builder::BedrockAgentBuilder;
pub use rag_builder::BedrockRagBuilder;
pub use services::{AgentService, DocumentStore, KnowledgeBaseService, ManagedCloudServices};

/// S3 prefix holding the documents of one knowledge base
pub fn document_prefix(knowledge_base_id: &str) -> String {
    format!("codebases/{}", knowledge_base_id)
}

use crate::domain::builder::BuilderError;

/// Prefix a provider failure with the step that raised it. Cancellation and
/// not-found pass through unchanged so callers can still match on them.
pub(crate) fn step_failed(step: &str, err: BuilderError) -> BuilderError {
    match err {
        BuilderError::Cancelled | BuilderError::NotFound(_) => err,
        other => BuilderError::Provider(format!("{}: {}", step, other)),
    }
}

/// Treat an already-deleted resource as deleted
pub(crate) fn ignore_missing(result: Result<(), BuilderError>) -> Result<(), BuilderError> {
    match result {
        Err(BuilderError::NotFound(_)) => Ok(()),
        other => other,
    }
}

/// Bedrock resource names allow `[0-9a-zA-Z_-]` and at most 100 characters
pub(crate) fn resource_name(raw: &str) -> String {
    let name: String = raw
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '_' || c == '-' { c } else { '-' })
        .take(100)
        .collect();
    if name.is_empty() {
        "agentforge".to_string()
    } else {
        name
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resource_name_replaces_invalid_characters() {
        assert_eq!(resource_name("widgets.v2-1234"), "widgets-v2-1234");
        assert_eq!(resource_name(""), "agentforge");
        assert_eq!(resource_name(&"a".repeat(150)).len(), 100);
    }

    #[test]
    fn test_step_failed_keeps_cancellation() {
        assert_eq!(step_failed("failed to create agent", BuilderError::Cancelled), BuilderError::Cancelled);
        assert_eq!(
            step_failed("failed to create agent", BuilderError::Network("timeout".into())),
            BuilderError::Provider("failed to create agent: network error: timeout".into())
        );
    }
}
