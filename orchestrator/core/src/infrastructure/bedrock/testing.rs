// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
// Recording fake of the managed cloud services used by the Bedrock builder tests.

use async_trait::async_trait;
use std::collections::HashSet;
use std::path::Path;
use std::sync::{Arc, Mutex};

use super::services::{
    AgentRequest, AgentService, DocumentStore, KnowledgeBaseRequest, KnowledgeBaseService,
    ManagedCloudServices,
};
use crate::domain::builder::BuilderError;

#[derive(Default)]
struct State {
    calls: Vec<String>,
    failing: HashSet<&'static str>,
    knowledge_base_requests: Vec<KnowledgeBaseRequest>,
    agent_requests: Vec<AgentRequest>,
}

#[derive(Clone, Default)]
pub struct RecordingCloud {
    state: Arc<Mutex<State>>,
}

impl RecordingCloud {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make the named operation fail with a provider error
    pub fn failing(self, operation: &'static str) -> Self {
        self.state.lock().unwrap().failing.insert(operation);
        self
    }

    pub fn services(&self) -> ManagedCloudServices {
        let shared = Arc::new(self.clone());
        ManagedCloudServices::new(shared.clone(), shared.clone(), shared)
    }

    pub fn calls(&self) -> Vec<String> {
        self.state.lock().unwrap().calls.clone()
    }

    pub fn knowledge_base_requests(&self) -> Vec<KnowledgeBaseRequest> {
        self.state.lock().unwrap().knowledge_base_requests.clone()
    }

    pub fn agent_requests(&self) -> Vec<AgentRequest> {
        self.state.lock().unwrap().agent_requests.clone()
    }

    fn record(&self, operation: &'static str, detail: &str) -> Result<(), BuilderError> {
        let mut state = self.state.lock().unwrap();
        state.calls.push(format!("{}({})", operation, detail));
        if state.failing.contains(operation) {
            return Err(BuilderError::Provider(format!("{} rejected", operation)));
        }
        Ok(())
    }
}

#[async_trait]
impl KnowledgeBaseService for RecordingCloud {
    async fn create_knowledge_base(&self, request: &KnowledgeBaseRequest) -> Result<String, BuilderError> {
        self.state
            .lock()
            .unwrap()
            .knowledge_base_requests
            .push(request.clone());
        self.record("create_knowledge_base", &request.name)?;
        Ok("kb-1".to_string())
    }

    async fn delete_knowledge_base(&self, knowledge_base_id: &str) -> Result<(), BuilderError> {
        self.record("delete_knowledge_base", knowledge_base_id)
    }
}

#[async_trait]
impl DocumentStore for RecordingCloud {
    async fn upload_directory(&self, _local_dir: &Path, prefix: &str) -> Result<(), BuilderError> {
        self.record("upload_directory", prefix)
    }

    async fn delete_directory(&self, prefix: &str) -> Result<(), BuilderError> {
        self.record("delete_directory", prefix)
    }

    async fn create_data_source(&self, knowledge_base_id: &str, prefix: &str) -> Result<String, BuilderError> {
        self.record("create_data_source", &format!("{},{}", knowledge_base_id, prefix))?;
        Ok("ds-1".to_string())
    }

    async fn delete_data_sources(&self, knowledge_base_id: &str) -> Result<(), BuilderError> {
        self.record("delete_data_sources", knowledge_base_id)
    }
}

#[async_trait]
impl AgentService for RecordingCloud {
    async fn create_agent(&self, request: &AgentRequest) -> Result<String, BuilderError> {
        self.state.lock().unwrap().agent_requests.push(request.clone());
        self.record("create_agent", &request.name)?;
        Ok("agent-1".to_string())
    }

    async fn associate_knowledge_base(&self, agent_id: &str, knowledge_base_id: &str) -> Result<(), BuilderError> {
        self.record("associate_knowledge_base", &format!("{},{}", agent_id, knowledge_base_id))
    }

    async fn create_alias(&self, agent_id: &str, alias_name: &str) -> Result<String, BuilderError> {
        self.record("create_alias", &format!("{},{}", agent_id, alias_name))?;
        Ok("alias-1".to_string())
    }

    async fn disassociate_knowledge_base(
        &self,
        agent_id: &str,
        agent_version: &str,
        knowledge_base_id: &str,
    ) -> Result<(), BuilderError> {
        self.record(
            "disassociate_knowledge_base",
            &format!("{},{},{}", agent_id, agent_version, knowledge_base_id),
        )
    }

    async fn delete_agent(&self, agent_id: &str) -> Result<(), BuilderError> {
        self.record("delete_agent", agent_id)
    }
}
