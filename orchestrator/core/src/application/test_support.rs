// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! Recording test doubles for the codebase and builder capabilities.

use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tokio_util::sync::CancellationToken;

use crate::domain::builder::{AgentBuilder, AgentDeployment, BuilderError, RagBuilder};
use crate::domain::codebase::{Codebase, CodebaseError};

/// Call order shared between every mock of one scenario
#[derive(Clone, Default)]
pub struct CallLog(Arc<Mutex<Vec<&'static str>>>);

impl CallLog {
    pub fn new() -> Self {
        Self::default()
    }

    fn push(&self, entry: &'static str) {
        self.0.lock().unwrap().push(entry);
    }

    pub fn entries(&self) -> Vec<&'static str> {
        self.0.lock().unwrap().clone()
    }
}

pub struct MockCodebase {
    log: CallLog,
    path: PathBuf,
    clone_error: Option<CodebaseError>,
    cleanup_error: Option<CodebaseError>,
    clone_calls: AtomicUsize,
    cleanup_calls: AtomicUsize,
}

impl MockCodebase {
    pub fn new(log: &CallLog) -> Self {
        Self {
            log: log.clone(),
            path: PathBuf::from("/tmp/agentforge/widgets-test"),
            clone_error: None,
            cleanup_error: None,
            clone_calls: AtomicUsize::new(0),
            cleanup_calls: AtomicUsize::new(0),
        }
    }

    pub fn with_clone_error(mut self, err: CodebaseError) -> Self {
        self.clone_error = Some(err);
        self
    }

    pub fn with_cleanup_error(mut self, err: CodebaseError) -> Self {
        self.cleanup_error = Some(err);
        self
    }

    pub fn clone_count(&self) -> usize {
        self.clone_calls.load(Ordering::SeqCst)
    }

    pub fn cleanup_count(&self) -> usize {
        self.cleanup_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Codebase for MockCodebase {
    async fn clone_repository(&self, ctx: &CancellationToken) -> Result<(), CodebaseError> {
        self.log.push("clone");
        self.clone_calls.fetch_add(1, Ordering::SeqCst);
        if ctx.is_cancelled() {
            return Err(CodebaseError::Cancelled);
        }
        match &self.clone_error {
            Some(err) => Err(err.clone()),
            None => Ok(()),
        }
    }

    fn path(&self) -> &Path {
        &self.path
    }

    async fn cleanup(&self) -> Result<(), CodebaseError> {
        self.log.push("cleanup");
        self.cleanup_calls.fetch_add(1, Ordering::SeqCst);
        match &self.cleanup_error {
            Some(err) => Err(err.clone()),
            None => Ok(()),
        }
    }
}

pub struct MockRagBuilder {
    log: CallLog,
    build_result: Result<String, BuilderError>,
    teardown_error: Option<BuilderError>,
    build_calls: AtomicUsize,
    teardown_calls: Mutex<Vec<(String, String)>>,
}

impl MockRagBuilder {
    pub fn returning(log: &CallLog, rag_id: &str) -> Self {
        Self::with_result(log, Ok(rag_id.to_string()))
    }

    pub fn failing(log: &CallLog, err: BuilderError) -> Self {
        Self::with_result(log, Err(err))
    }

    fn with_result(log: &CallLog, build_result: Result<String, BuilderError>) -> Self {
        Self {
            log: log.clone(),
            build_result,
            teardown_error: None,
            build_calls: AtomicUsize::new(0),
            teardown_calls: Mutex::new(Vec::new()),
        }
    }

    pub fn with_teardown_error(mut self, err: BuilderError) -> Self {
        self.teardown_error = Some(err);
        self
    }

    pub fn build_count(&self) -> usize {
        self.build_calls.load(Ordering::SeqCst)
    }

    /// `(vector_store_id, rag_id)` per teardown call
    pub fn teardown_calls(&self) -> Vec<(String, String)> {
        self.teardown_calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl RagBuilder for MockRagBuilder {
    async fn build(&self, ctx: &CancellationToken) -> Result<String, BuilderError> {
        self.log.push("rag.build");
        self.build_calls.fetch_add(1, Ordering::SeqCst);
        if ctx.is_cancelled() {
            return Err(BuilderError::Cancelled);
        }
        self.build_result.clone()
    }

    async fn tear_down(
        &self,
        _ctx: &CancellationToken,
        vector_store_id: &str,
        rag_id: &str,
    ) -> Result<(), BuilderError> {
        self.log.push("rag.tear_down");
        self.teardown_calls
            .lock()
            .unwrap()
            .push((vector_store_id.to_string(), rag_id.to_string()));
        match &self.teardown_error {
            Some(err) => Err(err.clone()),
            None => Ok(()),
        }
    }
}

pub struct MockAgentBuilder {
    log: CallLog,
    build_result: Result<AgentDeployment, BuilderError>,
    teardown_error: Option<BuilderError>,
    build_calls: Mutex<Vec<String>>,
    teardown_calls: Mutex<Vec<(String, String, String)>>,
}

impl MockAgentBuilder {
    pub fn returning(log: &CallLog, deployment: AgentDeployment) -> Self {
        Self::with_result(log, Ok(deployment))
    }

    pub fn failing(log: &CallLog, err: BuilderError) -> Self {
        Self::with_result(log, Err(err))
    }

    fn with_result(log: &CallLog, build_result: Result<AgentDeployment, BuilderError>) -> Self {
        Self {
            log: log.clone(),
            build_result,
            teardown_error: None,
            build_calls: Mutex::new(Vec::new()),
            teardown_calls: Mutex::new(Vec::new()),
        }
    }

    pub fn with_teardown_error(mut self, err: BuilderError) -> Self {
        self.teardown_error = Some(err);
        self
    }

    /// `rag_id` passed to each build call
    pub fn build_calls(&self) -> Vec<String> {
        self.build_calls.lock().unwrap().clone()
    }

    /// `(agent_id, agent_version, rag_id)` per teardown call
    pub fn teardown_calls(&self) -> Vec<(String, String, String)> {
        self.teardown_calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl AgentBuilder for MockAgentBuilder {
    async fn build(
        &self,
        ctx: &CancellationToken,
        rag_id: &str,
    ) -> Result<AgentDeployment, BuilderError> {
        self.log.push("agent.build");
        self.build_calls.lock().unwrap().push(rag_id.to_string());
        if ctx.is_cancelled() {
            return Err(BuilderError::Cancelled);
        }
        self.build_result.clone()
    }

    async fn tear_down(
        &self,
        _ctx: &CancellationToken,
        agent_id: &str,
        agent_version: &str,
        rag_id: &str,
    ) -> Result<(), BuilderError> {
        self.log.push("agent.tear_down");
        self.teardown_calls.lock().unwrap().push((
            agent_id.to_string(),
            agent_version.to_string(),
            rag_id.to_string(),
        ));
        match &self.teardown_error {
            Some(err) => Err(err.clone()),
            None => Ok(()),
        }
    }
}
