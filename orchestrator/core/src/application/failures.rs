// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! Failure aggregation for best-effort workflows.
//!
//! Teardown and cleanup attempt every step even after one fails. The
//! [`FailureLog`] keeps each step error in the order it happened; at the end
//! of a run every entry is logged with its 1-based index and the first one is
//! handed back as the run's result.

use tracing::error;

use crate::domain::workflow::WorkflowError;

#[derive(Debug, Clone, Default)]
pub struct FailureLog {
    errors: Vec<WorkflowError>,
}

impl FailureLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, err: WorkflowError) {
        self.errors.push(err);
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn len(&self) -> usize {
        self.errors.len()
    }

    pub fn errors(&self) -> &[WorkflowError] {
        &self.errors
    }

    pub fn into_errors(self) -> Vec<WorkflowError> {
        self.errors
    }

    /// Log every recorded failure and return the first one.
    pub fn finish(&self, label: &str) -> Result<(), WorkflowError> {
        let Some(first) = self.errors.first() else {
            return Ok(());
        };

        error!(
            workflow = label,
            count = self.errors.len(),
            "{} encountered {} error(s)",
            label,
            self.errors.len()
        );
        for (index, err) in self.errors.iter().enumerate() {
            error!(
                workflow = label,
                index = index + 1,
                step = %err.step(),
                "{} error {}: {}",
                label,
                index + 1,
                err
            );
        }

        Err(first.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::builder::BuilderError;
    use crate::domain::codebase::CodebaseError;
    use crate::domain::provider::ProviderKind;

    #[test]
    fn test_empty_log_finishes_ok() {
        let log = FailureLog::new();
        assert!(log.finish("teardown").is_ok());
    }

    #[test]
    fn test_first_error_wins_and_all_are_kept() {
        let mut log = FailureLog::new();
        log.record(WorkflowError::TearDownAgent {
            provider: ProviderKind::Local,
            reason: BuilderError::Network("connection refused".to_string()),
        });
        log.record(WorkflowError::Cleanup {
            reason: CodebaseError::Io("permission denied".to_string()),
        });

        let err = log.finish("cleanup").unwrap_err();
        assert!(matches!(err, WorkflowError::TearDownAgent { .. }));
        assert_eq!(log.len(), 2);
        assert!(matches!(log.errors()[1], WorkflowError::Cleanup { .. }));
    }
}
