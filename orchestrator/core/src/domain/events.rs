// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::infrastructure::InfrastructureId;
use crate::domain::provider::ProviderKind;
use crate::domain::resource::ResourceHandle;

/// Lifecycle events for provisioned agent infrastructure.
///
/// Failure events carry the handle as it stood when the workflow stopped, so a
/// subscriber can see exactly which provider resources are still alive.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum InfrastructureEvent {
    InfrastructureProvisioned {
        infrastructure_id: InfrastructureId,
        provider: ProviderKind,
        resources: ResourceHandle,
        provisioned_at: DateTime<Utc>,
    },
    ProvisioningFailed {
        infrastructure_id: InfrastructureId,
        provider: ProviderKind,
        resources: ResourceHandle,
        error: String,
        failed_at: DateTime<Utc>,
    },
    InfrastructureTornDown {
        infrastructure_id: InfrastructureId,
        provider: ProviderKind,
        torn_down_at: DateTime<Utc>,
    },
    TeardownFailed {
        infrastructure_id: InfrastructureId,
        provider: ProviderKind,
        resources: ResourceHandle,
        errors: Vec<String>,
        failed_at: DateTime<Utc>,
    },
}

impl InfrastructureEvent {
    pub fn infrastructure_id(&self) -> InfrastructureId {
        match self {
            InfrastructureEvent::InfrastructureProvisioned { infrastructure_id, .. }
            | InfrastructureEvent::ProvisioningFailed { infrastructure_id, .. }
            | InfrastructureEvent::InfrastructureTornDown { infrastructure_id, .. }
            | InfrastructureEvent::TeardownFailed { infrastructure_id, .. } => *infrastructure_id,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_provisioned_event_serialization() {
        let event = InfrastructureEvent::InfrastructureProvisioned {
            infrastructure_id: InfrastructureId::new(),
            provider: ProviderKind::ManagedCloud,
            resources: ResourceHandle::new("kb-1", "kb-1", "agent-1", "alias-1"),
            provisioned_at: Utc::now(),
        };
        let json = serde_json::to_string(&event).unwrap();
        assert!(json.contains("InfrastructureProvisioned"));
        assert!(json.contains("\"bedrock\""));
    }

    #[test]
    fn test_teardown_failed_round_trip() {
        let id = InfrastructureId::new();
        let event = InfrastructureEvent::TeardownFailed {
            infrastructure_id: id,
            provider: ProviderKind::Local,
            resources: ResourceHandle::new("rag-1", "rag-1", "", ""),
            errors: vec!["failed to tear down local RAG pipeline: timeout".to_string()],
            failed_at: Utc::now(),
        };
        let json = serde_json::to_string(&event).unwrap();
        let deserialized: InfrastructureEvent = serde_json::from_str(&json).unwrap();
        assert_eq!(deserialized.infrastructure_id(), id);
        if let InfrastructureEvent::TeardownFailed { errors, .. } = deserialized {
            assert_eq!(errors.len(), 1);
        } else {
            panic!("unexpected variant");
        }
    }
}
