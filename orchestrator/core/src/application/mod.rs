// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

pub mod cleanup;
pub mod create_setup;
pub mod factory;
pub mod failures;
pub mod provider_factory;
pub mod repository_factory;
pub mod teardown;

#[cfg(test)]
pub(crate) mod test_support;

// Re-export use cases for convenience
pub use cleanup::CleanupWorkflow;
pub use create_setup::CreateSetupWorkflow;
pub use factory::{AgentInfrastructureFactory, FactoryError, StandardAgentInfrastructureFactory};
pub use provider_factory::{BuilderPair, ProviderBackends, StandardProviderBackends};
pub use teardown::TeardownWorkflow;
