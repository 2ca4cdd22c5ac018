// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! Command implementations for the agentforge CLI

pub mod config;
pub mod infra;

pub use self::config::ConfigCommand;
pub use self::infra::InfraCommand;
