// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! Domain layer: value objects, capability traits and errors shared by every
//! provisioning workflow.
//!
//! # Architecture
//!
//! - **Layer:** Domain Layer
//! - **Purpose:** Provider-agnostic model of agent infrastructure

pub mod builder;
pub mod codebase;
pub mod config;
pub mod events;
pub mod infrastructure;
pub mod provider;
pub mod repository;
pub mod resource;
pub mod workflow;
