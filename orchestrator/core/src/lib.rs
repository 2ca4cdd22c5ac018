// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! Agentforge Core
//!
//! Provisions a RAG knowledge base and an agent bound to it for a source
//! repository, and tears them down again, behind provider-agnostic builder
//! interfaces.
//!
//! # Architecture
//!
//! - **Layer:** Core System
//! - **Purpose:** Domain model, workflows and provider adapters

pub mod domain;
pub mod application;
pub mod infrastructure;

pub use domain::*;
