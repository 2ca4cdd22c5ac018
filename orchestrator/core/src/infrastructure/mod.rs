// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

pub mod bedrock;
pub mod codebase;
pub mod db;
pub mod event_bus;
pub mod local;
pub mod repositories;

pub use codebase::GitCodebase;
pub use event_bus::EventBus;
