// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! Self-hosted provider: Ollama for models and embeddings, ChromaDB for the
//! vector store.

pub mod agent_builder;
pub mod chroma;
pub mod ollama;
pub mod rag_builder;

pub use agent_builder::LocalAgentBuilder;
pub use chroma::ChromaClient;
pub use ollama::OllamaClient;
pub use rag_builder::LocalRagBuilder;
