// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! Local RAG Builder
//!
//! Indexes the working copy into a fresh ChromaDB collection:
//!
//! 1. walk the working copy for source files (known code extensions, `.git`
//!    and oversized files skipped)
//! 2. split each file into line-aligned chunks
//! 3. embed every chunk through Ollama
//! 4. store the chunks in a new collection named `rag-<uuid>`
//!
//! The collection name is both the RAG id and the vector store id. If a step
//! after collection creation fails the collection is deleted again before the
//! error is returned, since the caller never learns its name.

use async_trait::async_trait;
use serde_json::json;
use std::path::{Path, PathBuf};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};
use uuid::Uuid;
use walkdir::WalkDir;

use crate::domain::builder::{cancellable, BuilderError, RagBuilder};
use crate::infrastructure::local::chroma::{ChromaClient, ChromaDocument};
use crate::infrastructure::local::ollama::OllamaClient;

const CODE_EXTENSIONS: &[&str] = &[
    "go", "js", "ts", "py", "java", "cpp", "c", "h", "hpp", "cs", "rb", "php", "swift", "kt", "rs",
];

const DEFAULT_CHUNK_CHARS: usize = 2000;
const DEFAULT_MAX_FILE_BYTES: u64 = 1024 * 1024;
const ADD_BATCH_SIZE: usize = 64;

/// A source file chunk before embedding
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceChunk {
    pub path: String,
    pub index: usize,
    pub text: String,
}

pub struct LocalRagBuilder {
    ollama: OllamaClient,
    chroma: ChromaClient,
    embedding_model: String,
    codebase_path: PathBuf,
    chunk_chars: usize,
    max_file_bytes: u64,
}

impl LocalRagBuilder {
    pub fn new(
        ollama: OllamaClient,
        chroma: ChromaClient,
        embedding_model: impl Into<String>,
        codebase_path: impl Into<PathBuf>,
    ) -> Self {
        Self {
            ollama,
            chroma,
            embedding_model: embedding_model.into(),
            codebase_path: codebase_path.into(),
            chunk_chars: DEFAULT_CHUNK_CHARS,
            max_file_bytes: DEFAULT_MAX_FILE_BYTES,
        }
    }

    async fn index(
        &self,
        ctx: &CancellationToken,
        collection_id: &str,
        chunks: &[SourceChunk],
    ) -> Result<(), BuilderError> {
        for batch in chunks.chunks(ADD_BATCH_SIZE) {
            let mut documents = Vec::with_capacity(batch.len());
            for chunk in batch {
                let embedding =
                    cancellable(ctx, self.ollama.embed(&self.embedding_model, &chunk.text)).await?;
                documents.push(ChromaDocument {
                    id: format!("{}#{}", chunk.path, chunk.index),
                    embedding,
                    document: chunk.text.clone(),
                    metadata: json!({ "path": chunk.path, "chunk": chunk.index }),
                });
            }
            cancellable(ctx, self.chroma.add(collection_id, &documents)).await?;
            debug!(collection_id = %collection_id, count = documents.len(), "Stored chunk batch");
        }
        Ok(())
    }
}

fn is_code_file(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| CODE_EXTENSIONS.contains(&ext.to_ascii_lowercase().as_str()))
        .unwrap_or(false)
}

/// Collect chunks for every source file under `root`, in path order.
pub fn collect_chunks(
    root: &Path,
    chunk_chars: usize,
    max_file_bytes: u64,
) -> Result<Vec<SourceChunk>, BuilderError> {
    let mut chunks = Vec::new();

    let walker = WalkDir::new(root)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|entry| entry.file_name() != ".git");

    for entry in walker {
        let entry = entry.map_err(|e| BuilderError::Io(e.to_string()))?;
        if !entry.file_type().is_file() || !is_code_file(entry.path()) {
            continue;
        }

        let size = entry.metadata().map_err(|e| BuilderError::Io(e.to_string()))?.len();
        if size > max_file_bytes {
            debug!(path = %entry.path().display(), size, "Skipping oversized file");
            continue;
        }

        let bytes = std::fs::read(entry.path())?;
        let Ok(content) = String::from_utf8(bytes) else {
            debug!(path = %entry.path().display(), "Skipping non UTF-8 file");
            continue;
        };

        let relative = entry
            .path()
            .strip_prefix(root)
            .unwrap_or(entry.path())
            .to_string_lossy()
            .replace('\\', "/");

        for (index, text) in chunk_text(&content, chunk_chars).into_iter().enumerate() {
            chunks.push(SourceChunk {
                path: relative.clone(),
                index,
                text,
            });
        }
    }

    Ok(chunks)
}

/// Split on line boundaries into pieces of at most `max_chars` characters.
/// A single line longer than the limit is split on character boundaries.
fn chunk_text(content: &str, max_chars: usize) -> Vec<String> {
    let mut chunks = Vec::new();
    let mut current = String::new();
    let mut current_chars = 0;

    for line in content.split_inclusive('\n') {
        let line_chars = line.chars().count();

        if current_chars + line_chars > max_chars && !current.is_empty() {
            chunks.push(std::mem::take(&mut current));
            current_chars = 0;
        }

        if line_chars > max_chars {
            let chars: Vec<char> = line.chars().collect();
            for piece in chars.chunks(max_chars) {
                chunks.push(piece.iter().collect());
            }
            continue;
        }

        current.push_str(line);
        current_chars += line_chars;
    }

    if !current.trim().is_empty() {
        chunks.push(current);
    }
    chunks.retain(|c| !c.trim().is_empty());
    chunks
}

#[async_trait]
impl RagBuilder for LocalRagBuilder {
    async fn build(&self, ctx: &CancellationToken) -> Result<String, BuilderError> {
        let root = self.codebase_path.clone();
        let chunk_chars = self.chunk_chars;
        let max_file_bytes = self.max_file_bytes;
        let chunks = tokio::task::spawn_blocking(move || {
            collect_chunks(&root, chunk_chars, max_file_bytes)
        })
        .await
        .map_err(|e| BuilderError::Io(format!("scan task failed: {}", e)))??;

        info!(
            path = %self.codebase_path.display(),
            chunks = chunks.len(),
            "Scanned repository for code files"
        );

        let name = format!("rag-{}", Uuid::new_v4());
        let source = self.codebase_path.to_string_lossy();
        let collection = cancellable(ctx, self.chroma.create_collection(&name, &source)).await?;

        if let Err(e) = self.index(ctx, &collection.id, &chunks).await {
            warn!(collection = %name, "Indexing failed, removing collection: {}", e);
            if let Err(cleanup_err) = self.chroma.delete_collection(&name).await {
                warn!(collection = %name, "Failed to remove collection: {}", cleanup_err);
            }
            return Err(e);
        }

        info!(collection = %name, "Local RAG pipeline created");
        Ok(name)
    }

    async fn tear_down(
        &self,
        ctx: &CancellationToken,
        vector_store_id: &str,
        rag_id: &str,
    ) -> Result<(), BuilderError> {
        match cancellable(ctx, self.chroma.delete_collection(vector_store_id)).await {
            Ok(()) => {
                info!(vector_store_id = %vector_store_id, rag_id = %rag_id, "Local RAG pipeline torn down");
                Ok(())
            }
            Err(BuilderError::NotFound(_)) => {
                info!(vector_store_id = %vector_store_id, "Collection already removed");
                Ok(())
            }
            Err(e) => Err(e),
        }
    }
}
