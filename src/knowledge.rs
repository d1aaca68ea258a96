//! Knowledge base manager orchestrating load → chunk → embed → store.
//!
//! [`KnowledgeBase`] composes a [`Chunker`], an [`EmbeddingProvider`], and a
//! [`VectorStore`] into the ingestion and retrieval surface used by the
//! agent's tools and the console commands. Ingestion failures are reported
//! as boolean outcomes and retrieval degrades to an empty result set, so
//! nothing past startup configuration is fatal.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::{error, info, warn};

use crate::chunking::Chunker;
use crate::document::Chunk;
use crate::embedding::EmbeddingProvider;
use crate::error::Result;
use crate::loader;
use crate::vectorstore::VectorStore;

/// Retrieval fan-out used by the search tool and the console `search`
/// command.
pub const DEFAULT_SEARCH_K: usize = 2;

/// Best-effort snapshot of the knowledge base state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KnowledgeBaseStats {
    /// Number of chunks currently stored.
    pub total_chunks: usize,
    /// Directory the collection persists to.
    pub storage_location: PathBuf,
}

/// The knowledge base manager.
pub struct KnowledgeBase {
    store: Arc<dyn VectorStore>,
    embedder: Arc<dyn EmbeddingProvider>,
    chunker: Arc<dyn Chunker>,
    storage_location: PathBuf,
}

impl KnowledgeBase {
    /// Create a manager over the given store, embedder, and chunker.
    pub fn new(
        store: Arc<dyn VectorStore>,
        embedder: Arc<dyn EmbeddingProvider>,
        chunker: Arc<dyn Chunker>,
        storage_location: impl Into<PathBuf>,
    ) -> Self {
        Self { store, embedder, chunker, storage_location: storage_location.into() }
    }

    /// Ingest a batch of files into the collection.
    ///
    /// Missing paths are skipped with a warning; a file that fails to load
    /// or has an unsupported extension is logged and skipped without
    /// aborting the rest of the batch. Returns `true` only if at least one
    /// chunk was embedded and persisted.
    pub async fn ingest(&self, paths: &[PathBuf]) -> bool {
        let mut all_chunks: Vec<Chunk> = Vec::new();

        for path in paths {
            if !path.exists() {
                warn!(path = %path.display(), "file not found, skipping");
                continue;
            }
            match loader::load_document(path) {
                Ok(document) => {
                    let chunks = self.chunker.chunk(&document);
                    info!(path = %path.display(), chunk_count = chunks.len(), "chunked document");
                    all_chunks.extend(chunks);
                }
                Err(e) => {
                    error!(path = %path.display(), error = %e, "failed to load document");
                }
            }
        }

        if all_chunks.is_empty() {
            warn!("ingest produced no chunks");
            return false;
        }

        match self.embed_and_store(&mut all_chunks).await {
            Ok(()) => {
                info!(chunk_count = all_chunks.len(), "ingested chunks into knowledge base");
                true
            }
            Err(e) => {
                error!(error = %e, "ingest failed");
                false
            }
        }
    }

    async fn embed_and_store(&self, chunks: &mut [Chunk]) -> Result<()> {
        let texts: Vec<&str> = chunks.iter().map(|c| c.text.as_str()).collect();
        let embeddings = self.embedder.embed_batch(&texts).await?;

        for (chunk, embedding) in chunks.iter_mut().zip(embeddings) {
            chunk.embedding = embedding;
        }

        self.store.upsert(chunks).await?;
        self.store.persist().await
    }

    /// Search the collection, returning up to `k` chunk texts ranked by
    /// similarity to `query`.
    ///
    /// Any retrieval failure degrades to an empty result set.
    pub async fn search(&self, query: &str, k: usize) -> Vec<String> {
        let query_embedding = match self.embedder.embed(query).await {
            Ok(embedding) => embedding,
            Err(e) => {
                error!(error = %e, "query embedding failed");
                return Vec::new();
            }
        };

        match self.store.search(&query_embedding, k).await {
            Ok(results) => results.into_iter().map(|r| r.chunk.text).collect(),
            Err(e) => {
                error!(error = %e, "vector store search failed");
                Vec::new()
            }
        }
    }

    /// Best-effort collection statistics; reports zero chunks on failure
    /// rather than erroring.
    pub async fn stats(&self) -> KnowledgeBaseStats {
        let total_chunks = match self.store.count().await {
            Ok(count) => count,
            Err(e) => {
                error!(error = %e, "failed to count chunks");
                0
            }
        };
        KnowledgeBaseStats { total_chunks, storage_location: self.storage_location.clone() }
    }

    /// Irreversibly empty the collection. Idempotent; returns `false` only
    /// if the store reported a failure.
    pub async fn reset(&self) -> bool {
        match self.store.reset().await {
            Ok(()) => {
                info!("knowledge base cleared");
                true
            }
            Err(e) => {
                error!(error = %e, "failed to clear knowledge base");
                false
            }
        }
    }

    /// Directory the collection persists to.
    pub fn storage_location(&self) -> &Path {
        &self.storage_location
    }
}
