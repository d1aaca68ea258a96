//! Vector store trait for storing and searching embedded chunks.

use async_trait::async_trait;

use crate::document::{Chunk, SearchResult};
use crate::error::Result;

/// A storage backend holding one collection of embedded [`Chunk`]s with
/// similarity search.
///
/// Reads (`search`, `count`) may run concurrently; `upsert` and `reset`
/// assume a single writer, which the console front end guarantees by
/// construction.
#[async_trait]
pub trait VectorStore: Send + Sync {
    /// Upsert chunks into the collection. Chunks must have embeddings set.
    async fn upsert(&self, chunks: &[Chunk]) -> Result<()>;

    /// Search for the `top_k` most similar chunks to the given embedding.
    ///
    /// Returns results ordered by descending similarity score.
    async fn search(&self, embedding: &[f32], top_k: usize) -> Result<Vec<SearchResult>>;

    /// Number of chunks currently stored.
    async fn count(&self) -> Result<usize>;

    /// Irreversibly empty the collection. Idempotent.
    async fn reset(&self) -> Result<()>;

    /// Flush the collection to durable storage.
    async fn persist(&self) -> Result<()>;
}
