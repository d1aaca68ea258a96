//! The embedding seam between text and the vector collection.
//!
//! Ingestion and retrieval must share one embedding space: chunks are
//! embedded in bulk when documents are ingested, and each search query is
//! embedded with the same provider before ranking. The trait therefore
//! exposes both shapes as required operations rather than defaulting one
//! in terms of the other; the Gemini backend has a native batch endpoint,
//! and a backend without one decides its own looping and failure policy
//! (fail the whole batch versus partial results) explicitly.

use async_trait::async_trait;

use crate::error::Result;

/// Maps text into the fixed-dimension vector space of the collection.
#[async_trait]
pub trait EmbeddingProvider: Send + Sync {
    /// Embed a single text, typically a search query.
    async fn embed(&self, text: &str) -> Result<Vec<f32>>;

    /// Embed a batch of chunk texts, returning one vector per input in
    /// input order. Ingestion calls this once per document batch.
    async fn embed_batch(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>>;

    /// Dimensionality of every vector this provider produces. The vector
    /// store rejects chunks whose embeddings disagree with this.
    fn dimensions(&self) -> usize;
}
