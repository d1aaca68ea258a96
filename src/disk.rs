//! On-disk vector store using cosine similarity.
//!
//! [`DiskVectorStore`] keeps the collection in memory behind a
//! `tokio::sync::RwLock` and persists it as a JSON snapshot in the
//! configured directory. The snapshot is written to a temporary file and
//! renamed into place, so a reader never observes a chunk without its
//! embedding.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::sync::RwLock;
use tracing::{debug, info};

use crate::document::{Chunk, SearchResult};
use crate::error::{Result, SupportError};
use crate::vectorstore::VectorStore;

/// File name of the collection snapshot inside the persistence directory.
const SNAPSHOT_FILE: &str = "collection.json";

/// A persistent [`VectorStore`] backed by a JSON snapshot on disk.
pub struct DiskVectorStore {
    directory: PathBuf,
    dimensions: usize,
    chunks: RwLock<HashMap<String, Chunk>>,
}

impl DiskVectorStore {
    /// Open (or create) a collection in `directory`.
    ///
    /// An existing snapshot is loaded; a missing snapshot starts the
    /// collection empty. `dimensions` is enforced on every upsert so that
    /// stored embeddings always match the provider's embedding space.
    pub async fn open(directory: impl Into<PathBuf>, dimensions: usize) -> Result<Self> {
        let directory = directory.into();
        tokio::fs::create_dir_all(&directory).await.map_err(|e| Self::store_err(e))?;

        let snapshot = directory.join(SNAPSHOT_FILE);
        let chunks = match tokio::fs::read(&snapshot).await {
            Ok(bytes) => {
                let loaded: Vec<Chunk> =
                    serde_json::from_slice(&bytes).map_err(|e| Self::store_err(e))?;
                info!(path = %snapshot.display(), chunks = loaded.len(), "loaded collection snapshot");
                loaded.into_iter().map(|c| (c.id.clone(), c)).collect()
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => HashMap::new(),
            Err(e) => return Err(Self::store_err(e)),
        };

        Ok(Self { directory, dimensions, chunks: RwLock::new(chunks) })
    }

    /// Directory holding the collection snapshot.
    pub fn directory(&self) -> &Path {
        &self.directory
    }

    fn store_err(e: impl std::fmt::Display) -> SupportError {
        SupportError::VectorStore { backend: "disk".to_string(), message: e.to_string() }
    }

    fn snapshot_path(&self) -> PathBuf {
        self.directory.join(SNAPSHOT_FILE)
    }

    /// Write the given chunks to the snapshot atomically (temp + rename).
    async fn write_snapshot(&self, chunks: Vec<Chunk>) -> Result<()> {
        let bytes = serde_json::to_vec(&chunks).map_err(|e| Self::store_err(e))?;
        let path = self.snapshot_path();
        let tmp = self.directory.join(format!("{SNAPSHOT_FILE}.tmp"));

        tokio::fs::write(&tmp, &bytes).await.map_err(|e| Self::store_err(e))?;
        tokio::fs::rename(&tmp, &path).await.map_err(|e| Self::store_err(e))?;

        debug!(path = %path.display(), chunks = chunks.len(), "wrote collection snapshot");
        Ok(())
    }
}

/// Compute cosine similarity between two vectors.
///
/// Returns 0.0 if either vector has zero magnitude.
pub(crate) fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    let dot: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }
    dot / (norm_a * norm_b)
}

#[async_trait]
impl VectorStore for DiskVectorStore {
    async fn upsert(&self, chunks: &[Chunk]) -> Result<()> {
        for chunk in chunks {
            if chunk.embedding.len() != self.dimensions {
                return Err(Self::store_err(format!(
                    "chunk '{}' has embedding dimension {} but the collection expects {}",
                    chunk.id,
                    chunk.embedding.len(),
                    self.dimensions
                )));
            }
        }

        let mut store = self.chunks.write().await;
        for chunk in chunks {
            store.insert(chunk.id.clone(), chunk.clone());
        }
        Ok(())
    }

    async fn search(&self, embedding: &[f32], top_k: usize) -> Result<Vec<SearchResult>> {
        let store = self.chunks.read().await;

        let mut scored: Vec<SearchResult> = store
            .values()
            .map(|chunk| {
                let score = cosine_similarity(&chunk.embedding, embedding);
                SearchResult { chunk: chunk.clone(), score }
            })
            .collect();

        scored.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(std::cmp::Ordering::Equal));
        scored.truncate(top_k);
        Ok(scored)
    }

    async fn count(&self) -> Result<usize> {
        Ok(self.chunks.read().await.len())
    }

    async fn reset(&self) -> Result<()> {
        let mut store = self.chunks.write().await;
        store.clear();
        drop(store);

        // Removing an already-absent snapshot keeps reset idempotent.
        match tokio::fs::remove_file(self.snapshot_path()).await {
            Ok(()) => {}
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => return Err(Self::store_err(e)),
        }
        info!("collection reset");
        Ok(())
    }

    async fn persist(&self) -> Result<()> {
        let chunks: Vec<Chunk> = self.chunks.read().await.values().cloned().collect();
        self.write_snapshot(chunks).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cosine_similarity_of_identical_vectors_is_one() {
        let v = vec![0.5, -0.25, 1.0];
        assert!((cosine_similarity(&v, &v) - 1.0).abs() < 1e-6);
    }

    #[test]
    fn cosine_similarity_of_zero_vector_is_zero() {
        assert_eq!(cosine_similarity(&[0.0, 0.0], &[1.0, 0.0]), 0.0);
    }

    #[test]
    fn cosine_similarity_of_orthogonal_vectors_is_zero() {
        assert!(cosine_similarity(&[1.0, 0.0], &[0.0, 1.0]).abs() < 1e-6);
    }
}
