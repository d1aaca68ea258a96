//! Data types for documents, chunks, and search results.

use std::path::Path;

use serde::{Deserialize, Serialize};

/// The supported ingestion formats, selected by file extension.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum DocumentFormat {
    /// Plain UTF-8 text (`.txt`).
    Text,
    /// Markdown (`.md`), ingested as plain text.
    Markdown,
    /// PDF (`.pdf`), text extracted page by page.
    Pdf,
    /// CSV (`.csv`), each row rendered as "header: value" lines.
    Csv,
}

impl DocumentFormat {
    /// Select a format from a file path's extension, case-insensitively.
    ///
    /// Returns `None` for extensions with no registered parser.
    pub fn from_path(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_str()?.to_ascii_lowercase();
        match ext.as_str() {
            "txt" => Some(Self::Text),
            "md" => Some(Self::Markdown),
            "pdf" => Some(Self::Pdf),
            "csv" => Some(Self::Csv),
            _ => None,
        }
    }
}

/// A source document loaded from disk, pending chunking.
///
/// Documents are transient: they exist between the loader and the chunker
/// and are discarded once their chunks are stored.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Document {
    /// The path the document was loaded from.
    pub source: String,
    /// The extracted text content.
    pub text: String,
    /// The format the document was parsed as.
    pub format: DocumentFormat,
}

/// A bounded segment of a [`Document`] with its vector embedding.
///
/// Chunks are the unit of storage and retrieval. The embedding is empty
/// until the knowledge base attaches one during ingestion.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Chunk {
    /// Unique identifier, derived as `{source}#{chunk_index}`.
    pub id: String,
    /// The text content of the chunk.
    pub text: String,
    /// The vector embedding for this chunk's text.
    pub embedding: Vec<f32>,
    /// The path of the originating document.
    pub source: String,
    /// Position of this chunk within its document.
    pub chunk_index: usize,
}

impl Chunk {
    /// Create a chunk with no embedding attached yet.
    pub fn new(source: &str, chunk_index: usize, text: String) -> Self {
        Self {
            id: format!("{source}#{chunk_index}"),
            text,
            embedding: Vec::new(),
            source: source.to_string(),
            chunk_index,
        }
    }
}

/// A retrieved [`Chunk`] paired with a relevance score.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchResult {
    /// The retrieved chunk.
    pub chunk: Chunk,
    /// The similarity score (higher is more relevant).
    pub score: f32,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn format_from_known_extensions() {
        assert_eq!(DocumentFormat::from_path(Path::new("a/faq.txt")), Some(DocumentFormat::Text));
        assert_eq!(DocumentFormat::from_path(Path::new("guide.MD")), Some(DocumentFormat::Markdown));
        assert_eq!(DocumentFormat::from_path(Path::new("manual.pdf")), Some(DocumentFormat::Pdf));
        assert_eq!(DocumentFormat::from_path(Path::new("plans.csv")), Some(DocumentFormat::Csv));
    }

    #[test]
    fn format_rejects_unknown_extensions() {
        assert_eq!(DocumentFormat::from_path(Path::new("image.png")), None);
        assert_eq!(DocumentFormat::from_path(&PathBuf::from("no_extension")), None);
    }

    #[test]
    fn chunk_id_encodes_source_and_index() {
        let chunk = Chunk::new("docs/faq.txt", 3, "body".to_string());
        assert_eq!(chunk.id, "docs/faq.txt#3");
        assert!(chunk.embedding.is_empty());
    }
}
