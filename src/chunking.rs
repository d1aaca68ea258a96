//! Document chunking strategies.
//!
//! This module provides the [`Chunker`] trait and two implementations:
//!
//! - [`FixedSizeChunker`] — splits by character count with configurable overlap
//! - [`RecursiveChunker`] — splits hierarchically by paragraphs, sentences, then words
//!
//! Both are deterministic: identical text with identical parameters always
//! yields the identical chunk sequence, which keeps retrieval reproducible
//! across re-ingestion of the same documents.

use crate::document::{Chunk, Document};

/// Default window length in characters.
pub const DEFAULT_CHUNK_SIZE: usize = 500;

/// Default overlap between consecutive windows in characters.
pub const DEFAULT_CHUNK_OVERLAP: usize = 100;

/// A strategy for splitting documents into chunks.
///
/// Implementations produce [`Chunk`]s with text and source metadata but no
/// embeddings. Embeddings are attached later by the knowledge base.
pub trait Chunker: Send + Sync {
    /// Split a document into chunks.
    ///
    /// Returns an empty `Vec` if the document has empty text.
    fn chunk(&self, document: &Document) -> Vec<Chunk>;
}

/// Character-count windowing with overlap, safe across multi-byte boundaries.
fn window_split(text: &str, chunk_size: usize, chunk_overlap: usize) -> Vec<String> {
    if text.is_empty() {
        return Vec::new();
    }

    let chars: Vec<char> = text.chars().collect();
    let mut windows = Vec::new();
    let mut start = 0;

    while start < chars.len() {
        let end = (start + chunk_size).min(chars.len());
        windows.push(chars[start..end].iter().collect());
        let step = chunk_size.saturating_sub(chunk_overlap);
        if step == 0 {
            break;
        }
        start += step;
    }

    windows
}

/// Splits text into fixed-size chunks by character count with configurable overlap.
///
/// Chunk IDs inherit the parent document's source path plus the chunk index.
#[derive(Debug, Clone)]
pub struct FixedSizeChunker {
    chunk_size: usize,
    chunk_overlap: usize,
}

impl FixedSizeChunker {
    /// Create a new `FixedSizeChunker`.
    ///
    /// # Arguments
    ///
    /// * `chunk_size` — maximum number of characters per chunk
    /// * `chunk_overlap` — number of overlapping characters between consecutive chunks
    pub fn new(chunk_size: usize, chunk_overlap: usize) -> Self {
        Self { chunk_size, chunk_overlap }
    }
}

impl Default for FixedSizeChunker {
    fn default() -> Self {
        Self::new(DEFAULT_CHUNK_SIZE, DEFAULT_CHUNK_OVERLAP)
    }
}

impl Chunker for FixedSizeChunker {
    fn chunk(&self, document: &Document) -> Vec<Chunk> {
        window_split(&document.text, self.chunk_size, self.chunk_overlap)
            .into_iter()
            .enumerate()
            .map(|(i, text)| Chunk::new(&document.source, i, text))
            .collect()
    }
}

/// Splits text hierarchically: paragraphs → sentences → words.
///
/// First splits by paragraph separators (`\n\n`). If a paragraph exceeds
/// `chunk_size`, splits by sentence boundaries (`. `, `! `, `? `). If a
/// sentence still exceeds `chunk_size`, splits by word boundaries, falling
/// back to plain character windows for pathological unbroken runs.
#[derive(Debug, Clone)]
pub struct RecursiveChunker {
    chunk_size: usize,
    chunk_overlap: usize,
}

impl RecursiveChunker {
    /// Create a new `RecursiveChunker`.
    ///
    /// # Arguments
    ///
    /// * `chunk_size` — maximum number of characters per chunk
    /// * `chunk_overlap` — number of overlapping characters between consecutive chunks
    pub fn new(chunk_size: usize, chunk_overlap: usize) -> Self {
        Self { chunk_size, chunk_overlap }
    }
}

impl Default for RecursiveChunker {
    fn default() -> Self {
        Self::new(DEFAULT_CHUNK_SIZE, DEFAULT_CHUNK_OVERLAP)
    }
}

impl Chunker for RecursiveChunker {
    fn chunk(&self, document: &Document) -> Vec<Chunk> {
        if document.text.is_empty() {
            return Vec::new();
        }

        let separators = ["\n\n", ". ", "! ", "? ", " "];
        let pieces =
            split_and_merge(&document.text, self.chunk_size, self.chunk_overlap, &separators);

        pieces
            .into_iter()
            .enumerate()
            .map(|(i, text)| Chunk::new(&document.source, i, text))
            .collect()
    }
}

/// Split text by a separator, then merge segments into pieces that respect
/// `chunk_size`. A segment that still exceeds `chunk_size` is split further
/// using the next-level separator.
fn split_and_merge(
    text: &str,
    chunk_size: usize,
    chunk_overlap: usize,
    separators: &[&str],
) -> Vec<String> {
    if text.chars().count() <= chunk_size || separators.is_empty() {
        return window_split(text, chunk_size, chunk_overlap);
    }

    let separator = separators[0];
    let remaining = &separators[1..];

    let segments = split_keeping_separator(text, separator);

    let mut pieces = Vec::new();
    let mut current = String::new();

    for segment in segments {
        if current.is_empty() {
            current = segment.to_string();
        } else if current.chars().count() + segment.chars().count() <= chunk_size {
            current.push_str(segment);
        } else {
            flush(&mut pieces, current, chunk_size, chunk_overlap, remaining);
            current = segment.to_string();
        }
    }

    if !current.is_empty() {
        flush(&mut pieces, current, chunk_size, chunk_overlap, remaining);
    }

    pieces
}

fn flush(
    pieces: &mut Vec<String>,
    piece: String,
    chunk_size: usize,
    chunk_overlap: usize,
    remaining: &[&str],
) {
    if piece.chars().count() > chunk_size {
        pieces.extend(split_and_merge(&piece, chunk_size, chunk_overlap, remaining));
    } else {
        pieces.push(piece);
    }
}

/// Split text at a separator while keeping the separator attached to the
/// preceding segment, so no characters are lost to re-joining.
fn split_keeping_separator<'a>(text: &'a str, separator: &str) -> Vec<&'a str> {
    let mut result = Vec::new();
    let mut start = 0;

    while let Some(pos) = text[start..].find(separator) {
        let end = start + pos + separator.len();
        result.push(&text[start..end]);
        start = end;
    }

    if start < text.len() {
        result.push(&text[start..]);
    }

    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::DocumentFormat;

    fn doc(text: &str) -> Document {
        Document { source: "test.txt".to_string(), text: text.to_string(), format: DocumentFormat::Text }
    }

    #[test]
    fn fixed_chunker_respects_size_and_overlap() {
        let chunker = FixedSizeChunker::new(10, 3);
        let chunks = chunker.chunk(&doc("abcdefghijklmnopqrstuvwxyz"));

        assert!(chunks.iter().all(|c| c.text.chars().count() <= 10));
        // Each successive window starts 7 characters after the previous one.
        assert_eq!(chunks[0].text, "abcdefghij");
        assert_eq!(chunks[1].text, "hijklmnopq");
        // All of the input is covered.
        assert!(chunks.last().unwrap().text.ends_with('z'));
    }

    #[test]
    fn chunking_is_deterministic() {
        let text = "Reset your password from the settings page. \
                    If the reset email does not arrive, check your spam folder. \
                    Contact support if the problem persists.";
        let chunker = RecursiveChunker::new(60, 10);

        let first = chunker.chunk(&doc(text));
        let second = chunker.chunk(&doc(text));
        assert_eq!(first, second);
        assert!(!first.is_empty());
    }

    #[test]
    fn empty_document_yields_no_chunks() {
        assert!(FixedSizeChunker::default().chunk(&doc("")).is_empty());
        assert!(RecursiveChunker::default().chunk(&doc("")).is_empty());
    }

    #[test]
    fn short_document_is_a_single_chunk() {
        let chunks = RecursiveChunker::new(500, 100).chunk(&doc("one short paragraph"));
        assert_eq!(chunks.len(), 1);
        assert_eq!(chunks[0].text, "one short paragraph");
        assert_eq!(chunks[0].chunk_index, 0);
    }

    #[test]
    fn recursive_chunker_prefers_paragraph_boundaries() {
        let text = "first paragraph about billing\n\nsecond paragraph about refunds";
        let chunks = RecursiveChunker::new(40, 5).chunk(&doc(text));

        assert_eq!(chunks.len(), 2);
        assert!(chunks[0].text.contains("billing"));
        assert!(chunks[1].text.contains("refunds"));
    }

    #[test]
    fn multibyte_text_does_not_split_mid_character() {
        let text = "héllo wörld ".repeat(20);
        let chunks = FixedSizeChunker::new(15, 5).chunk(&doc(&text));
        // Reconstructing each chunk must not panic and lengths hold in chars.
        assert!(chunks.iter().all(|c| c.text.chars().count() <= 15));
    }

    #[test]
    fn zero_step_window_terminates() {
        // overlap >= size would otherwise loop forever; a single window is produced.
        let chunks = FixedSizeChunker::new(5, 5).chunk(&doc("abcdefghij"));
        assert_eq!(chunks.len(), 1);
        assert_eq!(chunks[0].text, "abcde");
    }

    #[test]
    fn chunk_indices_are_sequential() {
        let chunks = FixedSizeChunker::new(4, 1).chunk(&doc("abcdefghijkl"));
        for (i, chunk) in chunks.iter().enumerate() {
            assert_eq!(chunk.chunk_index, i);
            assert_eq!(chunk.source, "test.txt");
        }
    }
}
