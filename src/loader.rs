//! Document loading with per-format parsers.
//!
//! The loader dispatches on file extension: `.txt` and `.md` are read as
//! UTF-8 text, `.csv` rows are rendered as `header: value` lines, and
//! `.pdf` text is extracted with the `pdf-extract` crate. Any other
//! extension is a [`SupportError::UnsupportedFormat`] for that file.

use std::fs;
use std::path::Path;

use tracing::info;

use crate::document::{Document, DocumentFormat};
use crate::error::{Result, SupportError};

/// Load a single document, selecting the parser by file extension.
///
/// # Errors
///
/// Returns [`SupportError::UnsupportedFormat`] for unrecognized extensions
/// and [`SupportError::Loader`] for read or parse failures.
pub fn load_document(path: &Path) -> Result<Document> {
    let format = DocumentFormat::from_path(path).ok_or_else(|| {
        SupportError::UnsupportedFormat(
            path.extension().and_then(|e| e.to_str()).unwrap_or("<none>").to_string(),
        )
    })?;

    let text = match format {
        DocumentFormat::Text | DocumentFormat::Markdown => read_text(path)?,
        DocumentFormat::Csv => read_csv(path)?,
        DocumentFormat::Pdf => read_pdf(path)?,
    };

    info!(path = %path.display(), ?format, chars = text.len(), "loaded document");

    Ok(Document { source: path.display().to_string(), text, format })
}

fn loader_err(path: &Path, message: impl std::fmt::Display) -> SupportError {
    SupportError::Loader { path: path.display().to_string(), message: message.to_string() }
}

fn read_text(path: &Path) -> Result<String> {
    fs::read_to_string(path).map_err(|e| loader_err(path, e))
}

/// Render each CSV record as one `header: value` block, blocks separated
/// by blank lines so the chunker treats rows as paragraphs.
fn read_csv(path: &Path) -> Result<String> {
    let mut reader = csv::Reader::from_path(path).map_err(|e| loader_err(path, e))?;
    let headers = reader.headers().map_err(|e| loader_err(path, e))?.clone();

    let mut blocks = Vec::new();
    for record in reader.records() {
        let record = record.map_err(|e| loader_err(path, e))?;
        let lines: Vec<String> = headers
            .iter()
            .zip(record.iter())
            .map(|(header, value)| format!("{header}: {value}"))
            .collect();
        blocks.push(lines.join("\n"));
    }

    Ok(blocks.join("\n\n"))
}

fn read_pdf(path: &Path) -> Result<String> {
    pdf_extract::extract_text(path).map_err(|e| loader_err(path, e))
}
