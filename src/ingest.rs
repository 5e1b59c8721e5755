//! Knowledge-base loading and chunk preparation.
//!
//! The knowledge base is a directory tree of plain-text files. Each file's
//! name becomes its `source` (unique per ingestion run) and its immediate
//! parent directory name becomes its `category`.

use std::path::Path;

use tracing::{error, info};
use walkdir::WalkDir;

use crate::chunking::chunk_document;
use crate::document::{Chunk, Document};
use crate::error::{RagError, Result};

/// Load all `.txt` documents under `kb_path`.
///
/// Files are visited in sorted path order so repeated runs load the same
/// documents in the same order. Files that fail to read are logged and
/// skipped; empty files are skipped silently.
///
/// # Errors
///
/// Returns [`RagError::NoDocumentsFound`] if no usable documents exist.
pub fn load_documents(kb_path: &Path) -> Result<Vec<Document>> {
    let mut files: Vec<_> = WalkDir::new(kb_path)
        .into_iter()
        .filter_map(std::result::Result::ok)
        .filter(|entry| entry.file_type().is_file())
        .filter(|entry| entry.path().extension().is_some_and(|ext| ext == "txt"))
        .map(|entry| entry.into_path())
        .collect();
    files.sort();

    let mut documents = Vec::new();
    for path in files {
        let text = match std::fs::read_to_string(&path) {
            Ok(text) => text.trim().to_string(),
            Err(e) => {
                error!(path = %path.display(), error = %e, "failed to load file, skipping");
                continue;
            }
        };
        if text.is_empty() {
            continue;
        }

        let source = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default();
        let category = path
            .parent()
            .and_then(Path::file_name)
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default();

        documents.push(Document { text, source, category });
    }

    if documents.is_empty() {
        return Err(RagError::NoDocumentsFound(kb_path.display().to_string()));
    }

    info!(document_count = documents.len(), kb_path = %kb_path.display(), "loaded documents");
    Ok(documents)
}

/// Chunk every document, preserving document order and per-document chunk
/// numbering.
pub fn chunk_documents(documents: &[Document], chunk_size: usize, overlap: usize) -> Vec<Chunk> {
    let chunks: Vec<Chunk> =
        documents.iter().flat_map(|doc| chunk_document(doc, chunk_size, overlap)).collect();

    info!(chunk_count = chunks.len(), document_count = documents.len(), "chunked documents");
    chunks
}
