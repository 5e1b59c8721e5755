//! Character-based document chunking with overlap.
//!
//! Chunking is a pure function of `(text, chunk_size, overlap)`: identical
//! input always yields identical output, which keeps ingestion reproducible.

use crate::document::{Chunk, Document};

/// Split text into overlapping fixed-size chunks.
///
/// Starting at offset 0, emits the window `[start, start + chunk_size)`
/// (clipped to the text length), then advances by `chunk_size - overlap`.
/// Every chunk overlaps its predecessor by exactly `overlap` characters,
/// except possibly at the tail.
///
/// Sizes are counted in Unicode scalar values, not bytes, so multi-byte
/// text never splits inside a code point.
///
/// Empty text yields no chunks; text shorter than `chunk_size` yields a
/// single chunk equal to the whole text. Callers must ensure
/// `0 < overlap < chunk_size` (enforced by [`RagConfig`](crate::RagConfig)
/// validation).
pub fn chunk_text(text: &str, chunk_size: usize, overlap: usize) -> Vec<String> {
    if text.is_empty() {
        return Vec::new();
    }

    let chars: Vec<char> = text.chars().collect();
    let mut chunks = Vec::new();
    let mut start = 0;

    while start < chars.len() {
        let end = (start + chunk_size).min(chars.len());
        chunks.push(chars[start..end].iter().collect());
        let step = chunk_size.saturating_sub(overlap);
        if step == 0 {
            break;
        }
        start += step;
    }

    chunks
}

/// Split a document into [`Chunk`]s carrying the document's source and
/// category, with `chunk_index` numbered from 0.
pub fn chunk_document(document: &Document, chunk_size: usize, overlap: usize) -> Vec<Chunk> {
    chunk_text(&document.text, chunk_size, overlap)
        .into_iter()
        .enumerate()
        .map(|(chunk_index, text)| Chunk {
            text,
            source: document.source.clone(),
            category: document.category.clone(),
            chunk_index,
        })
        .collect()
}
