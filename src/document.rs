//! Data types for documents, chunks, and retrieval results.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// A raw source document loaded from the knowledge base.
///
/// One `Document` corresponds to one source file. Documents exist only for
/// the duration of an ingestion run; their persisted form is owned by the
/// vector store afterwards.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Document {
    /// The full text content of the document.
    pub text: String,
    /// The source file name. Must be unique within an ingestion run.
    pub source: String,
    /// The category, taken from the file's immediate parent directory.
    pub category: String,
}

/// A bounded, overlapping segment of a [`Document`], the unit of retrieval.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Chunk {
    /// The text content of the chunk.
    pub text: String,
    /// The source file name inherited from the parent document.
    pub source: String,
    /// The category inherited from the parent document.
    pub category: String,
    /// Ordinal position within the parent document, starting at 0.
    pub chunk_index: usize,
}

impl Chunk {
    /// The stored identity of this chunk: `{source}_{chunk_index}`.
    ///
    /// Two documents sharing a `source` name would collide here and corrupt
    /// chunk identity. Source names must be unique per ingestion run; the
    /// collision is not detected at ingest time.
    pub fn id(&self) -> String {
        format!("{}_{}", self.source, self.chunk_index)
    }

    /// The metadata persisted alongside this chunk in the vector store.
    pub fn metadata(&self) -> ChunkMetadata {
        ChunkMetadata {
            source: self.source.clone(),
            category: self.category.clone(),
            chunk_id: self.chunk_index,
        }
    }
}

/// Metadata stored with each chunk in the vector store.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ChunkMetadata {
    /// The source file name of the parent document.
    pub source: String,
    /// The category of the parent document.
    pub category: String,
    /// Ordinal position of the chunk within its parent document.
    pub chunk_id: usize,
}

/// A chunk returned from a similarity query, with its distance to the query.
///
/// `distance` is cosine distance over L2-normalized vectors: 0.0 is an
/// identical match, 2.0 is opposite. Retrieved documents are owned by the
/// request that produced them and discarded afterwards.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetrievedDocument {
    /// The chunk text.
    pub text: String,
    /// The chunk's stored metadata.
    pub metadata: ChunkMetadata,
    /// Cosine distance to the query embedding.
    pub distance: f32,
}

impl RetrievedDocument {
    /// Similarity to the query: `1 - distance`.
    pub fn similarity(&self) -> f32 {
        1.0 - self.distance
    }
}

/// Collection-level information reported by a vector store.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CollectionInfo {
    /// The collection name.
    pub name: String,
    /// Number of stored chunks.
    pub count: usize,
    /// Collection-level metadata, if the backend exposes any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metadata: Option<HashMap<String, String>>,
}
