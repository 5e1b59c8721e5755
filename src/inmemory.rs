//! In-memory vector store using cosine distance.
//!
//! [`InMemoryVectorStore`] is a zero-dependency backend backed by a `HashMap`
//! protected by a `tokio::sync::RwLock`. It is suitable for development,
//! testing, and small knowledge bases.

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::document::{ChunkMetadata, CollectionInfo, RetrievedDocument};
use crate::error::{RagError, Result};
use crate::vectorstore::{ALL_CATEGORIES, VectorStore};

/// A stored chunk entry: text, embedding, and metadata keyed by chunk ID.
#[derive(Debug, Clone)]
struct StoredChunk {
    text: String,
    embedding: Vec<f32>,
    metadata: ChunkMetadata,
}

/// An in-memory vector store using cosine distance for search.
#[derive(Debug)]
pub struct InMemoryVectorStore {
    name: String,
    chunks: RwLock<HashMap<String, StoredChunk>>,
}

impl InMemoryVectorStore {
    /// Create a new empty store for the named collection.
    pub fn new(collection_name: impl Into<String>) -> Self {
        Self { name: collection_name.into(), chunks: RwLock::new(HashMap::new()) }
    }
}

/// Compute cosine distance (`1 - cosine similarity`) between two vectors.
///
/// Vectors are normalized before the dot product, so the distance lands in
/// `[0, 2]`. Returns 1.0 (orthogonal) if either vector has zero magnitude.
fn cosine_distance(a: &[f32], b: &[f32]) -> f32 {
    let dot: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm_a == 0.0 || norm_b == 0.0 {
        return 1.0;
    }
    1.0 - dot / (norm_a * norm_b)
}

#[async_trait]
impl VectorStore for InMemoryVectorStore {
    async fn add_documents(
        &self,
        texts: &[String],
        embeddings: &[Vec<f32>],
        metadatas: &[ChunkMetadata],
        ids: &[String],
    ) -> Result<()> {
        if texts.len() != embeddings.len()
            || texts.len() != metadatas.len()
            || texts.len() != ids.len()
        {
            return Err(RagError::StoreUnavailable {
                backend: "InMemory".to_string(),
                message: format!(
                    "mismatched input lengths: {} texts, {} embeddings, {} metadatas, {} ids",
                    texts.len(),
                    embeddings.len(),
                    metadatas.len(),
                    ids.len()
                ),
            });
        }

        let mut chunks = self.chunks.write().await;
        // Full replace: clearing an already-empty collection is a no-op.
        chunks.clear();
        for (((text, embedding), metadata), id) in
            texts.iter().zip(embeddings).zip(metadatas).zip(ids)
        {
            chunks.insert(
                id.clone(),
                StoredChunk {
                    text: text.clone(),
                    embedding: embedding.clone(),
                    metadata: metadata.clone(),
                },
            );
        }
        Ok(())
    }

    async fn query(
        &self,
        embedding: &[f32],
        top_k: usize,
        category: &str,
    ) -> Result<Vec<RetrievedDocument>> {
        let chunks = self.chunks.read().await;

        let mut scored: Vec<RetrievedDocument> = chunks
            .values()
            .filter(|chunk| category == ALL_CATEGORIES || chunk.metadata.category == category)
            .map(|chunk| RetrievedDocument {
                text: chunk.text.clone(),
                metadata: chunk.metadata.clone(),
                distance: cosine_distance(&chunk.embedding, embedding),
            })
            .collect();

        scored.sort_by(|a, b| {
            a.distance.partial_cmp(&b.distance).unwrap_or(std::cmp::Ordering::Equal)
        });
        scored.truncate(top_k);
        Ok(scored)
    }

    async fn info(&self) -> CollectionInfo {
        let chunks = self.chunks.read().await;
        CollectionInfo { name: self.name.clone(), count: chunks.len(), metadata: None }
    }
}
