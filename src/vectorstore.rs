//! Vector store trait for storing and querying chunk embeddings.

use async_trait::async_trait;

use crate::document::{ChunkMetadata, CollectionInfo, RetrievedDocument};
use crate::error::Result;

/// Category filter value that disables filtering.
pub const ALL_CATEGORIES: &str = "all";

/// A storage backend for chunk embeddings with similarity search.
///
/// This system's ingestion policy is full-replace, not incremental:
/// [`add_documents`](VectorStore::add_documents) deletes any prior contents
/// before adding the new set. A full replace is not safe to run concurrently
/// with itself or with queries against the same collection; callers should
/// serialize ingestion runs.
#[async_trait]
pub trait VectorStore: Send + Sync {
    /// Replace the entire stored collection with the given set.
    ///
    /// `texts`, `embeddings`, `metadatas`, and `ids` are parallel slices.
    /// Deleting from an empty or nonexistent collection is tolerated
    /// silently.
    ///
    /// # Errors
    ///
    /// Returns [`RagError::StoreUnavailable`](crate::RagError::StoreUnavailable)
    /// if the underlying index cannot be reached or the inputs are malformed.
    async fn add_documents(
        &self,
        texts: &[String],
        embeddings: &[Vec<f32>],
        metadatas: &[ChunkMetadata],
        ids: &[String],
    ) -> Result<()>;

    /// Return up to `top_k` nearest neighbors to `embedding`, most similar
    /// first (ascending cosine distance; ties broken by index order).
    ///
    /// `category` restricts results to chunks whose stored category matches;
    /// the pass-through value [`ALL_CATEGORIES`] disables filtering. An empty
    /// collection yields an empty result, not an error.
    async fn query(
        &self,
        embedding: &[f32],
        top_k: usize,
        category: &str,
    ) -> Result<Vec<RetrievedDocument>>;

    /// Return collection name, stored item count, and collection metadata.
    ///
    /// Fails soft: if the backend is unreachable this returns a zero-count
    /// placeholder rather than an error, so health-check callers never crash
    /// on this path.
    async fn info(&self) -> CollectionInfo;
}
