//! Query-time document retrieval.

use std::sync::Arc;

use tracing::{error, info};

use crate::document::RetrievedDocument;
use crate::embedding::EmbeddingProvider;
use crate::error::{RagError, Result};
use crate::vectorstore::VectorStore;

/// Turns a query string into an embedding and fetches the nearest chunks
/// from the vector store.
pub struct Retriever {
    embedder: Arc<dyn EmbeddingProvider>,
    store: Arc<dyn VectorStore>,
}

impl Retriever {
    /// Create a new retriever over the given embedding provider and store.
    pub fn new(embedder: Arc<dyn EmbeddingProvider>, store: Arc<dyn VectorStore>) -> Self {
        Self { embedder, store }
    }

    /// Retrieve up to `top_k` relevant documents for `query`, most similar
    /// first, optionally restricted to a category
    /// ([`ALL_CATEGORIES`](crate::vectorstore::ALL_CATEGORIES) disables the
    /// filter).
    ///
    /// # Errors
    ///
    /// Returns [`RagError::RetrievalFailed`] wrapping the underlying cause if
    /// either the embedding step or the store query fails. No partial
    /// results are returned on failure.
    pub async fn retrieve(
        &self,
        query: &str,
        top_k: usize,
        category: &str,
    ) -> Result<Vec<RetrievedDocument>> {
        let query_embedding = self.embedder.embed(query).await.map_err(|e| {
            error!(error = %e, "query embedding failed");
            RagError::RetrievalFailed(format!("query embedding failed: {e}"))
        })?;

        let results = self.store.query(&query_embedding, top_k, category).await.map_err(|e| {
            error!(error = %e, "vector store query failed");
            RagError::RetrievalFailed(format!("vector store query failed: {e}"))
        })?;

        info!(
            result_count = results.len(),
            query = %query.chars().take(50).collect::<String>(),
            category,
            "retrieved documents"
        );

        Ok(results)
    }
}
