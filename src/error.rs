//! Error types for the `gunner-rag` crate.

use thiserror::Error;

/// Errors that can occur in RAG operations.
#[derive(Debug, Error)]
pub enum RagError {
    /// The vector index could not be reached or rejected an operation.
    ///
    /// Fatal during ingestion. Callers that want retrieval to degrade to
    /// "no results" must catch this explicitly.
    #[error("Vector store unavailable ({backend}): {message}")]
    StoreUnavailable {
        /// The vector store backend that produced the error.
        backend: String,
        /// A description of the failure.
        message: String,
    },

    /// An error occurred during embedding generation.
    #[error("Embedding error ({provider}): {message}")]
    EmbeddingError {
        /// The embedding provider that produced the error.
        provider: String,
        /// A description of the failure.
        message: String,
    },

    /// The embedding or store-query step of retrieval failed.
    ///
    /// No partial results are returned when retrieval fails.
    #[error("Retrieval failed: {0}")]
    RetrievalFailed(String),

    /// The generation backend is not configured or is failing.
    ///
    /// Recovered locally by the pipeline, which substitutes a fixed
    /// fallback answer. Never fatal.
    #[error("Generation unavailable: {0}")]
    GenerationUnavailable(String),

    /// The generation backend signalled quota exhaustion.
    ///
    /// Surfaced distinctly from [`RagError::GenerationUnavailable`] so
    /// callers can back off.
    #[error("Rate limited: {0}")]
    RateLimited(String),

    /// An ingestion run found zero usable documents.
    #[error("No documents found in knowledge base at {0}")]
    NoDocumentsFound(String),

    /// A configuration validation error.
    #[error("Configuration error: {0}")]
    ConfigError(String),
}

/// A convenience result type for RAG operations.
pub type Result<T> = std::result::Result<T, RagError>;
