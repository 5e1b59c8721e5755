//! RAG pipeline orchestrator.
//!
//! [`RagPipeline`] composes an [`EmbeddingProvider`], a [`VectorStore`], and
//! an optional [`GenerationProvider`] behind a single chat-and-ingest
//! surface. All collaborators are injected through the builder; the pipeline
//! holds no process-global state.
//!
//! # Example
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use gunner_rag::{InMemoryVectorStore, RagConfig, RagPipeline};
//!
//! let config = RagConfig::default();
//! let pipeline = RagPipeline::builder()
//!     .config(config.clone())
//!     .embedding_provider(Arc::new(my_embedder))
//!     .vector_store(Arc::new(InMemoryVectorStore::new(&config.collection_name)))
//!     .generation_provider(Arc::new(my_generator))
//!     .build()?;
//!
//! pipeline.ingest(Path::new("./arsenal_kb")).await?;
//! let outcome = pipeline.chat("Who is Arsenal's manager?", "all").await?;
//! ```

use std::path::Path;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::config::RagConfig;
use crate::context::assemble_context;
use crate::document::{CollectionInfo, RetrievedDocument};
use crate::embedding::EmbeddingProvider;
use crate::error::{RagError, Result};
use crate::evaluator::{EvaluationMetrics, evaluate};
use crate::generation::GenerationProvider;
use crate::ingest::{chunk_documents, load_documents};
use crate::prompts::{FALLBACK_RESPONSE, format_chat_prompt};
use crate::retriever::Retriever;
use crate::vectorstore::VectorStore;

/// The structured result of one chat turn.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatOutcome {
    /// The generated (or fallback) answer.
    pub response: String,
    /// The retrieved documents the answer was grounded on, most similar
    /// first.
    pub sources: Vec<RetrievedDocument>,
    /// Quality metrics for the answer. `None` when the fallback answer was
    /// used — evaluation is only meaningful for real generated text.
    pub evaluation_metrics: Option<EvaluationMetrics>,
    /// The original user query.
    pub query: String,
}

/// The RAG pipeline orchestrator.
///
/// Sequences retrieve → assemble context → generate → evaluate for each
/// chat turn, and chunk → embed → full-replace store for ingestion.
/// Construct one via [`RagPipeline::builder()`].
pub struct RagPipeline {
    config: RagConfig,
    embedding_provider: Arc<dyn EmbeddingProvider>,
    vector_store: Arc<dyn VectorStore>,
    generation_provider: Option<Arc<dyn GenerationProvider>>,
    retriever: Retriever,
}

impl std::fmt::Debug for RagPipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RagPipeline")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl RagPipeline {
    /// Create a new [`RagPipelineBuilder`].
    pub fn builder() -> RagPipelineBuilder {
        RagPipelineBuilder::default()
    }

    /// Return a reference to the pipeline configuration.
    pub fn config(&self) -> &RagConfig {
        &self.config
    }

    /// Ingest the knowledge base at `kb_path`, replacing the entire stored
    /// collection.
    ///
    /// Loads documents, chunks them, embeds all chunk texts in one batch,
    /// and hands the set wholesale to the vector store. Returns the number
    /// of chunks ingested.
    ///
    /// Not safe to run concurrently with itself or with queries against the
    /// same collection: a query mid-replace may see a partially populated
    /// collection. Callers should serialize ingestion runs.
    ///
    /// # Errors
    ///
    /// Returns [`RagError::NoDocumentsFound`] for an empty knowledge base,
    /// or propagates embedding and store failures (fatal for ingestion).
    pub async fn ingest(&self, kb_path: &Path) -> Result<usize> {
        let documents = load_documents(kb_path)?;
        let chunks =
            chunk_documents(&documents, self.config.chunk_size, self.config.chunk_overlap);

        let texts: Vec<String> = chunks.iter().map(|c| c.text.clone()).collect();
        let text_refs: Vec<&str> = texts.iter().map(String::as_str).collect();
        let embeddings = self.embedding_provider.embed_batch(&text_refs).await?;

        let metadatas: Vec<_> = chunks.iter().map(|c| c.metadata()).collect();
        let ids: Vec<String> = chunks.iter().map(|c| c.id()).collect();

        self.vector_store.add_documents(&texts, &embeddings, &metadatas, &ids).await?;

        info!(chunk_count = chunks.len(), "ingested knowledge base");
        Ok(chunks.len())
    }

    /// Retrieve relevant documents for a query without generating an answer.
    ///
    /// # Errors
    ///
    /// Returns [`RagError::RetrievalFailed`] if embedding or search fails.
    pub async fn retrieve(&self, query: &str, category: &str) -> Result<Vec<RetrievedDocument>> {
        self.retriever.retrieve(query, self.config.top_k, category).await
    }

    /// Run one full chat turn: retrieve → assemble context → generate →
    /// evaluate.
    ///
    /// If the generation backend is unconfigured, unavailable, or returns no
    /// output, the fixed fallback answer is substituted and
    /// `evaluation_metrics` is `None`.
    ///
    /// # Errors
    ///
    /// Returns [`RagError::RetrievalFailed`] if retrieval fails — there is
    /// nothing useful to answer with — and [`RagError::RateLimited`] when
    /// the generation backend signals quota exhaustion.
    pub async fn chat(&self, message: &str, category: &str) -> Result<ChatOutcome> {
        let sources = self.retriever.retrieve(message, self.config.top_k, category).await?;

        let context = assemble_context(&sources, self.config.max_context_chars);
        let prompt = format_chat_prompt(&context, message);

        let generated = match &self.generation_provider {
            None => None,
            Some(provider) => match provider.generate(&prompt).await {
                Ok(text) if !text.trim().is_empty() => Some(text),
                Ok(_) => {
                    warn!("generation backend returned empty output");
                    None
                }
                Err(e @ RagError::RateLimited(_)) => return Err(e),
                Err(e) => {
                    warn!(error = %e, "generation unavailable, using fallback answer");
                    None
                }
            },
        };

        let (response, evaluation_metrics) = match generated {
            Some(text) => {
                let metrics = evaluate(message, &text, &sources);
                (text, Some(metrics))
            }
            None => (FALLBACK_RESPONSE.to_string(), None),
        };

        info!(
            source_count = sources.len(),
            evaluated = evaluation_metrics.is_some(),
            "chat turn complete"
        );

        Ok(ChatOutcome { response, sources, evaluation_metrics, query: message.to_string() })
    }

    /// Report collection info from the vector store. Never fails; the store
    /// returns a zero-count placeholder when unreachable.
    pub async fn info(&self) -> CollectionInfo {
        self.vector_store.info().await
    }
}

/// Builder for constructing a [`RagPipeline`].
///
/// `config`, `embedding_provider`, and `vector_store` are required;
/// `generation_provider` is optional — without one, every chat turn answers
/// with the fallback string.
#[derive(Default)]
pub struct RagPipelineBuilder {
    config: Option<RagConfig>,
    embedding_provider: Option<Arc<dyn EmbeddingProvider>>,
    vector_store: Option<Arc<dyn VectorStore>>,
    generation_provider: Option<Arc<dyn GenerationProvider>>,
}

impl RagPipelineBuilder {
    /// Set the pipeline configuration.
    pub fn config(mut self, config: RagConfig) -> Self {
        self.config = Some(config);
        self
    }

    /// Set the embedding provider.
    pub fn embedding_provider(mut self, provider: Arc<dyn EmbeddingProvider>) -> Self {
        self.embedding_provider = Some(provider);
        self
    }

    /// Set the vector store backend.
    pub fn vector_store(mut self, store: Arc<dyn VectorStore>) -> Self {
        self.vector_store = Some(store);
        self
    }

    /// Set an optional generation provider.
    pub fn generation_provider(mut self, provider: Arc<dyn GenerationProvider>) -> Self {
        self.generation_provider = Some(provider);
        self
    }

    /// Build the [`RagPipeline`], validating that all required fields are
    /// set.
    ///
    /// # Errors
    ///
    /// Returns [`RagError::ConfigError`] if any required field is missing.
    pub fn build(self) -> Result<RagPipeline> {
        let config =
            self.config.ok_or_else(|| RagError::ConfigError("config is required".to_string()))?;
        let embedding_provider = self
            .embedding_provider
            .ok_or_else(|| RagError::ConfigError("embedding_provider is required".to_string()))?;
        let vector_store = self
            .vector_store
            .ok_or_else(|| RagError::ConfigError("vector_store is required".to_string()))?;

        let retriever = Retriever::new(embedding_provider.clone(), vector_store.clone());

        Ok(RagPipeline {
            config,
            embedding_provider,
            vector_store,
            generation_provider: self.generation_provider,
            retriever,
        })
    }
}
