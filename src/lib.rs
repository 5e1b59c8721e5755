//! Retrieval-and-evaluation engine for the GunnerGPT knowledge assistant.
//!
//! This crate provides:
//! - Character-based document chunking with overlap
//! - Vector similarity retrieval with category filtering
//! - Context assembly under a character budget
//! - A multi-metric response evaluator (hallucination detection, grounding,
//!   recall, coverage, citation rate, composite quality score)
//! - A pipeline orchestrator sequencing retrieve → assemble → generate →
//!   evaluate
//!
//! The embedding model, the vector index, and the LLM are external
//! collaborators behind the [`EmbeddingProvider`], [`VectorStore`], and
//! [`GenerationProvider`] traits. [`InMemoryVectorStore`] is a bundled
//! development backend; the Gemini providers live behind the `gemini`
//! feature.

pub mod chunking;
pub mod config;
pub mod context;
pub mod document;
pub mod embedding;
pub mod error;
pub mod evaluator;
#[cfg(feature = "gemini")]
pub mod gemini;
pub mod generation;
pub mod ingest;
pub mod inmemory;
pub mod pipeline;
pub mod prompts;
pub mod retriever;
pub mod vectorstore;

pub use chunking::{chunk_document, chunk_text};
pub use config::{RagConfig, RagConfigBuilder};
pub use context::assemble_context;
pub use document::{Chunk, ChunkMetadata, CollectionInfo, Document, RetrievedDocument};
pub use embedding::EmbeddingProvider;
pub use error::{RagError, Result};
pub use evaluator::{EvaluationMetrics, evaluate};
#[cfg(feature = "gemini")]
pub use gemini::{GeminiEmbeddingProvider, GeminiGenerator};
pub use generation::GenerationProvider;
pub use ingest::{chunk_documents, load_documents};
pub use inmemory::InMemoryVectorStore;
pub use pipeline::{ChatOutcome, RagPipeline, RagPipelineBuilder};
pub use prompts::{FALLBACK_RESPONSE, SYSTEM_PROMPT, format_chat_prompt};
pub use retriever::Retriever;
pub use vectorstore::{ALL_CATEGORIES, VectorStore};
