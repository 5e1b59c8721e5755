//! Generation provider trait for producing answers from prompts.

use async_trait::async_trait;

use crate::error::Result;

/// A provider that generates an answer for a fully formatted prompt.
///
/// Implementations wrap an external LLM backend. Two failure modes are
/// distinguished:
///
/// - [`RagError::GenerationUnavailable`](crate::RagError::GenerationUnavailable)
///   when the backend is unconfigured or failing — the pipeline recovers by
///   substituting a fixed fallback answer.
/// - [`RagError::RateLimited`](crate::RagError::RateLimited) when the backend
///   signals quota exhaustion — surfaced to callers so they can back off.
#[async_trait]
pub trait GenerationProvider: Send + Sync {
    /// Generate a response for the given prompt.
    async fn generate(&self, prompt: &str) -> Result<String>;
}
