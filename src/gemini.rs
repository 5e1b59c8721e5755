//! Gemini generation and embedding providers over the REST API.
//!
//! This module is only available when the `gemini` feature is enabled.

use std::collections::VecDeque;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{debug, error, warn};

use crate::embedding::EmbeddingProvider;
use crate::error::{RagError, Result};
use crate::generation::GenerationProvider;

const GEMINI_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

const DEFAULT_GENERATION_MODEL: &str = "gemini-2.0-flash";
const DEFAULT_EMBEDDING_MODEL: &str = "text-embedding-004";

/// Embedding dimensions for `text-embedding-004`.
const DEFAULT_EMBEDDING_DIMENSIONS: usize = 768;

const DEFAULT_RATE_LIMIT_PER_MINUTE: usize = 15;
const DEFAULT_RATE_LIMIT_PER_DAY: usize = 1500;

/// Client-side sliding-window limiter for outbound Gemini calls.
///
/// Tracks a one-minute request window and a rolling 24-hour count. This is
/// the outbound quota guard, not an inbound request limiter.
#[derive(Debug)]
struct RateLimiter {
    per_minute: usize,
    per_day: usize,
    state: tokio::sync::Mutex<RateLimiterState>,
}

#[derive(Debug)]
struct RateLimiterState {
    requests: VecDeque<Instant>,
    daily_count: usize,
    daily_reset: Instant,
}

impl RateLimiter {
    fn new(per_minute: usize, per_day: usize) -> Self {
        Self {
            per_minute,
            per_day,
            state: tokio::sync::Mutex::new(RateLimiterState {
                requests: VecDeque::new(),
                daily_count: 0,
                daily_reset: Instant::now() + Duration::from_secs(24 * 60 * 60),
            }),
        }
    }

    /// Record a request if the window allows it. Returns `false` when either
    /// budget is exhausted.
    async fn acquire(&self) -> bool {
        let mut state = self.state.lock().await;
        let now = Instant::now();

        if now >= state.daily_reset {
            state.daily_count = 0;
            state.daily_reset = now + Duration::from_secs(24 * 60 * 60);
        }

        while let Some(&front) = state.requests.front() {
            if now.duration_since(front) >= Duration::from_secs(60) {
                state.requests.pop_front();
            } else {
                break;
            }
        }

        if state.requests.len() >= self.per_minute {
            warn!(per_minute = self.per_minute, "per-minute rate limit reached");
            return false;
        }
        if state.daily_count >= self.per_day {
            warn!(per_day = self.per_day, "daily rate limit reached");
            return false;
        }

        state.requests.push_back(now);
        state.daily_count += 1;
        true
    }
}

// ── Gemini API request/response types ──────────────────────────────

#[derive(Serialize)]
struct GenerateRequest<'a> {
    contents: Vec<Content<'a>>,
}

#[derive(Serialize)]
struct Content<'a> {
    parts: Vec<Part<'a>>,
}

#[derive(Serialize)]
struct Part<'a> {
    text: &'a str,
}

#[derive(Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Deserialize)]
struct Candidate {
    content: CandidateContent,
}

#[derive(Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<CandidatePart>,
}

#[derive(Deserialize)]
struct CandidatePart {
    #[serde(default)]
    text: String,
}

#[derive(Serialize)]
struct EmbedRequest<'a> {
    content: Content<'a>,
}

#[derive(Serialize)]
struct BatchEmbedRequest<'a> {
    requests: Vec<BatchEmbedEntry<'a>>,
}

#[derive(Serialize)]
struct BatchEmbedEntry<'a> {
    model: String,
    content: Content<'a>,
}

#[derive(Deserialize)]
struct EmbedResponse {
    embedding: EmbeddingValues,
}

#[derive(Deserialize)]
struct BatchEmbedResponse {
    #[serde(default)]
    embeddings: Vec<EmbeddingValues>,
}

#[derive(Deserialize)]
struct EmbeddingValues {
    values: Vec<f32>,
}

#[derive(Deserialize)]
struct ErrorResponse {
    error: ErrorDetail,
}

#[derive(Deserialize)]
struct ErrorDetail {
    message: String,
}

/// Pull the API error message out of an error body, falling back to the raw
/// body when it is not the documented JSON shape.
fn error_detail(body: String) -> String {
    serde_json::from_str::<ErrorResponse>(&body).map(|e| e.error.message).unwrap_or(body)
}

// ── Generation provider ────────────────────────────────────────────

/// A [`GenerationProvider`] backed by the Gemini `generateContent` API.
///
/// Carries a client-side rate limiter mirroring the free-tier quotas. An
/// exhausted local budget or an HTTP 429 from the API both surface as
/// [`RagError::RateLimited`]; other failures surface as
/// [`RagError::GenerationUnavailable`], which the pipeline recovers from.
pub struct GeminiGenerator {
    client: reqwest::Client,
    api_key: String,
    model: String,
    rate_limiter: RateLimiter,
}

impl GeminiGenerator {
    /// Create a new generator with the given API key and the default model
    /// and rate limits.
    pub fn new(api_key: impl Into<String>) -> Result<Self> {
        let api_key = api_key.into();
        if api_key.is_empty() {
            return Err(RagError::GenerationUnavailable(
                "Gemini API key must not be empty".to_string(),
            ));
        }

        Ok(Self {
            client: reqwest::Client::new(),
            api_key,
            model: DEFAULT_GENERATION_MODEL.to_string(),
            rate_limiter: RateLimiter::new(
                DEFAULT_RATE_LIMIT_PER_MINUTE,
                DEFAULT_RATE_LIMIT_PER_DAY,
            ),
        })
    }

    /// Create a new generator using the `GEMINI_API_KEY` environment
    /// variable.
    pub fn from_env() -> Result<Self> {
        let api_key = std::env::var("GEMINI_API_KEY").map_err(|_| {
            RagError::GenerationUnavailable(
                "GEMINI_API_KEY environment variable not set".to_string(),
            )
        })?;
        Self::new(api_key)
    }

    /// Set the model name (e.g. `gemini-2.0-flash`).
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// Override the client-side rate limits.
    pub fn with_rate_limits(mut self, per_minute: usize, per_day: usize) -> Self {
        self.rate_limiter = RateLimiter::new(per_minute, per_day);
        self
    }
}

/// Strip surrounding markdown code fences from a model reply.
fn clean_response(text: &str) -> String {
    let cleaned = text.trim();
    if let Some(rest) = cleaned.strip_prefix("```") {
        let mut lines: Vec<&str> = rest.lines().collect();
        // First line may carry a language tag.
        if !lines.is_empty() {
            lines.remove(0);
        }
        if lines.last().is_some_and(|l| l.trim_start().starts_with("```")) {
            lines.pop();
        }
        return lines.join("\n").trim().to_string();
    }
    cleaned.to_string()
}

#[async_trait]
impl GenerationProvider for GeminiGenerator {
    async fn generate(&self, prompt: &str) -> Result<String> {
        if !self.rate_limiter.acquire().await {
            return Err(RagError::RateLimited("client-side quota exhausted".to_string()));
        }

        debug!(model = %self.model, prompt_len = prompt.len(), "generating response");

        let url = format!("{GEMINI_BASE_URL}/models/{}:generateContent", self.model);
        let body = GenerateRequest { contents: vec![Content { parts: vec![Part { text: prompt }] }] };

        let response = self
            .client
            .post(&url)
            .header("x-goog-api-key", &self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                error!(error = %e, "Gemini request failed");
                RagError::GenerationUnavailable(format!("request failed: {e}"))
            })?;

        let status = response.status();
        if status.as_u16() == 429 {
            return Err(RagError::RateLimited("Gemini API quota exceeded".to_string()));
        }
        if !status.is_success() {
            let detail = error_detail(response.text().await.unwrap_or_default());
            error!(%status, "Gemini API error");
            return Err(RagError::GenerationUnavailable(format!(
                "API returned {status}: {detail}"
            )));
        }

        let parsed: GenerateResponse = response.json().await.map_err(|e| {
            error!(error = %e, "failed to parse Gemini response");
            RagError::GenerationUnavailable(format!("failed to parse response: {e}"))
        })?;

        let text = parsed
            .candidates
            .into_iter()
            .next()
            .and_then(|c| c.content.parts.into_iter().next())
            .map(|p| p.text)
            .unwrap_or_default();

        if text.is_empty() {
            return Err(RagError::GenerationUnavailable("empty response from API".to_string()));
        }

        let cleaned = clean_response(&text);
        debug!(response_len = cleaned.len(), "generated response");
        Ok(cleaned)
    }
}

// ── Embedding provider ─────────────────────────────────────────────

/// An [`EmbeddingProvider`] backed by the Gemini embedding API.
///
/// Returned vectors are L2-normalized so cosine distance semantics hold in
/// the vector store.
pub struct GeminiEmbeddingProvider {
    client: reqwest::Client,
    api_key: String,
    model: String,
    dimensions: usize,
}

impl GeminiEmbeddingProvider {
    /// Create a new provider with the given API key and the default
    /// `text-embedding-004` model.
    pub fn new(api_key: impl Into<String>) -> Result<Self> {
        let api_key = api_key.into();
        if api_key.is_empty() {
            return Err(RagError::EmbeddingError {
                provider: "Gemini".to_string(),
                message: "API key must not be empty".to_string(),
            });
        }

        Ok(Self {
            client: reqwest::Client::new(),
            api_key,
            model: DEFAULT_EMBEDDING_MODEL.to_string(),
            dimensions: DEFAULT_EMBEDDING_DIMENSIONS,
        })
    }

    /// Set the embedding model name.
    pub fn with_model(mut self, model: impl Into<String>, dimensions: usize) -> Self {
        self.model = model.into();
        self.dimensions = dimensions;
        self
    }

    async fn post_json<T: serde::de::DeserializeOwned>(
        &self,
        url: &str,
        body: &impl Serialize,
    ) -> Result<T> {
        let response = self
            .client
            .post(url)
            .header("x-goog-api-key", &self.api_key)
            .json(body)
            .send()
            .await
            .map_err(|e| {
                error!(provider = "Gemini", error = %e, "embedding request failed");
                RagError::EmbeddingError {
                    provider: "Gemini".to_string(),
                    message: format!("request failed: {e}"),
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            let detail = error_detail(response.text().await.unwrap_or_default());
            error!(provider = "Gemini", %status, "embedding API error");
            return Err(RagError::EmbeddingError {
                provider: "Gemini".to_string(),
                message: format!("API returned {status}: {detail}"),
            });
        }

        response.json().await.map_err(|e| {
            error!(provider = "Gemini", error = %e, "failed to parse embedding response");
            RagError::EmbeddingError {
                provider: "Gemini".to_string(),
                message: format!("failed to parse response: {e}"),
            }
        })
    }
}

/// L2-normalize a vector in place. Zero vectors are left unchanged.
fn normalize(mut values: Vec<f32>) -> Vec<f32> {
    let norm: f32 = values.iter().map(|v| v * v).sum::<f32>().sqrt();
    if norm > 0.0 {
        for v in &mut values {
            *v /= norm;
        }
    }
    values
}

#[async_trait]
impl EmbeddingProvider for GeminiEmbeddingProvider {
    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        debug!(provider = "Gemini", text_len = text.len(), "embedding single text");

        let url = format!("{GEMINI_BASE_URL}/models/{}:embedContent", self.model);
        let body = EmbedRequest { content: Content { parts: vec![Part { text }] } };

        let parsed: EmbedResponse = self.post_json(&url, &body).await?;
        Ok(normalize(parsed.embedding.values))
    }

    async fn embed_batch(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }

        debug!(provider = "Gemini", batch_size = texts.len(), "embedding batch");

        let url = format!("{GEMINI_BASE_URL}/models/{}:batchEmbedContents", self.model);
        let body = BatchEmbedRequest {
            requests: texts
                .iter()
                .map(|text| BatchEmbedEntry {
                    model: format!("models/{}", self.model),
                    content: Content { parts: vec![Part { text }] },
                })
                .collect(),
        };

        let parsed: BatchEmbedResponse = self.post_json(&url, &body).await?;
        if parsed.embeddings.len() != texts.len() {
            return Err(RagError::EmbeddingError {
                provider: "Gemini".to_string(),
                message: format!(
                    "API returned {} embeddings for {} inputs",
                    parsed.embeddings.len(),
                    texts.len()
                ),
            });
        }

        Ok(parsed.embeddings.into_iter().map(|e| normalize(e.values)).collect())
    }

    fn dimensions(&self) -> usize {
        self.dimensions
    }
}
