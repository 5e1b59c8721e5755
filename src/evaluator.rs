//! Response quality evaluation.
//!
//! Scores a generated answer against the retrieved chunks and the original
//! query using five independent text heuristics, then combines them into a
//! single quality score. Pure text analysis: no external calls, no state,
//! and no errors — every edge case has a defined numeric fallback so the
//! evaluator never aborts a response pipeline.
//!
//! The groundedness heuristics (sliding phrase windows plus keyword density)
//! are deliberately approximate; tests should assert tolerance bands rather
//! than exact scores on non-trivial text.

use std::collections::HashSet;
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::document::RetrievedDocument;

/// Responses with a hallucination rate below this are labeled grounded.
const GROUNDED_THRESHOLD: f64 = 0.3;

/// Similarity at or above this counts a retrieved document as relevant.
///
/// Intentionally permissive: most embedding models cluster relevant matches
/// in the 0.3-0.6 similarity range rather than near 1.0.
const RELEVANT_SIMILARITY: f64 = 0.3;

/// Fraction of a sentence's unique long words that must appear in the
/// sources for the keyword-density fallback to call it grounded.
const KEYWORD_DENSITY_THRESHOLD: f64 = 0.4;

/// Maximum number of key phrases extracted from any text.
const MAX_KEY_PHRASES: usize = 20;

/// Query stop words: articles, auxiliaries, interrogatives, and the domain
/// filler words users pad their questions with.
const STOP_WORDS: &[&str] = &[
    "who", "what", "when", "where", "why", "how", "is", "the", "a", "an", "and", "or", "but", "in",
    "on", "at", "to", "for", "of", "with", "by", "from", "up", "about", "into", "through",
    "during", "are", "was", "were", "been", "be", "have", "has", "had", "do", "does", "did",
    "will", "would", "could", "should", "may", "might", "must", "can", "this", "that", "these",
    "those", "arsenal", "tell", "me",
];

static WORD_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\w+").expect("word regex is valid"));

/// The scores produced for one query/response pair.
///
/// All fractional fields are rounded to 3 decimal places and lie in
/// `[0.0, 1.0]`. Metrics are ephemeral: produced fresh on every chat turn
/// and never persisted.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct EvaluationMetrics {
    /// Fraction of substantive response sentences not grounded in sources.
    pub hallucination_rate: f64,
    /// Whether `hallucination_rate` is below the grounded threshold (0.3).
    pub is_grounded: bool,
    /// Fraction of the response's key phrases found in source text.
    pub grounding_score: f64,
    /// Mean similarity over all retrieved documents.
    pub avg_similarity: f64,
    /// Highest similarity among retrieved documents.
    pub max_similarity: f64,
    /// Lowest similarity among retrieved documents.
    pub min_similarity: f64,
    /// Fraction of the top 5 retrieved documents that are relevant.
    pub recall_at_5: f64,
    /// Fraction of the top 3 retrieved documents that are relevant.
    pub recall_at_3: f64,
    /// Fraction of query terms covered by the response.
    pub coverage_score: f64,
    /// Number of retrieved documents with at least one phrase echoed in the
    /// response.
    pub sources_cited: usize,
    /// Total number of retrieved documents.
    pub total_sources: usize,
    /// `sources_cited / total_sources`, or 0.0 with no sources.
    pub citation_rate: f64,
    /// Composite quality score; see [`evaluate`] for the weighting.
    pub quality_score: f64,
}

/// Evaluate a generated response against the query and retrieved evidence.
///
/// The composite quality score is
/// `0.4 * recall_at_5 + 0.4 * ((1 - hallucination_rate) + grounding_score) / 2
/// + 0.2 * coverage_score`: retrieval quality and answer grounding matter
/// twice as much as raw topical coverage, because an ungrounded or
/// poorly-retrieved answer is worse than an incomplete-but-accurate one.
pub fn evaluate(
    query: &str,
    response: &str,
    retrieved_docs: &[RetrievedDocument],
) -> EvaluationMetrics {
    let hallucination_rate = detect_hallucination(response, retrieved_docs);
    let is_grounded = hallucination_rate < GROUNDED_THRESHOLD;
    let grounding_score = calculate_grounding_score(response, retrieved_docs);
    let recall = calculate_recall(retrieved_docs);
    let coverage_score = calculate_coverage(query, response);

    let sources_cited = count_source_usage(response, retrieved_docs);
    let total_sources = retrieved_docs.len();
    let citation_rate = if total_sources > 0 {
        round3(sources_cited as f64 / total_sources as f64)
    } else {
        0.0
    };

    let quality_score = round3(
        recall.recall_at_5 * 0.4
            + ((1.0 - hallucination_rate) + grounding_score) / 2.0 * 0.4
            + coverage_score * 0.2,
    );

    info!(
        quality = quality_score,
        hallucination = hallucination_rate,
        recall_at_5 = recall.recall_at_5,
        "evaluation complete"
    );

    EvaluationMetrics {
        hallucination_rate,
        is_grounded,
        grounding_score,
        avg_similarity: recall.avg_similarity,
        max_similarity: recall.max_similarity,
        min_similarity: recall.min_similarity,
        recall_at_5: recall.recall_at_5,
        recall_at_3: recall.recall_at_3,
        coverage_score,
        sources_cited,
        total_sources,
        citation_rate,
        quality_score,
    }
}

/// Measure the fraction of substantive response sentences that are not
/// supported by the retrieved sources.
///
/// 1.0 with no response or no evidence; 0.0 with no substantive sentences.
fn detect_hallucination(response: &str, retrieved_docs: &[RetrievedDocument]) -> f64 {
    if response.is_empty() || retrieved_docs.is_empty() {
        return 1.0;
    }

    let sentences = split_into_sentences(response);
    if sentences.is_empty() {
        return 0.0;
    }

    let source_text = combined_source_text(retrieved_docs);
    let source_lower = source_text.to_lowercase();

    // Sentences under 3 words (greetings and the like) are non-substantive.
    let substantive: Vec<&str> = sentences
        .iter()
        .map(String::as_str)
        .filter(|s| s.split_whitespace().count() >= 3)
        .collect();
    if substantive.is_empty() {
        return 0.0;
    }

    let grounded = substantive.iter().filter(|s| is_grounded_in_sources(s, &source_lower)).count();

    round3(1.0 - grounded as f64 / substantive.len() as f64)
}

/// Fraction of the response's key phrases found as case-insensitive
/// substrings of the combined source text.
///
/// 0.5 (neutral) if no phrases could be extracted; 0.0 with no response or
/// no evidence.
fn calculate_grounding_score(response: &str, retrieved_docs: &[RetrievedDocument]) -> f64 {
    if response.is_empty() || retrieved_docs.is_empty() {
        return 0.0;
    }

    let source_lower = combined_source_text(retrieved_docs).to_lowercase();
    let phrases = extract_key_phrases(response);
    if phrases.is_empty() {
        return 0.5;
    }

    let grounded =
        phrases.iter().filter(|phrase| source_lower.contains(&phrase.to_lowercase())).count();

    round3(grounded as f64 / phrases.len() as f64)
}

/// Retrieval-side recall metrics, using `1 - distance` as a relevance proxy.
struct RecallMetrics {
    avg_similarity: f64,
    max_similarity: f64,
    min_similarity: f64,
    recall_at_5: f64,
    recall_at_3: f64,
}

fn calculate_recall(retrieved_docs: &[RetrievedDocument]) -> RecallMetrics {
    if retrieved_docs.is_empty() {
        return RecallMetrics {
            avg_similarity: 0.0,
            max_similarity: 0.0,
            min_similarity: 0.0,
            recall_at_5: 0.0,
            recall_at_3: 0.0,
        };
    }

    let similarities: Vec<f64> =
        retrieved_docs.iter().map(|doc| f64::from(doc.similarity())).collect();

    info!(
        similarities = ?similarities.iter().map(|s| round3(*s)).collect::<Vec<_>>(),
        "retrieval trace"
    );

    let n = similarities.len();
    let avg = similarities.iter().sum::<f64>() / n as f64;
    let max = similarities.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let min = similarities.iter().copied().fold(f64::INFINITY, f64::min);

    let recall_at = |k: usize| {
        let relevant =
            similarities.iter().take(k).filter(|&&sim| sim >= RELEVANT_SIMILARITY).count();
        round3(relevant as f64 / k.min(n) as f64)
    };

    RecallMetrics {
        avg_similarity: round3(avg),
        max_similarity: round3(max),
        min_similarity: round3(min),
        recall_at_5: recall_at(5),
        recall_at_3: recall_at(3),
    }
}

/// Fraction of the query's filtered key terms that appear in the response.
///
/// 0.5 if no query terms survive stop-word filtering; 0.0 if query or
/// response is empty.
fn calculate_coverage(query: &str, response: &str) -> f64 {
    if query.is_empty() || response.is_empty() {
        return 0.0;
    }

    let terms = extract_query_terms(query);
    if terms.is_empty() {
        return 0.5;
    }

    let response_lower = response.to_lowercase();
    let covered = terms.iter().filter(|term| response_lower.contains(term.as_str())).count();

    round3(covered as f64 / terms.len() as f64)
}

/// Count how many retrieved documents contributed at least one phrase to
/// the response.
fn count_source_usage(response: &str, retrieved_docs: &[RetrievedDocument]) -> usize {
    if retrieved_docs.is_empty() {
        return 0;
    }

    let response_lower = response.to_lowercase();

    retrieved_docs
        .iter()
        .filter(|doc| {
            extract_key_phrases(&doc.text)
                .iter()
                .take(5)
                .any(|phrase| {
                    phrase.chars().count() > 10 && response_lower.contains(&phrase.to_lowercase())
                })
        })
        .count()
}

// Helpers

fn combined_source_text(retrieved_docs: &[RetrievedDocument]) -> String {
    retrieved_docs.iter().map(|doc| doc.text.as_str()).collect::<Vec<_>>().join(" ")
}

/// Split text into sentences on runs of `.`, `!`, `?`.
fn split_into_sentences(text: &str) -> Vec<String> {
    text.split(['.', '!', '?'])
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

/// Three-tier fuzzy groundedness check for a single sentence.
///
/// Tier 1: the whole sentence appears in the sources. Tier 2: any contiguous
/// 4-word or 3-word window (over words longer than 2 characters) appears
/// verbatim. Tier 3: at least 40% of the sentence's unique long words appear
/// somewhere in the sources.
fn is_grounded_in_sources(sentence: &str, source_lower: &str) -> bool {
    let sentence_lower = sentence.to_lowercase();

    if source_lower.contains(&sentence_lower) {
        return true;
    }

    let words: Vec<&str> =
        sentence_lower.split_whitespace().filter(|w| w.chars().count() > 2).collect();
    if words.len() < 3 {
        // Too short to evaluate meaningfully.
        return true;
    }

    for window_size in [4, 3] {
        if words.len() >= window_size {
            for window in words.windows(window_size) {
                if source_lower.contains(&window.join(" ")) {
                    return true;
                }
            }
        }
    }

    let unique_words: HashSet<&str> = words.iter().copied().collect();
    let source_words: HashSet<&str> =
        WORD_RE.find_iter(source_lower).map(|m| m.as_str()).collect();
    let matches = unique_words.iter().filter(|w| source_words.contains(**w)).count();

    matches as f64 / unique_words.len() as f64 >= KEYWORD_DENSITY_THRESHOLD
}

/// Extract candidate key phrases: contiguous 4-gram and 3-gram word windows
/// longer than 10 characters, capped at 20 phrases.
fn extract_key_phrases(text: &str) -> Vec<String> {
    let words: Vec<&str> = text.split_whitespace().collect();
    let mut phrases = Vec::new();

    for gram_size in [4, 3] {
        if words.len() >= gram_size {
            for window in words.windows(gram_size) {
                let phrase = window.join(" ");
                if phrase.chars().count() > 10 {
                    phrases.push(phrase);
                }
            }
        }
    }

    phrases.truncate(MAX_KEY_PHRASES);
    phrases
}

/// Lower-case and tokenize the query, dropping stop words and words of 2
/// characters or fewer.
fn extract_query_terms(query: &str) -> Vec<String> {
    let query_lower = query.to_lowercase();
    WORD_RE
        .find_iter(&query_lower)
        .map(|m| m.as_str())
        .filter(|w| !STOP_WORDS.contains(w) && w.chars().count() > 2)
        .map(str::to_string)
        .collect()
}

fn round3(value: f64) -> f64 {
    (value * 1000.0).round() / 1000.0
}
