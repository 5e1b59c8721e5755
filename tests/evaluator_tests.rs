//! Tests for the response evaluator.
//!
//! The groundedness heuristics are deliberately fuzzy, so assertions on
//! non-trivial text use tolerance bands rather than exact scores.

use gunner_rag::document::{ChunkMetadata, RetrievedDocument};
use gunner_rag::evaluate;
use proptest::prelude::*;

fn doc(text: &str, distance: f32) -> RetrievedDocument {
    RetrievedDocument {
        text: text.to_string(),
        metadata: ChunkMetadata {
            source: "kb.txt".to_string(),
            category: "history".to_string(),
            chunk_id: 0,
        },
        distance,
    }
}

#[test]
fn empty_inputs_produce_defined_fallbacks_without_panicking() {
    let metrics = evaluate("", "", &[]);

    assert_eq!(metrics.hallucination_rate, 1.0);
    assert!(!metrics.is_grounded);
    assert_eq!(metrics.grounding_score, 0.0);
    assert_eq!(metrics.avg_similarity, 0.0);
    assert_eq!(metrics.max_similarity, 0.0);
    assert_eq!(metrics.min_similarity, 0.0);
    assert_eq!(metrics.recall_at_5, 0.0);
    assert_eq!(metrics.recall_at_3, 0.0);
    assert_eq!(metrics.coverage_score, 0.0);
    assert_eq!(metrics.sources_cited, 0);
    assert_eq!(metrics.total_sources, 0);
    assert_eq!(metrics.citation_rate, 0.0);
    assert_eq!(metrics.quality_score, 0.0);
}

#[test]
fn response_without_evidence_counts_as_fully_hallucinated() {
    let metrics = evaluate("Who is the manager?", "Mikel Arteta is the manager.", &[]);
    assert_eq!(metrics.hallucination_rate, 1.0);
    assert_eq!(metrics.grounding_score, 0.0);
}

#[test]
fn response_with_only_short_sentences_is_not_penalized() {
    // Greetings and other sub-3-word sentences are non-substantive.
    let metrics = evaluate("Hello", "Hi! Thanks.", &[doc("Some club history text.", 0.5)]);
    assert_eq!(metrics.hallucination_rate, 0.0);
}

#[test]
fn grounded_answer_about_the_manager_is_detected() {
    let sources =
        vec![doc("Mikel Arteta has been Arsenal's manager since December 2019", 0.45)];
    let response = "Mikel Arteta is the manager of Arsenal, appointed in December 2019.";
    let metrics = evaluate("Who is Arsenal's manager?", response, &sources);

    assert!(metrics.hallucination_rate < 0.3);
    assert!(metrics.is_grounded);
    // "manager" is the only query term surviving stop-word filtering, and
    // the response covers it.
    assert_eq!(metrics.coverage_score, 1.0);
}

#[test]
fn verbatim_phrasing_scores_high_on_grounding() {
    let sources = vec![doc(
        "Mikel Arteta has been Arsenal's manager since December 2019 and leads the club.",
        0.4,
    )];
    let response = "Mikel Arteta has been Arsenal's manager since December 2019.";
    let metrics = evaluate("Who is Arsenal's manager?", response, &sources);

    assert!(metrics.grounding_score > 0.3);
    assert!(metrics.is_grounded);
}

#[test]
fn paraphrased_answer_scores_low_on_grounding() {
    let sources = vec![doc("The club plays its home games in north London.", 0.5)];
    let response = "Their ground is situated within the capital's northern districts.";
    let metrics = evaluate("Where do they play?", response, &sources);

    assert!(metrics.grounding_score < 0.3);
}

#[test]
fn citation_rate_counts_documents_echoed_in_the_response() {
    let sources = vec![
        doc("Arsenal won the Premier League title unbeaten in the Invincibles season", 0.3),
        doc("Thierry Henry scored 228 goals for the club across all competitions", 0.4),
        doc("The Emirates Stadium opened in July 2006 with capacity above sixty thousand", 0.5),
    ];
    let response = "Arsenal won the Premier League title unbeaten that season.";
    let metrics = evaluate("Tell me about the Invincibles", response, &sources);

    assert_eq!(metrics.sources_cited, 1);
    assert_eq!(metrics.total_sources, 3);
    assert_eq!(metrics.citation_rate, 0.333);
}

#[test]
fn recall_metrics_follow_the_similarity_threshold() {
    // Similarities: 0.9, 0.5, 0.1 — two of three clear the 0.3 threshold.
    let sources = vec![doc("a b c", 0.1), doc("d e f", 0.5), doc("g h i", 0.9)];
    let metrics = evaluate("query", "response", &sources);

    assert_eq!(metrics.max_similarity, 0.9);
    assert_eq!(metrics.min_similarity, 0.1);
    assert_eq!(metrics.avg_similarity, 0.5);
    assert_eq!(metrics.recall_at_3, 0.667);
    assert_eq!(metrics.recall_at_5, 0.667);
}

#[test]
fn recall_at_5_only_considers_the_first_five_documents() {
    let mut sources: Vec<RetrievedDocument> =
        (0..5).map(|_| doc("text", 0.2)).collect();
    // A sixth, irrelevant document must not dilute recall@5.
    sources.push(doc("text", 1.9));
    let metrics = evaluate("query", "response", &sources);

    assert_eq!(metrics.recall_at_5, 1.0);
}

#[test]
fn quality_score_weights_retrieval_grounding_and_coverage() {
    let sources =
        vec![doc("Mikel Arteta has been Arsenal's manager since December 2019 and leads the club.", 0.4)];
    let response = "Mikel Arteta has been Arsenal's manager since December 2019.";
    let metrics = evaluate("Who is Arsenal's manager?", response, &sources);

    let expected = metrics.recall_at_5 * 0.4
        + ((1.0 - metrics.hallucination_rate) + metrics.grounding_score) / 2.0 * 0.4
        + metrics.coverage_score * 0.2;
    assert!((metrics.quality_score - expected).abs() < 0.001);
}

#[test]
fn query_of_only_stop_words_yields_neutral_coverage() {
    let metrics = evaluate("Tell me about Arsenal", "Some answer text here.", &[doc("text", 0.5)]);
    assert_eq!(metrics.coverage_score, 0.5);
}

proptest! {
    /// All rate and score metrics stay in [0, 1] for arbitrary text inputs
    /// and in-range distances.
    #[test]
    fn scores_stay_within_unit_interval(
        query in ".{0,200}",
        response in ".{0,400}",
        texts in proptest::collection::vec(".{0,200}", 0..6),
        distances in proptest::collection::vec(0.0f32..=1.0f32, 0..6),
    ) {
        let sources: Vec<RetrievedDocument> = texts
            .iter()
            .zip(distances.iter().chain(std::iter::repeat(&0.5)))
            .map(|(text, &distance)| doc(text, distance))
            .collect();

        let metrics = evaluate(&query, &response, &sources);

        for value in [
            metrics.hallucination_rate,
            metrics.grounding_score,
            metrics.avg_similarity,
            metrics.max_similarity,
            metrics.min_similarity,
            metrics.recall_at_5,
            metrics.recall_at_3,
            metrics.coverage_score,
            metrics.citation_rate,
            metrics.quality_score,
        ] {
            prop_assert!((0.0..=1.0).contains(&value), "metric out of range: {value}");
        }
        prop_assert!(metrics.sources_cited <= metrics.total_sources);
    }

    /// Adding a perfect match (distance 0) never decreases average
    /// similarity.
    #[test]
    fn perfect_match_never_decreases_avg_similarity(
        distances in proptest::collection::vec(0.0f32..=2.0f32, 1..8),
    ) {
        let sources: Vec<RetrievedDocument> =
            distances.iter().map(|&d| doc("text", d)).collect();
        let before = evaluate("query", "response", &sources).avg_similarity;

        let mut extended = sources;
        extended.push(doc("text", 0.0));
        let after = evaluate("query", "response", &extended).avg_similarity;

        prop_assert!(after >= before);
    }
}
