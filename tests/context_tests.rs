//! Tests for context assembly under a character budget.

use gunner_rag::assemble_context;
use gunner_rag::document::{ChunkMetadata, RetrievedDocument};

fn doc(source: &str, text: &str, distance: f32) -> RetrievedDocument {
    RetrievedDocument {
        text: text.to_string(),
        metadata: ChunkMetadata {
            source: source.to_string(),
            category: "history".to_string(),
            chunk_id: 0,
        },
        distance,
    }
}

/// Block layout is `"Source: {source}\n{text}\n"`, so a source named
/// `"a.txt"` adds 15 characters of framing around the text.
fn block_len(source: &str, text: &str) -> usize {
    format!("Source: {source}\n{text}\n").chars().count()
}

#[test]
fn empty_input_yields_empty_context() {
    assert_eq!(assemble_context(&[], 4000), "");
}

#[test]
fn documents_within_budget_are_all_included() {
    let docs = vec![doc("a.txt", "Arsenal won the league.", 0.1), doc("b.txt", "Founded in 1886.", 0.2)];
    let context = assemble_context(&docs, 4000);

    assert!(context.contains("Source: a.txt\nArsenal won the league.\n"));
    assert!(context.contains("Source: b.txt\nFounded in 1886.\n"));
    // Retrieval order is preserved.
    assert!(context.find("a.txt").unwrap() < context.find("b.txt").unwrap());
}

#[test]
fn overflowing_block_is_truncated_with_ellipsis_when_budget_is_meaningful() {
    let text = "x".repeat(300);
    let docs = vec![doc("a.txt", &text, 0.1)];

    let max_chars = 200;
    assert!(block_len("a.txt", &text) > max_chars);

    let context = assemble_context(&docs, max_chars);
    assert_eq!(context.chars().count(), max_chars);
    assert!(context.ends_with("..."));
    assert!(context.starts_with("Source: a.txt\n"));
}

#[test]
fn overflowing_block_is_dropped_when_remaining_budget_is_small() {
    let text = "x".repeat(300);
    let docs = vec![doc("a.txt", &text, 0.1)];

    // 100 characters or fewer of leftover budget is not worth filling.
    assert_eq!(assemble_context(&docs, 50), "");
    assert_eq!(assemble_context(&docs, 100), "");
}

#[test]
fn earlier_documents_are_fully_preferred_over_later_ones() {
    let first_text = "a".repeat(131);
    let second_text = "b".repeat(200);
    let docs =
        vec![doc("first.txt", &first_text, 0.1), doc("second.txt", &second_text, 0.2)];

    // First block is 150 chars and fits; 50 chars remain, so the second
    // block is dropped entirely.
    assert_eq!(block_len("first.txt", &first_text), 150);
    let context = assemble_context(&docs, 200);

    assert!(context.contains(&first_text));
    assert!(!context.contains('b'));
}

#[test]
fn second_block_is_truncated_when_meaningful_budget_remains() {
    let first_text = "a".repeat(131);
    let second_text = "b".repeat(400);
    let docs =
        vec![doc("first.txt", &first_text, 0.1), doc("second.txt", &second_text, 0.2)];

    // 150 chars used, 250 remain: the second block arrives truncated.
    let context = assemble_context(&docs, 400);

    assert!(context.contains(&first_text));
    assert!(context.contains("Source: second.txt"));
    assert!(context.ends_with("..."));
}
