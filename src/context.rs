//! Context window assembly under a character budget.

use crate::document::RetrievedDocument;

/// Minimum leftover budget worth filling with a truncated block.
const MIN_TRUNCATION_BUDGET: usize = 100;

/// Pack retrieved documents into a single context string of at most
/// `max_chars` characters of block content.
///
/// Each document contributes a `"Source: {source}\n{text}\n"` block. Blocks
/// are appended greedily in input order (retrieval order, most similar
/// first) while the running character count stays within budget. When the
/// next block would overflow: if more than 100 characters of budget remain,
/// a truncated copy ending in `"..."` is appended; otherwise packing stops
/// without it. Blocks are joined with newline separators.
///
/// Greedy and order-preserving rather than optimal: earlier, more relevant
/// documents are always fully preferred over later ones. Budgets are counted
/// in characters, not bytes.
pub fn assemble_context(documents: &[RetrievedDocument], max_chars: usize) -> String {
    let mut parts: Vec<String> = Vec::new();
    let mut current_len = 0;

    for doc in documents {
        let block = format!("Source: {}\n{}\n", doc.metadata.source, doc.text);
        let block_len = block.chars().count();

        if current_len + block_len <= max_chars {
            current_len += block_len;
            parts.push(block);
        } else {
            let remaining = max_chars - current_len;
            if remaining > MIN_TRUNCATION_BUDGET {
                let truncated: String = block.chars().take(remaining - 3).collect();
                parts.push(format!("{truncated}..."));
            }
            break;
        }
    }

    parts.join("\n")
}
