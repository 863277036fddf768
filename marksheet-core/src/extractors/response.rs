//! Response-sheet block scanner
//!
//! Response sheets dump as repeating blocks of seven labeled fields:
//! Question ID, Option 1–4 ID, Status, Chosen Option. The scanner matches
//! whole blocks at once over the concatenated page text, so a block
//! truncated at a document boundary simply fails to match and is dropped
//! without an error.

use crate::types::{ResponseExtraction, ResponseRecord};
use regex::Regex;
use std::sync::LazyLock;

// Labels may carry an optional ASCII or full-width colon before the value.
// The whole pattern runs case-insensitive with dot-matches-newline because
// the status value can span lines between its label and the next one.
static QUESTION_BLOCK_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(concat!(
        r"(?is)",
        r"Question\s+ID\s*[:：]?\s*(\d+)\s*",
        r"Option\s+1\s+ID\s*[:：]?\s*(\d+)\s*",
        r"Option\s+2\s+ID\s*[:：]?\s*(\d+)\s*",
        r"Option\s+3\s+ID\s*[:：]?\s*(\d+)\s*",
        r"Option\s+4\s+ID\s*[:：]?\s*(\d+)\s*",
        r"Status\s*[:：]?\s*(.*?)\s*",
        r"Chosen\s+Option\s*[:：]?\s*(\d+|--)",
    ))
    .unwrap()
});

/// Scan one document's concatenated page text for question blocks.
///
/// All non-overlapping matches are extracted in the order they occur.
/// That order is an artifact of extraction, not a guarantee.
pub fn extract_question_blocks(full_text: &str) -> Vec<ResponseRecord> {
    QUESTION_BLOCK_REGEX
        .captures_iter(full_text)
        .map(|cap| ResponseRecord {
            question_id: cap[1].to_string(),
            option_ids: [
                cap[2].to_string(),
                cap[3].to_string(),
                cap[4].to_string(),
                cap[5].to_string(),
            ],
            status: collapse_whitespace(&cap[6]),
            chosen_option_id: cap[7].to_string(),
        })
        .collect()
}

/// Scan several documents belonging to the same candidate, accumulating
/// records and counters in document order.
pub fn extract_all<'a>(texts: impl IntoIterator<Item = &'a str>) -> ResponseExtraction {
    let mut extraction = ResponseExtraction::default();
    for text in texts {
        let records = extract_question_blocks(text);
        extraction.stats.documents += 1;
        extraction.stats.blocks += records.len();
        extraction.records.extend(records);
    }
    extraction
}

// Status values wrap across lines in the dump; fold all inner whitespace
// to single spaces and drop the ends.
fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}
