//! Answer-key page scanner
//!
//! Official result pages carry question numbers and correct option ids in
//! markup nodes whose `id` attribute embeds a recognizable label substring
//! (`lbl_QuestionNo`, `lbl_RAnswer` on the observed pages). The scanner is
//! selector-driven — the substrings come from config — and pairs the i-th
//! question node with the i-th answer node by document position.

use crate::config::ScoringConfig;
use crate::types::{KeyExtraction, KeyRecord, KeyStats, StudentInfo};
use anyhow::Result;
use regex::Regex;
use std::path::Path;

/// Compiles its node patterns once up front from the configured selectors.
pub struct AnswerKeyExtractor {
    question_no: Regex,
    answer: Regex,
    student_name: Regex,
    application_no: Regex,
    unknown_category: String,
}

// Any element whose id attribute contains the selector substring; the
// capture is the node's direct text content up to the next tag.
fn node_pattern(selector: &str) -> Result<Regex> {
    let pattern = format!(
        r#"(?is)<[a-z][a-z0-9]*\b[^>]*\bid\s*=\s*"[^"]*{}[^"]*"[^>]*>([^<]*)<"#,
        regex::escape(selector)
    );
    Ok(Regex::new(&pattern)?)
}

impl AnswerKeyExtractor {
    pub fn new(config: &ScoringConfig) -> Result<Self> {
        let selectors = &config.selectors;
        Ok(Self {
            question_no: node_pattern(&selectors.question_no)?,
            answer: node_pattern(&selectors.answer)?,
            student_name: node_pattern(&selectors.student_name)?,
            application_no: node_pattern(&selectors.application_no)?,
            unknown_category: config.unknown_category.clone(),
        })
    }

    /// Extract key records from one page. `source` names the document and
    /// supplies the category (its file stem).
    pub fn extract_document(
        &self,
        html: &str,
        source: &Path,
        stats: &mut KeyStats,
    ) -> Vec<KeyRecord> {
        let category = self.category_from_source(source);

        let question_ids = node_texts(&self.question_no, html);
        let answers = node_texts(&self.answer, html);
        stats.documents += 1;

        if question_ids.len() != answers.len() {
            println!(
                "⚠️  Node count mismatch in {}: {} question ids vs {} answers",
                source.display(),
                question_ids.len(),
                answers.len()
            );
            stats.surplus_dropped += question_ids.len().abs_diff(answers.len());
        }

        let mut records = Vec::with_capacity(question_ids.len().min(answers.len()));
        for (question_id, correct_option_id) in question_ids.into_iter().zip(answers) {
            stats.pairs += 1;
            if question_id.is_empty() || correct_option_id.is_empty() || category.is_empty() {
                stats.skipped_empty += 1;
                continue;
            }
            records.push(KeyRecord {
                question_id,
                correct_option_id,
                category: category.clone(),
            });
        }
        records
    }

    /// Extract across a set of pages, accumulating records in document
    /// order and picking up student metadata from the first page that
    /// carries it.
    pub fn extract_all<'a>(
        &self,
        documents: impl IntoIterator<Item = (&'a Path, &'a str)>,
    ) -> KeyExtraction {
        let mut extraction = KeyExtraction::default();
        for (source, html) in documents {
            let records = self.extract_document(html, source, &mut extraction.stats);
            println!(
                "✅ Extracted {} Q&A pairs from {}",
                records.len(),
                source.display()
            );
            extraction.records.extend(records);
            if extraction.student.is_none() {
                extraction.student = self.extract_student(html);
            }
        }
        extraction
    }

    /// Best-effort candidate metadata; absent unless both fields are found.
    pub fn extract_student(&self, html: &str) -> Option<StudentInfo> {
        let name = first_node_text(&self.student_name, html)?;
        let application_no = first_node_text(&self.application_no, html)?;
        Some(StudentInfo {
            name,
            application_no,
        })
    }

    /// Derive the grouping label from the document identifier: the file
    /// stem, whatever the extension. Undeterminable stems fall back to
    /// the configured unknown label.
    pub fn category_from_source(&self, source: &Path) -> String {
        source
            .file_stem()
            .and_then(|s| s.to_str())
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .unwrap_or_else(|| self.unknown_category.clone())
    }
}

fn node_texts(pattern: &Regex, html: &str) -> Vec<String> {
    pattern
        .captures_iter(html)
        .map(|cap| cap[1].trim().to_string())
        .collect()
}

fn first_node_text(pattern: &Regex, html: &str) -> Option<String> {
    pattern
        .captures(html)
        .map(|cap| cap[1].trim().to_string())
        .filter(|text| !text.is_empty())
}
