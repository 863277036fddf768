use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// The schema version stamped on every emitted report.
/// Bump this when the output shape changes.
pub const REPORT_SCHEMA_VERSION: &str = "0.1.0";

/// One question as recorded on the candidate's response sheet.
/// Created during extraction from one PDF's text stream; immutable after.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResponseRecord {
    #[serde(rename = "Question ID")]
    pub question_id: String,
    /// The four option identifiers in presentation order. Position encodes
    /// the option number 1–4; the ids themselves carry no ordering.
    #[serde(rename = "Option IDs")]
    pub option_ids: [String; 4],
    /// Free-text attempt status, e.g. "Answered" or "Not Answered".
    #[serde(rename = "Status")]
    pub status: String,
    /// Option id the candidate selected, or the no-selection sentinel.
    #[serde(rename = "Chosen Option")]
    pub chosen_option_id: String,
}

/// One question from an official answer-key page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyRecord {
    #[serde(rename = "Question ID")]
    pub question_id: String,
    #[serde(rename = "Correct Option ID")]
    pub correct_option_id: String,
    /// Grouping label (typically a subject) derived from the source
    /// document's file stem.
    #[serde(rename = "Category")]
    pub category: String,
}

/// Ternary outcome of comparing one response against the key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Verdict {
    Correct,
    Incorrect,
    /// Not genuinely attempted — excluded from both the correct and
    /// incorrect tallies and from the attempted count.
    NotApplicable,
}

impl Verdict {
    pub fn is_attempted(&self) -> bool {
        !matches!(self, Verdict::NotApplicable)
    }
}

/// Left join of a ResponseRecord with its KeyRecord, plus derived fields.
/// Every response produces exactly one row, matched or not.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComparisonRow {
    pub question_id: String,
    pub option_ids: [String; 4],
    pub status: String,
    pub chosen_option_id: String,
    /// Absent when no key record matched this question id.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub correct_option_id: Option<String>,
    pub category: String,
    /// Ordinal position (1–4) of the option whose id equals the official
    /// correct option id. Absent when none match or the row is unmatched.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub correct_option_number: Option<u8>,
    pub verdict: Verdict,
}

/// Per-category tallies under the marking scheme.
/// Invariants: total = attempted + not_answered, attempted = correct + incorrect.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategorySummary {
    pub category: String,
    pub total: usize,
    pub attempted: usize,
    pub correct: usize,
    pub incorrect: usize,
    pub not_answered: usize,
    pub score: i64,
}

/// Best-effort candidate metadata scraped from the answer-key pages.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StudentInfo {
    pub name: String,
    pub application_no: String,
}

/// The emitted result structure. Carries a schema version so consumers
/// can detect and handle shape changes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoreReport {
    pub schema_version: String,
    pub generated_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub student: Option<StudentInfo>,
    pub summary: Vec<CategorySummary>,
}

// ===== EXTRACTION OUTPUTS =====
// Each extractor returns its records together with diagnostic counters.
// Partial extraction is counted here, never raised as an error.

/// Output of the response extractor across all staged response sheets.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ResponseExtraction {
    pub records: Vec<ResponseRecord>,
    pub stats: ResponseStats,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct ResponseStats {
    /// Documents scanned.
    pub documents: usize,
    /// Seven-field blocks matched across all documents.
    pub blocks: usize,
}

/// Output of the answer-key extractor across all staged key pages.
#[derive(Debug, Clone, Default, Serialize)]
pub struct KeyExtraction {
    pub records: Vec<KeyRecord>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub student: Option<StudentInfo>,
    pub stats: KeyStats,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct KeyStats {
    pub documents: usize,
    /// Question/answer node pairs successfully paired by position.
    pub pairs: usize,
    /// Surplus nodes dropped when the two node lists differed in length.
    pub surplus_dropped: usize,
    /// Paired rows excluded because a field trimmed to empty.
    pub skipped_empty: usize,
}
