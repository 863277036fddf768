use anyhow::Result;
use serde::{Deserialize, Serialize};

// Default value functions for serde
fn default_per_correct() -> i64 {
    5
}

fn default_per_incorrect() -> i64 {
    1
}

fn default_not_answered_markers() -> Vec<String> {
    vec!["not answered".to_string()]
}

fn default_sentinel() -> String {
    "--".to_string()
}

fn default_unknown_category() -> String {
    "Unknown".to_string()
}

fn default_question_no_selector() -> String {
    "lbl_QuestionNo".to_string()
}

fn default_answer_selector() -> String {
    "lbl_RAnswer".to_string()
}

fn default_student_name_selector() -> String {
    "lbl_Name".to_string()
}

fn default_application_no_selector() -> String {
    "lbl_AppNo".to_string()
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoringConfig {
    /// Marking scheme applied per category
    #[serde(default)]
    pub marking: MarkingConfig,
    /// Status substrings that mean the question was skipped.
    /// Matched case-insensitively against the free-text status field —
    /// the observed vocabulary is small ("Not Answered", "Marked for
    /// Review") so this stays configurable rather than hardcoded.
    #[serde(default = "default_not_answered_markers")]
    pub not_answered_markers: Vec<String>,
    /// Literal the response sheet prints when no option was selected
    #[serde(default = "default_sentinel")]
    pub no_selection_sentinel: String,
    /// Category label for rows with no matching key record
    #[serde(default = "default_unknown_category")]
    pub unknown_category: String,
    /// Markup node selectors for the answer-key pages
    #[serde(default)]
    pub selectors: SelectorConfig,
}

/// Fixed scoring rule: +per_correct for each correct answer,
/// -per_incorrect for each incorrect one, 0 for unattempted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MarkingConfig {
    #[serde(default = "default_per_correct")]
    pub per_correct: i64,
    #[serde(default = "default_per_incorrect")]
    pub per_incorrect: i64,
}

impl Default for MarkingConfig {
    fn default() -> Self {
        Self {
            per_correct: 5,
            per_incorrect: 1,
        }
    }
}

/// Substrings matched against the `id` attribute of markup nodes on the
/// answer-key pages. Node text is the field value.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SelectorConfig {
    /// Nodes carrying question ids, in document order
    #[serde(default = "default_question_no_selector")]
    pub question_no: String,
    /// Nodes carrying correct option ids, in document order
    #[serde(default = "default_answer_selector")]
    pub answer: String,
    /// Best-effort: candidate name node
    #[serde(default = "default_student_name_selector")]
    pub student_name: String,
    /// Best-effort: application number node
    #[serde(default = "default_application_no_selector")]
    pub application_no: String,
}

impl Default for SelectorConfig {
    fn default() -> Self {
        Self {
            question_no: default_question_no_selector(),
            answer: default_answer_selector(),
            student_name: default_student_name_selector(),
            application_no: default_application_no_selector(),
        }
    }
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            marking: MarkingConfig::default(),
            not_answered_markers: default_not_answered_markers(),
            no_selection_sentinel: default_sentinel(),
            unknown_category: default_unknown_category(),
            selectors: SelectorConfig::default(),
        }
    }
}

impl ScoringConfig {
    /// Load config from file path (functional approach)
    pub fn load_from_file(path: &str) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: ScoringConfig = serde_yaml::from_str(&content)?;
        Ok(config)
    }

    /// Load config with fallback to default
    pub fn load_with_fallback(path: Option<&str>) -> Self {
        match path {
            Some(p) => Self::load_from_file(p).unwrap_or_else(|_| {
                eprintln!("⚠️  Failed to load config from {}, using defaults", p);
                Self::default()
            }),
            None => Self::default(),
        }
    }

    /// True when the free-text status marks the question as skipped
    pub fn status_means_not_answered(&self, status: &str) -> bool {
        let status = status.to_lowercase();
        self.not_answered_markers
            .iter()
            .any(|marker| status.contains(&marker.to_lowercase()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_marking_matches_exam_rule() {
        let config = ScoringConfig::default();
        assert_eq!(config.marking.per_correct, 5);
        assert_eq!(config.marking.per_incorrect, 1);
        assert_eq!(config.no_selection_sentinel, "--");
        assert_eq!(config.unknown_category, "Unknown");
    }

    #[test]
    fn status_matching_is_case_insensitive() {
        let config = ScoringConfig::default();
        assert!(config.status_means_not_answered("Not Answered"));
        assert!(config.status_means_not_answered("NOT ANSWERED"));
        assert!(config.status_means_not_answered("Marked For Review and Not Answered"));
        assert!(!config.status_means_not_answered("Answered"));
    }

    #[test]
    fn partial_yaml_fills_defaults() {
        let yaml = r#"
marking:
  per_correct: 4
"#;
        let config: ScoringConfig = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(config.marking.per_correct, 4);
        // Everything unspecified falls back to defaults
        assert_eq!(config.marking.per_incorrect, 1);
        assert_eq!(config.selectors.question_no, "lbl_QuestionNo");
        assert_eq!(config.not_answered_markers, vec!["not answered"]);
    }

    #[test]
    fn custom_marker_vocabulary() {
        let yaml = r#"
not_answered_markers:
  - "not answered"
  - "not attempted"
"#;
        let config: ScoringConfig = serde_yaml::from_str(yaml).unwrap();
        assert!(config.status_means_not_answered("Not Attempted"));
    }
}
