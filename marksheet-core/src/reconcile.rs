//! Reconciliation engine
//!
//! Left-joins the candidate's responses onto the official key by question
//! id, derives the correct option's ordinal position, classifies each
//! response, and aggregates per-category tallies under the marking scheme.

use crate::config::ScoringConfig;
use crate::types::{CategorySummary, ComparisonRow, KeyRecord, ResponseRecord, Verdict};
use std::collections::{BTreeMap, HashMap};

/// Left (outer) join of responses onto key records by trimmed question id.
///
/// Every response yields exactly one row whether or not a key matched; an
/// unmatched row gets the configured unknown category and no derivable
/// correct option. On duplicate key ids the first occurrence wins.
pub fn reconcile(
    responses: &[ResponseRecord],
    keys: &[KeyRecord],
    config: &ScoringConfig,
) -> Vec<ComparisonRow> {
    let mut by_question: HashMap<&str, &KeyRecord> = HashMap::new();
    for key in keys {
        by_question.entry(key.question_id.trim()).or_insert(key);
    }

    responses
        .iter()
        .map(|response| {
            let matched = by_question.get(response.question_id.trim()).copied();
            let correct_option_id = matched.map(|k| k.correct_option_id.trim().to_string());
            let category = matched
                .map(|k| k.category.clone())
                .unwrap_or_else(|| config.unknown_category.clone());
            let correct_option_number = correct_option_id
                .as_deref()
                .and_then(|correct| correct_option_number(&response.option_ids, correct));
            let verdict = classify(response, correct_option_number, config);

            ComparisonRow {
                question_id: response.question_id.clone(),
                option_ids: response.option_ids.clone(),
                status: response.status.clone(),
                chosen_option_id: response.chosen_option_id.clone(),
                correct_option_id,
                category,
                correct_option_number,
                verdict,
            }
        })
        .collect()
}

// First position 1→4 whose option id equals the official correct id.
fn correct_option_number(option_ids: &[String; 4], correct_option_id: &str) -> Option<u8> {
    option_ids
        .iter()
        .position(|id| id.trim() == correct_option_id)
        .map(|index| (index + 1) as u8)
}

// Ternary classification, evaluated in priority order: the skip signals
// win over everything, then an ungradeable row (no derivable correct
// option) stays out of both tallies.
fn classify(
    response: &ResponseRecord,
    correct_option_number: Option<u8>,
    config: &ScoringConfig,
) -> Verdict {
    let chosen = response.chosen_option_id.trim();
    if config.status_means_not_answered(&response.status)
        || chosen.contains(&config.no_selection_sentinel)
        || chosen.is_empty()
    {
        return Verdict::NotApplicable;
    }

    let Some(correct) = correct_option_number else {
        return Verdict::NotApplicable;
    };

    if chosen == correct.to_string() {
        Verdict::Correct
    } else {
        Verdict::Incorrect
    }
}

/// Group rows by category and compute the tallies. BTreeMap keeps the
/// category order sorted, so identical inputs always summarize
/// identically.
pub fn summarize(rows: &[ComparisonRow], config: &ScoringConfig) -> Vec<CategorySummary> {
    #[derive(Default)]
    struct Tally {
        total: usize,
        correct: usize,
        incorrect: usize,
    }

    let mut groups: BTreeMap<&str, Tally> = BTreeMap::new();
    for row in rows {
        let tally = groups.entry(row.category.as_str()).or_default();
        tally.total += 1;
        match row.verdict {
            Verdict::Correct => tally.correct += 1,
            Verdict::Incorrect => tally.incorrect += 1,
            Verdict::NotApplicable => {}
        }
    }

    groups
        .into_iter()
        .map(|(category, tally)| {
            let attempted = tally.correct + tally.incorrect;
            CategorySummary {
                category: category.to_string(),
                total: tally.total,
                attempted,
                correct: tally.correct,
                incorrect: tally.incorrect,
                not_answered: tally.total - attempted,
                score: tally.correct as i64 * config.marking.per_correct
                    - tally.incorrect as i64 * config.marking.per_incorrect,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn response(
        question_id: &str,
        option_ids: [&str; 4],
        status: &str,
        chosen: &str,
    ) -> ResponseRecord {
        ResponseRecord {
            question_id: question_id.to_string(),
            option_ids: option_ids.map(str::to_string),
            status: status.to_string(),
            chosen_option_id: chosen.to_string(),
        }
    }

    fn key(question_id: &str, correct: &str, category: &str) -> KeyRecord {
        KeyRecord {
            question_id: question_id.to_string(),
            correct_option_id: correct.to_string(),
            category: category.to_string(),
        }
    }

    #[test]
    fn chosen_option_matching_correct_position_is_correct() {
        let config = ScoringConfig::default();
        let responses = [response("101", ["5", "6", "7", "8"], "Answered", "2")];
        let keys = [key("101", "6", "Physics")];

        let rows = reconcile(&responses, &keys, &config);
        assert_eq!(rows[0].correct_option_number, Some(2));
        assert_eq!(rows[0].verdict, Verdict::Correct);
        assert_eq!(rows[0].category, "Physics");
    }

    #[test]
    fn chosen_option_differing_from_correct_position_is_incorrect() {
        let config = ScoringConfig::default();
        let responses = [response("102", ["1", "2", "3", "4"], "Answered", "1")];
        let keys = [key("102", "3", "Physics")];

        let rows = reconcile(&responses, &keys, &config);
        assert_eq!(rows[0].correct_option_number, Some(3));
        assert_eq!(rows[0].verdict, Verdict::Incorrect);
    }

    #[test]
    fn skip_signals_win_regardless_of_option_values() {
        let config = ScoringConfig::default();
        let keys = [key("103", "1", "Physics")];

        for chosen in ["--", ""] {
            let responses = [response("103", ["1", "2", "3", "4"], "Answered", chosen)];
            let rows = reconcile(&responses, &keys, &config);
            assert_eq!(rows[0].verdict, Verdict::NotApplicable, "chosen={chosen:?}");
        }

        let responses = [response("103", ["1", "2", "3", "4"], "Not Answered", "--")];
        let rows = reconcile(&responses, &keys, &config);
        assert_eq!(rows[0].verdict, Verdict::NotApplicable);
    }

    #[test]
    fn unmatched_response_still_produces_a_row() {
        let config = ScoringConfig::default();
        let responses = [response("999", ["1", "2", "3", "4"], "Answered", "2")];

        let rows = reconcile(&responses, &[], &config);
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].category, "Unknown");
        assert_eq!(rows[0].correct_option_id, None);
        assert_eq!(rows[0].correct_option_number, None);
        // No correct option derivable — not gradeable either way
        assert_eq!(rows[0].verdict, Verdict::NotApplicable);
    }

    #[test]
    fn key_without_matching_option_id_is_not_gradeable() {
        let config = ScoringConfig::default();
        let responses = [response("104", ["1", "2", "3", "4"], "Answered", "2")];
        let keys = [key("104", "77", "Physics")];

        let rows = reconcile(&responses, &keys, &config);
        assert_eq!(rows[0].correct_option_number, None);
        assert_eq!(rows[0].verdict, Verdict::NotApplicable);
    }

    #[test]
    fn join_compares_trimmed_ids() {
        let config = ScoringConfig::default();
        let responses = [response(" 101 ", ["5", "6", "7", "8"], "Answered", "2")];
        let keys = [key("101", " 6 ", "Physics")];

        let rows = reconcile(&responses, &keys, &config);
        assert_eq!(rows[0].verdict, Verdict::Correct);
    }

    #[test]
    fn duplicate_key_ids_first_occurrence_wins() {
        let config = ScoringConfig::default();
        let responses = [response("101", ["5", "6", "7", "8"], "Answered", "2")];
        let keys = [key("101", "6", "Physics"), key("101", "5", "Chemistry")];

        let rows = reconcile(&responses, &keys, &config);
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].category, "Physics");
        assert_eq!(rows[0].verdict, Verdict::Correct);
    }

    #[test]
    fn join_is_complete_for_every_response() {
        let config = ScoringConfig::default();
        let responses: Vec<_> = (0..10)
            .map(|i| response(&format!("{i}"), ["1", "2", "3", "4"], "Answered", "1"))
            .collect();
        let keys = [key("3", "1", "Maths")];

        let rows = reconcile(&responses, &keys, &config);
        assert_eq!(rows.len(), responses.len());
    }

    #[test]
    fn summary_matches_scoring_formula_and_conservation() {
        let config = ScoringConfig::default();
        // One category: 2 correct, 1 incorrect, 1 not answered
        let responses = [
            response("1", ["11", "12", "13", "14"], "Answered", "1"),
            response("2", ["21", "22", "23", "24"], "Answered", "2"),
            response("3", ["31", "32", "33", "34"], "Answered", "3"),
            response("4", ["41", "42", "43", "44"], "Not Answered", "--"),
        ];
        let keys = [
            key("1", "11", "Physics"),
            key("2", "22", "Physics"),
            key("3", "31", "Physics"),
            key("4", "44", "Physics"),
        ];

        let rows = reconcile(&responses, &keys, &config);
        let summary = summarize(&rows, &config);
        assert_eq!(summary.len(), 1);
        let physics = &summary[0];
        assert_eq!(physics.total, 4);
        assert_eq!(physics.attempted, 3);
        assert_eq!(physics.correct, 2);
        assert_eq!(physics.incorrect, 1);
        assert_eq!(physics.not_answered, 1);
        assert_eq!(physics.score, 2 * 5 - 1);
        // Conservation invariants
        assert_eq!(physics.total, physics.attempted + physics.not_answered);
        assert_eq!(physics.attempted, physics.correct + physics.incorrect);
    }

    #[test]
    fn summary_orders_categories_deterministically() {
        let config = ScoringConfig::default();
        let responses = [
            response("1", ["1", "2", "3", "4"], "Answered", "1"),
            response("2", ["1", "2", "3", "4"], "Answered", "1"),
            response("9", ["1", "2", "3", "4"], "Answered", "1"),
        ];
        let keys = [key("1", "1", "Physics"), key("2", "1", "Chemistry")];

        let summary = summarize(&reconcile(&responses, &keys, &config), &config);
        let categories: Vec<_> = summary.iter().map(|s| s.category.as_str()).collect();
        // Sorted, and the unmatched row's Unknown category is present
        assert_eq!(categories, ["Chemistry", "Physics", "Unknown"]);
    }

    #[test]
    fn reconciliation_is_idempotent() {
        let config = ScoringConfig::default();
        let responses = [
            response("1", ["11", "12", "13", "14"], "Answered", "2"),
            response("2", ["21", "22", "23", "24"], "Not Answered", "--"),
            response("3", ["31", "32", "33", "34"], "Answered", "4"),
        ];
        let keys = [key("1", "12", "Physics"), key("3", "31", "Chemistry")];

        let first_rows = reconcile(&responses, &keys, &config);
        let second_rows = reconcile(&responses, &keys, &config);
        let first: Vec<_> = first_rows.iter().map(|r| (r.category.clone(), r.verdict)).collect();
        let second: Vec<_> = second_rows.iter().map(|r| (r.category.clone(), r.verdict)).collect();
        assert_eq!(first, second);
        assert_eq!(summarize(&first_rows, &config), summarize(&second_rows, &config));
    }

    #[test]
    fn custom_marking_scheme_flows_into_score() {
        let mut config = ScoringConfig::default();
        config.marking.per_correct = 4;
        config.marking.per_incorrect = 2;

        let responses = [
            response("1", ["11", "12", "13", "14"], "Answered", "1"),
            response("2", ["21", "22", "23", "24"], "Answered", "1"),
        ];
        let keys = [key("1", "11", "Maths"), key("2", "22", "Maths")];

        let summary = summarize(&reconcile(&responses, &keys, &config), &config);
        assert_eq!(summary[0].score, 4 - 2);
    }
}
