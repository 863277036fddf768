//! Result emitter — terminal pipeline stage.
//!
//! Serializes the full comparison set for audit, assembles the report
//! structure, then purges the run's staging area. The purge is
//! unconditional cleanup on the success path, even when extraction
//! produced little or nothing.

use crate::staging::{self, RunContext};
use crate::types::{
    CategorySummary, ComparisonRow, ScoreReport, StudentInfo, REPORT_SCHEMA_VERSION,
};
use anyhow::Result;
use chrono::Utc;

pub fn emit(
    ctx: &RunContext,
    rows: &[ComparisonRow],
    student: Option<StudentInfo>,
    summary: Vec<CategorySummary>,
    purge: bool,
) -> Result<ScoreReport> {
    staging::write_table(&ctx.comparison_table(), rows)?;
    println!("✅ Comparison saved to: {}", ctx.comparison_table().display());

    print_summary(&summary);

    let report = ScoreReport {
        schema_version: REPORT_SCHEMA_VERSION.to_string(),
        generated_at: Utc::now(),
        student,
        summary,
    };

    if purge {
        println!("🧹 Cleaning up staged and intermediate files...");
        ctx.purge()?;
        println!("🧼 Cleanup complete.");
    }

    Ok(report)
}

fn print_summary(summary: &[CategorySummary]) {
    println!("\n📊 Summary by category:");
    for category in summary {
        println!("\n📚 {}", category.category);
        println!("   🧮 Total        : {}", category.total);
        println!("   ✏️  Attempted    : {}", category.attempted);
        println!("   ✅ Correct      : {}", category.correct);
        println!("   ❌ Incorrect    : {}", category.incorrect);
        println!("   🚫 Not Answered : {}", category.not_answered);
        println!("   🧾 Score        : {}", category.score);
    }
}
