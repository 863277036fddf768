use anyhow::Result;
use clap::Parser;
use std::path::Path;

use marksheet_core::{RunContext, ScorePipeline, ScoreStages, ScoringConfig};

#[derive(Parser)]
#[command(name = "marksheet")]
#[command(about = "Score a multiple-choice exam attempt from response sheets and answer-key pages")]
struct Args {
    /// Staging directory holding this candidate's response PDFs/text dumps
    /// and answer-key HTML pages
    #[arg(short, long, default_value = "uploads")]
    staging: String,

    /// Path to custom config file (YAML format)
    #[arg(short, long)]
    config: Option<String>,

    /// Report output path (printed to stdout if not specified)
    #[arg(short, long)]
    output: Option<String>,

    /// Show available config options and exit
    #[arg(long)]
    show_configs: bool,

    /// Keep the staging area instead of purging it (for debugging)
    #[arg(long)]
    keep_staging: bool,

    /// Dump all pipeline stage outputs to a directory
    /// Captures: responses, answer key, comparison rows, and final report
    #[arg(long)]
    dump_stages: bool,

    /// Directory for stage dump output
    #[arg(long, default_value = "test_outputs/stages")]
    stages_dir: String,

    /// Enable detailed profiling of all pipeline steps
    #[arg(long)]
    profile: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();

    println!("🦀 Marksheet Exam Scorer");

    if args.show_configs {
        show_help();
        return Ok(());
    }

    if !Path::new(&args.staging).exists() {
        println!("⚠️  Staging directory not found at: {}", args.staging);
        println!("   Stage the response sheets and answer-key pages there first.");
        return Ok(());
    }

    let config = ScoringConfig::load_with_fallback(args.config.as_deref());
    if let Some(config_path) = &args.config {
        println!("📋 Loaded config from: {}", config_path);
    } else {
        println!("📋 Using default config");
    }

    let pipeline = ScorePipeline::new(config)?;
    let ctx = RunContext::open(&args.staging)?;
    println!("📄 Scoring staged run: {} ({})", args.staging, ctx.run_id());

    // Stage dump mode keeps the staging area so every boundary stays
    // inspectable on disk afterwards.
    let purge = !args.keep_staging && !args.dump_stages;

    match pipeline.run_with_options(&ctx, purge, args.profile) {
        Ok(stages) => {
            println!("✅ Successfully scored attempt");

            if args.dump_stages {
                save_stages(&stages, &args.stages_dir)?;
                println!("\n✅ All stages dumped to: {}", args.stages_dir);
            }

            let report_json = serde_json::to_string_pretty(&stages.report)?;
            match &args.output {
                Some(path) => {
                    std::fs::write(path, &report_json)?;
                    println!("💾 Report saved to: {}", path);
                }
                None => {
                    println!("\n📤 Final report:");
                    println!("{report_json}");
                }
            }
        }
        Err(e) => {
            eprintln!("❌ Scoring failed: {e}");
            std::process::exit(1);
        }
    }

    Ok(())
}

fn show_help() {
    println!("\n📋 Available Configuration Options:");
    println!("  --staging <dir>         Staging directory with this run's documents");
    println!("  --config <path>         Load custom config file (YAML)");
    println!("  --output <path>         Report output path (stdout if not specified)");
    println!("  --keep-staging          Skip the cleanup purge");
    println!("  --dump-stages           Dump every pipeline stage to JSON files");
    println!("  --profile               Time each pipeline step");

    println!("\n📝 Config file fields (all optional, YAML):");
    println!("  marking.per_correct       Marks added per correct answer (default 5)");
    println!("  marking.per_incorrect     Marks deducted per incorrect answer (default 1)");
    println!("  not_answered_markers      Status substrings meaning skipped");
    println!("  no_selection_sentinel     Literal for no selection (default \"--\")");
    println!("  unknown_category          Label for unmatched questions");
    println!("  selectors.question_no     Id substring of question-number nodes");
    println!("  selectors.answer          Id substring of correct-answer nodes");

    println!("\n📝 Usage Examples:");
    println!("  cargo run -- -s uploads");
    println!("  cargo run -- -s uploads -o report.json");
    println!("  cargo run -- -s uploads -c scoring.yaml --profile");
}

fn save_stages(stages: &ScoreStages, output_dir: &str) -> Result<()> {
    use std::fs;
    fs::create_dir_all(output_dir)?;

    let responses_path = format!("{}/stage1_responses.json", output_dir);
    fs::write(&responses_path, serde_json::to_string_pretty(&stages.responses)?)?;
    println!("  💾 {} ({} records)", responses_path, stages.responses.records.len());

    let key_path = format!("{}/stage2_answer_key.json", output_dir);
    fs::write(&key_path, serde_json::to_string_pretty(&stages.answer_key)?)?;
    println!("  💾 {} ({} records)", key_path, stages.answer_key.records.len());

    let rows_path = format!("{}/stage3_comparison.json", output_dir);
    fs::write(&rows_path, serde_json::to_string_pretty(&stages.rows)?)?;
    println!("  💾 {} ({} rows)", rows_path, stages.rows.len());

    let report_path = format!("{}/stage4_report.json", output_dir);
    fs::write(&report_path, serde_json::to_string_pretty(&stages.report)?)?;
    println!("  💾 {}", report_path);

    Ok(())
}
