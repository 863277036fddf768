use crate::config::ScoringConfig;
use crate::emitter;
use crate::extractors::answer_key::AnswerKeyExtractor;
use crate::extractors::pdf_text::{has_extension, LopdfTextSource, PlainTextSource, TextSource};
use crate::extractors::response;
use crate::reconcile;
use crate::staging::{self, RunContext};
use crate::types::*;
use anyhow::Result;
use std::time::{Duration, Instant};

/// Captured outputs from each pipeline stage.
/// Used for testing and diagnostics — lets you inspect each boundary.
#[derive(Debug, Clone, serde::Serialize)]
pub struct ScoreStages {
    pub responses: ResponseExtraction,
    pub answer_key: KeyExtraction,
    pub rows: Vec<ComparisonRow>,
    pub report: ScoreReport,
}

/// Simple profiler that collects timings for pipeline steps
pub struct StepProfiler {
    enabled: bool,
    timings: Vec<(String, Duration)>,
}

impl StepProfiler {
    pub fn new(enabled: bool) -> Self {
        Self {
            enabled,
            timings: Vec::new(),
        }
    }

    pub fn time_step<F, R>(&mut self, step_name: &str, f: F) -> R
    where
        F: FnOnce() -> R,
    {
        if !self.enabled {
            return f();
        }

        let start = Instant::now();
        let result = f();
        let elapsed = start.elapsed();

        self.timings.push((step_name.to_string(), elapsed));
        println!("⏱️  {}: {:.0}ms", step_name, elapsed.as_millis());

        result
    }

    pub fn print_summary(&self) {
        if !self.enabled || self.timings.is_empty() {
            return;
        }

        println!("\n📊 Performance Summary:");
        let total: Duration = self.timings.iter().map(|(_, d)| *d).sum();

        for (step, duration) in &self.timings {
            let percentage = (duration.as_secs_f64() / total.as_secs_f64()) * 100.0;
            println!(
                "   {:.<35} {:.0}ms ({:.1}%)",
                step,
                duration.as_millis(),
                percentage
            );
        }
        println!("   {:.<35} {:.0}ms", "Total", total.as_millis());
    }
}

/// The three-stage scoring pipeline plus emission.
///
/// Single run = single candidate, strictly sequential: both extractors
/// complete before reconciliation starts, and the emitter's purge is the
/// terminal step.
pub struct ScorePipeline {
    text_sources: Vec<Box<dyn TextSource>>,
    key_extractor: AnswerKeyExtractor,
    config: ScoringConfig,
}

impl ScorePipeline {
    /// Pipeline with the default backends: lopdf for `.pdf` response
    /// sheets, pass-through for pre-dumped `.txt` text.
    pub fn new(config: ScoringConfig) -> Result<Self> {
        Self::new_with_text_sources(
            vec![Box::new(LopdfTextSource), Box::new(PlainTextSource)],
            config,
        )
    }

    /// Pipeline with injected text backends (tests, alternative formats)
    pub fn new_with_text_sources(
        text_sources: Vec<Box<dyn TextSource>>,
        config: ScoringConfig,
    ) -> Result<Self> {
        let key_extractor = AnswerKeyExtractor::new(&config)?;
        Ok(Self {
            text_sources,
            key_extractor,
            config,
        })
    }

    /// Score one staged run and purge its staging area.
    pub fn run(&self, ctx: &RunContext) -> Result<ScoreReport> {
        Ok(self.run_with_options(ctx, true, false)?.report)
    }

    /// Score one staged run with control over the purge and profiling.
    /// Returns every stage boundary for inspection.
    pub fn run_with_options(
        &self,
        ctx: &RunContext,
        purge: bool,
        profile: bool,
    ) -> Result<ScoreStages> {
        let mut profiler = StepProfiler::new(profile);

        let responses = profiler.time_step("Response extraction", || self.extract_responses(ctx))?;
        staging::write_table(&ctx.responses_table(), &responses.records)?;

        let answer_key = profiler.time_step("Answer-key extraction", || self.extract_answer_key(ctx))?;
        staging::write_table(&ctx.key_table(), &answer_key.records)?;

        // Round-trip the tabular intermediates the way they flowed between
        // the original pipeline steps; shape drift in the artifacts
        // surfaces here as SchemaMismatch before any scoring happens.
        let response_records: Vec<ResponseRecord> = staging::read_table(&ctx.responses_table())?;
        let key_records: Vec<KeyRecord> = staging::read_table(&ctx.key_table())?;

        let (rows, summary) = profiler.time_step("Reconciliation", || {
            let rows = reconcile::reconcile(&response_records, &key_records, &self.config);
            let summary = reconcile::summarize(&rows, &self.config);
            (rows, summary)
        });

        let unmatched = rows.iter().filter(|r| r.correct_option_id.is_none()).count();
        println!(
            "🧪 Responses: {}, key records: {}, comparison rows: {}, unmatched: {}",
            response_records.len(),
            key_records.len(),
            rows.len(),
            unmatched
        );

        let student = answer_key.student.clone();
        let report = profiler.time_step("Emission", || {
            emitter::emit(ctx, &rows, student, summary, purge)
        })?;
        profiler.print_summary();

        Ok(ScoreStages {
            responses,
            answer_key,
            rows,
            report,
        })
    }

    // Stage 1: staged response documents → ResponseRecords.
    // Documents no configured backend supports are ignored (they belong
    // to the other extractor or are stray uploads).
    fn extract_responses(&self, ctx: &RunContext) -> Result<ResponseExtraction> {
        let mut texts = Vec::new();
        for path in ctx.staged_files()? {
            let Some(source) = self.text_sources.iter().find(|s| s.supports(&path)) else {
                continue;
            };
            let bytes = std::fs::read(&path)?;
            let text = source.document_text(&bytes, &path)?;
            println!(
                "📄 Extracted text from {} via {}",
                path.display(),
                source.name()
            );
            texts.push(text);
        }

        if texts.is_empty() {
            println!("⚠️  No response documents staged in {}", ctx.dir().display());
        }

        let extraction = response::extract_all(texts.iter().map(String::as_str));
        println!(
            "📊 Total questions combined: {} from {} documents",
            extraction.stats.blocks, extraction.stats.documents
        );
        Ok(extraction)
    }

    // Stage 2: staged answer-key pages → KeyRecords + student metadata.
    fn extract_answer_key(&self, ctx: &RunContext) -> Result<KeyExtraction> {
        let mut documents = Vec::new();
        for path in ctx.staged_files()? {
            if !(has_extension(&path, "html") || has_extension(&path, "htm")) {
                continue;
            }
            let html = std::fs::read_to_string(&path).map_err(|e| {
                crate::error::ScoreError::MalformedInput {
                    path: path.display().to_string(),
                    reason: e.to_string(),
                }
            })?;
            documents.push((path, html));
        }

        println!("🔎 Found {} answer-key pages", documents.len());
        let extraction = self.key_extractor.extract_all(
            documents
                .iter()
                .map(|(path, html)| (path.as_path(), html.as_str())),
        );
        Ok(extraction)
    }
}
