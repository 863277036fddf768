// Marksheet Core Library
//
// Scores a multiple-choice exam attempt by reconciling response-sheet
// documents against official answer-key pages. Main interface for the
// staged extract → reconcile → emit pipeline.

pub mod config;
pub mod emitter;
pub mod error;
pub mod extractors;
pub mod pipeline;
pub mod reconcile;
pub mod staging;
pub mod types;

// Re-export main types and functions for easy use
pub use config::ScoringConfig;
pub use error::ScoreError;
pub use extractors::{AnswerKeyExtractor, LopdfTextSource, PlainTextSource, TextSource};
pub use pipeline::{ScorePipeline, ScoreStages, StepProfiler};
pub use staging::RunContext;
pub use types::*;
