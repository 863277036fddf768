use thiserror::Error;

/// Failures that abort a scoring run.
///
/// Only true structural failures live here. Partial extraction (a block
/// missing fields, surplus markup nodes) and unmatched joins are carried
/// as diagnostics and data, never as errors.
#[derive(Debug, Error)]
pub enum ScoreError {
    /// A source document failed to parse as its format. No partial
    /// scoring happens from a corrupted source.
    #[error("malformed input {path}: {reason}")]
    MalformedInput { path: String, reason: String },

    /// An intermediate tabular artifact did not match the expected shape
    /// (e.g. a missing column) when re-read.
    #[error("schema mismatch in {path}: {reason}")]
    SchemaMismatch { path: String, reason: String },
}
