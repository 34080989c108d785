//! Error taxonomy for the grading pipeline.
//!
//! Per-job failures are isolated: one job erroring never stops the worker
//! loop. A failed grading never reports success; it resolves to a persisted
//! `review_required` projection with the error message recorded.

use thiserror::Error;

/// Why the judge's raw output failed to yield a verdict.
///
/// A tagged reason rather than a bare `None`, so callers, logs, and tests
/// can inspect what was wrong with the payload.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseFailure {
    #[error("no JSON object found in judge output")]
    NoJsonObject,

    #[error("invalid JSON in judge output: {0}")]
    InvalidJson(String),

    #[error("judge verdict missing required field '{0}'")]
    MissingField(&'static str),

    #[error("judge verdict field '{0}' has the wrong shape")]
    WrongShape(&'static str),
}

/// Failure of one grading attempt.
#[derive(Debug, Error)]
pub enum GradeError {
    /// The judge interface returned `success = false`, empty content, or a
    /// transport-level error.
    #[error("judge call failed: {0}")]
    Judge(String),

    /// The judge answered but no verdict could be extracted. Callers of
    /// `grade_directly` must treat this as "no verdict obtained", not as a
    /// passing grade.
    #[error("no verdict obtained: {0}")]
    Parse(#[from] ParseFailure),
}
