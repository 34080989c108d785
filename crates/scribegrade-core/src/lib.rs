//! Judge-model quality grading for AI-generated clinical text.
//!
//! An upstream pipeline produces a (transcript, generated content) pair; this
//! crate grades the generated content against the transcript with a second
//! "judge" model and routes the outcome: pass, review required, or fail.
//!
//! Flow: producer -> [`service::GradingService::queue_for_grading`] -> worker
//! tick -> [`prompt::render`] -> judge call -> [`parser::parse`] -> usage
//! store update -> optional escalation.
//!
//! The judge's self-reported total and verdict are never trusted: both are
//! recomputed deterministically from the dimension scores and the rubric.

pub mod config;
pub mod errors;
pub mod escalation;
pub mod model;
pub mod parser;
pub mod prompt;
pub mod providers;
pub mod rubric;
pub mod service;
pub mod storage;

pub use config::GradingConfig;
pub use errors::{GradeError, ParseFailure};
pub use service::GradingService;
