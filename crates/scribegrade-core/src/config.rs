//! Runtime configuration for the grading service.

use crate::providers::judge::JudgeOptions;
use std::time::Duration;

/// Knobs for the grading worker and its judge calls.
///
/// Deliberately carries no retry policy: a failed job is persisted as an
/// error projection and not re-attempted (see the service docs).
#[derive(Debug, Clone)]
pub struct GradingConfig {
    /// Judge model identifier, recorded in `graded_by` alongside the
    /// provider name.
    pub model: String,
    /// Kept low so verdicts are near-deterministic.
    pub temperature: f32,
    pub max_tokens: u32,
    /// One job is dequeued per tick; the interval throttles throughput to
    /// respect judge-model rate limits.
    pub tick_interval: Duration,
}

impl Default for GradingConfig {
    fn default() -> Self {
        Self {
            model: "gpt-4o-mini".to_string(),
            temperature: 0.1,
            max_tokens: 2000,
            tick_interval: Duration::from_secs(1),
        }
    }
}

impl GradingConfig {
    pub fn judge_options(&self) -> JudgeOptions {
        JudgeOptions {
            model: self.model.clone(),
            temperature: self.temperature,
            max_tokens: self.max_tokens,
        }
    }
}
