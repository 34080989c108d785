//! Human-review escalation boundary.
//!
//! Fire-and-forget: the grading pipeline invokes the hook for every
//! non-pass outcome and neither awaits nor retries delivery.

use crate::model::QualityGradingResult;

pub trait EscalationHook: Send + Sync {
    fn escalate(&self, usage_id: &str, result: &QualityGradingResult);
}

/// Default hook: a structured warn log for whatever notification relay
/// tails the process logs.
#[derive(Debug, Default)]
pub struct LogEscalation;

impl EscalationHook for LogEscalation {
    fn escalate(&self, usage_id: &str, result: &QualityGradingResult) {
        tracing::warn!(
            usage_id,
            recommendation = %result.recommendation,
            score = result.overall_score,
            hallucinations = result.hallucinations.len(),
            critical_issues = result.critical_issues.len(),
            "graded item flagged for human review"
        );
    }
}
