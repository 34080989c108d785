//! Core data model shared by the grading pipeline and the metrics layer.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Kind of AI-generated content being graded. Selects which rubric applies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContentType {
    ClinicalNotes,
    PatientStateExtraction,
    Summarization,
}

/// Queue priority. High-priority jobs are inserted at the front of the
/// queue; there is no priority elevation after enqueue.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Priority {
    High,
    Normal,
    Low,
}

/// One unit of grading work. Born at enqueue time, dead at the end of one
/// worker tick; the queue carries no retry state between ticks.
#[derive(Debug, Clone)]
pub struct GradingJob {
    pub usage_id: String,
    pub transcript: String,
    pub generated_content: String,
    pub content_type: ContentType,
    pub priority: Priority,
}

/// Final routing verdict for a graded item.
///
/// Always a pure function of `(overall_score, hallucinations,
/// critical_issues, rubric)`; never copied from the judge model's output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Recommendation {
    Pass,
    ReviewRequired,
    Fail,
}

impl std::fmt::Display for Recommendation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Recommendation::Pass => write!(f, "pass"),
            Recommendation::ReviewRequired => write!(f, "review_required"),
            Recommendation::Fail => write!(f, "fail"),
        }
    }
}

/// One scored rubric dimension as returned by the judge, post-clamp.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QualityDimension {
    pub name: String,
    /// Clamped to [0, 100].
    pub score: f64,
    pub weight: f64,
    #[serde(default)]
    pub issues: Vec<String>,
}

/// The validated grading verdict after recomputation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QualityGradingResult {
    /// Recomputed as `round(sum(score_i * weight_i) / sum(weight_i))`; the
    /// judge's self-reported total is discarded.
    pub overall_score: u32,
    pub dimensions: Vec<QualityDimension>,
    pub hallucinations: Vec<String>,
    pub critical_issues: Vec<String>,
    pub recommendation: Recommendation,
}

/// Persisted projection of a grading outcome. Written once per usage record
/// at grading completion or on error; never mutated afterwards.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QualityGradingNotes {
    #[serde(default)]
    pub hallucinations: Vec<String>,
    #[serde(default)]
    pub critical_issues: Vec<String>,
    pub recommendation: Recommendation,
    #[serde(default)]
    pub dimensions: Vec<QualityDimension>,
    /// Set only when grading itself failed (judge call or parse failure).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl QualityGradingNotes {
    /// Error projection: no verdict was obtained, so the record is forced to
    /// `review_required` to fail safe toward human oversight.
    pub fn from_error(message: impl Into<String>) -> Self {
        Self {
            hallucinations: Vec::new(),
            critical_issues: Vec::new(),
            recommendation: Recommendation::ReviewRequired,
            dimensions: Vec::new(),
            error: Some(message.into()),
        }
    }
}

impl From<&QualityGradingResult> for QualityGradingNotes {
    fn from(result: &QualityGradingResult) -> Self {
        Self {
            hallucinations: result.hallucinations.clone(),
            critical_issues: result.critical_issues.clone(),
            recommendation: result.recommendation,
            dimensions: result.dimensions.clone(),
            error: None,
        }
    }
}

/// Fields written onto a usage record when grading completes or errors.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UsageUpdate {
    pub quality_score: Option<u32>,
    pub grading_notes: QualityGradingNotes,
    pub graded_at: DateTime<Utc>,
    /// Judge model identifier, or `"error"` for the error projection.
    pub graded_by: String,
}

/// A historical usage record as read back from the store.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UsageRecord {
    pub usage_id: String,
    pub tenant_id: Option<String>,
    pub quality_score: Option<u32>,
    pub grading_notes: Option<QualityGradingNotes>,
    pub graded_at: Option<DateTime<Utc>>,
    pub graded_by: Option<String>,
    pub created_at: DateTime<Utc>,
}
