//! Extracts and validates a JSON verdict from raw judge-model output.
//!
//! The judge's own `overallScore` and `recommendation` fields are required
//! to be present but their values are discarded: the total is recomputed as
//! the weighted mean of the dimension scores, and the routing verdict is
//! recomputed from score and issue counts. This keeps results consistent
//! regardless of model arithmetic errors or an overly generous self-verdict.

use crate::errors::ParseFailure;
use crate::model::{QualityDimension, QualityGradingResult, Recommendation};
use crate::rubric::QualityRubric;
use serde_json::Value;

/// Parse a raw judge response against a rubric.
///
/// Tolerates surrounding prose and markdown fences; the first balanced
/// `{...}` block is taken as the verdict payload.
pub fn parse(raw: &str, rubric: &QualityRubric) -> Result<QualityGradingResult, ParseFailure> {
    let block = extract_json_object(raw).ok_or(ParseFailure::NoJsonObject)?;
    let value: Value =
        serde_json::from_str(block).map_err(|e| ParseFailure::InvalidJson(e.to_string()))?;

    // Required shape. The numeric total itself is recomputed below.
    require_number(&value, "overallScore")?;
    let raw_dimensions = require_array(&value, "dimensions")?;
    let hallucinations = require_string_array(&value, "hallucinations")?;
    let critical_issues = require_string_array(&value, "criticalIssues")?;

    let dimensions: Vec<QualityDimension> =
        raw_dimensions.iter().map(dimension_from_value).collect();

    let overall_score = weighted_overall(&dimensions);
    let recommendation =
        determine_recommendation(overall_score, &hallucinations, &critical_issues, rubric);

    Ok(QualityGradingResult {
        overall_score,
        dimensions,
        hallucinations,
        critical_issues,
        recommendation,
    })
}

/// Deterministic routing verdict. Strict precedence chain: critical issues
/// and below-review-threshold scores must never be downgraded to
/// `review_required`, even when hallucinations are also present.
pub fn determine_recommendation(
    overall_score: u32,
    hallucinations: &[String],
    critical_issues: &[String],
    rubric: &QualityRubric,
) -> Recommendation {
    if !critical_issues.is_empty() {
        Recommendation::Fail
    } else if overall_score < rubric.flag_for_review_threshold {
        Recommendation::Fail
    } else if !hallucinations.is_empty() {
        Recommendation::ReviewRequired
    } else if overall_score < rubric.passing_score {
        Recommendation::ReviewRequired
    } else {
        Recommendation::Pass
    }
}

/// First balanced `{...}` block in `raw`, string- and escape-aware.
fn extract_json_object(raw: &str) -> Option<&str> {
    let start = raw.find('{')?;
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;
    for (idx, ch) in raw[start..].char_indices() {
        if in_string {
            if escaped {
                escaped = false;
            } else if ch == '\\' {
                escaped = true;
            } else if ch == '"' {
                in_string = false;
            }
            continue;
        }
        match ch {
            '"' => in_string = true,
            '{' => depth += 1,
            '}' => {
                depth -= 1;
                if depth == 0 {
                    return Some(&raw[start..start + idx + 1]);
                }
            }
            _ => {}
        }
    }
    None
}

fn require_number(value: &Value, field: &'static str) -> Result<f64, ParseFailure> {
    match value.get(field) {
        None => Err(ParseFailure::MissingField(field)),
        Some(v) => v.as_f64().ok_or(ParseFailure::WrongShape(field)),
    }
}

fn require_array<'a>(value: &'a Value, field: &'static str) -> Result<&'a Vec<Value>, ParseFailure> {
    match value.get(field) {
        None => Err(ParseFailure::MissingField(field)),
        Some(v) => v.as_array().ok_or(ParseFailure::WrongShape(field)),
    }
}

fn require_string_array(value: &Value, field: &'static str) -> Result<Vec<String>, ParseFailure> {
    let arr = require_array(value, field)?;
    Ok(arr
        .iter()
        .filter_map(|v| v.as_str().map(str::to_string))
        .collect())
}

/// Clamp the score, default missing issues, carry name/weight through as
/// given by the judge.
fn dimension_from_value(v: &Value) -> QualityDimension {
    let score = v
        .get("score")
        .and_then(Value::as_f64)
        .unwrap_or(0.0)
        .clamp(0.0, 100.0);
    QualityDimension {
        name: v
            .get("name")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string(),
        score,
        weight: v.get("weight").and_then(Value::as_f64).unwrap_or(0.0),
        issues: v
            .get("issues")
            .and_then(Value::as_array)
            .map(|a| {
                a.iter()
                    .filter_map(|i| i.as_str().map(str::to_string))
                    .collect()
            })
            .unwrap_or_default(),
    }
}

/// `round(sum(score_i * weight_i) / sum(weight_i))`; an empty dimension set
/// (or all-zero weights) yields 0 rather than a division error. Weights come
/// from untrusted judge output, so the quotient is clamped back to [0, 100]:
/// a negative weight can otherwise push the mean outside the score range.
fn weighted_overall(dimensions: &[QualityDimension]) -> u32 {
    let weight_sum: f64 = dimensions.iter().map(|d| d.weight).sum();
    if weight_sum <= 0.0 {
        return 0;
    }
    let weighted: f64 = dimensions.iter().map(|d| d.score * d.weight).sum();
    (weighted / weight_sum).clamp(0.0, 100.0).round() as u32
}
