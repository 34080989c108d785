//! Weighted scoring rubrics for the two graded content shapes.
//!
//! Pure data: two static rubrics, one for free-text clinical notes and one
//! for structured patient-state extractions, with different dimension sets
//! and thresholds. Immutable after construction.

use crate::model::ContentType;
use std::sync::LazyLock;

/// One weighted scoring dimension with its grading criteria.
#[derive(Debug, Clone)]
pub struct RubricDimension {
    pub name: &'static str,
    /// In (0, 1]; weights across a rubric sum to 1.0.
    pub weight: f64,
    pub criteria: &'static [&'static str],
}

/// A weighted set of scoring dimensions plus the pass/review thresholds.
///
/// Invariant: `flag_for_review_threshold < passing_score`. Scores at exactly
/// `passing_score` pass; scores at exactly `flag_for_review_threshold` are
/// not failures.
#[derive(Debug, Clone)]
pub struct QualityRubric {
    pub name: &'static str,
    pub dimensions: Vec<RubricDimension>,
    pub passing_score: u32,
    pub flag_for_review_threshold: u32,
}

impl QualityRubric {
    /// Check the structural invariants. Run by tests against both static
    /// rubrics; a violation here is a programming error, not runtime input.
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.flag_for_review_threshold >= self.passing_score {
            anyhow::bail!(
                "rubric '{}': review threshold {} must be below passing score {}",
                self.name,
                self.flag_for_review_threshold,
                self.passing_score
            );
        }
        let total: f64 = self.dimensions.iter().map(|d| d.weight).sum();
        if (total - 1.0).abs() > 1e-6 {
            anyhow::bail!("rubric '{}': dimension weights sum to {}", self.name, total);
        }
        for dim in &self.dimensions {
            if dim.weight <= 0.0 || dim.weight > 1.0 {
                anyhow::bail!("rubric '{}': dimension '{}' weight {} out of (0, 1]", self.name, dim.name, dim.weight);
            }
        }
        Ok(())
    }

    /// Serialize the rubric into the human-readable block substituted into
    /// the grading prompt.
    pub fn to_prompt_block(&self) -> String {
        let mut out = String::new();
        for dim in &self.dimensions {
            out.push_str(&format!("- {} (weight {:.2}):\n", dim.name, dim.weight));
            for criterion in dim.criteria {
                out.push_str(&format!("  - {}\n", criterion));
            }
        }
        out.push_str(&format!(
            "Passing score: {}. Scores below {} must fail.\n",
            self.passing_score, self.flag_for_review_threshold
        ));
        out
    }
}

static SCRIBE_NOTE_RUBRIC: LazyLock<QualityRubric> = LazyLock::new(|| QualityRubric {
    name: "scribe_note",
    dimensions: vec![
        RubricDimension {
            name: "accuracy",
            weight: 0.35,
            criteria: &[
                "Every clinical statement is supported by the transcript",
                "Medications, dosages and vitals match the transcript exactly",
                "Attribution is correct (patient-reported vs clinician-observed)",
            ],
        },
        RubricDimension {
            name: "completeness",
            weight: 0.25,
            criteria: &[
                "Chief complaint and history of present illness are captured",
                "Assessment and plan reflect what was discussed",
                "Relevant negatives mentioned in the visit are recorded",
            ],
        },
        RubricDimension {
            name: "no_fabrication",
            weight: 0.25,
            criteria: &[
                "No diagnoses, findings or orders absent from the transcript",
                "No invented numeric values (doses, vitals, lab results)",
            ],
        },
        RubricDimension {
            name: "clarity",
            weight: 0.15,
            criteria: &[
                "Standard clinical note structure and terminology",
                "Free of contradictions and duplicated content",
            ],
        },
    ],
    passing_score: 70,
    flag_for_review_threshold: 50,
});

static EXTRACTION_RUBRIC: LazyLock<QualityRubric> = LazyLock::new(|| QualityRubric {
    name: "patient_state_extraction",
    dimensions: vec![
        RubricDimension {
            name: "field_accuracy",
            weight: 0.40,
            criteria: &[
                "Each extracted field value is stated in the transcript",
                "Units and magnitudes are preserved exactly",
            ],
        },
        RubricDimension {
            name: "no_fabrication",
            weight: 0.30,
            criteria: &[
                "No fields populated from inference rather than the transcript",
                "Absent information is left empty, not guessed",
            ],
        },
        RubricDimension {
            name: "completeness",
            weight: 0.20,
            criteria: &["All extractable fields present in the transcript are filled"],
        },
        RubricDimension {
            name: "format_validity",
            weight: 0.10,
            criteria: &["Field values conform to the expected structured format"],
        },
    ],
    passing_score: 75,
    flag_for_review_threshold: 55,
});

/// Maps a content type to its rubric. No side effects, no failure modes.
pub struct RubricRegistry;

impl RubricRegistry {
    /// Structured extractions get the extraction rubric; every other content
    /// type grades against the scribe-note rubric.
    pub fn get(content_type: ContentType) -> &'static QualityRubric {
        match content_type {
            ContentType::PatientStateExtraction => &EXTRACTION_RUBRIC,
            ContentType::ClinicalNotes | ContentType::Summarization => &SCRIBE_NOTE_RUBRIC,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn both_static_rubrics_satisfy_invariants() {
        RubricRegistry::get(ContentType::ClinicalNotes).validate().unwrap();
        RubricRegistry::get(ContentType::PatientStateExtraction)
            .validate()
            .unwrap();
    }

    #[test]
    fn extraction_maps_to_extraction_rubric_all_else_to_scribe_note() {
        assert_eq!(
            RubricRegistry::get(ContentType::PatientStateExtraction).name,
            "patient_state_extraction"
        );
        assert_eq!(RubricRegistry::get(ContentType::ClinicalNotes).name, "scribe_note");
        assert_eq!(RubricRegistry::get(ContentType::Summarization).name, "scribe_note");
    }

    #[test]
    fn prompt_block_lists_dimensions_and_thresholds() {
        let block = RubricRegistry::get(ContentType::ClinicalNotes).to_prompt_block();
        assert!(block.contains("accuracy (weight 0.35)"));
        assert!(block.contains("Passing score: 70"));
        assert!(block.contains("below 50"));
    }
}
