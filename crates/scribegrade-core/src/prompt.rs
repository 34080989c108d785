//! Grading prompt construction. Pure string templating; no parsing or
//! validation happens here.

use crate::rubric::QualityRubric;

const TEMPLATE: &str = r#"You are auditing an AI-generated clinical document against the source visit transcript.

Ground rules:
- The transcript is the only source of truth.
- Any clinical fact in the generated content that cannot be traced back to the transcript is a hallucination. List every one you find.
- Missing information is less severe than fabricated information; weigh omissions accordingly.

Scoring rubric:
{{RUBRIC}}

### Source transcript:
<transcript>
{{TRANSCRIPT}}
</transcript>

### Generated content:
<generated_content>
{{GENERATED_CONTENT}}
</generated_content>

Respond with strict JSON only, no surrounding prose:
{
  "overallScore": <0-100>,
  "dimensions": [{"name": "<dimension>", "score": <0-100>, "weight": <0-1>, "issues": ["<issue>"]}],
  "hallucinations": ["<fabricated fact>"],
  "criticalIssues": ["<patient-safety issue>"],
  "recommendation": "pass" | "review_required" | "fail"
}"#;

/// Substitute the rubric, transcript and generated content into the grading
/// prompt template.
pub fn render(rubric: &QualityRubric, transcript: &str, generated_content: &str) -> String {
    TEMPLATE
        .replace("{{RUBRIC}}", &rubric.to_prompt_block())
        .replace("{{TRANSCRIPT}}", transcript)
        .replace("{{GENERATED_CONTENT}}", generated_content)
}
