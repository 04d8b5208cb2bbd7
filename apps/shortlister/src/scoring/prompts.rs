// Prompt builders for the scoring pipeline.
// Reuses cross-cutting fragments from llm_client::prompts.

use crate::llm_client::prompts::EVIDENCE_INSTRUCTION;
use crate::scoring::config::RubricQuestion;

/// Renders rubric questions as `- name: question` lines.
pub fn render_rubric(items: &[RubricQuestion]) -> String {
    items
        .iter()
        .map(|it| format!("- {}: {}", it.name, it.question))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Builds the rubric evaluation prompt. `cv` must already be truncated.
pub fn build_rubric_prompt(jd: &str, cv: &str, items: &[RubricQuestion]) -> String {
    format!(
        r#"You are a meticulous technical recruiter.

Task: Score this candidate on the rubric below for the given Job Description (JD).
Return strict JSON with fields:
{{ "rubric": [{{ "name": str, "score": int (0-5), "reason": str }}], "overall_comment": str }}

Guidelines:
{EVIDENCE_INSTRUCTION}
- Keep reasons concise (<= 2 sentences each).

JD:
<<<{jd}>>>

CV:
<<<{cv}>>>

Rubric:
{rubric}
"#,
        rubric = render_rubric(items),
    )
}
