// Prompt for JD parsing. The JSON-only system prompt is added by the client.

/// JD parsing prompt template. Replace `{jd_text}` before sending.
pub const JD_PARSE_PROMPT_TEMPLATE: &str = r#"You extract structured fields from a Job Description.

Return a JSON object with this EXACT schema (no extra fields):
{
  "title": "Senior ML Engineer",
  "required_skills": ["python", "pytorch"],
  "nice_to_have": ["kubernetes"],
  "responsibilities": ["Ship models to production"],
  "min_years_total": 5
}

Rules:
- required_skills: explicit must-haves ("required", "must have", "you will need").
- nice_to_have: phrases like "preferred", "bonus", "nice to have", "plus".
- Skills are short lowercase terms (languages, frameworks, tools).
- min_years_total: minimum total years of experience as a number, 0 if not stated.

JOB DESCRIPTION:
{jd_text}"#;
