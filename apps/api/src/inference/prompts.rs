// Prompt contract for the remote resume provider.

/// Longest slice of resume text sent to the remote provider, in characters.
pub const MAX_PROMPT_RESUME_CHARS: usize = 120_000;

/// System prompt: extraction rules and JSON-only output.
pub const RESUME_EXTRACT_SYSTEM: &str = "You are an information extraction engine for resumes.
Return ONLY valid JSON that matches the provided JSON schema. Do not add extra keys.
Rules:
- Do not guess. If missing, use null, empty string, or empty array as appropriate.
- Always populate these objects even if values are empty: target_fit, summary, skills.
- For target_fit.investment_approaches use only: Fundamental, Systematic (or empty).
- For target_fit.geographic_markets use only: US, Europe, APAC (or empty).
- Prefer short evidence snippets from the resume text for critical fields.
- Keep lists de-duplicated.";

/// User prompt template. Replace `{schema}` and `{resume_text}` before sending.
pub const RESUME_EXTRACT_PROMPT_TEMPLATE: &str = r#"Extract a structured resume record from the text below.

You MUST output JSON that conforms to this schema (JSON Schema):
{schema}

Resume text:
"""{resume_text}"""
"#;

/// Fills the user prompt, truncating the resume text on a char boundary.
pub fn build_extract_prompt(schema: &str, resume_text: &str) -> String {
    let truncated = match resume_text.char_indices().nth(MAX_PROMPT_RESUME_CHARS) {
        Some((idx, _)) => &resume_text[..idx],
        None => resume_text,
    };
    RESUME_EXTRACT_PROMPT_TEMPLATE
        .replace("{schema}", schema)
        .replace("{resume_text}", truncated)
}
