// All model prompt constants for the Generation module.
// Every call goes through llm_client; these only shape what is sent.

/// Default system prompt for CV generation requests. Callers may override it
/// per request via `systemPrompt`.
pub const CV_SYSTEM_PROMPT: &str = "You are an expert CV and resume writing assistant. \
    You help candidates produce clear, factual, well-structured CV content. \
    Write in concise professional language, quantify impact where the \
    provided material supports it, and never invent experience, employers, \
    dates, or qualifications the candidate did not state.";

/// Formatting-suggestion prompt template.
/// Replace `{style}` and `{cv_json}` before sending.
pub const FORMAT_PROMPT_TEMPLATE: &str = r#"Review the following CV data and suggest how to format it in a {style} style.

Cover, in order:
1. Section ordering appropriate for this candidate
2. Layout and visual hierarchy (headings, spacing, emphasis)
3. Consistency issues in the data (dates, tense, capitalization)
4. Content that should be condensed or dropped

CV DATA:
{cv_json}"#;

/// Section-improvement prompt template.
/// Replace `{cv_section}`, `{current_content}`, `{job_title}`, `{industry}`.
pub const IMPROVE_PROMPT_TEMPLATE: &str = r#"Improve the following {cv_section} section of a CV.

Target job title: {job_title}
Target industry: {industry}

Rewrite the content to be stronger and more specific. Keep every factual
claim from the original; do not invent achievements, numbers, or dates.
Return the improved section followed by a short list of what changed and why.

CURRENT CONTENT:
{current_content}"#;
