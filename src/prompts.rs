//! System prompt for the structured resume completion.
//!
//! The JSON Schema carries the output shape; the prompt only carries
//! extraction rules the schema cannot express. Callers override it through
//! [`crate::config::ParserConfig::system_prompt`].

/// Default system prompt used when `ParserConfig::system_prompt` is `None`.
pub const DEFAULT_SYSTEM_PROMPT: &str = r#"You are a precise resume parser. The user message contains the raw text extracted from a PDF resume.

Fill every field of the requested schema from that text:

1. Copy values exactly as written; do not invent, translate or embellish.
2. Use null for single values that are absent and an empty array for absent lists.
3. full_name is the candidate's name as written at the top of the resume.
4. List experience and education entries in the order they appear.
5. Dates stay in the format used by the resume.
6. skills holds individual skills, one per array item."#;

/// Wrap the extracted resume text as the user turn.
pub fn resume_user_message(resume_text: &str) -> String {
    format!("Resume text:\n\n\"\"\"{}\"\"\"", resume_text)
}
