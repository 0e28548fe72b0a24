//! Result types returned by the parse entry points.

use crate::error::ResumeParserError;
use crate::schema::Resume;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// The downloadable result of one successful parse request.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OutputArtifact {
    /// `<normalised full name>_resume_parsed.json`.
    pub filename: String,
    /// `full_name` as answered by the model.
    pub full_name: String,
    /// The model's JSON object (original key order) with `links` overwritten.
    /// This is what is displayed and downloaded.
    pub document: Map<String, Value>,
    /// Typed view of `document`, present when it fits [`Resume`] (always for
    /// the built-in schema, possibly not for a custom one).
    pub resume: Option<Resume>,
    /// Links extracted from the raw text, in order of appearance.
    pub links: Vec<String>,
    pub stats: ParseStats,
}

impl OutputArtifact {
    /// The document as UTF-8 JSON indented with 4 spaces.
    pub fn to_json_pretty(&self) -> Result<String, ResumeParserError> {
        let mut buf = Vec::with_capacity(1024);
        let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
        let mut serializer = serde_json::Serializer::with_formatter(&mut buf, formatter);
        self.document
            .serialize(&mut serializer)
            .map_err(|e| ResumeParserError::Internal(format!("artifact serialisation: {e}")))?;
        String::from_utf8(buf).map_err(|e| ResumeParserError::Internal(format!("artifact encoding: {e}")))
    }
}

/// Timing and size statistics for one parse request.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParseStats {
    /// Pages the PDF engine extracted.
    pub page_count: usize,
    /// Pages whose text was sent to the model.
    pub pages_used: usize,
    /// Characters of text sent to the model.
    pub text_chars: usize,
    pub links_found: usize,
    pub input_tokens: u32,
    pub output_tokens: u32,
    pub extraction_ms: u64,
    pub completion_ms: u64,
    pub total_ms: u64,
}

/// Text and links of an upload, without any model call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TextPreview {
    pub name: String,
    pub text: String,
    pub links: Vec<String>,
    pub page_count: usize,
    pub pages_used: usize,
}
