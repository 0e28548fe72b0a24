//! # resume-parser
//!
//! Turn an uploaded PDF resume into a structured JSON record.
//!
//! ## Why this crate?
//!
//! A language model reads messy resume layouts well but is unreliable at
//! copying URLs character for character. This crate lets the model fill a
//! strict JSON schema (name, contact, experience, education, skills) and
//! then overwrites its `links` field with every `http(s)://` URL found in
//! the raw PDF text, so the one field that has to be exact is never
//! paraphrased.
//!
//! ## Pipeline Overview
//!
//! ```text
//! upload (name + bytes)
//!  │
//!  ├─ 1. Stage     %PDF check, self-deleting temp file
//!  ├─ 2. Extract   pdfium text, first page by default (spawn_blocking)
//!  ├─ 3. Links     regex over the raw text, order and duplicates kept
//!  ├─ 4. Complete  one strict json_schema chat completion
//!  ├─ 5. Merge     overwrite `links`, derive `<Name>_resume_parsed.json`
//!  └─ 6. Output    displayed object == downloaded bytes (4-space JSON)
//! ```
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use resume_parser::{parse_resume_file, ParserConfig};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     // API key read from OPENAI_API_KEY at request time
//!     let config = ParserConfig::default();
//!     let artifact = parse_resume_file("resume.pdf", &config).await?;
//!     println!("{}", artifact.to_json_pretty()?);
//!     eprintln!("saved as {}", artifact.filename);
//!     Ok(())
//! }
//! ```
//!
//! ## Feature Flags
//!
//! | Feature | Default | Description |
//! |---------|---------|-------------|
//! | `cli`   | on      | Enables the `resume-parser` binary (clap + anyhow + tracing-subscriber) |
//!
//! Disable `cli` when using only the library:
//! ```toml
//! resume-parser = { version = "0.1", default-features = false }
//! ```
//!
//! ## Errors
//!
//! Every error is fatal for its request. [`ResumeParserError::kind`] groups
//! them so a host can tell "fix your environment" (missing API key, no
//! pdfium) apart from "this file is unusable" and "the model call failed".

// ── Modules ──────────────────────────────────────────────────────────────

pub mod config;
pub mod error;
pub mod filename;
pub mod links;
pub mod output;
pub mod parse;
pub mod pipeline;
pub mod progress;
pub mod prompts;
pub mod schema;
pub mod session;

// ── Re-exports ───────────────────────────────────────────────────────────

pub use config::{ParserConfig, ParserConfigBuilder};
pub use error::{ErrorKind, ResumeParserError};
pub use filename::{artifact_filename, clean_name_for_file};
pub use links::{extract_links, extract_links_with, LinkPolicy};
pub use output::{OutputArtifact, ParseStats, TextPreview};
pub use parse::{
    inspect_text, parse_resume, parse_resume_file, parse_resume_sync, parse_resume_to_dir,
    write_artifact,
};
pub use pipeline::structured::{Credential, Extraction, OpenAiExtractor, StructuredExtractor};
pub use pipeline::text::{PageScope, PdfiumTextExtractor, TextExtractor, TextOptions};
pub use pipeline::upload::UploadedFile;
pub use progress::{NoopObserver, PipelineObserver, PipelineStage};
pub use schema::{Education, Experience, Resume, ResumeSchema};
pub use session::{ResumeSession, SessionState};
