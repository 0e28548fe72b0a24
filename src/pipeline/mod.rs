//! Pipeline stages for resume parsing.
//!
//! Each submodule implements exactly one step, so each is testable on its
//! own and the two external collaborators (PDF engine, remote model) sit
//! behind traits that tests replace with mocks.
//!
//! ## Data Flow
//!
//! ```text
//! upload ──▶ text ──▶ links ──▶ structured ──▶ merge
//! (temp file) (pdfium) (regex)  (LLM, schema)  (links overwrite)
//! ```
//!
//! 1. [`upload`] validates the `%PDF` header and stages bytes in a
//!    self-deleting temp file
//! 2. [`text`] pulls per-page text through pdfium in `spawn_blocking`
//! 3. [`crate::links`] builds the authoritative link list from the raw text
//! 4. [`structured`] is the only stage with network I/O; no retries
//! 5. [`merge`] patches `links` into the exact JSON object shown and
//!    downloaded

pub mod merge;
pub mod structured;
pub mod text;
pub mod upload;
