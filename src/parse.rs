//! Orchestrator entry points: upload in, [`OutputArtifact`] out.
//!
//! One request runs every stage to completion or to its first error; there
//! is no retry and no partial artifact. The staged temp file is owned by a
//! [`crate::pipeline::upload::StagedUpload`] and removed on every exit path.

use crate::config::ParserConfig;
use crate::error::ResumeParserError;
use crate::filename::artifact_filename;
use crate::links::extract_links_with;
use crate::output::{OutputArtifact, ParseStats, TextPreview};
use crate::pipeline::merge;
use crate::pipeline::structured::{Credential, OpenAiExtractor, StructuredExtractor};
use crate::pipeline::text::{PdfiumTextExtractor, TextExtractor, TextOptions};
use crate::pipeline::upload::{self, StagedUpload, UploadedFile};
use crate::progress::{PipelineStage, StageTracker};
use crate::schema::Resume;
use serde_json::{Map, Value};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, error, info, warn};

/// Parse an uploaded PDF resume into a structured artifact.
///
/// This is the primary entry point for the library.
///
/// # Steps
/// 1. Stage the upload in a uniquely named temp file
/// 2. Extract text (first page by default, see [`crate::PageScope`])
/// 3. Extract links from the raw text
/// 4. Resolve the API credential (no network call without one)
/// 5. Request the structured completion
/// 6. Overwrite `links` and derive the download filename
///
/// # Errors
/// Any [`ResumeParserError`]; branch on [`ResumeParserError::kind`] to
/// present it.
pub async fn parse_resume(
    upload: &UploadedFile,
    config: &ParserConfig,
) -> Result<OutputArtifact, ResumeParserError> {
    parse_resume_staged(upload, config).await.map_err(|(_, e)| e)
}

/// [`parse_resume`], but a failure also carries the stage that raised it.
pub(crate) async fn parse_resume_staged(
    upload: &UploadedFile,
    config: &ParserConfig,
) -> Result<OutputArtifact, (PipelineStage, ResumeParserError)> {
    let mut tracker = StageTracker::new(config.observer.as_deref());
    info!("Parsing resume '{}' ({} bytes)", upload.name, upload.bytes.len());

    match run(upload, config, &mut tracker).await {
        Ok(artifact) => {
            info!(
                "Parsed '{}' → {} ({} links, {}ms)",
                upload.name,
                artifact.filename,
                artifact.links.len(),
                artifact.stats.total_ms
            );
            tracker.ready(&artifact.filename, artifact.links.len());
            Ok(artifact)
        }
        Err(e) => {
            let stage = tracker.current();
            error!("Parsing '{}' failed while {}: {}", upload.name, stage, e);
            tracker.fail(&e.to_string());
            Err((stage, e))
        }
    }
}

/// Read a local PDF and parse it as if it had been uploaded.
pub async fn parse_resume_file(
    path: impl AsRef<Path>,
    config: &ParserConfig,
) -> Result<OutputArtifact, ResumeParserError> {
    let upload = UploadedFile::from_path(path).await?;
    parse_resume(&upload, config).await
}

/// Synchronous wrapper around [`parse_resume`].
///
/// Creates a temporary tokio runtime internally.
pub fn parse_resume_sync(
    upload: &UploadedFile,
    config: &ParserConfig,
) -> Result<OutputArtifact, ResumeParserError> {
    tokio::runtime::Runtime::new()
        .map_err(|e| ResumeParserError::Internal(format!("Failed to create tokio runtime: {}", e)))?
        .block_on(parse_resume(upload, config))
}

/// Parse and write the artifact into `dir` under its download filename.
///
/// Uses atomic write (temp file + rename) so a failed request never leaves a
/// partial artifact behind. Returns the artifact and the written path.
pub async fn parse_resume_to_dir(
    upload: &UploadedFile,
    dir: impl AsRef<Path>,
    config: &ParserConfig,
) -> Result<(OutputArtifact, PathBuf), ResumeParserError> {
    let artifact = parse_resume(upload, config).await?;
    let path = dir.as_ref().join(&artifact.filename);
    write_artifact(&artifact, &path).await?;
    Ok((artifact, path))
}

/// Write `artifact` to `path` atomically.
pub async fn write_artifact(artifact: &OutputArtifact, path: &Path) -> Result<(), ResumeParserError> {
    let json = artifact.to_json_pretty()?;
    let write_err = |source: std::io::Error| ResumeParserError::OutputWriteFailed {
        path: path.to_path_buf(),
        source,
    };

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        tokio::fs::create_dir_all(parent).await.map_err(write_err)?;
    }

    let tmp_path = path.with_extension("json.tmp");
    tokio::fs::write(&tmp_path, json.as_bytes()).await.map_err(write_err)?;
    if let Err(e) = tokio::fs::rename(&tmp_path, path).await {
        let _ = tokio::fs::remove_file(&tmp_path).await;
        return Err(write_err(e));
    }

    debug!("Wrote artifact {}", path.display());
    Ok(())
}

/// Run steps 1–3 only: text and links, no credential and no network.
pub async fn inspect_text(
    upload: &UploadedFile,
    config: &ParserConfig,
) -> Result<TextPreview, ResumeParserError> {
    let staged = upload::stage(upload, config.temp_dir.as_deref()).await?;
    let extracted = extract_text(&staged, config).await;
    staged.close();
    let (text, page_count) = extracted?;

    Ok(TextPreview {
        name: upload.name.clone(),
        links: extract_links_with(&text, config.link_policy),
        pages_used: config.pages.pages_used(page_count),
        page_count,
        text,
    })
}

// ── Internal helpers ─────────────────────────────────────────────────────

async fn run(
    upload: &UploadedFile,
    config: &ParserConfig,
    tracker: &mut StageTracker<'_>,
) -> Result<OutputArtifact, ResumeParserError> {
    let total_start = Instant::now();

    // ── Step 1: Stage upload ─────────────────────────────────────────────
    tracker.enter(PipelineStage::Uploading);
    let staged = upload::stage(upload, config.temp_dir.as_deref()).await?;

    // ── Step 2: Extract text ─────────────────────────────────────────────
    tracker.enter(PipelineStage::Extracting);
    let extraction_start = Instant::now();
    let extracted = extract_text(&staged, config).await;
    // Nothing reads the staged file after this point.
    staged.close();
    let (text, page_count) = extracted?;

    // ── Step 3: Links ────────────────────────────────────────────────────
    let links = extract_links_with(&text, config.link_policy);
    let extraction_ms = extraction_start.elapsed().as_millis() as u64;
    debug!(
        "Extracted {} chars and {} links from {} pages",
        text.chars().count(),
        links.len(),
        page_count
    );

    // ── Step 4: Credential ───────────────────────────────────────────────
    let credential = Credential::resolve(config.api_key.as_deref(), &config.api_key_env)?;
    let extractor = resolve_structured_extractor(config)?;

    // ── Step 5: Structured completion ────────────────────────────────────
    tracker.enter(PipelineStage::RequestingStructuredData);
    let completion_start = Instant::now();
    let extraction = extractor.extract(&text, &config.schema, &credential).await?;
    let completion_ms = completion_start.elapsed().as_millis() as u64;

    // ── Step 6: Merge links, derive filename ─────────────────────────────
    tracker.enter(PipelineStage::Merging);
    let full_name = extraction.full_name;
    let filename = artifact_filename(&full_name);
    if full_name.trim().is_empty() {
        warn!("Model returned an empty full_name; filename is '{}'", filename);
    }
    let document = merge::apply_links(&extraction.raw_json, &links)?;
    let resume = typed_view(&document);

    let stats = ParseStats {
        page_count,
        pages_used: config.pages.pages_used(page_count),
        text_chars: text.chars().count(),
        links_found: links.len(),
        input_tokens: extraction.input_tokens,
        output_tokens: extraction.output_tokens,
        extraction_ms,
        completion_ms,
        total_ms: total_start.elapsed().as_millis() as u64,
    };

    Ok(OutputArtifact {
        filename,
        full_name,
        document,
        resume,
        links,
        stats,
    })
}

/// The merged document as a [`Resume`], if it has that shape.
fn typed_view(document: &Map<String, Value>) -> Option<Resume> {
    match serde_json::from_value::<Resume>(Value::Object(document.clone())) {
        Ok(resume) => Some(resume),
        Err(e) => {
            debug!("Answer does not fit the built-in record ({}); keeping JSON only", e);
            None
        }
    }
}

/// Extract the scoped text from a staged upload; returns `(text, page_count)`.
async fn extract_text(
    staged: &StagedUpload,
    config: &ParserConfig,
) -> Result<(String, usize), ResumeParserError> {
    let extractor = resolve_text_extractor(config);
    let options = TextOptions {
        name: staged.name().to_string(),
        password: config.password.clone(),
    };

    let pages = extractor.extract_pages(staged.path(), &options).await?;
    let text = config.pages.select(&pages, staged.name())?;
    if text.trim().is_empty() {
        warn!("'{}' yielded no text (scanned PDF?)", staged.name());
    }
    Ok((text, pages.len()))
}

/// The configured text extractor, else pdfium.
fn resolve_text_extractor(config: &ParserConfig) -> Arc<dyn TextExtractor> {
    if let Some(ref extractor) = config.text_extractor {
        return Arc::clone(extractor);
    }
    match config.pdfium_library_path {
        Some(ref path) => Arc::new(PdfiumTextExtractor::with_library(path.clone())),
        None => Arc::new(PdfiumTextExtractor::new()),
    }
}

/// The configured structured extractor, else the OpenAI-compatible client.
fn resolve_structured_extractor(
    config: &ParserConfig,
) -> Result<Arc<dyn StructuredExtractor>, ResumeParserError> {
    if let Some(ref extractor) = config.structured_extractor {
        return Ok(Arc::clone(extractor));
    }
    Ok(Arc::new(OpenAiExtractor::from_config(config)?))
}
