//! PDF text extraction via pdfium.
//!
//! ## Why spawn_blocking?
//!
//! The `pdfium-render` crate wraps the pdfium C++ library, which uses
//! thread-local state internally and is not safe to call from async contexts.
//! `tokio::task::spawn_blocking` moves the work onto the blocking pool so the
//! Tokio workers never stall on a large document.
//!
//! The extractor returns one string per page ("unit"); choosing which units
//! reach the model is [`PageScope`]'s job, not the extractor's.

use crate::error::ResumeParserError;
use async_trait::async_trait;
use pdfium_render::prelude::*;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Which extracted units are sent to the model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum PageScope {
    /// Only the first page. (default)
    #[default]
    First,
    /// Every page, joined with a newline.
    All,
}

impl PageScope {
    /// Select the text for this scope, failing when there is nothing to select.
    pub fn select(self, pages: &[String], name: &str) -> Result<String, ResumeParserError> {
        if pages.is_empty() {
            return Err(ResumeParserError::EmptyDocument {
                name: name.to_string(),
            });
        }
        Ok(match self {
            PageScope::First => pages[0].clone(),
            PageScope::All => pages.join("\n"),
        })
    }

    /// Number of units this scope uses out of `total`.
    pub fn pages_used(self, total: usize) -> usize {
        match self {
            PageScope::First => total.min(1),
            PageScope::All => total,
        }
    }
}

/// Options forwarded to a [`TextExtractor`].
#[derive(Debug, Clone, Default)]
pub struct TextOptions {
    /// Display name of the upload, for error messages.
    pub name: String,
    pub password: Option<String>,
}

/// Turns a staged PDF into per-page text.
#[async_trait]
pub trait TextExtractor: Send + Sync {
    /// Text of every page, in document order.
    async fn extract_pages(
        &self,
        path: &Path,
        options: &TextOptions,
    ) -> Result<Vec<String>, ResumeParserError>;
}

/// [`TextExtractor`] backed by the pdfium library.
///
/// The library is looked up in this order: the explicit path given to
/// [`PdfiumTextExtractor::with_library`], `PDFIUM_LIB_PATH`, the current
/// directory, then the system library path.
#[derive(Debug, Clone, Default)]
pub struct PdfiumTextExtractor {
    library: Option<PathBuf>,
}

impl PdfiumTextExtractor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Use a specific libpdfium file, or a directory containing one.
    pub fn with_library(path: impl Into<PathBuf>) -> Self {
        Self {
            library: Some(path.into()),
        }
    }
}

#[async_trait]
impl TextExtractor for PdfiumTextExtractor {
    async fn extract_pages(
        &self,
        path: &Path,
        options: &TextOptions,
    ) -> Result<Vec<String>, ResumeParserError> {
        let path = path.to_path_buf();
        let options = options.clone();
        let library = self.library.clone();

        tokio::task::spawn_blocking(move || extract_pages_blocking(&path, &options, library.as_deref()))
            .await
            .map_err(|e| ResumeParserError::Internal(format!("Text extraction task panicked: {}", e)))?
    }
}

/// Resolve and bind the pdfium library.
fn bind_pdfium(library: Option<&Path>) -> Result<Pdfium, ResumeParserError> {
    let explicit = library
        .map(Path::to_path_buf)
        .or_else(|| std::env::var_os("PDFIUM_LIB_PATH").map(PathBuf::from));

    let bindings = match explicit {
        Some(p) => {
            let file = if p.is_dir() {
                Pdfium::pdfium_platform_library_name_at_path(&p)
            } else {
                p
            };
            Pdfium::bind_to_library(&file)
                .map_err(|e| ResumeParserError::PdfiumBindingFailed(format!("{}: {:?}", file.display(), e)))?
        }
        None => Pdfium::bind_to_library(Pdfium::pdfium_platform_library_name_at_path("./"))
            .or_else(|_| Pdfium::bind_to_system_library())
            .map_err(|e| ResumeParserError::PdfiumBindingFailed(format!("{:?}", e)))?,
    };

    Ok(Pdfium::new(bindings))
}

/// Blocking implementation of text extraction.
fn extract_pages_blocking(
    pdf_path: &Path,
    options: &TextOptions,
    library: Option<&Path>,
) -> Result<Vec<String>, ResumeParserError> {
    let pdfium = bind_pdfium(library)?;
    let password = options.password.as_deref();
    let name = options.name.clone();

    let document = pdfium.load_pdf_from_file(pdf_path, password).map_err(|e| {
        let err_str = format!("{:?}", e);
        if err_str.contains("Password") || err_str.contains("password") {
            if password.is_some() {
                ResumeParserError::WrongPassword { name: name.clone() }
            } else {
                ResumeParserError::PasswordRequired { name: name.clone() }
            }
        } else {
            ResumeParserError::CorruptPdf {
                name: name.clone(),
                detail: err_str,
            }
        }
    })?;

    let pages = document.pages();
    let total_pages = pages.len() as usize;
    info!("PDF loaded: {} pages", total_pages);

    let mut texts = Vec::with_capacity(total_pages);
    for (idx, page) in pages.iter().enumerate() {
        let text = page
            .text()
            .map_err(|e| ResumeParserError::CorruptPdf {
                name: name.clone(),
                detail: format!("page {}: {:?}", idx + 1, e),
            })?
            .all();
        debug!("Page {} → {} chars", idx + 1, text.chars().count());
        texts.push(text);
    }

    Ok(texts)
}
