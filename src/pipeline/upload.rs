//! Upload staging: write the uploaded bytes to a uniquely named temp file.
//!
//! ## Why a temp file?
//!
//! pdfium opens documents from a path. Each request gets its own randomly
//! named `temp_resume_*.pdf` so concurrent sessions never collide, and the
//! file lives inside a [`NamedTempFile`] so it is removed when the
//! [`StagedUpload`] is dropped, on every exit path including `?` returns and
//! panics.

use crate::error::ResumeParserError;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use tracing::{debug, warn};

/// PDF readers accept the header anywhere in the first 1024 bytes.
const MAGIC_WINDOW: usize = 1024;

/// An uploaded file: a display name plus its bytes.
#[derive(Debug, Clone)]
pub struct UploadedFile {
    pub name: String,
    pub bytes: Vec<u8>,
}

impl UploadedFile {
    pub fn new(name: impl Into<String>, bytes: impl Into<Vec<u8>>) -> Self {
        Self {
            name: name.into(),
            bytes: bytes.into(),
        }
    }

    /// Read a local file as if it had been uploaded.
    pub async fn from_path(path: impl AsRef<Path>) -> Result<Self, ResumeParserError> {
        let path = path.as_ref();
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| path.display().to_string());
        let bytes = tokio::fs::read(path)
            .await
            .map_err(|source| ResumeParserError::StagingFailed {
                name: name.clone(),
                source,
            })?;
        Ok(Self { name, bytes })
    }

    /// True when the `%PDF` header appears within the first 1024 bytes.
    pub fn looks_like_pdf(&self) -> bool {
        let window = &self.bytes[..self.bytes.len().min(MAGIC_WINDOW)];
        window.windows(4).any(|w| w == b"%PDF")
    }
}

/// An upload written to disk for the duration of one request.
#[derive(Debug)]
pub struct StagedUpload {
    name: String,
    file: NamedTempFile,
}

impl StagedUpload {
    pub fn path(&self) -> &Path {
        self.file.path()
    }

    /// Original upload name, used in error messages.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Remove the temp file now, reporting (but not failing on) errors.
    ///
    /// Dropping a `StagedUpload` also removes the file; this just makes the
    /// success path explicit and logs failures.
    pub fn close(self) -> PathBuf {
        let path = self.file.path().to_path_buf();
        if let Err(e) = self.file.close() {
            warn!("Failed to remove staged upload {}: {}", path.display(), e);
        } else {
            debug!("Removed staged upload {}", path.display());
        }
        path
    }
}

/// Validate and stage `upload` under `temp_dir` (system temp dir if `None`).
pub async fn stage(
    upload: &UploadedFile,
    temp_dir: Option<&Path>,
) -> Result<StagedUpload, ResumeParserError> {
    if !upload.looks_like_pdf() {
        let magic = upload.bytes.iter().take(4).copied().collect();
        return Err(ResumeParserError::NotAPdf {
            name: upload.name.clone(),
            magic,
        });
    }

    let staging_err = |source: std::io::Error| ResumeParserError::StagingFailed {
        name: upload.name.clone(),
        source,
    };

    let mut builder = tempfile::Builder::new();
    builder.prefix("temp_resume_").suffix(".pdf");
    let file = match temp_dir {
        Some(dir) => builder.tempfile_in(dir),
        None => builder.tempfile(),
    }
    .map_err(staging_err)?;

    // Dropping `file` on a failed write removes it.
    tokio::fs::write(file.path(), &upload.bytes)
        .await
        .map_err(staging_err)?;

    debug!(
        "Staged '{}' ({} bytes) at {}",
        upload.name,
        upload.bytes.len(),
        file.path().display()
    );

    Ok(StagedUpload {
        name: upload.name.clone(),
        file,
    })
}
