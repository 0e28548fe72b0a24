//! Error types for the resume-parser library.
//!
//! Every failure is fatal for the request that raised it: there is no partial
//! artifact and no retry. What differs between failures is *what the user
//! should do next*, so each [`ResumeParserError`] variant belongs to exactly
//! one [`ErrorKind`]:
//!
//! * [`ErrorKind::NoFileProvided`]: nothing was uploaded; prompt for a file.
//! * [`ErrorKind::Extraction`]: the PDF itself is unusable; try another file.
//! * [`ErrorKind::Configuration`]: fix the environment (API key, PDF engine),
//!   re-uploading will not help.
//! * [`ErrorKind::RemoteService`]: the structured-completion call failed.
//!
//! Hosts branch on [`ResumeParserError::kind`] to render distinct messages.

use std::path::PathBuf;
use thiserror::Error;

/// All errors returned by the resume-parser library.
#[derive(Debug, Error)]
pub enum ResumeParserError {
    // ── Validation ───────────────────────────────────────────────────────
    /// Processing was triggered with no uploaded file.
    #[error("No resume uploaded. Please upload a PDF resume first.")]
    NoFileProvided,

    // ── Extraction errors ────────────────────────────────────────────────
    /// The upload is not a PDF document.
    #[error("'{name}' is not a valid PDF\nFirst bytes: {magic:?}")]
    NotAPdf { name: String, magic: Vec<u8> },

    /// The uploaded bytes could not be written to a temporary file.
    #[error("Failed to stage upload '{name}' for reading: {source}")]
    StagingFailed {
        name: String,
        #[source]
        source: std::io::Error,
    },

    /// PDF header/trailer/xref is corrupt and cannot be parsed.
    #[error("PDF '{name}' could not be read: {detail}")]
    CorruptPdf { name: String, detail: String },

    /// PDF requires a password but none was provided.
    #[error("PDF '{name}' is encrypted and requires a password.")]
    PasswordRequired { name: String },

    /// A password was provided but it is wrong.
    #[error("Wrong password for PDF '{name}'")]
    WrongPassword { name: String },

    /// The reader accepted the file but produced zero extractable units.
    #[error("PDF '{name}' contains no extractable pages")]
    EmptyDocument { name: String },

    // ── Configuration errors ─────────────────────────────────────────────
    /// No API credential is configured.
    #[error("API key is missing. Set the {env_var} environment variable (or add it to .env).")]
    MissingCredential { env_var: String },

    /// Builder validation failed.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// The target schema cannot be used for resume extraction.
    #[error("Invalid resume schema: {0}")]
    InvalidSchema(String),

    /// Could not bind to a pdfium library.
    #[error(
        "Failed to bind to pdfium library: {0}\n\
Set PDFIUM_LIB_PATH=/path/to/libpdfium or place the library next to the binary."
    )]
    PdfiumBindingFailed(String),

    // ── Remote service errors ────────────────────────────────────────────
    /// The API rejected the credential (401/403).
    #[error("Authentication error from '{endpoint}': {detail}")]
    AuthError { endpoint: String, detail: String },

    /// The API returned HTTP 429.
    #[error("Rate limit exceeded for '{endpoint}'")]
    RateLimitExceeded {
        endpoint: String,
        retry_after_secs: Option<u64>,
    },

    /// The structured-completion call timed out.
    #[error("Structured completion timed out after {secs}s")]
    ApiTimeout { secs: u64 },

    /// Any other API or transport failure.
    #[error("LLM API error: {message}")]
    LlmApiError { message: String },

    /// The model declined to produce the structured output.
    #[error("Model refused to extract the resume: {reason}")]
    Refusal { reason: String },

    /// The response did not conform to the requested schema.
    #[error("Response does not match the resume schema: {detail}")]
    SchemaViolation { detail: String },

    // ── Output errors ────────────────────────────────────────────────────
    /// Could not create or write the artifact file.
    #[error("Failed to write output file '{path}': {source}")]
    OutputWriteFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // ── Catch-all ────────────────────────────────────────────────────────
    /// Unexpected internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}

/// User-facing category of a [`ResumeParserError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
pub enum ErrorKind {
    NoFileProvided,
    Extraction,
    Configuration,
    RemoteService,
    Output,
    Internal,
}

impl ResumeParserError {
    /// The category that decides how a host presents this error.
    pub fn kind(&self) -> ErrorKind {
        use ResumeParserError::*;
        match self {
            NoFileProvided => ErrorKind::NoFileProvided,
            NotAPdf { .. }
            | StagingFailed { .. }
            | CorruptPdf { .. }
            | PasswordRequired { .. }
            | WrongPassword { .. }
            | EmptyDocument { .. } => ErrorKind::Extraction,
            MissingCredential { .. }
            | InvalidConfig(_)
            | InvalidSchema(_)
            | PdfiumBindingFailed(_) => ErrorKind::Configuration,
            AuthError { .. }
            | RateLimitExceeded { .. }
            | ApiTimeout { .. }
            | LlmApiError { .. }
            | Refusal { .. }
            | SchemaViolation { .. } => ErrorKind::RemoteService,
            OutputWriteFailed { .. } => ErrorKind::Output,
            Internal(_) => ErrorKind::Internal,
        }
    }

    /// True for errors the user resolves by changing configuration.
    pub fn is_configuration(&self) -> bool {
        self.kind() == ErrorKind::Configuration
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_credential_names_env_var() {
        let e = ResumeParserError::MissingCredential {
            env_var: "OPENAI_API_KEY".into(),
        };
        assert!(e.to_string().contains("OPENAI_API_KEY"));
        assert_eq!(e.kind(), ErrorKind::Configuration);
        assert!(e.is_configuration());
    }

    #[test]
    fn extraction_kinds() {
        let e = ResumeParserError::EmptyDocument {
            name: "cv.pdf".into(),
        };
        assert_eq!(e.kind(), ErrorKind::Extraction);
        assert!(e.to_string().contains("cv.pdf"));

        let e = ResumeParserError::NotAPdf {
            name: "cv.docx".into(),
            magic: b"PK\x03\x04".to_vec(),
        };
        assert_eq!(e.kind(), ErrorKind::Extraction);
    }

    #[test]
    fn remote_kinds_are_not_configuration() {
        let e = ResumeParserError::RateLimitExceeded {
            endpoint: "https://api.openai.com/v1".into(),
            retry_after_secs: Some(20),
        };
        assert_eq!(e.kind(), ErrorKind::RemoteService);
        assert!(!e.is_configuration());

        let e = ResumeParserError::ApiTimeout { secs: 120 };
        assert!(e.to_string().contains("120s"));
        assert_eq!(e.kind(), ErrorKind::RemoteService);
    }

    #[test]
    fn pdfium_binding_is_configuration() {
        let e = ResumeParserError::PdfiumBindingFailed("not found".into());
        assert_eq!(e.kind(), ErrorKind::Configuration);
        assert!(e.to_string().contains("PDFIUM_LIB_PATH"));
    }

    #[test]
    fn no_file_provided_is_its_own_kind() {
        assert_eq!(
            ResumeParserError::NoFileProvided.kind(),
            ErrorKind::NoFileProvided
        );
    }
}
