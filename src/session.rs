//! Interactive session state: one displayed result, replaced on success.
//!
//! Mirrors a single-user upload page. A missing upload is reported without
//! running the pipeline, and a failed request leaves the previously
//! displayed result in place.

use crate::config::ParserConfig;
use crate::error::ResumeParserError;
use crate::output::OutputArtifact;
use crate::parse::parse_resume_staged;
use crate::pipeline::upload::UploadedFile;
use crate::progress::PipelineStage;
use tracing::debug;

/// Holds the most recent successful artifact and the state of the last request.
#[derive(Debug, Default)]
pub struct ResumeSession {
    last: Option<OutputArtifact>,
    state: SessionState,
}

/// Outcome of the most recent request in a session.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum SessionState {
    #[default]
    Idle,
    /// Processing was triggered without an upload; nothing ran.
    AwaitingUpload,
    Ready,
    Failed {
        /// Stage that was active when the request failed.
        stage: PipelineStage,
        message: String,
    },
}

impl ResumeSession {
    pub fn new() -> Self {
        Self::default()
    }

    /// Run one parse request.
    ///
    /// On success the new artifact replaces the displayed one and is
    /// returned. On failure the error is returned and [`Self::last`] still
    /// yields the previous artifact, if any.
    pub async fn process(
        &mut self,
        upload: Option<UploadedFile>,
        config: &ParserConfig,
    ) -> Result<&OutputArtifact, ResumeParserError> {
        let Some(upload) = upload else {
            self.state = SessionState::AwaitingUpload;
            return Err(ResumeParserError::NoFileProvided);
        };

        match parse_resume_staged(&upload, config).await {
            Ok(artifact) => {
                self.state = SessionState::Ready;
                Ok(self.last.insert(artifact))
            }
            Err((stage, e)) => {
                debug!("Keeping previous result after failure: {}", e);
                self.state = SessionState::Failed {
                    stage,
                    message: e.to_string(),
                };
                Err(e)
            }
        }
    }

    /// The artifact currently displayed.
    pub fn last(&self) -> Option<&OutputArtifact> {
        self.last.as_ref()
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    /// `(filename, bytes)` for the download button. The bytes are exactly
    /// the displayed document rendered as 4-space-indented JSON.
    pub fn download(&self) -> Result<Option<(String, Vec<u8>)>, ResumeParserError> {
        match self.last {
            Some(ref artifact) => {
                let json = artifact.to_json_pretty()?;
                Ok(Some((artifact.filename.clone(), json.into_bytes())))
            }
            None => Ok(None),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn missing_upload_is_reported_without_running() {
        let mut session = ResumeSession::new();
        let config = ParserConfig::default();

        let err = session.process(None, &config).await.unwrap_err();
        assert!(matches!(err, ResumeParserError::NoFileProvided));
        assert_eq!(session.state(), &SessionState::AwaitingUpload);
        assert!(session.last().is_none());
        assert!(session.download().unwrap().is_none());
    }

    #[tokio::test]
    async fn non_pdf_upload_fails_in_upload_stage() {
        let mut session = ResumeSession::new();
        let config = ParserConfig::default();
        let upload = UploadedFile::new("notes.txt", b"hello".to_vec());

        let err = session.process(Some(upload), &config).await.unwrap_err();
        assert!(matches!(err, ResumeParserError::NotAPdf { .. }));
        match session.state() {
            SessionState::Failed { stage, .. } => assert_eq!(*stage, PipelineStage::Uploading),
            other => panic!("unexpected state {other:?}"),
        }
    }
}
