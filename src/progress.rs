//! Observer trait for per-request pipeline state.
//!
//! A request moves through
//! `Uploading → Extracting → RequestingStructuredData → Merging → Ready`, or
//! jumps to `Failed` from whichever stage raised the error. `Ready` and
//! `Failed` are terminal for that request; the next upload starts again from
//! `Idle`.
//!
//! Inject an [`Arc<dyn PipelineObserver>`] via
//! [`crate::config::ParserConfigBuilder::observer`] to drive a spinner, a log
//! line or a UI status badge.
//!
//! # Example
//!
//! ```rust
//! use resume_parser::{ParserConfig, PipelineObserver, PipelineStage};
//! use std::sync::Arc;
//!
//! struct Printer;
//!
//! impl PipelineObserver for Printer {
//!     fn on_stage(&self, stage: PipelineStage) {
//!         eprintln!("→ {stage}");
//!     }
//! }
//!
//! let config = ParserConfig::builder()
//!     .observer(Arc::new(Printer) as Arc<dyn PipelineObserver>)
//!     .build()
//!     .unwrap();
//! ```

use serde::Serialize;
use std::fmt;
use std::sync::Arc;

/// Stage of a single parse request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum PipelineStage {
    Idle,
    Uploading,
    Extracting,
    RequestingStructuredData,
    Merging,
    Ready,
    Failed,
}

impl PipelineStage {
    /// True for `Ready` and `Failed`.
    pub fn is_terminal(self) -> bool {
        matches!(self, PipelineStage::Ready | PipelineStage::Failed)
    }
}

impl fmt::Display for PipelineStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            PipelineStage::Idle => "idle",
            PipelineStage::Uploading => "staging upload",
            PipelineStage::Extracting => "extracting text",
            PipelineStage::RequestingStructuredData => "requesting structured data",
            PipelineStage::Merging => "merging links",
            PipelineStage::Ready => "ready",
            PipelineStage::Failed => "failed",
        };
        f.write_str(label)
    }
}

/// Called by the orchestrator as a request changes stage.
///
/// All methods default to no-ops so implementors override only what they
/// need.
pub trait PipelineObserver: Send + Sync {
    /// Called on entry to each non-terminal stage.
    fn on_stage(&self, stage: PipelineStage) {
        let _ = stage;
    }

    /// Called once when the request fails.
    ///
    /// # Arguments
    /// * `stage`: the stage that was active when the error was raised
    /// * `error`: human-readable error description
    fn on_failed(&self, stage: PipelineStage, error: &str) {
        let _ = (stage, error);
    }

    /// Called once when the artifact is ready.
    ///
    /// # Arguments
    /// * `filename`   : download filename of the artifact
    /// * `links_found`: number of links merged into the result
    fn on_ready(&self, filename: &str, links_found: usize) {
        let _ = (filename, links_found);
    }
}

/// Observer used when none is configured.
pub struct NoopObserver;

impl PipelineObserver for NoopObserver {}

/// Convenience alias matching the type stored in [`crate::config::ParserConfig`].
pub type ObserverHandle = Arc<dyn PipelineObserver>;

/// Tracks the active stage of one request and forwards transitions.
pub(crate) struct StageTracker<'a> {
    observer: Option<&'a dyn PipelineObserver>,
    current: PipelineStage,
}

impl<'a> StageTracker<'a> {
    pub(crate) fn new(observer: Option<&'a dyn PipelineObserver>) -> Self {
        Self {
            observer,
            current: PipelineStage::Idle,
        }
    }

    pub(crate) fn enter(&mut self, stage: PipelineStage) {
        tracing::debug!("stage: {} → {}", self.current, stage);
        self.current = stage;
        if let Some(observer) = self.observer {
            observer.on_stage(stage);
        }
    }

    pub(crate) fn current(&self) -> PipelineStage {
        self.current
    }

    pub(crate) fn fail(&mut self, error: &str) {
        let failed_in = self.current;
        self.current = PipelineStage::Failed;
        if let Some(observer) = self.observer {
            observer.on_failed(failed_in, error);
        }
    }

    pub(crate) fn ready(&mut self, filename: &str, links_found: usize) {
        self.current = PipelineStage::Ready;
        if let Some(observer) = self.observer {
            observer.on_ready(filename, links_found);
        }
    }
}
