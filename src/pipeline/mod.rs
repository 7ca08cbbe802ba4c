//! Adaptive transcription pipeline.
//!
//! The pipeline decides, purely from encoded audio size, whether to
//! transcribe in one shot or to degrade through preprocessing, silence
//! segmentation, bounded-concurrency per-segment transcription with model
//! fallback, and ordered reassembly — retaining the original audio for
//! later recovery whenever a run fails.
//!
//! # Flow
//!
//! ```text
//! AudioBuffer → encode_wav
//!      │
//!      ▼
//! classify(size)
//!      ├─ Direct ───────────────────────────▶ one primary-model call
//!      └─ Segmented[WithSpeedup]
//!            ├─ [speedup] ffmpeg atempo   (failure = degrade, keep original)
//!            ├─ sox silence split         (failure/empty = whole-buffer
//!            │                             fallback-model call)
//!            ├─ WorkerPool fan-out/fan-in (primary → fallback per unit)
//!            └─ aggregate (sort, drop empty, join)
//!      │
//!      ▼
//! publish to TextSink ── ok ──▶ clear recovery file, SessionOutcome::text
//!      └────────────── fail ──▶ retain WAV,          SessionOutcome::retained
//! ```

pub mod aggregator;
pub mod classifier;
pub mod runner;

pub use aggregator::aggregate;
pub use classifier::{classify, Strategy};
pub use runner::PipelineRunner;

use std::path::PathBuf;

use thiserror::Error;

use crate::tools::ToolError;
use crate::transcribe::TranscribeError;

// ---------------------------------------------------------------------------
// PipelineError
// ---------------------------------------------------------------------------

/// Run-level pipeline failures.
///
/// Unit-level failures (a segment failing one model) never surface here —
/// they are absorbed by the worker pool's fallback policy and only escalate
/// when no further fallback is defined for the stage.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// Aggregation yielded no text: every segment failed or came back empty.
    #[error("no segment produced any text")]
    AllSegmentsFailed,

    /// A whole-buffer transcription attempt (direct strategy, or the
    /// fallback after a segmenter failure) failed terminally.
    #[error("transcription failed: {0}")]
    Transcription(#[from] TranscribeError),

    /// A required external tool could not be invoked.
    #[error(transparent)]
    Tool(#[from] ToolError),

    /// Scratch-area or retained-file I/O failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The transcript was produced but could not be handed to the consuming
    /// surface.  Treated as a failed run for retention purposes.
    #[error("delivery failed: {0}")]
    Delivery(String),
}

// ---------------------------------------------------------------------------
// SessionOutcome
// ---------------------------------------------------------------------------

/// Terminal result of one pipeline run.
///
/// Exactly one field is meaningfully populated: success yields `final_text`
/// and no retained file; failure yields a retained-file path and no text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionOutcome {
    pub final_text: Option<String>,
    pub retained_audio: Option<PathBuf>,
}

impl SessionOutcome {
    pub fn succeeded(text: String) -> Self {
        Self {
            final_text: Some(text),
            retained_audio: None,
        }
    }

    pub fn failed(retained_audio: Option<PathBuf>) -> Self {
        Self {
            final_text: None,
            retained_audio,
        }
    }

    pub fn is_success(&self) -> bool {
        self.final_text.is_some()
    }
}
