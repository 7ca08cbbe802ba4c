//! External audio tool invocation — ffmpeg tempo adjustment and sox
//! silence splitting, each behind a narrow capability trait so the pipeline
//! can be tested with deterministic fakes.
//!
//! * [`AudioTransform`] / [`FfmpegTempo`] — pitch-preserving time compression.
//! * [`AudioSplitter`] / [`SoxSilenceSplitter`] — silence-boundary segmentation.
//! * [`ensure_tool`] — preflight availability check run before a session.

pub mod speedup;
pub mod splitter;

pub use speedup::{AudioTransform, FfmpegTempo};
pub use splitter::{AudioSplitter, Segment, SoxSilenceSplitter};

use thiserror::Error;

// ---------------------------------------------------------------------------
// ToolError
// ---------------------------------------------------------------------------

/// All errors that can surface from external tool invocation.
#[derive(Debug, Error)]
pub enum ToolError {
    /// The tool binary is not on PATH.  Checked before a run starts; fatal
    /// to starting that run.
    #[error("required tool not found on PATH: {tool}")]
    Unavailable { tool: String },

    /// The tool ran but exited with a non-zero status.
    #[error("{tool} failed: {message}")]
    Failed { tool: String, message: String },

    /// The tool exited successfully but its expected output file is missing.
    #[error("{tool} produced no output at {path}")]
    MissingOutput { tool: String, path: String },

    /// Spawning or waiting on the child process failed.
    #[error("I/O error running {tool}: {source}")]
    Io {
        tool: String,
        #[source]
        source: std::io::Error,
    },
}

// ---------------------------------------------------------------------------
// Preflight
// ---------------------------------------------------------------------------

/// Whether `tool` can be spawned at all.
///
/// The exit status is irrelevant — many tools reject `--version` spellings —
/// only a failure to locate the binary counts as unavailable.
pub fn command_available(tool: &str) -> bool {
    std::process::Command::new(tool)
        .arg("--version")
        .stdout(std::process::Stdio::null())
        .stderr(std::process::Stdio::null())
        .stdin(std::process::Stdio::null())
        .status()
        .is_ok()
}

/// Preflight check: error if `tool` is not spawnable.
pub fn ensure_tool(tool: &str) -> Result<(), ToolError> {
    if command_available(tool) {
        Ok(())
    } else {
        Err(ToolError::Unavailable {
            tool: tool.to_string(),
        })
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
