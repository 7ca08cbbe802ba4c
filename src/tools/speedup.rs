//! Pitch-preserving tempo adjustment via ffmpeg's `atempo` filter.
//!
//! Used only for very large inputs (the `SegmentedWithSpeedup` strategy).
//! Failure here is a **non-fatal degradation**: the caller logs a warning
//! and continues with the original, unmodified audio.

use std::path::Path;
use std::process::Stdio;

use async_trait::async_trait;
use tokio::process::Command;

use crate::tools::ToolError;

// ---------------------------------------------------------------------------
// AudioTransform trait
// ---------------------------------------------------------------------------

/// Capability interface for time-compressing an audio file without shifting
/// pitch.  Object-safe and `Send + Sync` so it can be held behind an
/// `Arc<dyn AudioTransform>` and substituted with a fake in tests.
#[async_trait]
pub trait AudioTransform: Send + Sync {
    /// Write a copy of `input` to `output` with tempo multiplied by
    /// `factor` (> 1.0) and pitch preserved.
    async fn speed_up(&self, input: &Path, output: &Path, factor: f64) -> Result<(), ToolError>;
}

// ---------------------------------------------------------------------------
// FfmpegTempo
// ---------------------------------------------------------------------------

/// Production transform backed by `ffmpeg -filter:a atempo=F`.
#[derive(Debug, Clone, Default)]
pub struct FfmpegTempo;

impl FfmpegTempo {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl AudioTransform for FfmpegTempo {
    async fn speed_up(&self, input: &Path, output: &Path, factor: f64) -> Result<(), ToolError> {
        let out = Command::new("ffmpeg")
            .arg("-i")
            .arg(input)
            .arg("-filter:a")
            .arg(format!("atempo={factor}"))
            .arg("-y")
            .arg(output)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .output()
            .await
            .map_err(|e| ToolError::Io {
                tool: "ffmpeg".into(),
                source: e,
            })?;

        if !out.status.success() {
            let stderr = String::from_utf8_lossy(&out.stderr);
            return Err(ToolError::Failed {
                tool: "ffmpeg".into(),
                message: format!("exit {:?}: {}", out.status.code(), stderr.trim()),
            });
        }

        if !output.exists() {
            return Err(ToolError::MissingOutput {
                tool: "ffmpeg".into(),
                path: output.display().to_string(),
            });
        }

        Ok(())
    }
}
