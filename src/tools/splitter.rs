//! Silence-boundary segmentation via sox.
//!
//! Sox writes numbered `segment_NNN.wav` files whose lexicographic order is
//! their temporal order.  Discovery assigns each segment an explicit dense
//! index at that point; nothing downstream ever re-derives ordering from
//! path strings again.

use std::path::{Path, PathBuf};
use std::process::Stdio;

use async_trait::async_trait;
use tokio::process::Command;

use crate::tools::ToolError;

// ---------------------------------------------------------------------------
// Segment
// ---------------------------------------------------------------------------

/// One silence-delimited slice of the source audio.
///
/// `index` is 0-based, dense and unique, assigned in discovery order.
/// Segments are created only by a splitter and are read-only afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Segment {
    pub index: usize,
    pub path: PathBuf,
}

// ---------------------------------------------------------------------------
// AudioSplitter trait
// ---------------------------------------------------------------------------

/// Capability interface for splitting an audio file at silence boundaries.
///
/// Returns segments in temporal order.  An empty result is valid output and
/// means the tool found nothing to split — the caller treats it the same as
/// a failure (whole-buffer fallback transcription).
#[async_trait]
pub trait AudioSplitter: Send + Sync {
    async fn split(&self, input: &Path, out_dir: &Path) -> Result<Vec<Segment>, ToolError>;
}

// ---------------------------------------------------------------------------
// SoxSilenceSplitter
// ---------------------------------------------------------------------------

/// Production splitter backed by sox's `silence … : newfile : restart`
/// effect chain.
#[derive(Debug, Clone)]
pub struct SoxSilenceSplitter {
    /// Relative amplitude below which audio counts as silence (e.g. `"1%"`).
    pub silence_threshold: String,
    /// Minimum silence duration in seconds that ends a segment.
    pub min_silence_secs: f64,
}

impl SoxSilenceSplitter {
    pub fn new(silence_threshold: impl Into<String>, min_silence_secs: f64) -> Self {
        Self {
            silence_threshold: silence_threshold.into(),
            min_silence_secs,
        }
    }
}

#[async_trait]
impl AudioSplitter for SoxSilenceSplitter {
    async fn split(&self, input: &Path, out_dir: &Path) -> Result<Vec<Segment>, ToolError> {
        tokio::fs::create_dir_all(out_dir)
            .await
            .map_err(|e| ToolError::Io {
                tool: "sox".into(),
                source: e,
            })?;

        let pattern = out_dir.join("segment_%03d.wav");

        let out = Command::new("sox")
            .arg(input)
            .arg(&pattern)
            .args(["silence", "1", "0.1", &self.silence_threshold])
            .args([
                "1",
                &self.min_silence_secs.to_string(),
                &self.silence_threshold,
            ])
            .args([":", "newfile", ":", "restart"])
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .output()
            .await
            .map_err(|e| ToolError::Io {
                tool: "sox".into(),
                source: e,
            })?;

        if !out.status.success() {
            let stderr = String::from_utf8_lossy(&out.stderr);
            return Err(ToolError::Failed {
                tool: "sox".into(),
                message: format!("exit {:?}: {}", out.status.code(), stderr.trim()),
            });
        }

        discover_segments(out_dir).map_err(|e| ToolError::Io {
            tool: "sox".into(),
            source: e,
        })
    }
}

/// Collect `segment_*.wav` files from `dir` in lexicographic (= temporal)
/// order and assign dense indexes in that discovery order.
pub(crate) fn discover_segments(dir: &Path) -> std::io::Result<Vec<Segment>> {
    let mut paths: Vec<PathBuf> = std::fs::read_dir(dir)?
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|p| {
            p.file_name()
                .and_then(|n| n.to_str())
                .is_some_and(|n| n.starts_with("segment_") && n.ends_with(".wav"))
        })
        .collect();

    paths.sort();

    Ok(paths
        .into_iter()
        .enumerate()
        .map(|(index, path)| Segment { index, path })
        .collect())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn touch(dir: &Path, name: &str) {
        std::fs::write(dir.join(name), b"x").expect("write");
    }

    /// Indexes are dense, 0-based, and follow lexicographic filename order
    /// regardless of creation order.
    #[test]
    fn discovery_assigns_dense_ordered_indexes() {
        let dir = tempdir().expect("temp dir");
        touch(dir.path(), "segment_002.wav");
        touch(dir.path(), "segment_000.wav");
        touch(dir.path(), "segment_001.wav");

        let segments = discover_segments(dir.path()).expect("discover");

        assert_eq!(segments.len(), 3);
        for (i, seg) in segments.iter().enumerate() {
            assert_eq!(seg.index, i);
            assert!(seg
                .path
                .file_name()
                .unwrap()
                .to_str()
                .unwrap()
                .contains(&format!("{i:03}")));
        }
    }

    /// Files outside the naming pattern are ignored.
    #[test]
    fn discovery_ignores_foreign_files() {
        let dir = tempdir().expect("temp dir");
        touch(dir.path(), "segment_000.wav");
        touch(dir.path(), "input.wav");
        touch(dir.path(), "segment_001.tmp");
        touch(dir.path(), "notes.txt");

        let segments = discover_segments(dir.path()).expect("discover");
        assert_eq!(segments.len(), 1);
        assert_eq!(segments[0].index, 0);
    }

    /// An empty directory yields zero segments, not an error.
    #[test]
    fn discovery_of_empty_dir_is_empty() {
        let dir = tempdir().expect("temp dir");
        let segments = discover_segments(dir.path()).expect("discover");
        assert!(segments.is_empty());
    }
}
