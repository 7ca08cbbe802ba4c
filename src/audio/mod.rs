//! Audio module — raw PCM capture and WAV container encoding.
//!
//! # Pipeline
//!
//! ```text
//! arecord (raw S16_LE) → Recorder → AudioBuffer → encode_wav() → Vec<u8>
//! ```
//!
//! The [`AudioBuffer`] produced by one recording session is consumed by
//! exactly one pipeline run; it is never mutated after construction.

pub mod buffer;
pub mod capture;

pub use buffer::AudioBuffer;
pub use capture::Recorder;

use thiserror::Error;

// ---------------------------------------------------------------------------
// AudioError
// ---------------------------------------------------------------------------

/// All errors that can surface in the audio subsystem.
#[derive(Debug, Error)]
pub enum AudioError {
    /// The capture tool could not be spawned.
    #[error("failed to start arecord: {0}")]
    CaptureStart(String),

    /// Reading the capture stream failed mid-recording.
    #[error("capture stream error: {0}")]
    CaptureStream(String),

    /// The recording produced no samples at all.
    #[error("no audio data captured")]
    EmptyRecording,

    /// WAV container encoding failed.
    #[error("WAV encoding failed: {0}")]
    Encode(String),
}
