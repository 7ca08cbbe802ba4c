//! Immutable per-session audio buffer and WAV container encoding.
//!
//! [`AudioBuffer`] holds the raw S16_LE PCM bytes of one recording session
//! together with the stream metadata needed to wrap them into a
//! self-contained WAV container via the `hound` crate.

use std::io::Cursor;

use crate::audio::AudioError;
use crate::config::AudioConfig;

// ---------------------------------------------------------------------------
// AudioBuffer
// ---------------------------------------------------------------------------

/// Raw PCM samples plus stream metadata.  Immutable once constructed and
/// owned exclusively by the pipeline invocation that consumes it.
#[derive(Debug, Clone)]
pub struct AudioBuffer {
    /// Raw little-endian signed 16-bit PCM bytes.
    data: Vec<u8>,
    /// Sample rate in Hz.
    pub sample_rate: u32,
    /// Channel count.
    pub channels: u16,
    /// Bits per sample.
    pub bits_per_sample: u16,
}

impl AudioBuffer {
    /// Build a buffer from raw PCM bytes and explicit stream metadata.
    pub fn new(data: Vec<u8>, sample_rate: u32, channels: u16, bits_per_sample: u16) -> Self {
        Self {
            data,
            sample_rate,
            channels,
            bits_per_sample,
        }
    }

    /// Build a buffer from raw PCM bytes using the capture configuration's
    /// stream metadata.
    pub fn from_config(data: Vec<u8>, config: &AudioConfig) -> Self {
        Self::new(
            data,
            config.sample_rate,
            config.channels,
            config.bits_per_sample,
        )
    }

    /// Raw PCM payload size in bytes.
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Whether the buffer holds no samples.
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Wrap the raw PCM payload into a complete in-memory WAV container.
    ///
    /// A trailing odd byte (a torn sample from a killed capture process) is
    /// dropped rather than treated as an error.
    ///
    /// # Errors
    ///
    /// Returns [`AudioError::Encode`] if the container cannot be written —
    /// in practice only when the metadata describes an unsupported spec.
    pub fn encode_wav(&self) -> Result<Vec<u8>, AudioError> {
        let spec = hound::WavSpec {
            channels: self.channels,
            sample_rate: self.sample_rate,
            bits_per_sample: self.bits_per_sample,
            sample_format: hound::SampleFormat::Int,
        };

        let mut cursor = Cursor::new(Vec::new());
        {
            let mut writer = hound::WavWriter::new(&mut cursor, spec)
                .map_err(|e| AudioError::Encode(e.to_string()))?;

            for frame in self.data.chunks_exact(2) {
                let sample = i16::from_le_bytes([frame[0], frame[1]]);
                writer
                    .write_sample(sample)
                    .map_err(|e| AudioError::Encode(e.to_string()))?;
            }

            writer
                .finalize()
                .map_err(|e| AudioError::Encode(e.to_string()))?;
        }

        Ok(cursor.into_inner())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
