//! Raw PCM capture via an `arecord` child process.
//!
//! [`Recorder::start`] spawns `arecord` producing raw S16_LE PCM on stdout
//! and accumulates it on a background task.  [`Recorder::stop`] terminates
//! the child, drains what was captured and hands back an [`AudioBuffer`].
//!
//! The daemon owns at most one live `Recorder` at a time; starting a second
//! recording while one is active is prevented by the caller, not here.

use std::process::Stdio;

use tokio::io::AsyncReadExt;
use tokio::process::{Child, Command};
use tokio::task::JoinHandle;

use crate::audio::{AudioBuffer, AudioError};
use crate::config::AudioConfig;

// ---------------------------------------------------------------------------
// Recorder
// ---------------------------------------------------------------------------

/// A live capture session wrapping one `arecord` child process.
pub struct Recorder {
    child: Child,
    reader: JoinHandle<std::io::Result<Vec<u8>>>,
    config: AudioConfig,
}

/// Build the `arecord` argument list for the given capture configuration.
///
/// `-t raw` keeps the container format out of the stream — the pipeline
/// wraps the payload itself so segment byte ranges stay self-describing.
pub fn arecord_args(config: &AudioConfig) -> Vec<String> {
    vec![
        "-D".into(),
        config.device.clone(),
        "-f".into(),
        "S16_LE".into(),
        "-r".into(),
        config.sample_rate.to_string(),
        "-c".into(),
        config.channels.to_string(),
        "-t".into(),
        "raw".into(),
    ]
}

impl Recorder {
    /// Spawn `arecord` and begin accumulating its stdout.
    ///
    /// # Errors
    ///
    /// Returns [`AudioError::CaptureStart`] when the child cannot be spawned
    /// (tool missing, device busy, permissions).
    pub fn start(config: &AudioConfig) -> Result<Self, AudioError> {
        let mut child = Command::new("arecord")
            .args(arecord_args(config))
            .stdout(Stdio::piped())
            .stderr(Stdio::null())
            .spawn()
            .map_err(|e| AudioError::CaptureStart(e.to_string()))?;

        let mut stdout = child
            .stdout
            .take()
            .ok_or_else(|| AudioError::CaptureStart("arecord stdout not piped".into()))?;

        // Accumulate until the pipe closes (i.e. until stop() kills arecord).
        let reader = tokio::spawn(async move {
            let mut data = Vec::new();
            stdout.read_to_end(&mut data).await.map(|_| data)
        });

        log::info!("recording started (device={})", config.device);

        Ok(Self {
            child,
            reader,
            config: config.clone(),
        })
    }

    /// Terminate the capture process and collect everything recorded so far.
    ///
    /// # Errors
    ///
    /// * [`AudioError::CaptureStream`] — the reader task failed or panicked.
    /// * [`AudioError::EmptyRecording`] — the session produced zero bytes.
    pub async fn stop(mut self) -> Result<AudioBuffer, AudioError> {
        // SIGKILL is fine here: arecord holds no state worth flushing and
        // the pipe EOF is what unblocks the reader task.
        let _ = self.child.start_kill();
        let _ = self.child.wait().await;

        let data = self
            .reader
            .await
            .map_err(|e| AudioError::CaptureStream(e.to_string()))?
            .map_err(|e| AudioError::CaptureStream(e.to_string()))?;

        if data.is_empty() {
            return Err(AudioError::EmptyRecording);
        }

        log::info!("recording stopped ({} bytes captured)", data.len());
        Ok(AudioBuffer::from_config(data, &self.config))
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    /// The argument list must request raw S16_LE at the configured rate.
    #[test]
    fn arecord_args_match_config() {
        let config = AudioConfig::default();
        let args = arecord_args(&config);
        assert_eq!(
            args,
            vec!["-D", "default", "-f", "S16_LE", "-r", "16000", "-c", "1", "-t", "raw"]
        );
    }

    /// Non-default device and rate flow through to the arguments.
    #[test]
    fn arecord_args_respect_overrides() {
        let config = AudioConfig {
            device: "hw:1,0".into(),
            sample_rate: 48_000,
            channels: 2,
            bits_per_sample: 16,
        };
        let args = arecord_args(&config);
        assert!(args.windows(2).any(|w| w == ["-D", "hw:1,0"]));
        assert!(args.windows(2).any(|w| w == ["-r", "48000"]));
        assert!(args.windows(2).any(|w| w == ["-c", "2"]));
    }
}
