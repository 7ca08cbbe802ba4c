//! Pipeline orchestrator — drives one encoded audio container to a terminal
//! [`SessionOutcome`].
//!
//! All collaborators arrive as `Arc<dyn …>` capability traits so the runner
//! holds no process-wide state: one [`PipelineRunner::run`] call is one
//! self-contained session, and tests drive it with deterministic fakes.
//!
//! # Degradation ladder
//!
//! * Speed-adjust failure → log, continue with the original audio.
//! * Segmenter failure or zero segments → one whole-buffer transcription on
//!   the **fallback** model (an unusual input already defeated the primary
//!   path once).
//! * Per-segment failure → absorbed by the worker pool's fallback policy.
//! * Everything else → run failure, audio retained for recovery.

use std::sync::Arc;
use std::time::Duration;

use crate::audio::AudioBuffer;
use crate::config::AppConfig;
use crate::deliver::TextSink;
use crate::pipeline::{aggregate, classify, PipelineError, SessionOutcome, Strategy};
use crate::recovery::RecoveryStore;
use crate::tools::{AudioSplitter, AudioTransform};
use crate::transcribe::{Transcriber, WorkerPool};

// ---------------------------------------------------------------------------
// PipelineRunner
// ---------------------------------------------------------------------------

/// Orchestrates classification, preprocessing, segmentation, concurrent
/// transcription, reassembly, delivery and retention for one session.
pub struct PipelineRunner {
    config: AppConfig,
    transcriber: Arc<dyn Transcriber>,
    transform: Arc<dyn AudioTransform>,
    splitter: Arc<dyn AudioSplitter>,
    sink: Arc<dyn TextSink>,
    recovery: RecoveryStore,
}

impl PipelineRunner {
    pub fn new(
        config: AppConfig,
        transcriber: Arc<dyn Transcriber>,
        transform: Arc<dyn AudioTransform>,
        splitter: Arc<dyn AudioSplitter>,
        sink: Arc<dyn TextSink>,
        recovery: RecoveryStore,
    ) -> Self {
        Self {
            config,
            transcriber,
            transform,
            splitter,
            sink,
            recovery,
        }
    }

    /// The recovery store this runner retains to / clears.
    pub fn recovery(&self) -> &RecoveryStore {
        &self.recovery
    }

    /// Run one session from raw captured audio.
    pub async fn run(&self, audio: AudioBuffer) -> SessionOutcome {
        let wav = match audio.encode_wav() {
            Ok(wav) => wav,
            Err(e) => {
                // Nothing encodable exists, so there is nothing to retain.
                log::error!("cannot encode captured audio: {e}");
                return SessionOutcome::failed(None);
            }
        };
        self.run_encoded(wav).await
    }

    /// Run one session from an already-encoded WAV container — the entry
    /// point shared with the recovery binary, which feeds a previously
    /// retained file back through the identical pipeline.
    pub async fn run_encoded(&self, wav: Vec<u8>) -> SessionOutcome {
        self.run_with(wav, None).await
    }

    /// Run one session forced onto the Direct strategy regardless of size.
    ///
    /// Used when the segmentation tools are unavailable: one primary-model
    /// whole-buffer call instead of a split that is known to fail.
    pub async fn run_direct(&self, wav: Vec<u8>) -> SessionOutcome {
        self.run_with(wav, Some(Strategy::Direct)).await
    }

    async fn run_with(&self, wav: Vec<u8>, forced: Option<Strategy>) -> SessionOutcome {
        match self.transcribe_adaptive(&wav, forced).await {
            Ok(text) if !text.is_empty() => match self.publish(&text).await {
                Ok(()) => {
                    if let Err(e) = self.recovery.clear() {
                        log::warn!("could not clear retained audio: {e}");
                    }
                    SessionOutcome::succeeded(text)
                }
                Err(e) => {
                    log::warn!("{e}");
                    self.retain(&wav)
                }
            },
            Ok(_) => {
                log::warn!("transcription produced no text");
                self.retain(&wav)
            }
            Err(e) => {
                log::warn!("pipeline failed: {e}");
                self.retain(&wav)
            }
        }
    }

    // -----------------------------------------------------------------------
    // Stages
    // -----------------------------------------------------------------------

    /// Pick a strategy from the encoded size and run it to a transcript.
    async fn transcribe_adaptive(
        &self,
        wav: &[u8],
        forced: Option<Strategy>,
    ) -> Result<String, PipelineError> {
        let strategy = forced.unwrap_or_else(|| classify(wav.len() as u64, &self.config.pipeline));
        log::info!(
            "audio size {:.2} MB → {strategy} strategy",
            wav.len() as f64 / (1024.0 * 1024.0)
        );

        match strategy {
            Strategy::Direct => {
                let text = self
                    .transcriber
                    .transcribe(wav, &self.config.gemini.model, self.single_shot_timeout())
                    .await?;
                Ok(text)
            }
            Strategy::Segmented => self.transcribe_segmented(wav, false).await,
            Strategy::SegmentedWithSpeedup => self.transcribe_segmented(wav, true).await,
        }
    }

    /// The degraded path: optional speedup, silence segmentation, concurrent
    /// per-segment transcription, ordered reassembly.
    async fn transcribe_segmented(
        &self,
        wav: &[u8],
        speedup: bool,
    ) -> Result<String, PipelineError> {
        // Scratch area lives for the whole stage; its Drop removes it
        // unconditionally, error paths included.
        let scratch = tempfile::tempdir()?;
        let input = scratch.path().join("input.wav");
        tokio::fs::write(&input, wav).await?;

        let mut source = input.clone();
        if speedup {
            let sped = scratch.path().join("speed.wav");
            let factor = self.config.pipeline.speed_factor;
            match self.transform.speed_up(&input, &sped, factor).await {
                Ok(()) => {
                    log::info!("audio time-compressed {factor}x");
                    source = sped;
                }
                Err(e) => {
                    // Non-fatal degradation: segmentation proceeds on the
                    // original audio.
                    log::warn!("speed-adjust failed ({e}), continuing with original audio");
                }
            }
        }

        let seg_dir = scratch.path().join("segments");
        let segments = match self.splitter.split(&source, &seg_dir).await {
            Ok(segments) if !segments.is_empty() => segments,
            Ok(_) => {
                log::warn!("splitter produced no segments, falling back to whole-buffer");
                return self.whole_buffer_fallback(wav).await;
            }
            Err(e) => {
                log::warn!("splitter failed ({e}), falling back to whole-buffer");
                return self.whole_buffer_fallback(wav).await;
            }
        };

        log::info!("transcribing {} segments", segments.len());
        let pool = WorkerPool::new(
            Arc::clone(&self.transcriber),
            self.config.gemini.model.clone(),
            self.config.gemini.fallback_model.clone(),
            self.config.pipeline.max_workers,
            self.segment_timeout(),
        );

        let results = pool.transcribe_all(segments).await;
        aggregate(results)
    }

    /// Segmenter-failure path: exactly one whole-buffer attempt on the
    /// fallback model — never the primary, since a failing split already
    /// suggests an unusual or corrupt input.
    async fn whole_buffer_fallback(&self, wav: &[u8]) -> Result<String, PipelineError> {
        let text = self
            .transcriber
            .transcribe(
                wav,
                &self.config.gemini.fallback_model,
                self.single_shot_timeout(),
            )
            .await?;
        Ok(text)
    }

    /// Hand the transcript to the sink on a blocking task.
    async fn publish(&self, text: &str) -> Result<(), PipelineError> {
        let sink = Arc::clone(&self.sink);
        let text = text.to_string();
        tokio::task::spawn_blocking(move || sink.publish(&text))
            .await
            .map_err(|e| PipelineError::Delivery(format!("publish task panicked: {e}")))?
            .map_err(|e| PipelineError::Delivery(e.to_string()))
    }

    /// Persist the container for a later recovery run.
    fn retain(&self, wav: &[u8]) -> SessionOutcome {
        match self.recovery.retain(wav) {
            Ok(path) => SessionOutcome::failed(Some(path)),
            Err(e) => {
                log::error!("could not retain audio for recovery: {e}");
                SessionOutcome::failed(None)
            }
        }
    }

    fn single_shot_timeout(&self) -> Duration {
        Duration::from_secs(self.config.gemini.single_shot_timeout_secs)
    }

    fn segment_timeout(&self) -> Duration {
        Duration::from_secs(self.config.gemini.segment_timeout_secs)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
