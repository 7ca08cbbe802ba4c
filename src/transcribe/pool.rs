//! Bounded-concurrency segment transcription — fan-out/fan-in with per-unit
//! model fallback.
//!
//! The pool spawns one task per segment, capped by a semaphore at
//! `min(max_workers, segment_count)`, and returns only after **every**
//! submitted unit has produced a [`TranscriptionResult`].  A unit that fails
//! the primary model is retried once on the fallback model; a unit that
//! fails both is recorded as a terminal failure without affecting its
//! siblings.  Partial success is expected output, not an error.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::Semaphore;

use crate::tools::Segment;
use crate::transcribe::Transcriber;

// ---------------------------------------------------------------------------
// TranscriptionResult
// ---------------------------------------------------------------------------

/// Outcome of one transcription unit.
///
/// Invariant: `succeeded == false` implies `text.is_empty()`.  Aggregation
/// treats empty text and failure identically, so the two constructors are
/// the only way to build a result.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TranscriptionResult {
    pub index: usize,
    pub text: String,
    pub succeeded: bool,
}

impl TranscriptionResult {
    /// A successful unit.  The text may still be empty (silent segment).
    pub fn ok(index: usize, text: String) -> Self {
        Self {
            index,
            text,
            succeeded: true,
        }
    }

    /// A unit that failed both the primary and fallback attempts.
    pub fn failed(index: usize) -> Self {
        Self {
            index,
            text: String::new(),
            succeeded: false,
        }
    }
}

// ---------------------------------------------------------------------------
// WorkerPool
// ---------------------------------------------------------------------------

/// Fan-out/fan-in transcription of independent segments.
pub struct WorkerPool {
    transcriber: Arc<dyn Transcriber>,
    primary_model: String,
    fallback_model: String,
    max_workers: usize,
    segment_timeout: Duration,
}

impl WorkerPool {
    pub fn new(
        transcriber: Arc<dyn Transcriber>,
        primary_model: impl Into<String>,
        fallback_model: impl Into<String>,
        max_workers: usize,
        segment_timeout: Duration,
    ) -> Self {
        Self {
            transcriber,
            primary_model: primary_model.into(),
            fallback_model: fallback_model.into(),
            max_workers: max_workers.max(1),
            segment_timeout,
        }
    }

    /// Transcribe all segments and return one result per segment.
    ///
    /// This is a barrier: the returned vector always has exactly
    /// `segments.len()` entries, one per submitted unit, success or terminal
    /// failure.  Arrival order is not meaningful — callers must sort by
    /// `index`.
    pub async fn transcribe_all(&self, segments: Vec<Segment>) -> Vec<TranscriptionResult> {
        let cap = self.max_workers.min(segments.len().max(1));
        let semaphore = Arc::new(Semaphore::new(cap));

        let mut handles = Vec::with_capacity(segments.len());
        for segment in segments {
            let semaphore = Arc::clone(&semaphore);
            let transcriber = Arc::clone(&self.transcriber);
            let primary = self.primary_model.clone();
            let fallback = self.fallback_model.clone();
            let timeout = self.segment_timeout;
            let index = segment.index;

            let handle = tokio::spawn(async move {
                // Permit held for the full unit, both attempts included.
                let _permit = semaphore.acquire_owned().await;
                transcribe_unit(&*transcriber, &segment, &primary, &fallback, timeout).await
            });
            handles.push((index, handle));
        }

        let mut results = Vec::with_capacity(handles.len());
        for (index, handle) in handles {
            match handle.await {
                Ok(result) => results.push(result),
                Err(e) => {
                    log::error!("segment {index}: worker task panicked: {e}");
                    results.push(TranscriptionResult::failed(index));
                }
            }
        }
        results
    }
}

/// Run one unit: read the segment file, attempt the primary model, escalate
/// once to the fallback model, then give up.
async fn transcribe_unit(
    transcriber: &dyn Transcriber,
    segment: &Segment,
    primary: &str,
    fallback: &str,
    timeout: Duration,
) -> TranscriptionResult {
    let wav = match tokio::fs::read(&segment.path).await {
        Ok(bytes) => bytes,
        Err(e) => {
            log::error!(
                "segment {}: cannot read {}: {e}",
                segment.index,
                segment.path.display()
            );
            return TranscriptionResult::failed(segment.index);
        }
    };

    match transcriber.transcribe(&wav, primary, timeout).await {
        Ok(text) => TranscriptionResult::ok(segment.index, text),
        Err(primary_err) => {
            log::warn!(
                "segment {}: {primary} failed ({primary_err}), retrying with {fallback}",
                segment.index
            );
            match transcriber.transcribe(&wav, fallback, timeout).await {
                Ok(text) => TranscriptionResult::ok(segment.index, text),
                Err(fallback_err) => {
                    log::warn!(
                        "segment {}: fallback {fallback} also failed ({fallback_err})",
                        segment.index
                    );
                    TranscriptionResult::failed(segment.index)
                }
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
