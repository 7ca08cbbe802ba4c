//! Cloud transcription module.
//!
//! This module provides:
//! * [`Transcriber`] — async trait implemented by all transcription backends.
//! * [`GeminiClient`] — Gemini `generateContent` REST backend.
//! * [`WorkerPool`] — bounded-concurrency per-segment fan-out/fan-in with
//!   per-unit primary → fallback model escalation.
//! * [`TranscriptionResult`] — one per-segment outcome.
//! * [`TranscribeError`] — error variants for a single transcription call.
//!
//! # Quick start
//!
//! ```rust,no_run
//! use std::time::Duration;
//! use voxclip::config::GeminiConfig;
//! use voxclip::transcribe::{GeminiClient, Transcriber};
//!
//! #[tokio::main]
//! async fn main() {
//!     let client = GeminiClient::from_config(&GeminiConfig::default());
//!     let wav: Vec<u8> = std::fs::read("recording.wav").unwrap();
//!     let text = client
//!         .transcribe(&wav, "gemini-1.5-flash", Duration::from_secs(20))
//!         .await
//!         .unwrap();
//!     println!("{text}");
//! }
//! ```

pub mod client;
pub mod pool;

// ---------------------------------------------------------------------------
// Public re-exports
// ---------------------------------------------------------------------------

pub use client::{GeminiClient, TranscribeError, Transcriber};
pub use pool::{TranscriptionResult, WorkerPool};
