//! Daemon entry point — voxclip.
//!
//! # Startup sequence
//!
//! 1. Initialise logging.
//! 2. Enforce single instance via a PID lock file.
//! 3. Load [`AppConfig`] from disk (returns default on first run).
//! 4. Preflight external tools (`arecord` fatal, `ffmpeg`/`sox` degrade).
//! 5. Build the pipeline runner from config.
//! 6. Wait for SIGUSR1 toggles: first toggle starts capture, second stops
//!    it and runs the transcription pipeline on a background task.
//!    Ctrl-C / SIGTERM shuts down.
//!
//! A toggle that arrives while a pipeline run is in flight is ignored —
//! exactly one run is active at a time.

use std::fs;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use anyhow::Context;
use tokio::signal::unix::{signal, SignalKind};

use voxclip::audio::Recorder;
use voxclip::config::{AppConfig, AppPaths};
use voxclip::deliver::{ClipboardSink, TextSink};
use voxclip::pipeline::PipelineRunner;
use voxclip::recovery::RecoveryStore;
use voxclip::tools::{
    command_available, ensure_tool, AudioSplitter, AudioTransform, FfmpegTempo,
    SoxSilenceSplitter,
};
use voxclip::transcribe::{GeminiClient, Transcriber};

// ---------------------------------------------------------------------------
// Single-instance lock
// ---------------------------------------------------------------------------

/// Claim the PID lock file, or bail if another live instance holds it.
///
/// A lock file whose PID cannot be parsed, or whose process no longer
/// exists under `/proc`, is treated as stale and replaced.
fn acquire_lock(paths: &AppPaths) -> anyhow::Result<()> {
    if let Ok(contents) = fs::read_to_string(&paths.lock_file) {
        match contents.trim().parse::<u32>() {
            Ok(pid) if std::path::Path::new(&format!("/proc/{pid}")).exists() => {
                anyhow::bail!("another instance is already running (pid {pid})");
            }
            _ => {
                log::warn!("removing stale lock file {}", paths.lock_file.display());
                let _ = fs::remove_file(&paths.lock_file);
            }
        }
    }
    fs::write(&paths.lock_file, std::process::id().to_string())
        .with_context(|| format!("cannot write lock file {}", paths.lock_file.display()))
}

fn release_lock(paths: &AppPaths) {
    let _ = fs::remove_file(&paths.lock_file);
}

// ---------------------------------------------------------------------------
// Runner construction
// ---------------------------------------------------------------------------

fn build_runner(config: &AppConfig, paths: &AppPaths) -> PipelineRunner {
    let transcriber: Arc<dyn Transcriber> = Arc::new(GeminiClient::from_config(&config.gemini));
    let transform: Arc<dyn AudioTransform> = Arc::new(FfmpegTempo::new());
    let splitter: Arc<dyn AudioSplitter> = Arc::new(SoxSilenceSplitter::new(
        config.pipeline.silence_threshold.clone(),
        config.pipeline.min_silence_secs,
    ));
    let sink: Arc<dyn TextSink> = Arc::new(ClipboardSink::new());

    PipelineRunner::new(
        config.clone(),
        transcriber,
        transform,
        splitter,
        sink,
        RecoveryStore::new(paths.recovery_file.clone()),
    )
}

// ---------------------------------------------------------------------------
// main
// ---------------------------------------------------------------------------

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // 1. Logging
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    log::info!("voxclip starting up");

    // 2. Single instance
    let paths = AppPaths::new();
    acquire_lock(&paths)?;

    // 3. Configuration
    let config = AppConfig::load().unwrap_or_else(|e| {
        log::warn!("Failed to load config ({e}); using defaults");
        AppConfig::default()
    });

    // 4. Tool preflight.  Capture cannot run without arecord; the others
    //    only remove pipeline stages when absent.
    if let Err(e) = ensure_tool("arecord") {
        release_lock(&paths);
        return Err(e).context("audio capture is unavailable");
    }
    for tool in ["ffmpeg", "sox"] {
        if !command_available(tool) {
            log::warn!("{tool} not found; long recordings will degrade to whole-buffer transcription");
        }
    }

    // 5. Pipeline runner
    let runner = Arc::new(build_runner(&config, &paths));
    if runner.recovery().exists() {
        log::info!(
            "retained audio from a failed run exists at {} — run voxclip-recover to retry it",
            runner.recovery().path().display()
        );
    }

    // 6. Signal loop
    let mut toggle = signal(SignalKind::user_defined1()).context("cannot install SIGUSR1 handler")?;
    let mut terminate = signal(SignalKind::terminate()).context("cannot install SIGTERM handler")?;

    let processing = Arc::new(AtomicBool::new(false));
    let mut recorder: Option<Recorder> = None;

    log::info!(
        "ready — send SIGUSR1 to pid {} to toggle recording",
        std::process::id()
    );

    loop {
        tokio::select! {
            _ = toggle.recv() => {
                if processing.load(Ordering::SeqCst) {
                    log::info!("toggle ignored: a transcription run is in flight");
                    continue;
                }
                match recorder.take() {
                    None => match Recorder::start(&config.audio) {
                        Ok(r) => {
                            log::info!("recording started");
                            recorder = Some(r);
                        }
                        Err(e) => log::error!("cannot start recording: {e}"),
                    },
                    Some(r) => {
                        let audio = match r.stop().await {
                            Ok(audio) => audio,
                            Err(e) => {
                                log::error!("recording produced no usable audio: {e}");
                                continue;
                            }
                        };
                        log::info!("recording stopped ({} bytes of PCM)", audio.len());

                        processing.store(true, Ordering::SeqCst);
                        let runner = Arc::clone(&runner);
                        let processing = Arc::clone(&processing);
                        tokio::spawn(async move {
                            let outcome = runner.run(audio).await;
                            match (&outcome.final_text, &outcome.retained_audio) {
                                (Some(text), _) => {
                                    log::info!("transcript on clipboard ({} chars)", text.chars().count())
                                }
                                (None, Some(path)) => {
                                    log::error!(
                                        "run failed; audio retained at {} (run voxclip-recover)",
                                        path.display()
                                    )
                                }
                                (None, None) => log::error!("run failed; audio could not be retained"),
                            }
                            processing.store(false, Ordering::SeqCst);
                        });
                    }
                }
            }
            _ = terminate.recv() => {
                log::info!("SIGTERM received, shutting down");
                break;
            }
            _ = tokio::signal::ctrl_c() => {
                log::info!("interrupted, shutting down");
                break;
            }
        }
    }

    if let Some(r) = recorder.take() {
        // Discard whatever was being captured at shutdown.
        let _ = r.stop().await;
    }
    release_lock(&paths);
    Ok(())
}
