//! voxclip-recover — replay the retained audio of a failed run.
//!
//! A failed daemon run leaves its WAV container at a fixed path.  This tool
//! feeds that file back through the identical adaptive pipeline: on success
//! the transcript lands on the clipboard and the file is cleared; on another
//! failure the file stays put and the process exits non-zero.

use std::sync::Arc;

use voxclip::config::{AppConfig, AppPaths};
use voxclip::deliver::{ClipboardSink, TextSink};
use voxclip::pipeline::PipelineRunner;
use voxclip::recovery::RecoveryStore;
use voxclip::tools::{
    command_available, AudioSplitter, AudioTransform, FfmpegTempo, SoxSilenceSplitter,
};
use voxclip::transcribe::{GeminiClient, Transcriber};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let paths = AppPaths::new();
    let store = RecoveryStore::new(paths.recovery_file.clone());
    if !store.exists() {
        log::info!("no retained audio at {}; nothing to recover", store.path().display());
        return Ok(());
    }

    let config = AppConfig::load().unwrap_or_else(|e| {
        log::warn!("Failed to load config ({e}); using defaults");
        AppConfig::default()
    });

    // With ffmpeg or sox missing, skip segmentation entirely and make one
    // primary-model whole-buffer call instead of attempting a split that is
    // known to fail.
    let mut direct_only = false;
    for tool in ["ffmpeg", "sox"] {
        if !command_available(tool) {
            log::warn!("{tool} not found; recovery degrades to direct transcription");
            direct_only = true;
        }
    }

    let wav = store.load()?;
    log::info!(
        "recovering {:.2} MB of retained audio from {}",
        wav.len() as f64 / (1024.0 * 1024.0),
        store.path().display()
    );

    let transcriber: Arc<dyn Transcriber> = Arc::new(GeminiClient::from_config(&config.gemini));
    let transform: Arc<dyn AudioTransform> = Arc::new(FfmpegTempo::new());
    let splitter: Arc<dyn AudioSplitter> = Arc::new(SoxSilenceSplitter::new(
        config.pipeline.silence_threshold.clone(),
        config.pipeline.min_silence_secs,
    ));
    let sink: Arc<dyn TextSink> = Arc::new(ClipboardSink::new());
    let runner = PipelineRunner::new(config, transcriber, transform, splitter, sink, store);

    let outcome = if direct_only {
        runner.run_direct(wav).await
    } else {
        runner.run_encoded(wav).await
    };
    match outcome.final_text {
        Some(text) => {
            log::info!("recovered transcript on clipboard ({} chars)", text.chars().count());
            Ok(())
        }
        None => {
            anyhow::bail!(
                "recovery failed; audio remains at {}",
                runner.recovery().path().display()
            )
        }
    }
}
