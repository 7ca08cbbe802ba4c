//! Application settings structs, defaults and TOML persistence.
//!
//! All structs implement `Serialize`, `Deserialize`, `Default` and `Clone`
//! so they can be round-tripped through TOML files and shared across threads.

use anyhow::Result;
use serde::{Deserialize, Serialize};

use super::AppPaths;

// ---------------------------------------------------------------------------
// GeminiConfig
// ---------------------------------------------------------------------------

/// Settings for the Gemini transcription API.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeminiConfig {
    /// Base URL of the Generative Language API.
    pub base_url: String,
    /// API key.  `None` means "read from the `GEMINI_API_KEY` environment
    /// variable at runtime" — see [`GeminiConfig::resolve_api_key`].
    pub api_key: Option<String>,
    /// Primary model identifier (e.g. `"gemini-1.5-flash"`).
    pub model: String,
    /// Fallback model attempted once after the primary fails for a given
    /// transcription unit (e.g. `"gemini-1.5-flash-8b"`).
    pub fallback_model: String,
    /// Instruction text sent alongside the audio payload.
    pub prompt: String,
    /// Sampling temperature.  Low values keep transcription consistent.
    pub temperature: f32,
    /// Maximum output tokens per response.
    pub max_output_tokens: u32,
    /// Timeout budget for a whole-buffer (single-shot) transcription call.
    pub single_shot_timeout_secs: u64,
    /// Timeout budget for one per-segment transcription call.
    pub segment_timeout_secs: u64,
}

impl Default for GeminiConfig {
    fn default() -> Self {
        Self {
            base_url: "https://generativelanguage.googleapis.com/v1beta".into(),
            api_key: None,
            model: "gemini-1.5-flash".into(),
            fallback_model: "gemini-1.5-flash-8b".into(),
            prompt: "Transcribe this audio accurately and quickly.".into(),
            temperature: 0.1,
            max_output_tokens: 1000,
            single_shot_timeout_secs: 20,
            segment_timeout_secs: 15,
        }
    }
}

impl GeminiConfig {
    /// Return the configured API key, preferring the `GEMINI_API_KEY`
    /// environment variable over the settings file so the key never has to
    /// be written to disk.
    pub fn resolve_api_key(&self) -> Option<String> {
        std::env::var("GEMINI_API_KEY")
            .ok()
            .filter(|k| !k.is_empty())
            .or_else(|| self.api_key.clone().filter(|k| !k.is_empty()))
    }
}

// ---------------------------------------------------------------------------
// AudioConfig
// ---------------------------------------------------------------------------

/// Settings for raw PCM capture.  The values describe the stream `arecord`
/// is asked to produce and the WAV metadata written around it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AudioConfig {
    /// ALSA capture device name.
    pub device: String,
    /// Sample rate in Hz (16 kHz is optimal for speech models).
    pub sample_rate: u32,
    /// Channel count (mono).
    pub channels: u16,
    /// Bits per sample (S16_LE).
    pub bits_per_sample: u16,
}

impl Default for AudioConfig {
    fn default() -> Self {
        Self {
            device: "default".into(),
            sample_rate: 16_000,
            channels: 1,
            bits_per_sample: 16,
        }
    }
}

// ---------------------------------------------------------------------------
// PipelineConfig
// ---------------------------------------------------------------------------

/// Settings controlling the adaptive transcription pipeline.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineConfig {
    /// Encoded audio at or below this size (MB) is transcribed in one shot.
    pub segment_threshold_mb: f64,
    /// Encoded audio above this size (MB) is time-compressed before
    /// segmentation.  Must be greater than `segment_threshold_mb`;
    /// conventionally 2×.
    pub speedup_threshold_mb: f64,
    /// Tempo multiplier applied by the speed-adjust step (> 1.0).
    pub speed_factor: f64,
    /// Relative silence amplitude threshold passed to the splitter
    /// (e.g. `"1%"`).
    pub silence_threshold: String,
    /// Minimum silence duration (seconds) that delimits two segments.
    pub min_silence_secs: f64,
    /// Concurrency cap for per-segment transcription.  The effective cap is
    /// `min(max_workers, segment_count)`.
    pub max_workers: usize,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            segment_threshold_mb: 2.0,
            speedup_threshold_mb: 4.0,
            speed_factor: 2.0,
            silence_threshold: "1%".into(),
            min_silence_secs: 1.0,
            max_workers: 4,
        }
    }
}

impl PipelineConfig {
    /// `segment_threshold_mb` converted to bytes.
    pub fn segment_threshold_bytes(&self) -> u64 {
        (self.segment_threshold_mb * 1024.0 * 1024.0) as u64
    }

    /// `speedup_threshold_mb` converted to bytes.
    pub fn speedup_threshold_bytes(&self) -> u64 {
        (self.speedup_threshold_mb * 1024.0 * 1024.0) as u64
    }
}

// ---------------------------------------------------------------------------
// AppConfig  (top-level)
// ---------------------------------------------------------------------------

/// Top-level application configuration, serialised as `settings.toml`.
///
/// # Persistence
///
/// ```rust,no_run
/// use voxclip::config::AppConfig;
///
/// // Load (returns Default when file is missing)
/// let config = AppConfig::load().unwrap();
///
/// // Modify and save
/// // config.save().unwrap();
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Gemini API settings.
    pub gemini: GeminiConfig,
    /// Capture / WAV metadata settings.
    pub audio: AudioConfig,
    /// Adaptive pipeline settings.
    pub pipeline: PipelineConfig,
}

impl AppConfig {
    /// Load configuration from the platform-appropriate `settings.toml`.
    ///
    /// Returns `Ok(AppConfig::default())` when the file does not exist yet
    /// (first-run scenario) so callers never need to special-case a missing
    /// file.
    pub fn load() -> Result<Self> {
        Self::load_from(&AppPaths::new().settings_file)
    }

    /// Load from an explicit path (useful for tests).
    pub fn load_from(path: &std::path::Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path)?;
        let config: Self = toml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Save configuration to the platform-appropriate `settings.toml`,
    /// creating parent directories as needed.
    pub fn save(&self) -> Result<()> {
        self.save_to(&AppPaths::new().settings_file)
    }

    /// Save to an explicit path (useful for tests).
    pub fn save_to(&self, path: &std::path::Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Reject configurations the pipeline cannot honour.
    pub fn validate(&self) -> Result<()> {
        if self.pipeline.speedup_threshold_mb <= self.pipeline.segment_threshold_mb {
            anyhow::bail!(
                "pipeline.speedup_threshold_mb ({}) must be greater than \
                 pipeline.segment_threshold_mb ({})",
                self.pipeline.speedup_threshold_mb,
                self.pipeline.segment_threshold_mb
            );
        }
        if self.pipeline.speed_factor <= 1.0 {
            anyhow::bail!(
                "pipeline.speed_factor ({}) must be greater than 1.0",
                self.pipeline.speed_factor
            );
        }
        if self.pipeline.max_workers == 0 {
            anyhow::bail!("pipeline.max_workers must be at least 1");
        }
        if self.gemini.segment_timeout_secs > self.gemini.single_shot_timeout_secs {
            anyhow::bail!(
                "gemini.segment_timeout_secs ({}) must not exceed \
                 gemini.single_shot_timeout_secs ({})",
                self.gemini.segment_timeout_secs,
                self.gemini.single_shot_timeout_secs
            );
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
