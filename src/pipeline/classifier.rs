//! Size-based strategy selection.
//!
//! A pure, total function of the encoded audio size and two configured
//! thresholds.  No side effects, no failure mode.

use crate::config::PipelineConfig;

// ---------------------------------------------------------------------------
// Strategy
// ---------------------------------------------------------------------------

/// How one pipeline run will transcribe its audio.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Strategy {
    /// Single whole-buffer transcription, no segmentation.
    Direct,
    /// Silence-split into segments, transcribed concurrently.
    Segmented,
    /// Time-compressed first, then silence-split and transcribed.
    SegmentedWithSpeedup,
}

impl std::fmt::Display for Strategy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Strategy::Direct => write!(f, "direct"),
            Strategy::Segmented => write!(f, "segmented"),
            Strategy::SegmentedWithSpeedup => write!(f, "segmented+speedup"),
        }
    }
}

// ---------------------------------------------------------------------------
// classify
// ---------------------------------------------------------------------------

/// Select the strategy for an encoded audio container of `size_bytes`.
///
/// A size exactly at a threshold selects the smaller-strategy branch.
pub fn classify(size_bytes: u64, config: &PipelineConfig) -> Strategy {
    if size_bytes <= config.segment_threshold_bytes() {
        Strategy::Direct
    } else if size_bytes <= config.speedup_threshold_bytes() {
        Strategy::Segmented
    } else {
        Strategy::SegmentedWithSpeedup
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    const MB: u64 = 1024 * 1024;

    fn default_config() -> PipelineConfig {
        // Thresholds 2.0 / 4.0 MB.
        PipelineConfig::default()
    }

    #[test]
    fn small_audio_is_direct() {
        let config = default_config();
        assert_eq!(classify(0, &config), Strategy::Direct);
        assert_eq!(classify(MB, &config), Strategy::Direct);
    }

    #[test]
    fn mid_audio_is_segmented() {
        let config = default_config();
        assert_eq!(classify(3 * MB, &config), Strategy::Segmented);
    }

    #[test]
    fn large_audio_is_segmented_with_speedup() {
        let config = default_config();
        assert_eq!(classify(5 * MB, &config), Strategy::SegmentedWithSpeedup);
        assert_eq!(classify(u64::MAX, &config), Strategy::SegmentedWithSpeedup);
    }

    /// Sizes exactly at a threshold select the smaller-strategy branch.
    #[test]
    fn boundaries_go_to_smaller_strategy() {
        let config = default_config();
        assert_eq!(classify(2 * MB, &config), Strategy::Direct);
        assert_eq!(classify(2 * MB + 1, &config), Strategy::Segmented);
        assert_eq!(classify(4 * MB, &config), Strategy::Segmented);
        assert_eq!(classify(4 * MB + 1, &config), Strategy::SegmentedWithSpeedup);
    }

    /// Same inputs, same output — the classifier is deterministic.
    #[test]
    fn classification_is_deterministic() {
        let config = default_config();
        for size in [0, MB, 3 * MB, 5 * MB] {
            assert_eq!(classify(size, &config), classify(size, &config));
        }
    }

    /// Non-default thresholds shift the boundaries accordingly.
    #[test]
    fn respects_configured_thresholds() {
        let config = PipelineConfig {
            segment_threshold_mb: 1.0,
            speedup_threshold_mb: 2.0,
            ..PipelineConfig::default()
        };
        assert_eq!(classify(MB, &config), Strategy::Direct);
        assert_eq!(classify(MB + 1, &config), Strategy::Segmented);
        assert_eq!(classify(2 * MB + 1, &config), Strategy::SegmentedWithSpeedup);
    }
}
