//! Ordered reassembly of per-segment outcomes.
//!
//! The worker pool's fan-in delivers results in non-deterministic arrival
//! order; this module is the explicit re-sort.  Output always reflects
//! segment index order, never completion order.

use crate::pipeline::PipelineError;
use crate::transcribe::TranscriptionResult;

/// Combine per-segment results into the final transcript.
///
/// Sorts by segment index ascending, discards entries with empty text
/// (failed units carry empty text, so failure and silence are treated
/// identically), joins the survivors with a single space and trims.
///
/// # Errors
///
/// [`PipelineError::AllSegmentsFailed`] when zero entries survive — distinct
/// from any single segment's failure, which is expected partial output.
pub fn aggregate(mut results: Vec<TranscriptionResult>) -> Result<String, PipelineError> {
    results.sort_by_key(|r| r.index);

    let parts: Vec<&str> = results
        .iter()
        .filter(|r| !r.text.is_empty())
        .map(|r| r.text.as_str())
        .collect();

    if parts.is_empty() {
        return Err(PipelineError::AllSegmentsFailed);
    }

    Ok(parts.join(" ").trim().to_string())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
