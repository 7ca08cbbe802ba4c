//! Delivery sink — hands the final transcript to the consuming surface.
//!
//! The production sink is the system clipboard via the `arboard` crate.  A
//! short-lived [`arboard::Clipboard`] handle is created per call rather than
//! shared, because `arboard::Clipboard` is not `Send` on all platforms and
//! the handle is cheap to create.
//!
//! Delivery success — not just transcription success — gates the recovery
//! store's cleanup-vs-retain decision, so failures here are typed, never
//! swallowed.

use thiserror::Error;

// ---------------------------------------------------------------------------
// DeliverError
// ---------------------------------------------------------------------------

/// All errors that can surface while publishing the final text.
#[derive(Debug, Error)]
pub enum DeliverError {
    /// Could not open the OS clipboard.
    #[error("cannot access clipboard: {0}")]
    ClipboardAccess(String),

    /// Could not write text to the OS clipboard.
    #[error("cannot set clipboard text: {0}")]
    ClipboardSet(String),
}

// ---------------------------------------------------------------------------
// TextSink trait
// ---------------------------------------------------------------------------

/// Capability interface for the publish step.
///
/// Implementations must be `Send + Sync`; the pipeline calls `publish` from
/// a blocking task.  Tests substitute a recording fake.
pub trait TextSink: Send + Sync {
    fn publish(&self, text: &str) -> Result<(), DeliverError>;
}

// ---------------------------------------------------------------------------
// ClipboardSink
// ---------------------------------------------------------------------------

/// Production sink that places the transcript on the system clipboard.
#[derive(Debug, Clone, Default)]
pub struct ClipboardSink;

impl ClipboardSink {
    pub fn new() -> Self {
        Self
    }
}

impl TextSink for ClipboardSink {
    fn publish(&self, text: &str) -> Result<(), DeliverError> {
        let mut clipboard = arboard::Clipboard::new()
            .map_err(|e| DeliverError::ClipboardAccess(e.to_string()))?;
        clipboard
            .set_text(text)
            .map_err(|e| DeliverError::ClipboardSet(e.to_string()))?;
        log::info!("transcript copied to clipboard ({} chars)", text.chars().count());
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    /// ClipboardSink must be usable as a `dyn TextSink`.
    #[test]
    fn sink_is_object_safe() {
        let sink: Box<dyn TextSink> = Box::new(ClipboardSink::new());
        drop(sink);
    }
}
