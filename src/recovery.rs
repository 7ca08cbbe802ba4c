//! Failure-safe retention of encoded audio.
//!
//! On any unrecoverable pipeline failure the full WAV container is persisted
//! to a single fixed path so the transcription can be retried later (by the
//! `voxclip-recover` binary).  The file's presence is the sole signal that a
//! prior run failed; a new run's write overwrites, never merges with, any
//! prior retained file, and the file is deleted only after a fully
//! successful run including delivery.

use std::io;
use std::path::{Path, PathBuf};

// ---------------------------------------------------------------------------
// RecoveryStore
// ---------------------------------------------------------------------------

/// Single-path store for the audio of the most recent failed run.
#[derive(Debug, Clone)]
pub struct RecoveryStore {
    path: PathBuf,
}

impl RecoveryStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// The fixed retention path.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Whether a retained file from a prior failed run exists.
    pub fn exists(&self) -> bool {
        self.path.exists()
    }

    /// Persist `wav` to the fixed path, overwriting any prior retained file.
    /// Parent directories are created as needed.
    pub fn retain(&self, wav: &[u8]) -> io::Result<PathBuf> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(&self.path, wav)?;
        log::info!(
            "audio retained for recovery at {} ({} bytes)",
            self.path.display(),
            wav.len()
        );
        Ok(self.path.clone())
    }

    /// Read back the retained container for a recovery run.
    pub fn load(&self) -> io::Result<Vec<u8>> {
        std::fs::read(&self.path)
    }

    /// Delete the retained file.  A missing file is not an error — success
    /// after a clean prior run is the common case.
    pub fn clear(&self) -> io::Result<()> {
        match std::fs::remove_file(&self.path) {
            Ok(()) => {
                log::debug!("cleared retained audio at {}", self.path.display());
                Ok(())
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e),
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn retain_then_load_round_trips() {
        let dir = tempdir().expect("temp dir");
        let store = RecoveryStore::new(dir.path().join("retained.wav"));

        assert!(!store.exists());
        let path = store.retain(b"RIFF-data").expect("retain");
        assert_eq!(path, store.path());
        assert!(store.exists());
        assert_eq!(store.load().expect("load"), b"RIFF-data");
    }

    #[test]
    fn retain_overwrites_prior_file() {
        let dir = tempdir().expect("temp dir");
        let store = RecoveryStore::new(dir.path().join("retained.wav"));

        store.retain(b"first").expect("retain");
        store.retain(b"second").expect("retain");
        assert_eq!(store.load().expect("load"), b"second");
    }

    #[test]
    fn retain_creates_parent_dirs() {
        let dir = tempdir().expect("temp dir");
        let store = RecoveryStore::new(dir.path().join("deep/nested/retained.wav"));
        store.retain(b"x").expect("retain");
        assert!(store.exists());
    }

    #[test]
    fn clear_removes_file_and_tolerates_absence() {
        let dir = tempdir().expect("temp dir");
        let store = RecoveryStore::new(dir.path().join("retained.wav"));

        // Clearing a never-written store is fine.
        store.clear().expect("clear empty");

        store.retain(b"x").expect("retain");
        store.clear().expect("clear");
        assert!(!store.exists());

        // Clearing twice is also fine.
        store.clear().expect("clear again");
    }
}
