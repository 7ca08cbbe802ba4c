//! Cross-platform application paths using the `dirs` crate.
//!
//! Layout:
//!
//! Config dir (settings):
//!   Windows: %APPDATA%\voxclip\
//!   macOS:   ~/Library/Application Support/voxclip/
//!   Linux:   ~/.config/voxclip/
//!
//! Data dir (retained audio from failed runs):
//!   Windows: %LOCALAPPDATA%\voxclip\
//!   macOS:   ~/Library/Application Support/voxclip/
//!   Linux:   ~/.local/share/voxclip/

use std::path::PathBuf;

/// Holds all resolved application directory/file paths.
#[derive(Debug, Clone)]
pub struct AppPaths {
    /// Directory for `settings.toml`.
    pub config_dir: PathBuf,
    /// Full path to `settings.toml`.
    pub settings_file: PathBuf,
    /// Fixed path for the retained audio of a failed run.  Its presence is
    /// the sole signal that a prior run failed and can be retried.
    pub recovery_file: PathBuf,
    /// PID lock file for single-instance enforcement of the daemon.
    pub lock_file: PathBuf,
}

impl AppPaths {
    const APP_NAME: &'static str = "voxclip";

    /// Resolves all paths using the `dirs` crate.
    ///
    /// Falls back to the current directory if the platform cannot provide a
    /// standard path (should be extremely rare in practice).
    pub fn new() -> Self {
        let config_dir = dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(Self::APP_NAME);

        let data_dir = dirs::data_local_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(Self::APP_NAME);

        let settings_file = config_dir.join("settings.toml");
        let recovery_file = data_dir.join("retained-audio.wav");
        let lock_file = std::env::temp_dir().join("voxclip.pid");

        Self {
            config_dir,
            settings_file,
            recovery_file,
            lock_file,
        }
    }
}

impl Default for AppPaths {
    fn default() -> Self {
        Self::new()
    }
}
