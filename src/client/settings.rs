//! User settings and their live, shared handle.
//!
//! # File Format
//!
//! ```toml
//! url = "ws://ci.example.com:8081/"
//! show_error_only = false
//! balloon_tip_timeout = 5.0
//! title = "Jenkins"
//! sound_dir = "/usr/share/build-notifier"
//! sound_player = "aplay"
//! ```
//!
//! Every key is optional.

// ============================================================================
// Imports
// ============================================================================

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use tracing::debug;
use url::Url;

use crate::alert::AlertConfig;
use crate::error::{Error, Result};

// ============================================================================
// Constants
// ============================================================================

/// Default server URL.
pub const DEFAULT_URL: &str = "ws://localhost:8080/";

/// Default balloon title.
pub const DEFAULT_TITLE: &str = "Build Notifier";

/// File name inside the config directory.
const SETTINGS_FILE: &str = "settings.toml";

// ============================================================================
// Settings
// ============================================================================

/// Client settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// WebSocket URL of the build server.
    pub url: String,
    /// Only alert on failures.
    pub show_error_only: bool,
    /// Balloon display time in seconds.
    pub balloon_tip_timeout: f64,
    /// Balloon title.
    pub title: String,
    /// Directory with the `.wav` files. Program directory when unset.
    pub sound_dir: Option<PathBuf>,
    /// External command used to play sounds. Silent when unset.
    pub sound_player: Option<String>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            url: DEFAULT_URL.to_string(),
            show_error_only: false,
            balloon_tip_timeout: 5.0,
            title: DEFAULT_TITLE.to_string(),
            sound_dir: None,
            sound_player: None,
        }
    }
}

impl Settings {
    /// Default settings path: `<config dir>/build-notifier/settings.toml`.
    #[must_use]
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("build-notifier").join(SETTINGS_FILE))
    }

    /// Parses settings from TOML text.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Toml`] on malformed input.
    pub fn from_toml_str(text: &str) -> Result<Self> {
        Ok(toml::from_str(text)?)
    }

    /// Reads settings from `path`.
    ///
    /// # Errors
    ///
    /// - [`Error::Io`] if the file cannot be read
    /// - [`Error::Toml`] if it cannot be parsed
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = fs::read_to_string(path)?;
        debug!(path = %path.display(), "Loaded settings");
        Self::from_toml_str(&text)
    }

    /// Reads settings from `path`, or returns defaults if it does not exist.
    ///
    /// # Errors
    ///
    /// Same as [`Settings::load`] for files that exist.
    pub fn load_or_default(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if path.exists() {
            Self::load(path)
        } else {
            debug!(path = %path.display(), "No settings file, using defaults");
            Ok(Self::default())
        }
    }

    /// Checks the settings.
    ///
    /// # Errors
    ///
    /// - [`Error::InvalidUrl`] if `url` does not parse or is not `ws`/`wss`
    /// - [`Error::Config`] if `balloon_tip_timeout` is negative or not finite
    pub fn validate(&self) -> Result<()> {
        let url = Url::parse(&self.url).map_err(|e| Error::invalid_url(&self.url, e.to_string()))?;
        if !matches!(url.scheme(), "ws" | "wss") {
            return Err(Error::invalid_url(&self.url, "scheme must be ws or wss"));
        }

        if !self.balloon_tip_timeout.is_finite() || self.balloon_tip_timeout < 0.0 {
            return Err(Error::config(format!(
                "balloon_tip_timeout must be a non-negative number of seconds, got {}",
                self.balloon_tip_timeout
            )));
        }

        Ok(())
    }

    /// Alert-relevant subset.
    #[inline]
    #[must_use]
    pub fn alert_config(&self) -> AlertConfig {
        AlertConfig {
            show_error_only: self.show_error_only,
            balloon_timeout_secs: self.balloon_tip_timeout,
        }
    }
}

// ============================================================================
// SettingsHandle
// ============================================================================

/// Shared, live view of the current settings.
///
/// Readers always see the latest [`SettingsHandle::replace`].
#[derive(Debug, Clone, Default)]
pub struct SettingsHandle {
    inner: Arc<RwLock<Settings>>,
}

impl SettingsHandle {
    /// Wraps `settings`.
    #[must_use]
    pub fn new(settings: Settings) -> Self {
        Self {
            inner: Arc::new(RwLock::new(settings)),
        }
    }

    /// Copy of the current settings.
    #[must_use]
    pub fn snapshot(&self) -> Settings {
        self.inner.read().clone()
    }

    /// Current server URL.
    #[must_use]
    pub fn url(&self) -> String {
        self.inner.read().url.clone()
    }

    /// Current alert configuration.
    #[must_use]
    pub fn alert_config(&self) -> AlertConfig {
        self.inner.read().alert_config()
    }

    /// Current balloon title.
    #[must_use]
    pub fn title(&self) -> String {
        self.inner.read().title.clone()
    }

    /// Current sound directory override.
    #[must_use]
    pub fn sound_dir(&self) -> Option<PathBuf> {
        self.inner.read().sound_dir.clone()
    }

    /// Current sound player command.
    #[must_use]
    pub fn sound_player(&self) -> Option<String> {
        self.inner.read().sound_player.clone()
    }

    /// Replaces the settings.
    pub fn replace(&self, settings: Settings) {
        *self.inner.write() = settings;
    }

    /// Edits the settings in place.
    pub fn update(&self, edit: impl FnOnce(&mut Settings)) {
        edit(&mut *self.inner.write());
    }
}

// ============================================================================
// Tests
// ============================================================================
